//! Route controllers

use hyper::StatusCode;
use serde_json::{json, Map, Value};

use super::auth;
use crate::config::{AppState, ControllerKind};
use crate::error::{DispatchError, RepositoryError};
use crate::http::Exchange;
use crate::logger;
use crate::routing::{Flow, Stage};

impl Stage<AppState> for ControllerKind {
    async fn run(&self, exchange: &mut Exchange, state: &AppState) -> Result<Flow, DispatchError> {
        match self {
            Self::SignUp => sign_up(exchange, state).await?,
            Self::SignIn => sign_in(exchange, state).await?,
            Self::PingWithAuth => ping_with_auth(exchange),
        }
        Ok(Flow::Halt)
    }
}

pub fn handle_not_found(exchange: &mut Exchange) {
    let message = format!("Route {} not found.", exchange.path());
    exchange.send_text(StatusCode::NOT_FOUND, message);
}

/// Runs behind `authenticate`, which leaves the verified user on the exchange
pub fn ping_with_auth(exchange: &mut Exchange) {
    if let Some(username) = exchange
        .user
        .as_ref()
        .and_then(|user| user.get("username"))
        .and_then(Value::as_str)
    {
        logger::log_debug(&format!("Authenticated ping from '{username}'"));
    }
    exchange.send_text(StatusCode::OK, "Success");
}

pub async fn sign_up(exchange: &mut Exchange, state: &AppState) -> Result<(), DispatchError> {
    let input = body_object(exchange);

    match auth::insert_user(&state.users, &input).await {
        Ok(user) => exchange.send_json(
            StatusCode::CREATED,
            &json!({"status": "success", "id": user.get("id")}),
        ),
        Err(RepositoryError::Validation(e)) => {
            send_fail(exchange, StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e @ RepositoryError::Uniqueness { .. }) => {
            send_fail(exchange, StatusCode::CONFLICT, &e.to_string())
        }
        Err(e @ RepositoryError::Store(_)) => Err(e.into()),
    }
}

pub async fn sign_in(exchange: &mut Exchange, state: &AppState) -> Result<(), DispatchError> {
    let input = body_object(exchange);
    let (Some(username), Some(password)) = (
        input.get("username").and_then(Value::as_str),
        input.get("password").and_then(Value::as_str),
    ) else {
        return send_fail(
            exchange,
            StatusCode::BAD_REQUEST,
            "Fields 'username' and 'password' must be strings",
        );
    };

    if auth::verify_user(&state.users, username, password).await.is_some() {
        exchange.send_json(StatusCode::OK, &json!({"status": "success"}))
    } else {
        exchange.send_json(StatusCode::UNAUTHORIZED, &json!({"status": "fail"}))
    }
}

/// The parsed body as an object; anything else counts as empty
fn body_object(exchange: &Exchange) -> Map<String, Value> {
    match &exchange.json_body {
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    }
}

fn send_fail(
    exchange: &mut Exchange,
    status: StatusCode,
    message: &str,
) -> Result<(), DispatchError> {
    exchange.send_json(status, &json!({"status": "fail", "message": message}))
}
