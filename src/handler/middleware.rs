//! Middleware run before controllers

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use hyper::StatusCode;
use serde_json::{json, Map, Value};

use super::auth;
use crate::config::{AppState, MiddlewareKind};
use crate::error::DispatchError;
use crate::http::Exchange;
use crate::logger;
use crate::routing::{Flow, Stage};

impl Stage<AppState> for MiddlewareKind {
    async fn run(&self, exchange: &mut Exchange, state: &AppState) -> Result<Flow, DispatchError> {
        match self {
            Self::ParseRequestBody => parse_request_body(exchange),
            Self::Authenticate => authenticate(exchange, state).await,
        }
    }
}

/// Parse the buffered body as JSON; an empty body counts as `{}`
pub fn parse_request_body(exchange: &mut Exchange) -> Result<Flow, DispatchError> {
    let body = exchange.body().clone();
    if body.iter().all(u8::is_ascii_whitespace) {
        exchange.json_body = Some(Value::Object(Map::new()));
        return Ok(Flow::Next);
    }

    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => {
            exchange.json_body = Some(value);
            Ok(Flow::Next)
        }
        Err(e) => {
            logger::log_debug(&format!("Rejecting body for {}: {e}", exchange.path()));
            exchange.send_json(
                StatusCode::BAD_REQUEST,
                &json!({"status": "fail", "message": format!("Invalid JSON: {e}")}),
            )?;
            Ok(Flow::Halt)
        }
    }
}

/// Require HTTP Basic credentials of an existing user
pub async fn authenticate(
    exchange: &mut Exchange,
    state: &AppState,
) -> Result<Flow, DispatchError> {
    let user = match basic_credentials(exchange) {
        Some((username, password)) => auth::verify_user(&state.users, &username, &password).await,
        None => None,
    };

    if let Some(user) = user {
        exchange.user = Some(user);
        return Ok(Flow::Next);
    }

    exchange.set_header(WWW_AUTHENTICATE, "Basic realm=\"mvc-server\"")?;
    exchange.send_json(StatusCode::UNAUTHORIZED, &json!({"status": "fail"}))?;
    Ok(Flow::Halt)
}

fn basic_credentials(exchange: &Exchange) -> Option<(String, String)> {
    let header = exchange.header(AUTHORIZATION)?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
