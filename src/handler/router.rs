//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: reads the body, resolves the
//! route, runs its chain and writes the access log.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{HeaderMap, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use super::controllers;
use crate::config::AppState;
use crate::http::{self, Exchange};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{run_chain, Resolved};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let server_name = state.config.http.server_name.as_str();
    let max_body_size = state.config.http.max_body_size;

    let mut entry = access_entry(
        peer_addr,
        &parts.method,
        &parts.uri,
        parts.version,
        &parts.headers,
    );

    logger::log_headers_count(parts.headers.len(), state.config.logging.show_headers);

    let response = if exceeds_declared_length(&parts.headers, max_body_size) {
        http::build_413_response(server_name)
    } else {
        let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
        match Limited::new(body, limit).collect().await {
            Ok(collected) => {
                let mut exchange =
                    Exchange::new(parts.method, &parts.uri, parts.headers, collected.to_bytes());
                dispatch(&mut exchange, &state).await;
                http::build_exchange_response(exchange, server_name)
            }
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                logger::log_warning(&format!("Request body exceeds {max_body_size} bytes"));
                http::build_413_response(server_name)
            }
            Err(e) => {
                logger::log_warning(&format!("Failed to read request body: {e}"));
                http::build_400_response(server_name)
            }
        }
    };

    if state.cached_access_log.load(Ordering::Relaxed) {
        record_response(&mut entry, &response, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve the exchange's route and run it.
///
/// Chain errors are logged and answered with a 500 and an empty body.
pub async fn dispatch(exchange: &mut Exchange, state: &AppState) {
    let resolved = state.routes.route(exchange.method(), exchange.path());
    match resolved {
        Resolved::Matched(entry) => {
            let outcome =
                run_chain(&entry.middlewares, &entry.controller, exchange, state).await;
            if let Err(e) = outcome {
                logger::log_error(&format!("{} {} failed: {e}", entry.method, entry.path));
                exchange.fail(StatusCode::INTERNAL_SERVER_ERROR);
            } else if !exchange.is_ended() {
                logger::log_debug(&format!(
                    "{} {} finished without a body, sending {}",
                    entry.method,
                    entry.path,
                    exchange.status()
                ));
            }
        }
        Resolved::NotFound => controllers::handle_not_found(exchange),
    }
}

/// Early 413 based on the declared Content-Length
fn exceeds_declared_length(headers: &HeaderMap, max_body_size: u64) -> bool {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return false;
    };
    match value.to_str().ok().and_then(|v| v.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Some(_) => false,
        None => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            false
        }
    }
}

fn access_entry(
    peer_addr: SocketAddr,
    method: &hyper::Method,
    uri: &hyper::Uri,
    version: Version,
    headers: &HeaderMap,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        method.to_string(),
        uri.path().to_string(),
    );
    entry.query = uri.query().map(ToString::to_string);
    entry.http_version = match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

/// Fill in the response side of an access log entry
fn record_response(
    entry: &mut AccessLogEntry,
    response: &Response<Full<Bytes>>,
    started: Instant,
) {
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
}
