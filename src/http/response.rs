//! HTTP response building module
//!
//! Turns a finished exchange into a hyper response, plus the few responses
//! the dispatcher produces before any chain runs.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::{HeaderMap, Response, StatusCode};

use super::exchange::Exchange;

/// Build the final response for an exchange
pub fn build_exchange_response(exchange: Exchange, server_name: &str) -> Response<Full<Bytes>> {
    let (status, headers, body) = exchange.into_parts();
    build_response(status, headers, body, server_name)
}

/// Build 413 Payload Too Large response
pub fn build_413_response(server_name: &str) -> Response<Full<Bytes>> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    build_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        headers,
        Bytes::from("413 Payload Too Large"),
        server_name,
    )
}

/// Build 400 Bad Request response for unreadable bodies
pub fn build_400_response(server_name: &str) -> Response<Full<Bytes>> {
    build_response(
        StatusCode::BAD_REQUEST,
        HeaderMap::new(),
        Bytes::new(),
        server_name,
    )
}

fn build_response(
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(status)
        .header(SERVER, server_name)
        .header(CONTENT_LENGTH, body.len());

    for (name, value) in &headers {
        builder = builder.header(name, value);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status, &e);
        let mut fallback = Response::new(Full::new(Bytes::new()));
        *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        fallback
    })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
