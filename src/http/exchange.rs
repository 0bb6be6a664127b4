//! Request/response exchange
//!
//! Carries the buffered request and the response under construction through
//! a middleware/controller chain. Middleware attach parsed state (the JSON
//! body, the authenticated user) for the steps that follow.

use hyper::body::Bytes;
use hyper::header::{AsHeaderName, HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::Value;

use crate::error::DispatchError;
use crate::logger;
use crate::store::Entity;

pub struct Exchange {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,

    /// Set by the body-parsing middleware
    pub json_body: Option<Value>,
    /// Set by the authentication middleware
    pub user: Option<Entity>,

    status: StatusCode,
    response_headers: HeaderMap,
    response_body: Bytes,
    ended: bool,
}

impl Exchange {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            headers,
            body,
            json_body: None,
            user: None,
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            response_body: Bytes::new(),
            ended: false,
        }
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path component only; the query string never takes part in routing
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_header(&mut self, name: HeaderName, value: &str) -> Result<(), DispatchError> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| DispatchError::Response(format!("invalid value for {name}: {e}")))?;
        self.response_headers.insert(name, value);
        Ok(())
    }

    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Finish the response. Later calls are ignored with a warning.
    pub fn end(&mut self, body: impl Into<Bytes>) {
        if self.ended {
            logger::log_warning(&format!(
                "Response for {} {} already ended, ignoring extra write",
                self.method, self.path
            ));
            return;
        }
        self.response_body = body.into();
        self.ended = true;
    }

    pub fn send_text(&mut self, status: StatusCode, text: impl Into<String>) {
        self.status = status;
        self.response_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.end(text.into());
    }

    pub fn send_json<T: Serialize>(
        &mut self,
        status: StatusCode,
        body: &T,
    ) -> Result<(), DispatchError> {
        let json = serde_json::to_vec(body)
            .map_err(|e| DispatchError::Response(format!("failed to serialize JSON body: {e}")))?;
        self.status = status;
        self.response_headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.end(json);
        Ok(())
    }

    /// Discard whatever was written so far and answer with a bare status
    pub fn fail(&mut self, status: StatusCode) {
        self.status = status;
        self.response_headers.clear();
        self.response_body = Bytes::new();
        self.ended = true;
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.response_headers, self.response_body)
    }
}
