// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    /// Route table, in declaration order
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteSpec>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Zero disables keep-alive; any other value enables it
    pub keep_alive_timeout: u64,
    /// Together with `write_timeout`, `max(read, write)` seconds bound a whole connection
    pub read_timeout: u64,
    pub write_timeout: u64,
    /// Connections beyond this many are dropped on accept
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Flat-file storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one `<collection>.json` file per collection
    pub base_dir: String,
}

/// One route table record: exact method + path to a controller
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub method: String,
    pub path: String,
    pub controller: ControllerKind,
    /// Run in order before the controller
    #[serde(default)]
    pub middlewares: Vec<MiddlewareKind>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    SignUp,
    SignIn,
    PingWithAuth,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewareKind {
    ParseRequestBody,
    Authenticate,
}

pub fn default_routes() -> Vec<RouteSpec> {
    vec![
        RouteSpec {
            method: "POST".to_string(),
            path: "/sign-up".to_string(),
            controller: ControllerKind::SignUp,
            middlewares: vec![MiddlewareKind::ParseRequestBody],
        },
        RouteSpec {
            method: "POST".to_string(),
            path: "/sign-in".to_string(),
            controller: ControllerKind::SignIn,
            middlewares: vec![MiddlewareKind::ParseRequestBody],
        },
        RouteSpec {
            method: "GET".to_string(),
            path: "/ping-with-auth".to_string(),
            controller: ControllerKind::PingWithAuth,
            middlewares: vec![MiddlewareKind::Authenticate],
        },
    ]
}
