// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{
    default_routes, Config, ControllerKind, HttpConfig, LoggingConfig, MiddlewareKind,
    PerformanceConfig, RouteSpec, ServerConfig, StorageConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file
    /// (optional), then `MVC_*` environment variables such as `MVC_SERVER__PORT`.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "mvc-server")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("storage.base_dir", "./database")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("MVC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cfg = Config::load_from(missing.to_str().unwrap()).unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.base_dir, "./database");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.routes, default_routes());
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_file_overrides_defaults_and_routes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 9090

[storage]
base_dir = "/tmp/mvc-data"

[[routes]]
method = "get"
path = "/ping"
controller = "ping_with_auth"
"#,
        )
        .unwrap();

        let cfg = Config::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.storage.base_dir, "/tmp/mvc-data");
        assert_eq!(cfg.routes.len(), 1);
        assert_eq!(cfg.routes[0].controller, ControllerKind::PingWithAuth);
        assert!(cfg.routes[0].middlewares.is_empty());
    }
}
