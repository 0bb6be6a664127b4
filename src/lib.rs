//! mvc-server
//!
//! A small HTTP application server: a JSON file store, schema-validated
//! repositories, and a configurable route table whose routes run a
//! middleware chain before their controller.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod repository;
pub mod routing;
pub mod server;
pub mod store;
