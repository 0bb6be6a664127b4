//! Request handler module
//!
//! Dispatches requests through the route table and holds the controllers,
//! middleware and user helpers they run.

pub mod auth;
pub mod controllers;
pub mod middleware;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
