//! Routing module
//!
//! Provides:
//! - Exact (method, path) route lookup
//! - Sequential middleware chains in front of each controller

mod chain;
mod table;

pub use chain::{run_chain, Flow, Stage};
pub use table::{Resolved, RouteEntry, RouteTable};
