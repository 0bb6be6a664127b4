//! HTTP protocol layer module
//!
//! The exchange passed through middleware chains and the builders that turn
//! it into a hyper response.

pub mod exchange;
pub mod response;

pub use exchange::Exchange;
pub use response::{build_400_response, build_413_response, build_exchange_response};
