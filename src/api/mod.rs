//! API module
//!
//! HTTP endpoints for the ledger.

pub mod routes;

pub use routes::create_router;
