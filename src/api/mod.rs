//! API Module
//!
//! Command dispatcher and HTTP routing for the key-value server.
//!
//! # Endpoints
//! - `POST /command` - Execute a `set`, `get`, `delete` or `delete_all` envelope
//! - `GET /readings` - Every live key with its value and timestamps
//! - `GET /stats` - Engine counters
//! - `GET /health` - Health check endpoint

pub mod commands;
pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
