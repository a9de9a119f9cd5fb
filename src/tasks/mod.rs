//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: purges expired entries that nobody reads any more

mod sweep;

pub use sweep::spawn_sweep_task;
