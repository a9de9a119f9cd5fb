//! Request and Response models for the command envelope
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing command envelopes and HTTP response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{Command, KeyRequest, SetRequest, TtlSeconds};
pub use responses::{
    CommandResponse, DeleteAllResponse, DeleteResponse, GetResponse, HealthResponse,
    ReadingsResponse, SetResponse, StatsResponse,
};
