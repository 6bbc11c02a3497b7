//! Shared domain types and pure scheduling logic for SagePilot services.
//!
//! Everything here is request-scoped read projection: identities, sessions,
//! normalized sheet rows, and platform test links. No module in this crate
//! performs I/O; the `sagepilot-api` binary owns the store and the HTTP
//! clients and feeds their results through these types.

pub mod content;
pub mod error;
pub mod identity;
pub mod schedule;
pub mod sessions;
