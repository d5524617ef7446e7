//! Provider use-case layer.
//!
//! # Responsibility
//! - Route identifiers to typed operations and validate payloads.
//! - Keep collaborators decoupled from SQL and connection handling.

pub mod pet_provider;
