//! Resource identifiers for the pets collection.
//!
//! # Responsibility
//! - Classify `<scheme>://<authority>/pets[/<id>]` identifiers.
//! - Build collection and item identifiers for callers and notifications.
//!
//! # Invariants
//! - Classification is pure and allocation-free.

pub mod matcher;
