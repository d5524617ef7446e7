//! Change notification channel keyed by resource identifier.
//!
//! # Responsibility
//! - Let collaborators subscribe to invalidation events for an identifier.
//! - Deliver provider publishes synchronously and without blocking.
//!
//! # Invariants
//! - No replay: a publish with no matching subscriber is dropped.
//! - Delivery is hierarchical along `/` segment boundaries.

pub mod channel;
