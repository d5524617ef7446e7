//! Storage backend for the pets table.
//!
//! # Responsibility
//! - Define the storage contract used by the provider (query, insert,
//!   update, delete, clear).
//! - Keep SQL text and parameter binding inside this module.
//!
//! # Invariants
//! - Writes on one repository are mutually exclusive.
//! - Filters and sort orders only reference closed-enum column names; every
//!   caller-supplied value is bound as a parameter.

pub mod pet_repo;
pub mod query;
