//! Domain model for the pets resource.
//!
//! # Responsibility
//! - Describe the `pets` table: column identifiers and enumerated domains.
//! - Hold the field payload used by insert/update and its validation rules.
//!
//! # Invariants
//! - Every stored pet has a valid `gender` and a non-empty `name`.
//! - `weight` is never negative.
//! - `id` is assigned by storage and cannot appear in a write payload.

pub mod pet;
