//! SQLite storage bootstrap for the pets store.
//!
//! # Responsibility
//! - Open the single connection backing the `pets` table.
//! - Ensure the table exists before any row is read or written.
//!
//! # Invariants
//! - Schema setup is idempotent: reopening an existing file keeps its rows.
//! - There is no versioned migration; `pets.sql` only creates what is missing.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while bringing up a pets connection.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused to open `target` (a file path or `:memory:`).
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Pragmas or the `pets` table definition could not be applied.
    Schema(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "cannot open pets database `{target}`: {source}")
            }
            Self::Schema(source) => write!(f, "cannot prepare pets schema: {source}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Schema(source) => Some(source),
        }
    }
}
