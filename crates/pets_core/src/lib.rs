//! Core data access for the pets catalog.
//!
//! Collaborators address data through resource identifiers
//! (`content://<authority>/pets` and `content://<authority>/pets/<id>`)
//! instead of SQL. [`PetProvider`] classifies each identifier, validates
//! write payloads, delegates to the SQLite-backed repository, and publishes
//! change notifications that subscribers use to refresh.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod uri;

pub use config::{ConfigError, ProviderConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::pet::{
    FieldValue, Gender, Pet, PetColumn, PetField, PetId, PetValidationError, PetValues,
};
pub use notify::channel::{ChangeEvent, ChangeNotifier, Subscription};
pub use repo::pet_repo::{PetRepository, PetRow, RepoError, RepoResult, SqlitePetRepository};
pub use repo::query::{Comparison, Condition, Filter, SortDirection, SortOrder};
pub use service::pet_provider::{Cursor, PetProvider, ProviderError, ProviderResult};
pub use uri::matcher::{UriMatch, UriMatcher};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
