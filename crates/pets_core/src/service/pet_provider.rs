//! CRUD mediator for the pets resource.
//!
//! # Responsibility
//! - Classify each identifier and turn item addresses into `id` filters.
//! - Validate write payloads before any storage call.
//! - Publish a change notification after every mutation that touched rows.
//!
//! # Invariants
//! - No partial write: validation fails before the repository is reached.
//! - Notifications are delivered before the mutating call returns.
//! - The provider holds no record state between calls.

use crate::config::{ConfigError, ProviderConfig};
use crate::model::pet::{Pet, PetColumn, PetId, PetValidationError, PetValues};
use crate::notify::channel::{ChangeNotifier, Subscription};
use crate::repo::pet_repo::{PetRepository, PetRow, RepoError, RepoResult, SqlitePetRepository};
use crate::repo::query::{Filter, SortOrder};
use crate::uri::matcher::{UriMatch, UriMatcher};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Outcome of a rejected provider call.
#[derive(Debug)]
pub enum ProviderError {
    /// Identifier matches neither the collection nor the item shape.
    InvalidResource(String),
    /// Identifier is valid but the operation does not accept its shape.
    UnsupportedOperation {
        operation: &'static str,
        uri: String,
    },
    /// Payload broke a field rule; nothing was written.
    Validation(PetValidationError),
    /// Storage rejected or failed the statement.
    Storage(RepoError),
    /// Provider settings are unusable.
    Config(ConfigError),
}

impl ProviderError {
    /// Field named by a validation failure.
    pub fn validation_field(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.field()),
            _ => None,
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidResource(uri) => write!(f, "unknown resource identifier: {uri}"),
            Self::UnsupportedOperation { operation, uri } => {
                write!(f, "{operation} is not supported for {uri}")
            }
            Self::Validation(err) => write!(f, "validation failed on `{}`: {err}", err.field()),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::InvalidResource(_) | Self::UnsupportedOperation { .. } => None,
        }
    }
}

impl From<PetValidationError> for ProviderError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ProviderError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<ConfigError> for ProviderError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

/// Rows returned by [`PetProvider::query`], tagged with the identifier a
/// consumer should watch for invalidation.
#[derive(Debug)]
pub struct Cursor {
    notification_uri: String,
    rows: std::vec::IntoIter<PetRow>,
}

impl Cursor {
    pub fn notification_uri(&self) -> &str {
        &self.notification_uri
    }

    /// Rows not yet consumed.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.len() == 0
    }

    /// Decodes the remaining rows; requires a full projection.
    pub fn into_pets(self) -> RepoResult<Vec<Pet>> {
        self.rows.map(|row| row.to_pet()).collect()
    }
}

impl Iterator for Cursor {
    type Item = PetRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}

/// Entry point for collaborators: four CRUD calls plus subscriptions.
pub struct PetProvider<R: PetRepository = SqlitePetRepository> {
    matcher: UriMatcher,
    repo: R,
    notifier: ChangeNotifier,
}

impl PetProvider<SqlitePetRepository> {
    /// Validates `config` and opens the configured store.
    pub fn open(config: &ProviderConfig) -> ProviderResult<Self> {
        config.validate()?;
        let repo = match &config.database_path {
            Some(path) => SqlitePetRepository::open(path)?,
            None => SqlitePetRepository::open_in_memory()?,
        };
        Ok(Self::new(
            UriMatcher::new(&config.scheme, &config.authority),
            repo,
            ChangeNotifier::new(),
        ))
    }
}

impl<R: PetRepository> PetProvider<R> {
    pub fn new(matcher: UriMatcher, repo: R, notifier: ChangeNotifier) -> Self {
        Self {
            matcher,
            repo,
            notifier,
        }
    }

    pub fn matcher(&self) -> &UriMatcher {
        &self.matcher
    }

    pub fn collection_uri(&self) -> &str {
        self.matcher.collection_uri()
    }

    pub fn item_uri(&self, id: PetId) -> String {
        self.matcher.item_uri(id)
    }

    /// Shared channel; clone it to hand to other collaborators.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn subscribe(&self, uri: impl Into<String>) -> Subscription {
        self.notifier.subscribe(uri)
    }

    pub fn classify(&self, uri: &str) -> UriMatch {
        self.matcher.classify(uri)
    }

    /// MIME-style type of the data behind `uri`.
    pub fn content_type(&self, uri: &str) -> ProviderResult<String> {
        let authority_path = self
            .matcher
            .collection_uri()
            .split_once("://")
            .map_or("", |(_, rest)| rest);
        match self.classify(uri) {
            UriMatch::Collection => Ok(format!("vnd.cursor.dir/{authority_path}")),
            UriMatch::Item(_) => Ok(format!("vnd.cursor.item/{authority_path}")),
            UriMatch::Unmatched => Err(ProviderError::InvalidResource(uri.to_string())),
        }
    }

    /// Identifier as the matcher spells it, so `/pets/007` and `/pets/7`
    /// reach the same watchers.
    fn canonical_uri(&self, matched: UriMatch) -> String {
        match matched {
            UriMatch::Item(id) => self.matcher.item_uri(id),
            UriMatch::Collection | UriMatch::Unmatched => {
                self.matcher.collection_uri().to_string()
            }
        }
    }

    /// Reads rows addressed by `uri`.
    ///
    /// An item identifier replaces `filter` with equality on its id. No match
    /// is an empty cursor, not an error.
    pub fn query(
        &self,
        uri: &str,
        projection: &[PetColumn],
        filter: &Filter,
        sort: &SortOrder,
    ) -> ProviderResult<Cursor> {
        let matched = self.classify(uri);
        let item_filter;
        let effective_filter = match matched {
            UriMatch::Collection => filter,
            UriMatch::Item(id) => {
                item_filter = Filter::by_id(id);
                &item_filter
            }
            UriMatch::Unmatched => {
                warn!("event=pet_query module=provider status=rejected error_code=invalid_resource");
                return Err(ProviderError::InvalidResource(uri.to_string()));
            }
        };

        let rows = self
            .repo
            .query(projection, effective_filter, sort)
            .map_err(|err| {
                error!(
                    "event=pet_query module=provider status=error match={} error={}",
                    matched.label(),
                    err
                );
                err
            })?;
        debug!(
            "event=pet_query module=provider status=ok match={} rows={}",
            matched.label(),
            rows.len()
        );

        Ok(Cursor {
            notification_uri: self.canonical_uri(matched),
            rows: rows.into_iter(),
        })
    }

    /// Inserts one pet into the collection and returns its item identifier.
    pub fn insert(&self, uri: &str, values: &PetValues) -> ProviderResult<String> {
        let matched = self.classify(uri);
        if matched != UriMatch::Collection {
            warn!(
                "event=pet_insert module=provider status=rejected match={} error_code=unsupported_operation",
                matched.label()
            );
            return Err(ProviderError::UnsupportedOperation {
                operation: "insert",
                uri: uri.to_string(),
            });
        }

        if let Err(err) = values.validate_for_insert() {
            warn!(
                "event=pet_insert module=provider status=rejected error_code=validation field={}",
                err.field()
            );
            return Err(err.into());
        }

        let id = self.repo.insert(values).map_err(|err| {
            error!("event=pet_insert module=provider status=error error={err}");
            err
        })?;
        info!("event=pet_insert module=provider status=ok id={id}");

        self.notifier.publish(self.matcher.collection_uri());
        Ok(self.matcher.item_uri(id))
    }

    /// Applies `values` to the rows addressed by `uri`.
    ///
    /// A collection identifier with an empty `filter` rewrites every row. An
    /// empty payload is a no-op returning 0.
    pub fn update(&self, uri: &str, values: &PetValues, filter: &Filter) -> ProviderResult<usize> {
        let matched = self.classify(uri);
        let item_filter;
        let effective_filter = match matched {
            UriMatch::Collection => filter,
            UriMatch::Item(id) => {
                item_filter = Filter::by_id(id);
                &item_filter
            }
            UriMatch::Unmatched => {
                warn!("event=pet_update module=provider status=rejected error_code=invalid_resource");
                return Err(ProviderError::InvalidResource(uri.to_string()));
            }
        };

        if values.is_empty() {
            return Ok(0);
        }

        if let Err(err) = values.validate_for_update() {
            warn!(
                "event=pet_update module=provider status=rejected match={} error_code=validation field={}",
                matched.label(),
                err.field()
            );
            return Err(err.into());
        }

        let updated = self.repo.update(values, effective_filter).map_err(|err| {
            error!(
                "event=pet_update module=provider status=error match={} error={}",
                matched.label(),
                err
            );
            err
        })?;
        info!(
            "event=pet_update module=provider status=ok match={} rows={}",
            matched.label(),
            updated
        );

        if updated > 0 {
            self.notifier.publish(&self.canonical_uri(matched));
        }
        Ok(updated)
    }

    /// Deletes the rows addressed by `uri`.
    ///
    /// A collection identifier with an empty `filter` clears the table.
    pub fn delete(&self, uri: &str, filter: &Filter) -> ProviderResult<usize> {
        let matched = self.classify(uri);
        let result = match matched {
            UriMatch::Collection if filter.is_empty() => self.repo.clear(),
            UriMatch::Collection => self.repo.delete(filter),
            UriMatch::Item(id) => self.repo.delete(&Filter::by_id(id)),
            UriMatch::Unmatched => {
                warn!("event=pet_delete module=provider status=rejected error_code=invalid_resource");
                return Err(ProviderError::InvalidResource(uri.to_string()));
            }
        };

        let deleted = result.map_err(|err| {
            error!(
                "event=pet_delete module=provider status=error match={} error={}",
                matched.label(),
                err
            );
            err
        })?;
        info!(
            "event=pet_delete module=provider status=ok match={} rows={}",
            matched.label(),
            deleted
        );

        if deleted > 0 {
            self.notifier.publish(&self.canonical_uri(matched));
        }
        Ok(deleted)
    }
}
