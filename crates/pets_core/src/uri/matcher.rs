//! Structural matcher for pet resource identifiers.
//!
//! Two shapes are registered: the bare collection path and the collection
//! path followed by one base-10 id segment. Anything else is unmatched.

use crate::model::pet::{PetId, PETS_TABLE};

/// Outcome of classifying a resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// The whole pets collection.
    Collection,
    /// One pet addressed by id.
    Item(PetId),
    /// Neither registered shape.
    Unmatched,
}

impl UriMatch {
    /// Short label used in log events.
    pub fn label(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Item(_) => "item",
            Self::Unmatched => "unmatched",
        }
    }
}

/// Matcher bound to one scheme and authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriMatcher {
    collection_uri: String,
}

impl UriMatcher {
    pub fn new(scheme: &str, authority: &str) -> Self {
        Self {
            collection_uri: format!("{scheme}://{authority}/{PETS_TABLE}"),
        }
    }

    /// Identifier of the whole collection, e.g. `content://com.example.android.pets/pets`.
    pub fn collection_uri(&self) -> &str {
        &self.collection_uri
    }

    /// Identifier of one pet.
    pub fn item_uri(&self, id: PetId) -> String {
        format!("{}/{id}", self.collection_uri)
    }

    /// Classifies `uri` against the collection and item shapes.
    ///
    /// The id segment must be ASCII digits only (no sign, whitespace or
    /// trailing segments) and must fit in a [`PetId`].
    pub fn classify(&self, uri: &str) -> UriMatch {
        let Some(rest) = uri.strip_prefix(self.collection_uri.as_str()) else {
            return UriMatch::Unmatched;
        };
        if rest.is_empty() {
            return UriMatch::Collection;
        }
        let Some(segment) = rest.strip_prefix('/') else {
            return UriMatch::Unmatched;
        };
        parse_id_segment(segment).map_or(UriMatch::Unmatched, UriMatch::Item)
    }
}

fn parse_id_segment(segment: &str) -> Option<PetId> {
    if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    segment.parse::<PetId>().ok()
}
