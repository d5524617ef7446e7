//! Pet record, column schema and write-payload validation.
//!
//! # Responsibility
//! - Name the `pets` table columns in one closed enum.
//! - Validate insert payloads (all rules) and update payloads (present keys
//!   only) without touching storage.
//!
//! # Invariants
//! - Validation is a pure function of the payload.
//! - `PetField` excludes `id`, so a payload can never rewrite identity.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Table backing the pets resource.
pub const PETS_TABLE: &str = "pets";

/// Storage-assigned row identifier. Never reused after deletion.
pub type PetId = i64;

/// Enumerated gender domain, persisted as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub const UNKNOWN_CODE: i64 = 0;
    pub const MALE_CODE: i64 = 1;
    pub const FEMALE_CODE: i64 = 2;

    /// Integer code stored in `pets.gender`.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => Self::UNKNOWN_CODE,
            Self::Male => Self::MALE_CODE,
            Self::Female => Self::FEMALE_CODE,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            Self::UNKNOWN_CODE => Some(Self::Unknown),
            Self::MALE_CODE => Some(Self::Male),
            Self::FEMALE_CODE => Some(Self::Female),
            _ => None,
        }
    }

    pub fn is_valid_code(code: i64) -> bool {
        Self::from_code(code).is_some()
    }
}

/// Column identifiers of the `pets` table, in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PetColumn {
    Id,
    Name,
    Breed,
    Gender,
    Weight,
}

impl PetColumn {
    /// All columns in schema order. Used when a projection is empty.
    pub const ALL: [PetColumn; 5] = [
        PetColumn::Id,
        PetColumn::Name,
        PetColumn::Breed,
        PetColumn::Gender,
        PetColumn::Weight,
    ];

    /// SQL column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Breed => "breed",
            Self::Gender => "gender",
            Self::Weight => "weight",
        }
    }
}

/// Writable pet fields. `id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PetField {
    Name,
    Breed,
    Gender,
    Weight,
}

impl PetField {
    pub fn column(self) -> PetColumn {
        match self {
            Self::Name => PetColumn::Name,
            Self::Breed => PetColumn::Breed,
            Self::Gender => PetColumn::Gender,
            Self::Weight => PetColumn::Weight,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.column().as_str()
    }
}

/// Dynamically typed cell value crossing the provider boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Integer view of the value. Text is parsed as trimmed base-10.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<i64>().ok(),
            Self::Null => None,
        }
    }

    /// Text view of the value. Integers are rendered in base 10.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "`{text}`"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Gender> for FieldValue {
    fn from(value: Gender) -> Self {
        Self::Integer(value.code())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A fully decoded pet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    /// `None` when the breed column is NULL.
    pub breed: Option<String>,
    pub gender: Gender,
    pub weight: i64,
}

/// Rule violated by a write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    /// Insert without a name, or an explicit null name.
    MissingName,
    /// Name present but blank.
    EmptyName,
    /// Insert without a gender.
    MissingGender,
    /// Gender present but not one of the known codes.
    InvalidGender(FieldValue),
    /// Weight present but null, non-numeric or negative.
    InvalidWeight(FieldValue),
}

impl PetValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName | Self::EmptyName => PetField::Name.as_str(),
            Self::MissingGender | Self::InvalidGender(_) => PetField::Gender.as_str(),
            Self::InvalidWeight(_) => PetField::Weight.as_str(),
        }
    }
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "pet requires a name"),
            Self::EmptyName => write!(f, "pet name must not be empty"),
            Self::MissingGender => write!(f, "pet requires a gender"),
            Self::InvalidGender(value) => {
                write!(f, "pet gender {value} is not one of 0 (unknown), 1 (male), 2 (female)")
            }
            Self::InvalidWeight(value) => {
                write!(f, "pet weight {value} must be a non-negative integer")
            }
        }
    }
}

impl Error for PetValidationError {}

/// Field payload for insert and update.
///
/// Only keys present in the payload are written; absent keys keep their
/// stored value on update and fall back to column defaults on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetValues {
    values: BTreeMap<PetField, FieldValue>,
}

impl PetValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.with(PetField::Name, FieldValue::Text(name.into()))
    }

    pub fn breed(self, breed: impl Into<String>) -> Self {
        self.with(PetField::Breed, FieldValue::Text(breed.into()))
    }

    pub fn gender(self, gender: impl Into<FieldValue>) -> Self {
        self.with(PetField::Gender, gender.into())
    }

    pub fn weight(self, weight: impl Into<FieldValue>) -> Self {
        self.with(PetField::Weight, weight.into())
    }

    /// Builder form of [`PetValues::set`].
    pub fn with(mut self, field: PetField, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: PetField, value: impl Into<FieldValue>) {
        self.values.insert(field, value.into());
    }

    pub fn remove(&mut self, field: PetField) -> Option<FieldValue> {
        self.values.remove(&field)
    }

    pub fn get(&self, field: PetField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn contains(&self, field: PetField) -> bool {
        self.values.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Present fields in column order.
    pub fn iter(&self) -> btree_map::Iter<'_, PetField, FieldValue> {
        self.values.iter()
    }

    /// Checks an insert payload: `name` and `gender` are mandatory.
    pub fn validate_for_insert(&self) -> Result<(), PetValidationError> {
        match self.get(PetField::Name) {
            None => return Err(PetValidationError::MissingName),
            Some(value) => check_name(value)?,
        }
        match self.get(PetField::Gender) {
            None => return Err(PetValidationError::MissingGender),
            Some(value) => check_gender(value)?,
        }
        if let Some(value) = self.get(PetField::Weight) {
            check_weight(value)?;
        }
        Ok(())
    }

    /// Checks an update payload: only keys present are validated.
    pub fn validate_for_update(&self) -> Result<(), PetValidationError> {
        if let Some(value) = self.get(PetField::Name) {
            check_name(value)?;
        }
        if let Some(value) = self.get(PetField::Gender) {
            check_gender(value)?;
        }
        if let Some(value) = self.get(PetField::Weight) {
            check_weight(value)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a PetValues {
    type Item = (&'a PetField, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, PetField, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_name(value: &FieldValue) -> Result<(), PetValidationError> {
    match value.as_text() {
        None => Err(PetValidationError::MissingName),
        Some(name) if name.trim().is_empty() => Err(PetValidationError::EmptyName),
        Some(_) => Ok(()),
    }
}

fn check_gender(value: &FieldValue) -> Result<(), PetValidationError> {
    match value.as_integer() {
        Some(code) if Gender::is_valid_code(code) => Ok(()),
        _ => Err(PetValidationError::InvalidGender(value.clone())),
    }
}

fn check_weight(value: &FieldValue) -> Result<(), PetValidationError> {
    match value.as_integer() {
        Some(weight) if weight >= 0 => Ok(()),
        _ => Err(PetValidationError::InvalidWeight(value.clone())),
    }
}
