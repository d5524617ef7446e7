//! Pet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Execute projection/filter/sort reads and field-payload writes on `pets`.
//! - Report decoded rows and affected-row counts; never validate payloads.
//!
//! # Invariants
//! - All statements on one `SqlitePetRepository` run under a single lock, so
//!   writes never interleave.
//! - Integer columns are bound as integers even when supplied as text.
//! - `id` values come from AUTOINCREMENT and are never reused.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::pet::{FieldValue, Gender, Pet, PetColumn, PetField, PetId, PetValues, PETS_TABLE};
use crate::repo::query::{resolve_projection, to_sql_value, Filter, SortOrder};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level failure.
#[derive(Debug)]
pub enum RepoError {
    /// The backing connection could not be brought up.
    Open(DbError),
    /// A statement was rejected (constraint violation, I/O, ...).
    Sqlite(rusqlite::Error),
    /// A persisted row could not be decoded.
    InvalidData(String),
    /// The store acknowledged an insert without producing a row.
    NoRowInserted,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "pets statement failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::NoRowInserted => write!(f, "insert did not produce a pet row"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            Self::InvalidData(_) | Self::NoRowInserted => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Open(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// One result row holding the projected columns in projection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetRow {
    cells: Vec<(PetColumn, FieldValue)>,
}

impl PetRow {
    pub fn new(cells: Vec<(PetColumn, FieldValue)>) -> Self {
        Self { cells }
    }

    /// Value of `column`, or `None` when it was not projected.
    pub fn get(&self, column: PetColumn) -> Option<&FieldValue> {
        self.cells
            .iter()
            .find(|(candidate, _)| *candidate == column)
            .map(|(_, value)| value)
    }

    pub fn get_integer(&self, column: PetColumn) -> Option<i64> {
        match self.get(column)? {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_text(&self, column: PetColumn) -> Option<&str> {
        match self.get(column)? {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = PetColumn> + '_ {
        self.cells.iter().map(|(column, _)| *column)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Decodes a full-projection row into a [`Pet`].
    pub fn to_pet(&self) -> RepoResult<Pet> {
        let id = self
            .get_integer(PetColumn::Id)
            .ok_or_else(|| missing_column(PetColumn::Id))?;
        let name = self
            .get_text(PetColumn::Name)
            .ok_or_else(|| missing_column(PetColumn::Name))?
            .to_string();
        let breed = match self.get(PetColumn::Breed) {
            Some(FieldValue::Null) => None,
            Some(value) => value.as_text(),
            None => return Err(missing_column(PetColumn::Breed)),
        };
        let gender_code = self
            .get_integer(PetColumn::Gender)
            .ok_or_else(|| missing_column(PetColumn::Gender))?;
        let gender = Gender::from_code(gender_code).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid gender `{gender_code}` in {PETS_TABLE}.gender for id {id}"
            ))
        })?;
        let weight = self
            .get_integer(PetColumn::Weight)
            .ok_or_else(|| missing_column(PetColumn::Weight))?;

        Ok(Pet {
            id,
            name,
            breed,
            gender,
            weight,
        })
    }
}

fn missing_column(column: PetColumn) -> RepoError {
    RepoError::InvalidData(format!(
        "column `{}` missing or mistyped in {PETS_TABLE} row",
        column.as_str()
    ))
}

/// Storage contract consumed by the provider.
pub trait PetRepository {
    /// Reads rows matching `filter`, ordered by `sort`, with `projection`
    /// columns (all when empty).
    fn query(
        &self,
        projection: &[PetColumn],
        filter: &Filter,
        sort: &SortOrder,
    ) -> RepoResult<Vec<PetRow>>;
    /// Inserts one row and returns its assigned id.
    fn insert(&self, values: &PetValues) -> RepoResult<PetId>;
    /// Applies `values` to every row matching `filter`; returns the row count.
    fn update(&self, values: &PetValues, filter: &Filter) -> RepoResult<usize>;
    /// Deletes every row matching `filter`; returns the row count.
    fn delete(&self, filter: &Filter) -> RepoResult<usize>;
    /// Deletes every row; returns the row count.
    fn clear(&self) -> RepoResult<usize>;
}

/// SQLite-backed pet repository owning its connection.
pub struct SqlitePetRepository {
    conn: Mutex<Connection>,
}

impl SqlitePetRepository {
    /// Wraps an already bootstrapped connection (see [`crate::db`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens or creates the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a fresh in-memory store.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-statement leaves no partial SQLite state behind.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PetRepository for SqlitePetRepository {
    fn query(
        &self,
        projection: &[PetColumn],
        filter: &Filter,
        sort: &SortOrder,
    ) -> RepoResult<Vec<PetRow>> {
        let columns = resolve_projection(projection);
        let column_list: Vec<&str> = columns.iter().map(|column| column.as_str()).collect();
        let mut binds = Vec::new();
        let sql = format!(
            "SELECT {} FROM {PETS_TABLE}{}{};",
            column_list.join(", "),
            filter.render(&mut binds),
            sort.render()
        );

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut result = Vec::new();

        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                let value = decode_cell(*column, row.get::<_, Value>(index)?)?;
                cells.push((*column, value));
            }
            result.push(PetRow::new(cells));
        }

        Ok(result)
    }

    fn insert(&self, values: &PetValues) -> RepoResult<PetId> {
        let conn = self.lock();

        let changed = if values.is_empty() {
            conn.execute(&format!("INSERT INTO {PETS_TABLE} DEFAULT VALUES;"), [])?
        } else {
            let columns: Vec<&str> = values.iter().map(|(field, _)| field.as_str()).collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            let binds: Vec<Value> = values
                .iter()
                .map(|(field, value)| bind_field(*field, value))
                .collect();
            conn.execute(
                &format!(
                    "INSERT INTO {PETS_TABLE} ({}) VALUES ({placeholders});",
                    columns.join(", ")
                ),
                params_from_iter(binds),
            )?
        };

        if changed == 0 {
            return Err(RepoError::NoRowInserted);
        }
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, values: &PetValues, filter: &Filter) -> RepoResult<usize> {
        if values.is_empty() {
            return Ok(0);
        }

        let assignments: Vec<String> = values
            .iter()
            .map(|(field, _)| format!("{} = ?", field.as_str()))
            .collect();
        let mut binds: Vec<Value> = values
            .iter()
            .map(|(field, value)| bind_field(*field, value))
            .collect();
        let where_clause = filter.render(&mut binds);
        let sql = format!(
            "UPDATE {PETS_TABLE} SET {}{where_clause};",
            assignments.join(", ")
        );

        let conn = self.lock();
        Ok(conn.execute(&sql, params_from_iter(binds))?)
    }

    fn delete(&self, filter: &Filter) -> RepoResult<usize> {
        let mut binds = Vec::new();
        let sql = format!("DELETE FROM {PETS_TABLE}{};", filter.render(&mut binds));

        let conn = self.lock();
        Ok(conn.execute(&sql, params_from_iter(binds))?)
    }

    fn clear(&self) -> RepoResult<usize> {
        let conn = self.lock();
        Ok(conn.execute(&format!("DELETE FROM {PETS_TABLE};"), [])?)
    }
}

fn bind_field(field: PetField, value: &FieldValue) -> Value {
    match field {
        PetField::Gender | PetField::Weight => value
            .as_integer()
            .map_or_else(|| to_sql_value(value), Value::Integer),
        PetField::Name | PetField::Breed => to_sql_value(value),
    }
}

fn decode_cell(column: PetColumn, value: Value) -> RepoResult<FieldValue> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::Integer(value) => Ok(FieldValue::Integer(value)),
        Value::Text(text) => Ok(FieldValue::Text(text)),
        Value::Real(_) | Value::Blob(_) => Err(RepoError::InvalidData(format!(
            "unsupported storage class in {PETS_TABLE}.{}",
            column.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{PetRepository, PetRow, RepoError, SqlitePetRepository};
    use crate::model::pet::{FieldValue, Gender, PetColumn, PetValues};
    use crate::repo::query::{Filter, SortOrder};

    fn repo() -> SqlitePetRepository {
        SqlitePetRepository::open_in_memory().expect("in-memory store opens")
    }

    #[test]
    fn insert_defaults_weight_and_null_breed() {
        let repo = repo();
        let id = repo
            .insert(&PetValues::new().name("Rex").gender(Gender::Unknown))
            .unwrap();

        let rows = repo.query(&[], &Filter::by_id(id), &SortOrder::new()).unwrap();
        assert_eq!(rows.len(), 1);
        let pet = rows[0].to_pet().unwrap();
        assert_eq!(pet.weight, 0);
        assert_eq!(pet.breed, None);
    }

    #[test]
    fn numeric_text_is_stored_as_integer() {
        let repo = repo();
        let id = repo
            .insert(&PetValues::new().name("Rex").gender("2").weight("11"))
            .unwrap();

        let rows = repo
            .query(
                &[PetColumn::Gender, PetColumn::Weight],
                &Filter::by_id(id),
                &SortOrder::new(),
            )
            .unwrap();
        assert_eq!(rows[0].get_integer(PetColumn::Gender), Some(2));
        assert_eq!(rows[0].get_integer(PetColumn::Weight), Some(11));
    }

    #[test]
    fn not_null_constraint_surfaces_as_error() {
        let repo = repo();
        let err = repo
            .insert(&PetValues::new().breed("nameless"))
            .unwrap_err();
        assert!(matches!(err, RepoError::Sqlite(_)));
    }

    #[test]
    fn clear_removes_every_row_without_reusing_ids() {
        let repo = repo();
        let first = repo
            .insert(&PetValues::new().name("A").gender(1))
            .unwrap();
        repo.insert(&PetValues::new().name("B").gender(2)).unwrap();

        assert_eq!(repo.clear().unwrap(), 2);
        let next = repo.insert(&PetValues::new().name("C").gender(0)).unwrap();
        assert!(next > first + 1);
    }

    #[test]
    fn partial_row_does_not_decode_to_pet() {
        let row = PetRow::new(vec![(PetColumn::Name, FieldValue::from("Rex"))]);
        assert!(row.to_pet().is_err());
        assert_eq!(row.get_text(PetColumn::Name), Some("Rex"));
        assert_eq!(row.get(PetColumn::Id), None);
    }
}
