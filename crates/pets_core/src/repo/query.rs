//! Filter, sort and projection passthrough types.
//!
//! These replace free-form selection strings: a filter is a conjunction of
//! column comparisons, rendered with bound parameters only.

use crate::model::pet::{FieldValue, PetColumn, PetId};
use rusqlite::types::Value;

/// Comparison applied by one filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    IsNull,
    IsNotNull,
}

impl Comparison {
    fn operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    fn takes_value(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// One `column <op> value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: PetColumn,
    pub comparison: Comparison,
    /// Ignored for `IsNull` / `IsNotNull`.
    pub value: FieldValue,
}

/// Conjunction of conditions. Empty means "every row".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality on `id`; used for item-addressed requests.
    pub fn by_id(id: PetId) -> Self {
        Self::new().eq(PetColumn::Id, id)
    }

    pub fn and(
        mut self,
        column: PetColumn,
        comparison: Comparison,
        value: impl Into<FieldValue>,
    ) -> Self {
        self.conditions.push(Condition {
            column,
            comparison,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: PetColumn, value: impl Into<FieldValue>) -> Self {
        self.and(column, Comparison::Eq, value)
    }

    pub fn is_null(self, column: PetColumn) -> Self {
        self.and(column, Comparison::IsNull, FieldValue::Null)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Renders ` WHERE ...` (or an empty string) and appends bind values.
    pub(crate) fn render(&self, binds: &mut Vec<Value>) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }

        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|condition| {
                let column = condition.column.as_str();
                let operator = condition.comparison.operator();
                if condition.comparison.takes_value() {
                    binds.push(to_sql_value(&condition.value));
                    format!("{column} {operator} ?")
                } else {
                    format!("{column} {operator}")
                }
            })
            .collect();

        format!(" WHERE {}", clauses.join(" AND "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordered sort keys. Empty leaves ordering to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<(PetColumn, SortDirection)>,
}

impl SortOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, column: PetColumn) -> Self {
        self.keys.push((column, SortDirection::Ascending));
        self
    }

    pub fn desc(mut self, column: PetColumn) -> Self {
        self.keys.push((column, SortDirection::Descending));
        self
    }

    pub fn keys(&self) -> &[(PetColumn, SortDirection)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn render(&self) -> String {
        if self.keys.is_empty() {
            return String::new();
        }

        let keys: Vec<String> = self
            .keys
            .iter()
            .map(|(column, direction)| {
                let direction = match direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                format!("{} {direction}", column.as_str())
            })
            .collect();

        format!(" ORDER BY {}", keys.join(", "))
    }
}

/// Resolves a projection; empty selects every column in schema order.
pub(crate) fn resolve_projection(projection: &[PetColumn]) -> Vec<PetColumn> {
    if projection.is_empty() {
        PetColumn::ALL.to_vec()
    } else {
        projection.to_vec()
    }
}

pub(crate) fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(value) => Value::Integer(*value),
        FieldValue::Text(text) => Value::Text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_projection, Comparison, Filter, SortOrder};
    use crate::model::pet::PetColumn;
    use rusqlite::types::Value;

    #[test]
    fn empty_filter_renders_nothing() {
        let mut binds = Vec::new();
        assert_eq!(Filter::new().render(&mut binds), "");
        assert!(binds.is_empty());
    }

    #[test]
    fn filter_binds_values_in_order() {
        let filter = Filter::new()
            .eq(PetColumn::Gender, 1)
            .and(PetColumn::Weight, Comparison::Ge, 5)
            .is_null(PetColumn::Breed);
        let mut binds = Vec::new();

        assert_eq!(
            filter.render(&mut binds),
            " WHERE gender = ? AND weight >= ? AND breed IS NULL"
        );
        assert_eq!(binds, vec![Value::Integer(1), Value::Integer(5)]);
    }

    #[test]
    fn sort_order_renders_keys() {
        let sort = SortOrder::new().asc(PetColumn::Name).desc(PetColumn::Id);
        assert_eq!(sort.render(), " ORDER BY name ASC, id DESC");
        assert_eq!(SortOrder::new().render(), "");
    }

    #[test]
    fn empty_projection_selects_all_columns() {
        assert_eq!(resolve_projection(&[]), PetColumn::ALL.to_vec());
        assert_eq!(
            resolve_projection(&[PetColumn::Name]),
            vec![PetColumn::Name]
        );
    }
}
