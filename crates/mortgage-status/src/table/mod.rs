//! Typed in-memory tables and the relational operators the mortgage workflow
//! composes: joins with key reconciliation, derived columns, grouping,
//! filtering and stable sorting.

mod aggregate;
mod error;
mod expr;
mod join;
mod ops;
mod render;
mod value;

pub use aggregate::{group_aggregate, AggregateFn, Aggregation};
pub use error::TableError;
pub use expr::{col, lit, BinaryOp, CompareOp, Expr};
pub use join::{ensure_unique_key, outer_join, JoinKind};
pub use ops::{append_column, derive, filter, limit, select, sort, SortDirection};
pub use value::{ColumnType, DatePart, Value};

use serde::Serialize;
use std::collections::HashMap;

pub type Row = Vec<Value>;

/// Named, typed column declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub column_type: ColumnType,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column declarations with a name index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Result<Self, TableError> {
        Self::named("<schema>", fields)
    }

    fn named(table: &str, fields: Vec<Field>) -> Result<Self, TableError> {
        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(TableError::DuplicateColumn {
                    table: table.to_string(),
                    column: field.name.clone(),
                });
            }
        }
        Ok(Self { fields, index })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.position(name).map(|position| &self.fields[position])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }
}

/// Ordered rows conforming to a schema. Tables are values: operators take
/// them by reference and return new tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    pub fn empty(name: impl Into<String>, fields: Vec<Field>) -> Result<Self, TableError> {
        Self::from_rows(name, fields, Vec::new())
    }

    /// Builds a table, checking every row's arity and cell types.
    pub fn from_rows(
        name: impl Into<String>,
        fields: Vec<Field>,
        rows: Vec<Row>,
    ) -> Result<Self, TableError> {
        let name = name.into();
        let schema = Schema::named(&name, fields)?;

        for (position, row) in rows.iter().enumerate() {
            if row.len() != schema.len() {
                return Err(TableError::RowArity {
                    table: name,
                    row: position,
                    expected: schema.len(),
                    actual: row.len(),
                });
            }
            for (value, field) in row.iter().zip(schema.fields()) {
                if !value.fits(field.column_type) {
                    return Err(TableError::TypeMismatch {
                        context: format!("column '{}' of table '{}'", field.name, name),
                        expected: field.column_type.to_string(),
                        found: value
                            .column_type()
                            .map(|ty| ty.to_string())
                            .unwrap_or_default(),
                    });
                }
            }
        }

        Ok(Self { name, schema, rows })
    }

    /// Operators build rows that already conform to `schema`.
    pub(crate) fn from_parts(name: String, schema: Schema, rows: Vec<Row>) -> Self {
        Self { name, schema, rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `column`, or `UnknownColumn` naming this table.
    pub fn column_index(&self, column: &str) -> Result<usize, TableError> {
        self.schema
            .position(column)
            .ok_or_else(|| TableError::UnknownColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &Value>, TableError> {
        let position = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| &row[position]))
    }

    pub fn value(&self, row: usize, column: &str) -> Result<Option<&Value>, TableError> {
        let position = self.column_index(column)?;
        Ok(self.rows.get(row).map(|values| &values[position]))
    }
}

/// Tables built from typed records, one row per record.
pub trait TableRecord {
    const TABLE: &'static str;

    fn fields() -> Vec<Field>;

    fn into_row(self) -> Row;
}

impl Table {
    pub fn from_records<T, I>(records: I) -> Result<Self, TableError>
    where
        T: TableRecord,
        I: IntoIterator<Item = T>,
    {
        let rows = records.into_iter().map(TableRecord::into_row).collect();
        Self::from_rows(T::TABLE, T::fields(), rows)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn int_table(name: &str, columns: &[&str], rows: &[&[Option<i64>]]) -> Table {
        let fields = columns
            .iter()
            .map(|column| Field::new(*column, ColumnType::Int))
            .collect();
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|value| Value::from(*value)).collect())
            .collect();
        Table::from_rows(name, fields, rows).expect("valid fixture table")
    }

    pub(crate) fn ints(table: &Table, column: &str) -> Vec<Option<i64>> {
        table
            .column(column)
            .expect("column exists")
            .map(Value::as_int)
            .collect()
    }
}
