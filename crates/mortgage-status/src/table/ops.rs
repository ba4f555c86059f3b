use super::error::TableError;
use super::expr::Expr;
use super::value::{ColumnType, Value};
use super::{Field, Schema, Table};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Appends `column` computed row-wise from `expression`.
pub fn derive(table: &Table, column: &str, expression: &Expr) -> Result<Table, TableError> {
    let column_type = expression.infer_type(table)?;
    let mut fields = table.schema().fields().to_vec();
    fields.push(Field::new(column, column_type));
    let schema = Schema::named(table.name(), fields)?;

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let value = coerce(expression.evaluate(table.schema(), row), column_type);
            let mut derived = row.clone();
            derived.push(value);
            derived
        })
        .collect();

    Ok(Table::from_parts(table.name().to_string(), schema, rows))
}

/// Appends `field` with one precomputed value per row.
pub fn append_column(table: &Table, field: Field, values: Vec<Value>) -> Result<Table, TableError> {
    if values.len() != table.len() {
        return Err(TableError::RowArity {
            table: table.name().to_string(),
            row: values.len().min(table.len()),
            expected: table.len(),
            actual: values.len(),
        });
    }
    if let Some(value) = values.iter().find(|value| !value.fits(field.column_type)) {
        return Err(TableError::TypeMismatch {
            context: format!("column '{}' of table '{}'", field.name, table.name()),
            expected: field.column_type.to_string(),
            found: value.column_type().map(|ty| ty.to_string()).unwrap_or_default(),
        });
    }

    let mut fields = table.schema().fields().to_vec();
    fields.push(field);
    let schema = Schema::named(table.name(), fields)?;

    let rows = table
        .rows()
        .iter()
        .zip(values)
        .map(|(row, value)| {
            let mut extended = row.clone();
            extended.push(value);
            extended
        })
        .collect();

    Ok(Table::from_parts(table.name().to_string(), schema, rows))
}

/// Keeps the rows whose predicate is `true`; false and null rows are dropped.
pub fn filter(table: &Table, predicate: &Expr) -> Result<Table, TableError> {
    let predicate_type = predicate.infer_type(table)?;
    if predicate_type != ColumnType::Bool {
        return Err(TableError::TypeMismatch {
            context: format!("filter on table '{}'", table.name()),
            expected: ColumnType::Bool.to_string(),
            found: predicate_type.to_string(),
        });
    }

    let rows = table
        .rows()
        .iter()
        .filter(|row| predicate.evaluate(table.schema(), row) == Value::Bool(true))
        .cloned()
        .collect();

    Ok(Table::from_parts(
        table.name().to_string(),
        table.schema().clone(),
        rows,
    ))
}

/// Stable sort on one column. Nulls sort last in both directions.
pub fn sort(table: &Table, column: &str, direction: SortDirection) -> Result<Table, TableError> {
    let position = table.column_index(column)?;
    let mut rows = table.rows().to_vec();

    rows.sort_by(|a, b| {
        let (left, right) = (&a[position], &b[position]);
        match direction {
            SortDirection::Ascending => left.sort_cmp(right),
            SortDirection::Descending if left.is_null() || right.is_null() => left.sort_cmp(right),
            SortDirection::Descending => right.sort_cmp(left),
        }
    });

    Ok(Table::from_parts(
        table.name().to_string(),
        table.schema().clone(),
        rows,
    ))
}

/// Projects `columns` in the given order.
pub fn select(table: &Table, columns: &[&str]) -> Result<Table, TableError> {
    let positions = columns
        .iter()
        .map(|column| table.column_index(column))
        .collect::<Result<Vec<_>, _>>()?;

    let fields = positions
        .iter()
        .map(|&position| table.schema().fields()[position].clone())
        .collect();
    let schema = Schema::named(table.name(), fields)?;

    let rows = table
        .rows()
        .iter()
        .map(|row| positions.iter().map(|&position| row[position].clone()).collect())
        .collect();

    Ok(Table::from_parts(table.name().to_string(), schema, rows))
}

/// First `count` rows.
pub fn limit(table: &Table, count: usize) -> Table {
    Table::from_parts(
        table.name().to_string(),
        table.schema().clone(),
        table.rows().iter().take(count).cloned().collect(),
    )
}

fn coerce(value: Value, column_type: ColumnType) -> Value {
    match (value, column_type) {
        (Value::Int(number), ColumnType::Float) => Value::Float(number as f64),
        (other, _) => other,
    }
}
