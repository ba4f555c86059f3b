use super::error::TableError;
use super::value::{ColumnType, Value};
use super::{Field, Row, Schema, Table};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    /// Non-null values of the column.
    Count,
    /// Rows in the group, nulls included.
    CountRows,
    Sum,
    Min,
    Max,
    Mean,
}

/// One output column of a grouping: `function(column) AS alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub function: AggregateFn,
    pub column: Option<String>,
    pub alias: String,
}

impl Aggregation {
    fn over(function: AggregateFn, column: &str, alias: &str) -> Self {
        Self {
            function,
            column: Some(column.to_string()),
            alias: alias.to_string(),
        }
    }

    pub fn count(column: &str, alias: &str) -> Self {
        Self::over(AggregateFn::Count, column, alias)
    }

    pub fn count_rows(alias: &str) -> Self {
        Self {
            function: AggregateFn::CountRows,
            column: None,
            alias: alias.to_string(),
        }
    }

    pub fn sum(column: &str, alias: &str) -> Self {
        Self::over(AggregateFn::Sum, column, alias)
    }

    pub fn min(column: &str, alias: &str) -> Self {
        Self::over(AggregateFn::Min, column, alias)
    }

    pub fn max(column: &str, alias: &str) -> Self {
        Self::over(AggregateFn::Max, column, alias)
    }

    pub fn mean(column: &str, alias: &str) -> Self {
        Self::over(AggregateFn::Mean, column, alias)
    }
}

struct BoundAggregation {
    function: AggregateFn,
    position: Option<usize>,
}

/// Groups `table` by the `group_keys` tuple and evaluates `aggregations`
/// per group. Rows with null keys form their own group. Groups appear in the
/// order their first row appears; with no keys the whole table is one group.
pub fn group_aggregate(
    table: &Table,
    group_keys: &[&str],
    aggregations: &[Aggregation],
) -> Result<Table, TableError> {
    let key_positions = group_keys
        .iter()
        .map(|key| table.column_index(key))
        .collect::<Result<Vec<_>, _>>()?;

    let mut fields: Vec<Field> = key_positions
        .iter()
        .map(|&position| table.schema().fields()[position].clone())
        .collect();
    let mut bound = Vec::with_capacity(aggregations.len());

    for aggregation in aggregations {
        let position = match &aggregation.column {
            Some(column) => Some(table.column_index(column)?),
            None => None,
        };
        let input_type = position.map(|position| table.schema().fields()[position].column_type);
        let output_type = output_type(aggregation, input_type)?;
        fields.push(Field::new(aggregation.alias.clone(), output_type));
        bound.push(BoundAggregation {
            function: aggregation.function,
            position,
        });
    }

    let schema = Schema::named(table.name(), fields)?;

    let mut order: Vec<Vec<Value>> = Vec::new();
    let mut members: HashMap<Vec<Value>, Vec<&Row>> = HashMap::new();
    if key_positions.is_empty() {
        order.push(Vec::new());
        members.insert(Vec::new(), table.rows().iter().collect());
    } else {
        for row in table.rows() {
            let key: Vec<Value> = key_positions
                .iter()
                .map(|&position| row[position].clone())
                .collect();
            members
                .entry(key)
                .or_insert_with_key(|key| {
                    order.push(key.clone());
                    Vec::new()
                })
                .push(row);
        }
    }

    let rows = order
        .into_iter()
        .map(|key| {
            let group = members.get(&key).map(Vec::as_slice).unwrap_or_default();
            let mut row = key;
            row.extend(bound.iter().map(|aggregation| evaluate(aggregation, group)));
            row
        })
        .collect();

    Ok(Table::from_parts(table.name().to_string(), schema, rows))
}

fn output_type(
    aggregation: &Aggregation,
    input: Option<ColumnType>,
) -> Result<ColumnType, TableError> {
    let numeric_input = || match input {
        Some(ty) if ty.is_numeric() => Ok(ty),
        other => Err(TableError::TypeMismatch {
            context: format!("aggregate '{}'", aggregation.alias),
            expected: "numeric column".to_string(),
            found: other.map(|ty| ty.to_string()).unwrap_or_else(|| "no column".to_string()),
        }),
    };

    match aggregation.function {
        AggregateFn::Count | AggregateFn::CountRows => Ok(ColumnType::Int),
        AggregateFn::Sum => numeric_input(),
        AggregateFn::Mean => numeric_input().map(|_| ColumnType::Float),
        AggregateFn::Min | AggregateFn::Max => input.ok_or_else(|| TableError::TypeMismatch {
            context: format!("aggregate '{}'", aggregation.alias),
            expected: "a column".to_string(),
            found: "no column".to_string(),
        }),
    }
}

fn evaluate(aggregation: &BoundAggregation, group: &[&Row]) -> Value {
    let values = || {
        group
            .iter()
            .filter_map(|row| aggregation.position.map(|position| &row[position]))
            .filter(|value| !value.is_null())
    };

    match aggregation.function {
        AggregateFn::CountRows => Value::Int(group.len() as i64),
        AggregateFn::Count => Value::Int(values().count() as i64),
        AggregateFn::Sum => sum(values()),
        AggregateFn::Mean => {
            let numbers: Vec<f64> = values().filter_map(Value::as_float).collect();
            if numbers.is_empty() {
                Value::Null
            } else {
                Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
        AggregateFn::Min => values()
            .min_by(|a, b| a.sort_cmp(b))
            .cloned()
            .unwrap_or(Value::Null),
        AggregateFn::Max => values()
            .max_by(|a, b| a.sort_cmp(b))
            .cloned()
            .unwrap_or(Value::Null),
    }
}

/// SQL `SUM`: null for an empty or all-null group, null on integer overflow.
fn sum<'a>(values: impl Iterator<Item = &'a Value>) -> Value {
    let mut total: Option<Value> = None;
    for value in values {
        total = Some(match (total, value) {
            (None, first) => first.clone(),
            (Some(Value::Int(acc)), Value::Int(next)) => match acc.checked_add(*next) {
                Some(result) => Value::Int(result),
                None => return Value::Null,
            },
            (Some(acc), next) => match (acc.as_float(), next.as_float()) {
                (Some(a), Some(b)) => Value::Float(a + b),
                _ => return Value::Null,
            },
        });
    }
    total.unwrap_or(Value::Null)
}
