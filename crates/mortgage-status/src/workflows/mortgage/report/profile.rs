use crate::table::{ColumnType, Table, Value};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Descriptive statistics for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub title: String,
    pub table: String,
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub column_type: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub distinct: usize,
    pub min: Option<Value>,
    pub max: Option<Value>,
    /// Numeric columns only.
    pub mean: Option<f64>,
    pub most_frequent: Option<ValueFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueFrequency {
    pub value: Value,
    pub occurrences: usize,
}

impl DatasetProfile {
    pub fn of(title: impl Into<String>, table: &Table) -> Self {
        let columns = table
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(position, field)| {
                profile_column(
                    &field.name,
                    field.column_type,
                    table.rows().iter().map(|row| &row[position]),
                )
            })
            .collect();

        Self {
            title: title.into(),
            table: table.name().to_string(),
            rows: table.len(),
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|column| column.name == name)
    }
}

fn profile_column<'a>(
    name: &str,
    column_type: ColumnType,
    values: impl Iterator<Item = &'a Value>,
) -> ColumnProfile {
    let mut null_count = 0;
    let mut present: Vec<&Value> = Vec::new();
    for value in values {
        if value.is_null() {
            null_count += 1;
        } else {
            present.push(value);
        }
    }

    let mut occurrences: HashMap<&Value, usize> = HashMap::new();
    let mut first_seen: Vec<&Value> = Vec::new();
    for &value in &present {
        let seen = occurrences.entry(value).or_insert(0);
        if *seen == 0 {
            first_seen.push(value);
        }
        *seen += 1;
    }

    // Ties go to the value seen first.
    let most_frequent = first_seen
        .iter()
        .fold(None::<(&Value, usize)>, |best, &value| {
            let count = occurrences.get(value).copied().unwrap_or_default();
            match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((value, count)),
            }
        })
        .map(|(value, occurrences)| ValueFrequency {
            value: value.clone(),
            occurrences,
        });

    let min = extreme(&present, Ordering::Less);
    let max = extreme(&present, Ordering::Greater);
    let mean = if column_type.is_numeric() && !present.is_empty() {
        let total: f64 = present.iter().filter_map(|value| value.as_float()).sum();
        Some(total / present.len() as f64)
    } else {
        None
    };

    ColumnProfile {
        name: name.to_string(),
        column_type,
        count: present.len(),
        null_count,
        distinct: first_seen.len(),
        min,
        max,
        mean,
        most_frequent,
    }
}

fn extreme(values: &[&Value], wanted: Ordering) -> Option<Value> {
    values
        .iter()
        .copied()
        .reduce(|current, candidate| {
            if candidate.compare(current) == Some(wanted) {
                candidate
            } else {
                current
            }
        })
        .cloned()
}
