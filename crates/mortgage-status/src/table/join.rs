use super::error::TableError;
use super::value::Value;
use super::{Field, Row, Schema, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    const fn keeps_unmatched_left(self) -> bool {
        matches!(self, Self::Left | Self::Full)
    }

    const fn keeps_unmatched_right(self) -> bool {
        matches!(self, Self::Right | Self::Full)
    }
}

/// Joins `left` and `right` on the column `key` present in both.
///
/// The output keeps the left columns in order, with `key` holding the first
/// non-null of the two sides, followed by the right table's other columns
/// (suffixed `_right` when the name is already taken). Null keys never match.
/// Inner and left joins follow left row order, right joins follow right row
/// order, and full joins emit left order then the unmatched right rows.
/// Duplicate keys produce one row per matching pair.
pub fn outer_join(
    left: &Table,
    right: &Table,
    key: &str,
    kind: JoinKind,
) -> Result<Table, TableError> {
    let left_key = left
        .schema()
        .position(key)
        .ok_or_else(|| TableError::MissingJoinKey {
            key: key.to_string(),
            side: "left",
            table: left.name().to_string(),
        })?;
    let right_key = right
        .schema()
        .position(key)
        .ok_or_else(|| TableError::MissingJoinKey {
            key: key.to_string(),
            side: "right",
            table: right.name().to_string(),
        })?;

    let left_type = left.schema().fields()[left_key].column_type;
    let right_type = right.schema().fields()[right_key].column_type;
    if left_type != right_type {
        return Err(TableError::JoinKeyTypeMismatch {
            key: key.to_string(),
            left: left_type,
            right: right_type,
        });
    }

    let name = format!("{}+{}", left.name(), right.name());
    let schema = Schema::named(&name, joined_fields(left.schema(), right.schema(), right_key))?;
    let layout = JoinLayout {
        left_width: left.schema().len(),
        left_key,
        right_width: right.schema().len() - 1,
        right_key,
    };

    let mut rows = Vec::new();
    if kind == JoinKind::Right {
        let left_index = key_index(left.rows(), left_key);
        for right_row in right.rows() {
            match left_index.get(&right_row[right_key]) {
                Some(matches) => rows.extend(matches.iter().map(|&position| {
                    layout.combine(Some(&left.rows()[position]), Some(right_row))
                })),
                None => rows.push(layout.combine(None, Some(right_row))),
            }
        }
    } else {
        let right_index = key_index(right.rows(), right_key);
        let mut right_matched = vec![false; right.len()];

        for left_row in left.rows() {
            match right_index.get(&left_row[left_key]) {
                Some(matches) => {
                    for &position in matches {
                        right_matched[position] = true;
                        rows.push(layout.combine(Some(left_row), Some(&right.rows()[position])));
                    }
                }
                None if kind.keeps_unmatched_left() => {
                    rows.push(layout.combine(Some(left_row), None))
                }
                None => {}
            }
        }

        if kind.keeps_unmatched_right() {
            for (right_row, matched) in right.rows().iter().zip(right_matched) {
                if !matched {
                    rows.push(layout.combine(None, Some(right_row)));
                }
            }
        }
    }

    Ok(Table::from_parts(name, schema, rows))
}

/// Fails with `DuplicateKey` on the first non-null `key` value carried by
/// more than one row of `table`.
pub fn ensure_unique_key(table: &Table, key: &str) -> Result<(), TableError> {
    let position = table.column_index(key)?;
    let index = key_index(table.rows(), position);

    let duplicate = table
        .rows()
        .iter()
        .map(|row| &row[position])
        .find_map(|value| {
            index
                .get(value)
                .filter(|positions| positions.len() > 1)
                .map(|positions| (value, positions.len()))
        });

    match duplicate {
        Some((value, count)) => Err(TableError::DuplicateKey {
            table: table.name().to_string(),
            key: key.to_string(),
            value: value.clone(),
            count,
        }),
        None => Ok(()),
    }
}

struct JoinLayout {
    left_width: usize,
    left_key: usize,
    right_width: usize,
    right_key: usize,
}

impl JoinLayout {
    fn combine(&self, left: Option<&Row>, right: Option<&Row>) -> Row {
        let mut row = match left {
            Some(values) => values.clone(),
            None => vec![Value::Null; self.left_width],
        };

        if let Some(values) = right {
            if row[self.left_key].is_null() {
                row[self.left_key] = values[self.right_key].clone();
            }
            row.extend(
                values
                    .iter()
                    .enumerate()
                    .filter(|(position, _)| *position != self.right_key)
                    .map(|(_, value)| value.clone()),
            );
        } else {
            row.extend(std::iter::repeat(Value::Null).take(self.right_width));
        }

        row
    }
}

fn joined_fields(left: &Schema, right: &Schema, right_key: usize) -> Vec<Field> {
    let mut fields: Vec<Field> = left.fields().to_vec();
    for (position, field) in right.fields().iter().enumerate() {
        if position == right_key {
            continue;
        }
        let name = if left.position(&field.name).is_some() {
            format!("{}_right", field.name)
        } else {
            field.name.clone()
        };
        fields.push(Field::new(name, field.column_type));
    }
    fields
}

fn key_index(rows: &[Row], key: usize) -> HashMap<&Value, Vec<usize>> {
    let mut index: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (position, row) in rows.iter().enumerate() {
        let value = &row[key];
        if !value.is_null() {
            index.entry(value).or_default().push(position);
        }
    }
    index
}
