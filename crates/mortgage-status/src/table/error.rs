use super::value::{ColumnType, Value};

/// Structural failures raised by table operators. Every variant indicates a
/// configuration mistake rather than bad data, so callers abort on them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn { table: String, column: String },
    #[error("join key '{key}' is missing from the {side} table '{table}'")]
    MissingJoinKey {
        key: String,
        side: &'static str,
        table: String,
    },
    #[error("join key '{key}' has type {left} on the left and {right} on the right")]
    JoinKeyTypeMismatch {
        key: String,
        left: ColumnType,
        right: ColumnType,
    },
    #[error("key '{key}' has {count} rows with value '{value}' in table '{table}'")]
    DuplicateKey {
        table: String,
        key: String,
        value: Value,
        count: usize,
    },
    #[error("column '{column}' appears more than once in table '{table}'")]
    DuplicateColumn { table: String, column: String },
    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },
    #[error("row {row} of table '{table}' has {actual} values but the schema declares {expected}")]
    RowArity {
        table: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
}
