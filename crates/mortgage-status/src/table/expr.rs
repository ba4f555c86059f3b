use super::error::TableError;
use super::value::{ColumnType, DatePart, Value};
use super::{Row, Schema, Table};
use std::cmp::Ordering;

/// Arithmetic operators. Integer arithmetic that overflows, and any division
/// by zero, evaluates to null for that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    FloorDiv,
}

impl BinaryOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::FloorDiv => "div",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::NotEq => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::LtEq => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::GtEq => ordering != Ordering::Less,
        }
    }
}

/// Row-wise expression evaluated against a table's columns.
///
/// Comparisons and boolean connectives follow three-valued logic: a null
/// operand yields null unless the other operand already decides the result
/// (`false AND null` is `false`, `true OR null` is `true`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Literal(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    IsNull(Box<Expr>),
    InList {
        expr: Box<Expr>,
        list: Vec<Value>,
    },
    DatePart {
        part: DatePart,
        expr: Box<Expr>,
    },
    Coalesce(Vec<Expr>),
}

pub fn col(name: impl Into<String>) -> Expr {
    Expr::Column(name.into())
}

pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::Literal(value.into())
}

impl Expr {
    fn binary(self, op: BinaryOp, right: impl Into<Expr>) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right.into()),
        }
    }

    fn compare(self, op: CompareOp, right: impl Into<Expr>) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(right.into()),
        }
    }

    pub fn floor_div(self, right: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::FloorDiv, right)
    }

    pub fn equals(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Eq, right)
    }

    pub fn not_equals(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::NotEq, right)
    }

    pub fn lt(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Lt, right)
    }

    pub fn lt_eq(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::LtEq, right)
    }

    pub fn gt(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::Gt, right)
    }

    pub fn gt_eq(self, right: impl Into<Expr>) -> Expr {
        self.compare(CompareOp::GtEq, right)
    }

    pub fn and(self, right: impl Into<Expr>) -> Expr {
        Expr::And(Box::new(self), Box::new(right.into()))
    }

    pub fn or(self, right: impl Into<Expr>) -> Expr {
        Expr::Or(Box::new(self), Box::new(right.into()))
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(Box::new(self))
    }

    pub fn is_not_null(self) -> Expr {
        !self.is_null()
    }

    pub fn is_in<V: Into<Value>>(self, list: impl IntoIterator<Item = V>) -> Expr {
        Expr::InList {
            expr: Box::new(self),
            list: list.into_iter().map(Into::into).collect(),
        }
    }

    pub fn date_part(self, part: DatePart) -> Expr {
        Expr::DatePart {
            part,
            expr: Box::new(self),
        }
    }

    pub fn year(self) -> Expr {
        self.date_part(DatePart::Year)
    }

    pub fn month(self) -> Expr {
        self.date_part(DatePart::Month)
    }

    pub fn day(self) -> Expr {
        self.date_part(DatePart::Day)
    }

    pub fn quarter(self) -> Expr {
        self.date_part(DatePart::Quarter)
    }

    pub fn decade(self) -> Expr {
        self.date_part(DatePart::Decade)
    }

    /// First non-null of `self` and `fallback`.
    pub fn coalesce(self, fallback: impl Into<Expr>) -> Expr {
        match self {
            Expr::Coalesce(mut candidates) => {
                candidates.push(fallback.into());
                Expr::Coalesce(candidates)
            }
            other => Expr::Coalesce(vec![other, fallback.into()]),
        }
    }

    /// Resolves the result type against `table`, failing on unknown columns
    /// or operands that cannot be combined.
    pub fn infer_type(&self, table: &Table) -> Result<ColumnType, TableError> {
        match self {
            Expr::Column(name) => {
                let position = table.column_index(name)?;
                Ok(table.schema().fields()[position].column_type)
            }
            Expr::Literal(value) => value.column_type().ok_or_else(|| TableError::TypeMismatch {
                context: "literal".to_string(),
                expected: "a typed value".to_string(),
                found: "null".to_string(),
            }),
            Expr::Binary { op, left, right } => {
                let left_type = left.infer_type(table)?;
                let right_type = right.infer_type(table)?;
                if !left_type.is_numeric() || !right_type.is_numeric() {
                    return Err(mismatch(
                        format!("operator '{}'", op.symbol()),
                        "numeric operands",
                        format!("{left_type} and {right_type}"),
                    ));
                }
                Ok(widen(left_type, right_type))
            }
            Expr::Compare { left, right, .. } => {
                let left_type = left.infer_type(table)?;
                let right_type = right.infer_type(table)?;
                if !comparable(left_type, right_type) {
                    return Err(mismatch(
                        "comparison",
                        "comparable operands",
                        format!("{left_type} and {right_type}"),
                    ));
                }
                Ok(ColumnType::Bool)
            }
            Expr::And(left, right) | Expr::Or(left, right) => {
                expect_bool(left.infer_type(table)?, "boolean connective")?;
                expect_bool(right.infer_type(table)?, "boolean connective")?;
                Ok(ColumnType::Bool)
            }
            Expr::Not(inner) => {
                expect_bool(inner.infer_type(table)?, "negation")?;
                Ok(ColumnType::Bool)
            }
            Expr::IsNull(inner) => {
                inner.infer_type(table)?;
                Ok(ColumnType::Bool)
            }
            Expr::InList { expr, list } => {
                let expr_type = expr.infer_type(table)?;
                for candidate in list.iter().filter_map(Value::column_type) {
                    if !comparable(expr_type, candidate) {
                        return Err(mismatch(
                            "IN list",
                            expr_type.to_string(),
                            candidate.to_string(),
                        ));
                    }
                }
                Ok(ColumnType::Bool)
            }
            Expr::DatePart { part, expr } => {
                let expr_type = expr.infer_type(table)?;
                if expr_type != ColumnType::Date {
                    return Err(mismatch(
                        format!("{part:?} extraction"),
                        "date",
                        expr_type.to_string(),
                    ));
                }
                Ok(ColumnType::Int)
            }
            Expr::Coalesce(candidates) => {
                let mut resolved: Option<ColumnType> = None;
                for candidate in candidates {
                    let candidate_type = candidate.infer_type(table)?;
                    resolved = Some(match resolved {
                        None => candidate_type,
                        Some(current) if current == candidate_type => current,
                        Some(current) if current.is_numeric() && candidate_type.is_numeric() => {
                            widen(current, candidate_type)
                        }
                        Some(current) => {
                            return Err(mismatch(
                                "coalesce",
                                current.to_string(),
                                candidate_type.to_string(),
                            ))
                        }
                    });
                }
                resolved.ok_or_else(|| mismatch("coalesce", "at least one candidate", "none"))
            }
        }
    }

    /// Evaluates against one row. Callers validate with `infer_type` first;
    /// an unresolved column evaluates to null.
    pub(crate) fn evaluate(&self, schema: &Schema, row: &Row) -> Value {
        match self {
            Expr::Column(name) => schema
                .position(name)
                .map(|position| row[position].clone())
                .unwrap_or(Value::Null),
            Expr::Literal(value) => value.clone(),
            Expr::Binary { op, left, right } => {
                arithmetic(*op, &left.evaluate(schema, row), &right.evaluate(schema, row))
            }
            Expr::Compare { op, left, right } => left
                .evaluate(schema, row)
                .compare(&right.evaluate(schema, row))
                .map(|ordering| Value::Bool(op.holds(ordering)))
                .unwrap_or(Value::Null),
            Expr::And(left, right) => {
                match (
                    left.evaluate(schema, row).as_bool(),
                    right.evaluate(schema, row).as_bool(),
                ) {
                    (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                    (Some(true), Some(true)) => Value::Bool(true),
                    _ => Value::Null,
                }
            }
            Expr::Or(left, right) => {
                match (
                    left.evaluate(schema, row).as_bool(),
                    right.evaluate(schema, row).as_bool(),
                ) {
                    (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                    (Some(false), Some(false)) => Value::Bool(false),
                    _ => Value::Null,
                }
            }
            Expr::Not(inner) => inner
                .evaluate(schema, row)
                .as_bool()
                .map(|value| Value::Bool(!value))
                .unwrap_or(Value::Null),
            Expr::IsNull(inner) => Value::Bool(inner.evaluate(schema, row).is_null()),
            Expr::InList { expr, list } => {
                let value = expr.evaluate(schema, row);
                if value.is_null() {
                    return Value::Null;
                }
                if list
                    .iter()
                    .any(|candidate| value.compare(candidate) == Some(Ordering::Equal))
                {
                    Value::Bool(true)
                } else if list.iter().any(Value::is_null) {
                    Value::Null
                } else {
                    Value::Bool(false)
                }
            }
            Expr::DatePart { part, expr } => expr
                .evaluate(schema, row)
                .as_date()
                .map(|date| Value::Int(part.extract(date)))
                .unwrap_or(Value::Null),
            Expr::Coalesce(candidates) => candidates
                .iter()
                .map(|candidate| candidate.evaluate(schema, row))
                .find(|value| !value.is_null())
                .unwrap_or(Value::Null),
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        lit(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        lit(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        lit(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        lit(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        lit(value)
    }
}

impl<T: Into<Expr>> std::ops::Add<T> for Expr {
    type Output = Expr;

    fn add(self, right: T) -> Expr {
        self.binary(BinaryOp::Add, right)
    }
}

impl<T: Into<Expr>> std::ops::Sub<T> for Expr {
    type Output = Expr;

    fn sub(self, right: T) -> Expr {
        self.binary(BinaryOp::Sub, right)
    }
}

impl<T: Into<Expr>> std::ops::Mul<T> for Expr {
    type Output = Expr;

    fn mul(self, right: T) -> Expr {
        self.binary(BinaryOp::Mul, right)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

fn mismatch(
    context: impl Into<String>,
    expected: impl Into<String>,
    found: impl Into<String>,
) -> TableError {
    TableError::TypeMismatch {
        context: context.into(),
        expected: expected.into(),
        found: found.into(),
    }
}

fn expect_bool(found: ColumnType, context: &str) -> Result<(), TableError> {
    if found == ColumnType::Bool {
        Ok(())
    } else {
        Err(mismatch(context, "bool", found.to_string()))
    }
}

fn widen(left: ColumnType, right: ColumnType) -> ColumnType {
    if left == ColumnType::Int && right == ColumnType::Int {
        ColumnType::Int
    } else {
        ColumnType::Float
    }
}

fn comparable(left: ColumnType, right: ColumnType) -> bool {
    left == right || (left.is_numeric() && right.is_numeric())
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::FloorDiv => floor_div(*a, *b),
            };
            result.map(Value::Int).unwrap_or(Value::Null)
        }
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => match op {
                BinaryOp::Add => Value::Float(a + b),
                BinaryOp::Sub => Value::Float(a - b),
                BinaryOp::Mul => Value::Float(a * b),
                BinaryOp::FloorDiv if b == 0.0 => Value::Null,
                BinaryOp::FloorDiv => Value::Float((a / b).floor()),
            },
            _ => Value::Null,
        },
    }
}

/// Integer division rounding toward negative infinity; `None` on a zero
/// divisor or overflow.
pub(crate) fn floor_div(dividend: i64, divisor: i64) -> Option<i64> {
    let quotient = dividend.checked_div(divisor)?;
    if dividend % divisor != 0 && ((dividend < 0) != (divisor < 0)) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::fixtures::int_table;
    use crate::table::Field;
    use chrono::NaiveDate;

    fn eval(expr: &Expr, table: &Table, row: usize) -> Value {
        expr.evaluate(table.schema(), &table.rows()[row])
    }

    #[test]
    fn floor_div_rounds_toward_negative_infinity() {
        assert_eq!(floor_div(240, 12), Some(20));
        assert_eq!(floor_div(239, 12), Some(19));
        assert_eq!(floor_div(-7, 2), Some(-4));
        assert_eq!(floor_div(7, -2), Some(-4));
        assert_eq!(floor_div(7, 0), None);
        assert_eq!(floor_div(i64::MIN, -1), None);
    }

    #[test]
    fn division_by_zero_yields_null() {
        let table = int_table(
            "financial_situations",
            &["loan_principal", "duration_months"],
            &[&[Some(120_000), Some(0)], &[Some(120_000), Some(240)]],
        );
        let repayment = col("loan_principal").floor_div(col("duration_months"));

        assert_eq!(repayment.infer_type(&table), Ok(ColumnType::Int));
        assert_eq!(eval(&repayment, &table, 0), Value::Null);
        assert_eq!(eval(&repayment, &table, 1), Value::Int(500));
    }

    #[test]
    fn null_comparisons_are_indeterminate() {
        let table = int_table("t", &["amount"], &[&[None], &[Some(5)]]);
        let predicate = col("amount").gt(1);

        assert_eq!(eval(&predicate, &table, 0), Value::Null);
        assert_eq!(eval(&predicate, &table, 1), Value::Bool(true));
        assert_eq!(eval(&predicate.clone().and(false), &table, 0), Value::Bool(false));
        assert_eq!(eval(&predicate.or(col("amount").is_null()), &table, 0), Value::Bool(true));
    }

    #[test]
    fn in_list_with_no_match_and_null_candidate_is_null() {
        let table = int_table("t", &["year"], &[&[Some(2020)]]);
        let expr = col("year").is_in([Value::Int(2018), Value::Null]);
        assert_eq!(eval(&expr, &table, 0), Value::Null);

        let expr = col("year").is_in([2019_i64, 2020]);
        assert_eq!(eval(&expr, &table, 0), Value::Bool(true));
    }

    #[test]
    fn infer_type_rejects_unknown_columns_and_bad_operands() {
        let table = int_table("applications", &["operation_amount"], &[]);

        let err = (col("operation_amount") - col("apport"))
            .infer_type(&table)
            .expect_err("unknown column");
        assert!(matches!(err, TableError::UnknownColumn { ref column, .. } if column == "apport"));

        let err = col("operation_amount")
            .year()
            .infer_type(&table)
            .expect_err("year of an int");
        assert!(matches!(err, TableError::TypeMismatch { .. }));
    }

    #[test]
    fn date_parts_and_arithmetic_compose() {
        let table = Table::from_rows(
            "family",
            vec![
                Field::new("request_date", ColumnType::Date),
                Field::new("date_of_birth", ColumnType::Date),
            ],
            vec![vec![
                Value::Date(NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid")),
                Value::Date(NaiveDate::from_ymd_opt(1965, 12, 31).expect("valid")),
            ]],
        )
        .expect("table builds");
        let age = col("request_date").year() - col("date_of_birth").year();

        assert_eq!(age.infer_type(&table), Ok(ColumnType::Int));
        assert_eq!(eval(&age, &table, 0), Value::Int(55));
    }

    #[test]
    fn coalesce_widens_numeric_candidates() {
        let table = int_table("t", &["down_payment"], &[&[None]]);
        let expr = col("down_payment").coalesce(0.0);
        assert_eq!(expr.infer_type(&table), Ok(ColumnType::Float));
        assert_eq!(eval(&expr, &table, 0), Value::Float(0.0));
    }
}
