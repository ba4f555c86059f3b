mod config;
mod policy;
mod rules;

pub use config::{EligibilityConfig, IndeterminateRule};
pub use policy::{EligibilityDecision, EligibilityRule, RefusalReason};

use super::domain::{columns, IncomeRegularity};
use crate::table::{append_column, ColumnType, Field, Row, Table, TableError, Value};
use policy::decide_status;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Stateless classifier that applies the lender's rule cascade to a row.
pub struct EligibilityEngine {
    config: EligibilityConfig,
}

impl EligibilityEngine {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn classify(&self, inputs: &EligibilityInputs) -> EligibilityDecision {
        decide_status(inputs, &self.config)
    }

    /// Appends `status` and `status_reason` to every row of `table`.
    pub fn classify_table(&self, table: &Table) -> Result<Table, TableError> {
        let bound = InputColumns::bind(table)?;
        let mut statuses: Vec<Value> = Vec::with_capacity(table.len());
        let mut reasons: Vec<Value> = Vec::with_capacity(table.len());

        for (position, row) in table.rows().iter().enumerate() {
            let decision = self.classify(&bound.read(row));
            if let Some(reason) = decision.reason() {
                debug!(row = position, reason = reason.code(), "application refused");
            }
            statuses.push(Value::text(decision.status().label()));
            reasons.push(decision.reason().map(RefusalReason::summary).into());
        }

        let with_status =
            append_column(table, Field::new(columns::STATUS, ColumnType::Text), statuses)?;
        append_column(
            &with_status,
            Field::new(columns::STATUS_REASON, ColumnType::Text),
            reasons,
        )
    }
}

/// Row attributes the rules read; `None` marks a null cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityInputs {
    pub applicant_age_at_maturity: Option<i64>,
    pub income_regularity: Option<IncomeRegularity>,
    pub monthly_repayment: Option<i64>,
    pub average_monthly_income: Option<f64>,
    pub dependent_children: Option<i64>,
}

/// Column positions resolved once per table.
struct InputColumns {
    age_at_maturity: usize,
    income_regularity: usize,
    monthly_repayment: usize,
    average_monthly_income: usize,
    dependent_children: usize,
}

impl InputColumns {
    fn bind(table: &Table) -> Result<Self, TableError> {
        Ok(Self {
            age_at_maturity: table.column_index(columns::APPLICANT_AGE_AT_MATURITY)?,
            income_regularity: table.column_index(columns::INCOME_REGULARITY)?,
            monthly_repayment: table.column_index(columns::MONTHLY_REPAYMENT)?,
            average_monthly_income: table.column_index(columns::AVERAGE_MONTHLY_INCOME)?,
            dependent_children: table.column_index(columns::DEPENDENT_CHILDREN)?,
        })
    }

    fn read(&self, row: &Row) -> EligibilityInputs {
        EligibilityInputs {
            applicant_age_at_maturity: row[self.age_at_maturity].as_int(),
            income_regularity: row[self.income_regularity]
                .as_text()
                .and_then(IncomeRegularity::parse),
            monthly_repayment: row[self.monthly_repayment].as_int(),
            average_monthly_income: row[self.average_monthly_income].as_float(),
            dependent_children: row[self.dependent_children].as_int(),
        }
    }
}
