use super::datasets::MortgageDatasets;
use super::domain::{columns, LoanStatus};
use super::eligibility::{EligibilityConfig, EligibilityEngine};
use crate::table::{
    col, derive, ensure_unique_key, outer_join, select, sort, Expr, JoinKind, SortDirection,
    Table, TableError, Value,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Columns of the classified output, in order.
pub const OUTPUT_COLUMNS: [&str; 17] = [
    columns::APPLICATION_ID,
    columns::CLIENT_ID,
    columns::REQUEST_DATE,
    columns::OPERATION_AMOUNT,
    columns::DOWN_PAYMENT,
    columns::DURATION_MONTHS,
    columns::LOAN_PRINCIPAL,
    columns::ANNUAL_DURATION,
    columns::MONTHLY_REPAYMENT,
    columns::DECISION,
    columns::AVERAGE_MONTHLY_INCOME,
    columns::INCOME_REGULARITY,
    columns::DATE_OF_BIRTH,
    columns::DEPENDENT_CHILDREN,
    columns::APPLICANT_AGE_AT_MATURITY,
    columns::STATUS,
    columns::STATUS_REASON,
];

/// A table operation failed; `stage` names the pipeline step.
#[derive(Debug, Error)]
#[error("pipeline stage '{stage}' failed: {source}")]
pub struct PipelineError {
    pub stage: &'static str,
    #[source]
    pub source: TableError,
}

trait StageContext<T> {
    fn stage(self, stage: &'static str) -> Result<T, PipelineError>;
}

impl<T> StageContext<T> for Result<T, TableError> {
    fn stage(self, stage: &'static str) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

/// How `loan_principal` treats an application without a down payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDownPayment {
    #[default]
    TreatAsZero,
    Propagate,
}

impl MissingDownPayment {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "treat_as_zero" | "zero" => Some(Self::TreatAsZero),
            "propagate" | "null" => Some(Self::Propagate),
            _ => None,
        }
    }
}

/// Whether several professional or family records per client are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateClientRecords {
    #[default]
    Reject,
    /// Keep every match, fanning out the application row.
    Expand,
}

impl DuplicateClientRecords {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "expand" | "fan_out" | "fan-out" => Some(Self::Expand),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub missing_down_payment: MissingDownPayment,
    pub duplicate_client_records: DuplicateClientRecords,
}

/// Joins applications with their down payments and derives the loan figures.
pub fn financial_situations(
    datasets: &MortgageDatasets,
    options: &PipelineOptions,
) -> Result<Table, PipelineError> {
    let joined = outer_join(
        &datasets.applications,
        &datasets.down_payments,
        columns::APPLICATION_ID,
        JoinKind::Full,
    )
    .stage("join down payments")?;

    let down_payment = match options.missing_down_payment {
        MissingDownPayment::TreatAsZero => col(columns::DOWN_PAYMENT).coalesce(0),
        MissingDownPayment::Propagate => col(columns::DOWN_PAYMENT),
    };
    let principal = col(columns::OPERATION_AMOUNT) - down_payment;

    let with_principal =
        derive(&joined, columns::LOAN_PRINCIPAL, &principal).stage("derive loan principal")?;
    let with_years = derive(
        &with_principal,
        columns::ANNUAL_DURATION,
        &col(columns::DURATION_MONTHS).floor_div(12),
    )
    .stage("derive annual duration")?;
    let situations = derive(
        &with_years,
        columns::MONTHLY_REPAYMENT,
        &col(columns::LOAN_PRINCIPAL).floor_div(col(columns::DURATION_MONTHS)),
    )
    .stage("derive monthly repayment")?;

    let zero_durations = situations
        .column(columns::DURATION_MONTHS)
        .stage("count zero durations")?
        .filter(|value| **value == Value::Int(0))
        .count();
    if zero_durations > 0 {
        warn!(
            rows = zero_durations,
            "zero loan duration; monthly repayment left null"
        );
    }

    Ok(situations.renamed("financial_situations"))
}

/// Applicant age in the year the loan matures.
pub fn age_at_maturity() -> Expr {
    col(columns::REQUEST_DATE).year() - col(columns::DATE_OF_BIRTH).year()
        + col(columns::ANNUAL_DURATION)
}

/// Full classification run over the five datasets.
pub struct ClassificationPipeline {
    engine: EligibilityEngine,
    options: PipelineOptions,
}

impl ClassificationPipeline {
    pub fn new(config: EligibilityConfig, options: PipelineOptions) -> Self {
        Self {
            engine: EligibilityEngine::new(config),
            options,
        }
    }

    pub fn eligibility(&self) -> &EligibilityConfig {
        self.engine.config()
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn run(&self, datasets: &MortgageDatasets) -> Result<Table, PipelineError> {
        if self.options.duplicate_client_records == DuplicateClientRecords::Reject {
            ensure_unique_key(&datasets.professional_status, columns::CLIENT_ID)
                .stage("check professional status keys")?;
            ensure_unique_key(&datasets.family_status, columns::CLIENT_ID)
                .stage("check family status keys")?;
        }

        let situations = financial_situations(datasets, &self.options)?;
        let with_professional = outer_join(
            &situations,
            &datasets.professional_status,
            columns::CLIENT_ID,
            JoinKind::Left,
        )
        .stage("join professional status")?;
        let with_family = outer_join(
            &with_professional,
            &datasets.family_status,
            columns::CLIENT_ID,
            JoinKind::Left,
        )
        .stage("join family status")?;
        let with_age = derive(
            &with_family,
            columns::APPLICANT_AGE_AT_MATURITY,
            &age_at_maturity(),
        )
        .stage("derive age at maturity")?;

        let classified = self
            .engine
            .classify_table(&with_age)
            .stage("classify applications")?;
        let projected = select(&classified, &OUTPUT_COLUMNS).stage("select output columns")?;
        let ordered = sort(&projected, columns::STATUS, SortDirection::Descending)
            .stage("order by status")?;

        let refused = ordered
            .column(columns::STATUS)
            .stage("count refusals")?
            .filter(|value| value.as_text() == Some(LoanStatus::Refused.label()))
            .count();
        info!(
            applications = ordered.len(),
            refused,
            accepted = ordered.len() - refused,
            "applications classified"
        );

        Ok(ordered.renamed("classified_applications"))
    }
}
