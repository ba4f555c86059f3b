//! Mortgage application status: loads the five lender datasets, joins them,
//! derives the loan figures and classifies every application.

pub mod datasets;
pub mod domain;
pub mod eligibility;
pub mod pipeline;
pub mod queries;
pub mod report;

#[cfg(test)]
mod tests;

pub use datasets::{
    CsvDatasetLoader, DatasetLoadError, DatasetLoader, DatasetPaths, DatasetReaders,
    MortgageDatasets,
};
pub use domain::{
    Application, Branch, DownPayment, FamilyStatus, IncomeRegularity, LoanDecision, LoanStatus,
    ProfessionalStatus,
};
pub use eligibility::{
    EligibilityConfig, EligibilityDecision, EligibilityEngine, EligibilityInputs, EligibilityRule,
    IndeterminateRule, RefusalReason,
};
pub use pipeline::{
    financial_situations, ClassificationPipeline, DuplicateClientRecords, MissingDownPayment,
    PipelineError, PipelineOptions, OUTPUT_COLUMNS,
};
pub use queries::ExploratoryQuery;
pub use report::{
    profile_inputs, CsvResultSink, DatasetProfile, ReportWriter, ResultSink, SinkError,
};
