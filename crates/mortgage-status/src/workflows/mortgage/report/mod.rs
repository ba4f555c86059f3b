mod profile;
mod sink;

pub use profile::{ColumnProfile, DatasetProfile, ValueFrequency};
pub use sink::{CsvResultSink, ReportWriter, ResultSink, SinkError};

use super::datasets::MortgageDatasets;

/// Profiles of the five inputs, in loading order.
pub fn profile_inputs(datasets: &MortgageDatasets) -> Vec<DatasetProfile> {
    let titles = [
        "Mortgage applications",
        "Branches",
        "Professional status",
        "Down payments",
        "Family status",
    ];
    titles
        .into_iter()
        .zip(datasets.tables())
        .map(|(title, table)| DatasetProfile::of(title, table))
        .collect()
}
