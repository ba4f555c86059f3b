use super::domain::{Application, Branch, DownPayment, FamilyStatus, ProfessionalStatus};
use crate::table::{Table, TableError, TableRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DatasetLoadError {
    #[error("failed to open {dataset} dataset at {path}: {source}")]
    Io {
        dataset: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid {dataset} CSV data: {source}")]
    Csv {
        dataset: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Table(#[from] TableError),
}

/// The five input tables, loaded once per run.
#[derive(Debug, Clone, PartialEq)]
pub struct MortgageDatasets {
    pub applications: Table,
    pub branches: Table,
    pub professional_status: Table,
    pub down_payments: Table,
    pub family_status: Table,
}

impl MortgageDatasets {
    pub fn from_records(
        applications: Vec<Application>,
        branches: Vec<Branch>,
        professional_status: Vec<ProfessionalStatus>,
        down_payments: Vec<DownPayment>,
        family_status: Vec<FamilyStatus>,
    ) -> Result<Self, TableError> {
        Ok(Self {
            applications: Table::from_records(applications)?,
            branches: Table::from_records(branches)?,
            professional_status: Table::from_records(professional_status)?,
            down_payments: Table::from_records(down_payments)?,
            family_status: Table::from_records(family_status)?,
        })
    }

    /// Tables in loading order, for reporting.
    pub fn tables(&self) -> [&Table; 5] {
        [
            &self.applications,
            &self.branches,
            &self.professional_status,
            &self.down_payments,
            &self.family_status,
        ]
    }
}

/// Opaque source of the input datasets.
pub trait DatasetLoader {
    fn load(&self) -> Result<MortgageDatasets, DatasetLoadError>;
}

/// File locations of the five CSV inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub applications: PathBuf,
    pub branches: PathBuf,
    pub professional_status: PathBuf,
    pub down_payments: PathBuf,
    pub family_status: PathBuf,
}

impl DatasetPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            applications: dir.join("applications.csv"),
            branches: dir.join("branches.csv"),
            professional_status: dir.join("professional_status.csv"),
            down_payments: dir.join("down_payments.csv"),
            family_status: dir.join("family_status.csv"),
        }
    }
}

/// One reader per dataset, used when the inputs do not live on disk.
pub struct DatasetReaders<R> {
    pub applications: R,
    pub branches: R,
    pub professional_status: R,
    pub down_payments: R,
    pub family_status: R,
}

pub struct CsvDatasetLoader {
    paths: DatasetPaths,
}

impl CsvDatasetLoader {
    pub fn new(paths: DatasetPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &DatasetPaths {
        &self.paths
    }

    pub fn from_readers<R: Read>(
        readers: DatasetReaders<R>,
    ) -> Result<MortgageDatasets, DatasetLoadError> {
        let datasets = MortgageDatasets::from_records(
            parse_records(readers.applications)?,
            parse_records(readers.branches)?,
            parse_records(readers.professional_status)?,
            parse_records(readers.down_payments)?,
            parse_records(readers.family_status)?,
        )?;

        for table in datasets.tables() {
            info!(
                dataset = table.name(),
                rows = table.len(),
                "dataset loaded"
            );
        }

        Ok(datasets)
    }
}

impl DatasetLoader for CsvDatasetLoader {
    fn load(&self) -> Result<MortgageDatasets, DatasetLoadError> {
        let paths = &self.paths;
        Self::from_readers(DatasetReaders {
            applications: open::<Application>(&paths.applications)?,
            branches: open::<Branch>(&paths.branches)?,
            professional_status: open::<ProfessionalStatus>(&paths.professional_status)?,
            down_payments: open::<DownPayment>(&paths.down_payments)?,
            family_status: open::<FamilyStatus>(&paths.family_status)?,
        })
    }
}

fn open<T: TableRecord>(path: &Path) -> Result<std::fs::File, DatasetLoadError> {
    std::fs::File::open(path).map_err(|source| DatasetLoadError::Io {
        dataset: T::TABLE,
        path: path.to_path_buf(),
        source,
    })
}

/// Deserializes every row of a headed CSV into `T`.
pub(crate) fn parse_records<T, R>(reader: R) -> Result<Vec<T>, DatasetLoadError>
where
    T: TableRecord + DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for record in csv_reader.deserialize::<T>() {
        let row = record.map_err(|source| DatasetLoadError::Csv {
            dataset: T::TABLE,
            source,
        })?;
        records.push(row);
    }

    Ok(records)
}
