use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::mortgage::{DatasetLoadError, PipelineError, SinkError};
use crate::table::TableError;
use std::fmt;

/// Everything that can abort a classification run.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Load(DatasetLoadError),
    Query(TableError),
    Pipeline(PipelineError),
    Sink(SinkError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Load(err) => write!(f, "dataset load error: {}", err),
            AppError::Query(err) => write!(f, "query error: {}", err),
            AppError::Pipeline(err) => write!(f, "classification error: {}", err),
            AppError::Sink(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Load(err) => Some(err),
            AppError::Query(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Sink(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<DatasetLoadError> for AppError {
    fn from(value: DatasetLoadError) -> Self {
        Self::Load(value)
    }
}

impl From<TableError> for AppError {
    fn from(value: TableError) -> Self {
        Self::Query(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<SinkError> for AppError {
    fn from(value: SinkError) -> Self {
        Self::Sink(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn pipeline_errors_name_stage_and_column() {
        let err = AppError::from(PipelineError {
            stage: "join professional status",
            source: TableError::UnknownColumn {
                table: "financial_situations".to_string(),
                column: "client_id".to_string(),
            },
        });

        let message = err.to_string();
        assert!(message.starts_with("classification error:"));
        assert!(message.contains("join professional status"));
        assert!(message.contains("client_id"));
        assert!(err.source().is_some());
    }
}
