use super::profile::DatasetProfile;
use crate::table::Table;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode CSV output: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination of the classified table.
pub trait ResultSink {
    fn persist(&self, table: &Table) -> Result<(), SinkError>;
}

/// Writes the table as a headed CSV file.
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    path: PathBuf,
}

impl CsvResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_to<W: Write>(table: &Table, writer: W) -> Result<(), SinkError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(table.schema().names())?;
        for row in table.rows() {
            csv_writer.write_record(row.iter().map(ToString::to_string))?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

impl ResultSink for CsvResultSink {
    fn persist(&self, table: &Table) -> Result<(), SinkError> {
        create_parent(&self.path)?;
        let file = fs::File::create(&self.path).map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;
        Self::write_to(table, file)?;
        info!(
            table = table.name(),
            rows = table.len(),
            path = %self.path.display(),
            "table persisted"
        );
        Ok(())
    }
}

/// Writes profiling reports as pretty JSON files inside `dir`.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, profile: &DatasetProfile) -> PathBuf {
        self.dir.join(format!("{}_report.json", slug(&profile.table)))
    }

    pub fn write(&self, profile: &DatasetProfile) -> Result<PathBuf, SinkError> {
        fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(profile);
        let file = fs::File::create(&path).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::to_writer_pretty(file, profile)?;
        info!(report = %profile.title, path = %path.display(), "profile report written");
        Ok(path)
    }
}

fn create_parent(path: &Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| SinkError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ColumnType, Field, Value};

    fn classified() -> Table {
        Table::from_rows(
            "classified_applications",
            vec![
                Field::new("application_id", ColumnType::Int),
                Field::new("status", ColumnType::Text),
                Field::new("status_reason", ColumnType::Text),
            ],
            vec![
                vec![
                    Value::Int(7),
                    Value::text("refused"),
                    Value::text("income is very irregular"),
                ],
                vec![Value::Int(3), Value::text("accepted"), Value::Null],
            ],
        )
        .expect("valid table")
    }

    #[test]
    fn csv_output_has_header_and_empty_nulls() {
        let mut buffer = Vec::new();
        CsvResultSink::write_to(&classified(), &mut buffer).expect("write succeeds");

        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(
            text,
            "application_id,status,status_reason\n7,refused,income is very irregular\n3,accepted,\n"
        );
    }

    #[test]
    fn report_paths_are_slugged_table_names() {
        let writer = ReportWriter::new("reports");
        let profile = DatasetProfile::of("Output", &classified().renamed("Applications + Down payments"));

        assert_eq!(
            writer.path_for(&profile),
            PathBuf::from("reports").join("applications_down_payments_report.json")
        );
    }

    #[test]
    fn writes_csv_and_report_files() {
        let dir = std::env::temp_dir().join(format!("mortgage-status-sink-{}", std::process::id()));
        let table = classified();

        let sink = CsvResultSink::new(dir.join("out").join("status.csv"));
        sink.persist(&table).expect("csv persisted");
        let report = ReportWriter::new(dir.join("reports"))
            .write(&DatasetProfile::of("Classified applications", &table))
            .expect("report written");

        let csv = fs::read_to_string(sink.path()).expect("csv exists");
        assert!(csv.starts_with("application_id,status,status_reason"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report).expect("report exists"))
                .expect("valid json");
        assert_eq!(json["rows"], 2);
        assert_eq!(json["columns"][0]["name"], "application_id");

        fs::remove_dir_all(&dir).ok();
    }
}
