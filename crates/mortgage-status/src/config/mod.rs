use crate::workflows::mortgage::datasets::DatasetPaths;
use crate::workflows::mortgage::eligibility::{EligibilityConfig, IndeterminateRule};
use crate::workflows::mortgage::pipeline::{
    DuplicateClientRecords, MissingDownPayment, PipelineOptions,
};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for a classification run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub datasets: DatasetPaths,
    pub output: OutputConfig,
    pub eligibility: EligibilityConfig,
    pub pipeline: PipelineOptions,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let data_dir = env::var("MORTGAGE_DATA_DIR").unwrap_or_else(|_| "datasets".to_string());
        let defaults = DatasetPaths::in_dir(&data_dir);
        let datasets = DatasetPaths {
            applications: path_var("MORTGAGE_APPLICATIONS_CSV", defaults.applications),
            branches: path_var("MORTGAGE_BRANCHES_CSV", defaults.branches),
            professional_status: path_var(
                "MORTGAGE_PROFESSIONAL_STATUS_CSV",
                defaults.professional_status,
            ),
            down_payments: path_var("MORTGAGE_DOWN_PAYMENTS_CSV", defaults.down_payments),
            family_status: path_var("MORTGAGE_FAMILY_STATUS_CSV", defaults.family_status),
        };

        let output = OutputConfig {
            classified_csv: path_var(
                "MORTGAGE_OUTPUT_CSV",
                PathBuf::from(&data_dir).join("mortgage_applications_status.csv"),
            ),
            report_dir: path_var("MORTGAGE_REPORT_DIR", PathBuf::from("reports")),
        };

        let rule_defaults = EligibilityConfig::default();
        let eligibility = EligibilityConfig {
            max_age_at_maturity: parsed_var("MORTGAGE_MAX_AGE_AT_MATURITY", |raw| {
                raw.parse::<i64>().ok().filter(|age| *age > 0)
            })?
            .unwrap_or(rule_defaults.max_age_at_maturity),
            affordability_ratio: parsed_var("MORTGAGE_AFFORDABILITY_RATIO", |raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            })?
            .unwrap_or(rule_defaults.affordability_ratio),
            indeterminate: parsed_var("MORTGAGE_INDETERMINATE_RULES", IndeterminateRule::parse)?
                .unwrap_or(rule_defaults.indeterminate),
        };

        let pipeline = PipelineOptions {
            missing_down_payment: parsed_var(
                "MORTGAGE_MISSING_DOWN_PAYMENT",
                MissingDownPayment::parse,
            )?
            .unwrap_or_default(),
            duplicate_client_records: parsed_var(
                "MORTGAGE_DUPLICATE_CLIENT_RECORDS",
                DuplicateClientRecords::parse,
            )?
            .unwrap_or_default(),
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            datasets,
            output,
            eligibility,
            pipeline,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where the classified table and the profiling reports go.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub classified_csv: PathBuf,
    pub report_dir: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value } => {
                write!(f, "{key} has an unsupported value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn path_var(key: &str, default: PathBuf) -> PathBuf {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}

/// `Ok(None)` when the variable is unset or blank.
fn parsed_var<T>(
    key: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => parse(value.trim())
            .map(Some)
            .ok_or(ConfigError::Invalid { key, value }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    const KEYS: [&str; 15] = [
        "APP_ENV",
        "APP_LOG_LEVEL",
        "MORTGAGE_DATA_DIR",
        "MORTGAGE_APPLICATIONS_CSV",
        "MORTGAGE_BRANCHES_CSV",
        "MORTGAGE_PROFESSIONAL_STATUS_CSV",
        "MORTGAGE_DOWN_PAYMENTS_CSV",
        "MORTGAGE_FAMILY_STATUS_CSV",
        "MORTGAGE_OUTPUT_CSV",
        "MORTGAGE_REPORT_DIR",
        "MORTGAGE_MAX_AGE_AT_MATURITY",
        "MORTGAGE_AFFORDABILITY_RATIO",
        "MORTGAGE_MISSING_DOWN_PAYMENT",
        "MORTGAGE_INDETERMINATE_RULES",
        "MORTGAGE_DUPLICATE_CLIENT_RECORDS",
    ];

    fn reset_env() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(
            config.datasets.applications,
            PathBuf::from("datasets").join("applications.csv")
        );
        assert_eq!(config.output.report_dir, PathBuf::from("reports"));
        assert_eq!(config.eligibility, EligibilityConfig::default());
        assert_eq!(config.pipeline, PipelineOptions::default());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn overrides_paths_thresholds_and_policies() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("MORTGAGE_DATA_DIR", "/srv/lender");
        env::set_var("MORTGAGE_BRANCHES_CSV", "/srv/shared/agences.csv");
        env::set_var("MORTGAGE_MAX_AGE_AT_MATURITY", "80");
        env::set_var("MORTGAGE_AFFORDABILITY_RATIO", "0.35");
        env::set_var("MORTGAGE_INDETERMINATE_RULES", "fall-through");
        env::set_var("MORTGAGE_MISSING_DOWN_PAYMENT", "propagate");
        env::set_var("MORTGAGE_DUPLICATE_CLIENT_RECORDS", "expand");

        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(
            config.datasets.family_status,
            PathBuf::from("/srv/lender").join("family_status.csv")
        );
        assert_eq!(config.datasets.branches, PathBuf::from("/srv/shared/agences.csv"));
        assert_eq!(config.eligibility.max_age_at_maturity, 80);
        assert_eq!(config.eligibility.affordability_ratio, 0.35);
        assert_eq!(config.eligibility.indeterminate, IndeterminateRule::FallThrough);
        assert_eq!(
            config.pipeline.missing_down_payment,
            MissingDownPayment::Propagate
        );
        assert_eq!(
            config.pipeline.duplicate_client_records,
            DuplicateClientRecords::Expand
        );
    }

    #[test]
    fn rejects_unknown_policy_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MORTGAGE_INDETERMINATE_RULES", "accept");

        let err = AppConfig::load().expect_err("invalid policy");
        reset_env();

        match err {
            ConfigError::Invalid { key, value } => {
                assert_eq!(key, "MORTGAGE_INDETERMINATE_RULES");
                assert_eq!(value, "accept");
            }
        }
    }

    #[test]
    fn rejects_non_numeric_thresholds() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MORTGAGE_AFFORDABILITY_RATIO", "a third");

        let err = AppConfig::load().expect_err("invalid ratio");
        reset_env();

        assert!(err.to_string().contains("MORTGAGE_AFFORDABILITY_RATIO"));
    }
}
