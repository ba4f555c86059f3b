use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::table::{ColumnType, Field, Row, TableRecord};

/// Column names shared by the datasets, the derived tables and the output.
pub mod columns {
    pub const APPLICATION_ID: &str = "application_id";
    pub const CLIENT_ID: &str = "client_id";
    pub const REQUEST_DATE: &str = "request_date";
    pub const BRANCH_ID: &str = "branch_id";
    pub const OPERATION_AMOUNT: &str = "operation_amount";
    pub const DURATION_MONTHS: &str = "duration_months";
    pub const DECISION: &str = "decision";
    pub const CITY: &str = "city";
    pub const SOCIO_PROFESSIONAL_CATEGORY: &str = "socio_professional_category";
    pub const EMPLOYMENT_STATUS: &str = "employment_status";
    pub const INCOME_REGULARITY: &str = "income_regularity";
    pub const AVERAGE_MONTHLY_INCOME: &str = "average_monthly_income";
    pub const DOWN_PAYMENT: &str = "down_payment";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const DEPENDENT_CHILDREN: &str = "dependent_children";

    pub const LOAN_PRINCIPAL: &str = "loan_principal";
    pub const ANNUAL_DURATION: &str = "annual_duration";
    pub const MONTHLY_REPAYMENT: &str = "monthly_repayment";
    pub const APPLICANT_AGE_AT_MATURITY: &str = "applicant_age_at_maturity";
    pub const STATUS: &str = "status";
    pub const STATUS_REASON: &str = "status_reason";
}

/// Lender decision recorded on the application; `None` while pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Granted,
    Refused,
}

impl LoanDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Refused => "refused",
        }
    }

    /// Accepts `O`/`N` codes as well as English and French words.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "o" | "oui" | "y" | "yes" | "granted" | "accordé" => Some(Self::Granted),
            "n" | "non" | "no" | "refused" | "refusé" => Some(Self::Refused),
            _ => None,
        }
    }
}

/// Stability of the applicant's income as recorded by the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeRegularity {
    Stable,
    Variable,
    VeryIrregular,
}

impl IncomeRegularity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Variable => "variable",
            Self::VeryIrregular => "very_irregular",
        }
    }

    /// Accepts the coded labels (`3 : Très irréguliers`) and English names.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase().replace(['_', '-'], " ");

        match normalized.chars().next() {
            Some('1') => return Some(Self::Stable),
            Some('2') => return Some(Self::Variable),
            Some('3') => return Some(Self::VeryIrregular),
            _ => {}
        }

        match normalized.as_str() {
            "stable" | "regular" | "réguliers" => Some(Self::Stable),
            "variable" | "irregular" | "irréguliers" => Some(Self::Variable),
            "very irregular" | "très irréguliers" => Some(Self::VeryIrregular),
            _ => None,
        }
    }
}

/// Outcome assigned by the eligibility rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Accepted,
    Refused,
}

impl LoanStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Refused => "refused",
        }
    }
}

/// Row of the applications dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(alias = "Numéro_demande_de_prêt", deserialize_with = "optional_int")]
    pub application_id: Option<i64>,
    #[serde(alias = "Numéro_client", deserialize_with = "optional_int")]
    pub client_id: Option<i64>,
    #[serde(alias = "Date_de_demande", deserialize_with = "optional_date")]
    pub request_date: Option<NaiveDate>,
    #[serde(alias = "Numéro_agence", deserialize_with = "optional_int")]
    pub branch_id: Option<i64>,
    #[serde(alias = "Montant_opération", deserialize_with = "optional_int")]
    pub operation_amount: Option<i64>,
    #[serde(alias = "Durée", deserialize_with = "optional_int")]
    pub duration_months: Option<i64>,
    #[serde(alias = "Accord", deserialize_with = "optional_decision")]
    pub decision: Option<LoanDecision>,
}

impl TableRecord for Application {
    const TABLE: &'static str = "applications";

    fn fields() -> Vec<Field> {
        vec![
            Field::new(columns::APPLICATION_ID, ColumnType::Int),
            Field::new(columns::CLIENT_ID, ColumnType::Int),
            Field::new(columns::REQUEST_DATE, ColumnType::Date),
            Field::new(columns::BRANCH_ID, ColumnType::Int),
            Field::new(columns::OPERATION_AMOUNT, ColumnType::Int),
            Field::new(columns::DURATION_MONTHS, ColumnType::Int),
            Field::new(columns::DECISION, ColumnType::Text),
        ]
    }

    fn into_row(self) -> Row {
        vec![
            self.application_id.into(),
            self.client_id.into(),
            self.request_date.into(),
            self.branch_id.into(),
            self.operation_amount.into(),
            self.duration_months.into(),
            self.decision.map(LoanDecision::label).into(),
        ]
    }
}

/// Row of the branch directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(alias = "Numéro_agence", deserialize_with = "optional_int")]
    pub branch_id: Option<i64>,
    #[serde(alias = "Ville", deserialize_with = "non_empty")]
    pub city: Option<String>,
}

impl TableRecord for Branch {
    const TABLE: &'static str = "branches";

    fn fields() -> Vec<Field> {
        vec![
            Field::new(columns::BRANCH_ID, ColumnType::Int),
            Field::new(columns::CITY, ColumnType::Text),
        ]
    }

    fn into_row(self) -> Row {
        vec![self.branch_id.into(), self.city.into()]
    }
}

/// Row of the professional status dataset, one per client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalStatus {
    #[serde(alias = "Numéro_client", deserialize_with = "optional_int")]
    pub client_id: Option<i64>,
    #[serde(
        alias = "Catégorie_socioprofessionnelle",
        deserialize_with = "non_empty"
    )]
    pub socio_professional_category: Option<String>,
    #[serde(alias = "Statut_emploi", deserialize_with = "non_empty")]
    pub employment_status: Option<String>,
    #[serde(
        alias = "Régularité_des_revenus",
        deserialize_with = "optional_regularity"
    )]
    pub income_regularity: Option<IncomeRegularity>,
    #[serde(alias = "Revenu_mensuel_moyen", deserialize_with = "optional_float")]
    pub average_monthly_income: Option<f64>,
}

impl TableRecord for ProfessionalStatus {
    const TABLE: &'static str = "professional_status";

    fn fields() -> Vec<Field> {
        vec![
            Field::new(columns::CLIENT_ID, ColumnType::Int),
            Field::new(columns::SOCIO_PROFESSIONAL_CATEGORY, ColumnType::Text),
            Field::new(columns::EMPLOYMENT_STATUS, ColumnType::Text),
            Field::new(columns::INCOME_REGULARITY, ColumnType::Text),
            Field::new(columns::AVERAGE_MONTHLY_INCOME, ColumnType::Float),
        ]
    }

    fn into_row(self) -> Row {
        vec![
            self.client_id.into(),
            self.socio_professional_category.into(),
            self.employment_status.into(),
            self.income_regularity.map(IncomeRegularity::label).into(),
            self.average_monthly_income.into(),
        ]
    }
}

/// Row of the down payment dataset, keyed by application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownPayment {
    #[serde(alias = "Numéro_demande_de_prêt", deserialize_with = "optional_int")]
    pub application_id: Option<i64>,
    #[serde(alias = "Apport", deserialize_with = "optional_int")]
    pub down_payment: Option<i64>,
}

impl TableRecord for DownPayment {
    const TABLE: &'static str = "down_payments";

    fn fields() -> Vec<Field> {
        vec![
            Field::new(columns::APPLICATION_ID, ColumnType::Int),
            Field::new(columns::DOWN_PAYMENT, ColumnType::Int),
        ]
    }

    fn into_row(self) -> Row {
        vec![self.application_id.into(), self.down_payment.into()]
    }
}

/// Row of the family status dataset, one per client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyStatus {
    #[serde(alias = "Numéro_client", deserialize_with = "optional_int")]
    pub client_id: Option<i64>,
    #[serde(alias = "Date_de_naissance", deserialize_with = "optional_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(
        alias = "Nombre_enfants_à_charge",
        deserialize_with = "optional_int"
    )]
    pub dependent_children: Option<i64>,
}

impl TableRecord for FamilyStatus {
    const TABLE: &'static str = "family_status";

    fn fields() -> Vec<Field> {
        vec![
            Field::new(columns::CLIENT_ID, ColumnType::Int),
            Field::new(columns::DATE_OF_BIRTH, ColumnType::Date),
            Field::new(columns::DEPENDENT_CHILDREN, ColumnType::Int),
        ]
    }

    fn into_row(self) -> Row {
        vec![
            self.client_id.into(),
            self.date_of_birth.into(),
            self.dependent_children.into(),
        ]
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// Spreadsheet exports write whole amounts as `250000` or `250000.0`.
pub(crate) fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.fract() == 0.0 && value.is_finite())
        .map(|value| value as i64)
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    None
}

fn optional_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)?
        .map(|raw| {
            parse_int(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("'{raw}' is not a whole number")))
        })
        .transpose()
}

fn optional_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)?
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("'{raw}' is not a number")))
        })
        .transpose()
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)?
        .map(|raw| {
            parse_date(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("'{raw}' is not a date")))
        })
        .transpose()
}

fn optional_decision<'de, D>(deserializer: D) -> Result<Option<LoanDecision>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)?
        .map(|raw| {
            LoanDecision::parse(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown decision '{raw}'")))
        })
        .transpose()
}

fn optional_regularity<'de, D>(deserializer: D) -> Result<Option<IncomeRegularity>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)?
        .map(|raw| {
            IncomeRegularity::parse(&raw).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown income regularity '{raw}'"))
            })
        })
        .transpose()
}
