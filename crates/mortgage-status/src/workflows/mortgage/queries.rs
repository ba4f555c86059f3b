//! Read-only analyses over the loaded datasets. Each query returns a fresh
//! table and leaves the inputs untouched.

use super::datasets::MortgageDatasets;
use super::domain::{columns, IncomeRegularity, LoanDecision};
use super::eligibility::EligibilityConfig;
use crate::table::{
    col, derive, filter, group_aggregate, limit, outer_join, select, sort, Aggregation,
    JoinKind, SortDirection, Table, TableError,
};

pub const APPLICATION_COUNT: &str = "application_count";
pub const TOTAL_AMOUNT: &str = "total_amount";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";
pub const DAY: &str = "day";
pub const QUARTER: &str = "quarter";
pub const DECADE: &str = "decade";
pub const AGE: &str = "age";

/// The catalogue of exploratory analyses, with the thresholds the lender uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploratoryQuery {
    GrantedApplications,
    RefusedApplications,
    ProcessedApplications,
    PendingApplications,
    LargeApplications,
    FrequentBorrowers,
    Applications2018To2019,
    Applications2020To2021,
    RequestDateParts,
    RequestPeriods,
    HighVolumeClients,
    ApplicationsWithDownPayment,
    TopBranchAmounts,
    BranchPerformance,
    VeryIrregularIncomeApplications,
    VeryIrregularIncomeClients,
    ApplicantsTooOldAtMaturity,
}

impl ExploratoryQuery {
    pub const ALL: [ExploratoryQuery; 17] = [
        Self::GrantedApplications,
        Self::RefusedApplications,
        Self::ProcessedApplications,
        Self::PendingApplications,
        Self::LargeApplications,
        Self::FrequentBorrowers,
        Self::Applications2018To2019,
        Self::Applications2020To2021,
        Self::RequestDateParts,
        Self::RequestPeriods,
        Self::HighVolumeClients,
        Self::ApplicationsWithDownPayment,
        Self::TopBranchAmounts,
        Self::BranchPerformance,
        Self::VeryIrregularIncomeApplications,
        Self::VeryIrregularIncomeClients,
        Self::ApplicantsTooOldAtMaturity,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            Self::GrantedApplications => "granted applications by amount",
            Self::RefusedApplications => "refused applications by amount",
            Self::ProcessedApplications => "processed applications by amount",
            Self::PendingApplications => "pending applications by amount",
            Self::LargeApplications => "applications above 100000",
            Self::FrequentBorrowers => "clients with at least 300000 requested",
            Self::Applications2018To2019 => "applications requested in 2018 and 2019",
            Self::Applications2020To2021 => "applications requested in 2020 and 2021",
            Self::RequestDateParts => "request day, month and year",
            Self::RequestPeriods => "request quarter, year and decade",
            Self::HighVolumeClients => "clients with more than 300000 requested",
            Self::ApplicationsWithDownPayment => "applications with down payment",
            Self::TopBranchAmounts => "ten largest applications by branch",
            Self::BranchPerformance => "total amount per branch",
            Self::VeryIrregularIncomeApplications => "applications with very irregular income",
            Self::VeryIrregularIncomeClients => "clients with very irregular income",
            Self::ApplicantsTooOldAtMaturity => "applicants reaching the age limit at maturity",
        }
    }

    /// Runs the query; the maturity age limit is the one the classifier uses.
    pub fn run(
        self,
        datasets: &MortgageDatasets,
        eligibility: &EligibilityConfig,
    ) -> Result<Table, TableError> {
        let table = match self {
            Self::GrantedApplications => applications_with_decision(datasets, LoanDecision::Granted),
            Self::RefusedApplications => applications_with_decision(datasets, LoanDecision::Refused),
            Self::ProcessedApplications => processed_applications(datasets),
            Self::PendingApplications => pending_applications(datasets),
            Self::LargeApplications => applications_above(datasets, 100_000),
            Self::FrequentBorrowers => client_application_totals(datasets, 300_000),
            Self::Applications2018To2019 => {
                applications_in_years(datasets, &[2018, 2019], SortDirection::Ascending)
            }
            Self::Applications2020To2021 => {
                applications_in_years(datasets, &[2020, 2021], SortDirection::Descending)
            }
            Self::RequestDateParts => request_date_parts(datasets),
            Self::RequestPeriods => request_periods(datasets),
            Self::HighVolumeClients => clients_above_total(datasets, 300_000),
            Self::ApplicationsWithDownPayment => applications_with_down_payment(datasets),
            Self::TopBranchAmounts => top_branch_amounts(datasets, 10),
            Self::BranchPerformance => branch_performance(datasets),
            Self::VeryIrregularIncomeApplications => very_irregular_income_applications(datasets),
            Self::VeryIrregularIncomeClients => very_irregular_income_clients(datasets),
            Self::ApplicantsTooOldAtMaturity => {
                applicants_too_old_at_maturity(datasets, eligibility.max_age_at_maturity)
            }
        }?;
        Ok(table.renamed(self.title()))
    }
}

fn by_amount(table: &Table) -> Result<Table, TableError> {
    sort(table, columns::OPERATION_AMOUNT, SortDirection::Descending)
}

pub fn applications_with_decision(
    datasets: &MortgageDatasets,
    decision: LoanDecision,
) -> Result<Table, TableError> {
    let matching = filter(
        &datasets.applications,
        &col(columns::DECISION).equals(decision.label()),
    )?;
    by_amount(&matching)
}

pub fn processed_applications(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let processed = filter(
        &datasets.applications,
        &col(columns::DECISION).is_in([
            LoanDecision::Granted.label(),
            LoanDecision::Refused.label(),
        ]),
    )?;
    by_amount(&processed)
}

pub fn pending_applications(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let pending = filter(&datasets.applications, &col(columns::DECISION).is_null())?;
    by_amount(&pending)
}

pub fn applications_above(datasets: &MortgageDatasets, amount: i64) -> Result<Table, TableError> {
    let large = filter(
        &datasets.applications,
        &col(columns::OPERATION_AMOUNT).gt(amount),
    )?;
    by_amount(&large)
}

fn totals_per_client(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    group_aggregate(
        &datasets.applications,
        &[columns::CLIENT_ID],
        &[
            Aggregation::count(columns::APPLICATION_ID, APPLICATION_COUNT),
            Aggregation::sum(columns::OPERATION_AMOUNT, TOTAL_AMOUNT),
        ],
    )
}

/// Clients whose requested total reaches `threshold`, most applications first.
pub fn client_application_totals(
    datasets: &MortgageDatasets,
    threshold: i64,
) -> Result<Table, TableError> {
    let totals = totals_per_client(datasets)?;
    let retained = filter(&totals, &col(TOTAL_AMOUNT).gt_eq(threshold))?;
    sort(&retained, APPLICATION_COUNT, SortDirection::Descending)
}

/// Clients whose requested total strictly exceeds `threshold`, largest first.
pub fn clients_above_total(
    datasets: &MortgageDatasets,
    threshold: i64,
) -> Result<Table, TableError> {
    let totals = group_aggregate(
        &datasets.applications,
        &[columns::CLIENT_ID],
        &[Aggregation::sum(columns::OPERATION_AMOUNT, TOTAL_AMOUNT)],
    )?;
    let retained = filter(&totals, &col(TOTAL_AMOUNT).gt(threshold))?;
    sort(&retained, TOTAL_AMOUNT, SortDirection::Descending)
}

pub fn applications_in_years(
    datasets: &MortgageDatasets,
    years: &[i64],
    direction: SortDirection,
) -> Result<Table, TableError> {
    let projected = select(
        &datasets.applications,
        &[
            columns::CLIENT_ID,
            columns::APPLICATION_ID,
            columns::OPERATION_AMOUNT,
            columns::REQUEST_DATE,
        ],
    )?;
    let with_year = derive(&projected, YEAR, &col(columns::REQUEST_DATE).year())?;
    let in_years = filter(&with_year, &col(YEAR).is_in(years.iter().copied()))?;
    sort(&in_years, YEAR, direction)
}

fn request_columns(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    select(
        &datasets.applications,
        &[
            columns::CLIENT_ID,
            columns::REQUEST_DATE,
            columns::OPERATION_AMOUNT,
        ],
    )
}

pub fn request_date_parts(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let base = request_columns(datasets)?;
    let with_day = derive(&base, DAY, &col(columns::REQUEST_DATE).day())?;
    let with_month = derive(&with_day, MONTH, &col(columns::REQUEST_DATE).month())?;
    derive(&with_month, YEAR, &col(columns::REQUEST_DATE).year())
}

pub fn request_periods(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let base = request_columns(datasets)?;
    let with_quarter = derive(&base, QUARTER, &col(columns::REQUEST_DATE).quarter())?;
    let with_year = derive(&with_quarter, YEAR, &col(columns::REQUEST_DATE).year())?;
    derive(&with_year, DECADE, &col(columns::REQUEST_DATE).decade())
}

pub fn applications_with_down_payment(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let joined = outer_join(
        &datasets.applications,
        &datasets.down_payments,
        columns::APPLICATION_ID,
        JoinKind::Full,
    )?;
    let projected = select(
        &joined,
        &[
            columns::APPLICATION_ID,
            columns::DECISION,
            columns::OPERATION_AMOUNT,
            columns::DOWN_PAYMENT,
        ],
    )?;
    by_amount(&projected)
}

fn applications_by_branch(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let joined = outer_join(
        &datasets.applications,
        &datasets.branches,
        columns::BRANCH_ID,
        JoinKind::Left,
    )?;
    select(
        &joined,
        &[columns::BRANCH_ID, columns::CITY, columns::OPERATION_AMOUNT],
    )
}

pub fn top_branch_amounts(datasets: &MortgageDatasets, count: usize) -> Result<Table, TableError> {
    let by_branch = applications_by_branch(datasets)?;
    Ok(limit(&by_amount(&by_branch)?, count))
}

pub fn branch_performance(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let by_branch = applications_by_branch(datasets)?;
    let totals = group_aggregate(
        &by_branch,
        &[columns::BRANCH_ID, columns::CITY],
        &[Aggregation::sum(columns::OPERATION_AMOUNT, TOTAL_AMOUNT)],
    )?;
    sort(&totals, TOTAL_AMOUNT, SortDirection::Descending)
}

pub fn very_irregular_income_applications(
    datasets: &MortgageDatasets,
) -> Result<Table, TableError> {
    let joined = outer_join(
        &datasets.applications,
        &datasets.professional_status,
        columns::CLIENT_ID,
        JoinKind::Left,
    )?;
    let projected = select(
        &joined,
        &[
            columns::CLIENT_ID,
            columns::OPERATION_AMOUNT,
            columns::SOCIO_PROFESSIONAL_CATEGORY,
            columns::EMPLOYMENT_STATUS,
            columns::INCOME_REGULARITY,
        ],
    )?;
    let irregular = filter(
        &projected,
        &col(columns::INCOME_REGULARITY).equals(IncomeRegularity::VeryIrregular.label()),
    )?;
    by_amount(&irregular)
}

pub fn very_irregular_income_clients(datasets: &MortgageDatasets) -> Result<Table, TableError> {
    let joined = outer_join(
        &datasets.applications,
        &datasets.professional_status,
        columns::CLIENT_ID,
        JoinKind::Right,
    )?;
    let totals = group_aggregate(
        &joined,
        &[
            columns::CLIENT_ID,
            columns::SOCIO_PROFESSIONAL_CATEGORY,
            columns::EMPLOYMENT_STATUS,
            columns::INCOME_REGULARITY,
            columns::AVERAGE_MONTHLY_INCOME,
        ],
        &[
            Aggregation::count(columns::APPLICATION_ID, APPLICATION_COUNT),
            Aggregation::sum(columns::OPERATION_AMOUNT, TOTAL_AMOUNT),
        ],
    )?;
    let irregular = filter(
        &totals,
        &col(columns::INCOME_REGULARITY).equals(IncomeRegularity::VeryIrregular.label()),
    )?;
    sort(&irregular, TOTAL_AMOUNT, SortDirection::Descending)
}

/// Applicants whose age in the maturity year reaches `max_age`, longest loans first.
pub fn applicants_too_old_at_maturity(
    datasets: &MortgageDatasets,
    max_age: i64,
) -> Result<Table, TableError> {
    let joined = outer_join(
        &datasets.applications,
        &datasets.family_status,
        columns::CLIENT_ID,
        JoinKind::Left,
    )?;
    let projected = select(
        &joined,
        &[
            columns::CLIENT_ID,
            columns::REQUEST_DATE,
            columns::DURATION_MONTHS,
            columns::OPERATION_AMOUNT,
            columns::DATE_OF_BIRTH,
        ],
    )?;
    let with_years = derive(
        &projected,
        columns::ANNUAL_DURATION,
        &col(columns::DURATION_MONTHS).floor_div(12),
    )?;
    let with_age = derive(
        &with_years,
        AGE,
        &(col(columns::REQUEST_DATE).year() - col(columns::DATE_OF_BIRTH).year()),
    )?;
    let too_old = filter(
        &with_age,
        &(col(AGE) + col(columns::ANNUAL_DURATION)).gt_eq(max_age),
    )?;
    sort(&too_old, columns::ANNUAL_DURATION, SortDirection::Descending)
}
