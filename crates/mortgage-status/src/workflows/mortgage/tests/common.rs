use chrono::NaiveDate;

use crate::table::{Table, Value};
use crate::workflows::mortgage::datasets::MortgageDatasets;
use crate::workflows::mortgage::domain::{
    Application, Branch, DownPayment, FamilyStatus, IncomeRegularity, LoanDecision,
    ProfessionalStatus,
};
use crate::workflows::mortgage::eligibility::{
    EligibilityConfig, EligibilityEngine, EligibilityInputs,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn application(
    application_id: i64,
    client_id: i64,
    request_date: NaiveDate,
    branch_id: i64,
    operation_amount: i64,
    duration_months: i64,
    decision: Option<LoanDecision>,
) -> Application {
    Application {
        application_id: Some(application_id),
        client_id: Some(client_id),
        request_date: Some(request_date),
        branch_id: Some(branch_id),
        operation_amount: Some(operation_amount),
        duration_months: Some(duration_months),
        decision,
    }
}

pub(super) fn applications() -> Vec<Application> {
    vec![
        application(1, 10, date(2019, 3, 14), 5, 250_000, 240, Some(LoanDecision::Granted)),
        application(2, 11, date(2020, 6, 1), 5, 180_000, 180, Some(LoanDecision::Refused)),
        application(3, 12, date(2021, 1, 10), 6, 120_000, 120, None),
        application(4, 10, date(2018, 9, 30), 7, 90_000, 0, None),
        application(5, 13, date(2020, 11, 11), 6, 300_000, 300, Some(LoanDecision::Granted)),
    ]
}

pub(super) fn branches() -> Vec<Branch> {
    vec![
        Branch {
            branch_id: Some(5),
            city: Some("Paris".to_string()),
        },
        Branch {
            branch_id: Some(6),
            city: Some("Lyon".to_string()),
        },
    ]
}

pub(super) fn professional(
    client_id: i64,
    income_regularity: IncomeRegularity,
    average_monthly_income: f64,
) -> ProfessionalStatus {
    ProfessionalStatus {
        client_id: Some(client_id),
        socio_professional_category: Some("Employé".to_string()),
        employment_status: Some("CDI".to_string()),
        income_regularity: Some(income_regularity),
        average_monthly_income: Some(average_monthly_income),
    }
}

/// Client 13 has no professional record.
pub(super) fn professional_status() -> Vec<ProfessionalStatus> {
    vec![
        professional(10, IncomeRegularity::Stable, 4000.0),
        professional(11, IncomeRegularity::VeryIrregular, 5000.0),
        professional(12, IncomeRegularity::Variable, 1500.0),
    ]
}

/// Application 3 has no down payment; application 9 does not exist.
pub(super) fn down_payments() -> Vec<DownPayment> {
    [(1, 50_000), (2, 20_000), (5, 30_000), (9, 10_000)]
        .into_iter()
        .map(|(application_id, amount)| DownPayment {
            application_id: Some(application_id),
            down_payment: Some(amount),
        })
        .collect()
}

pub(super) fn family(client_id: i64, born: NaiveDate, children: i64) -> FamilyStatus {
    FamilyStatus {
        client_id: Some(client_id),
        date_of_birth: Some(born),
        dependent_children: Some(children),
    }
}

pub(super) fn family_status() -> Vec<FamilyStatus> {
    vec![
        family(10, date(1970, 5, 2), 1),
        family(11, date(1985, 2, 20), 0),
        family(12, date(1990, 7, 7), 2),
        family(13, date(1950, 1, 1), 0),
    ]
}

pub(super) fn datasets() -> MortgageDatasets {
    MortgageDatasets::from_records(
        applications(),
        branches(),
        professional_status(),
        down_payments(),
        family_status(),
    )
    .expect("valid datasets")
}

pub(super) fn engine() -> EligibilityEngine {
    EligibilityEngine::new(EligibilityConfig::default())
}

pub(super) fn inputs(
    age: i64,
    regularity: IncomeRegularity,
    monthly_repayment: i64,
    income: f64,
    children: i64,
) -> EligibilityInputs {
    EligibilityInputs {
        applicant_age_at_maturity: Some(age),
        income_regularity: Some(regularity),
        monthly_repayment: Some(monthly_repayment),
        average_monthly_income: Some(income),
        dependent_children: Some(children),
    }
}

pub(super) fn ints(table: &Table, column: &str) -> Vec<Option<i64>> {
    table
        .column(column)
        .expect("column exists")
        .map(Value::as_int)
        .collect()
}

pub(super) fn texts(table: &Table, column: &str) -> Vec<Option<String>> {
    table
        .column(column)
        .expect("column exists")
        .map(|value| value.as_text().map(str::to_string))
        .collect()
}
