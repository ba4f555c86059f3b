use super::common::*;
use crate::table::{SortDirection, Value};
use crate::workflows::mortgage::domain::{columns, LoanDecision};
use crate::workflows::mortgage::eligibility::EligibilityConfig;
use crate::workflows::mortgage::queries::{self, ExploratoryQuery, APPLICATION_COUNT, TOTAL_AMOUNT};

#[test]
fn decision_queries_sort_by_amount_descending() {
    let datasets = datasets();

    let granted = queries::applications_with_decision(&datasets, LoanDecision::Granted)
        .expect("query succeeds");
    let refused = queries::applications_with_decision(&datasets, LoanDecision::Refused)
        .expect("query succeeds");
    let processed = queries::processed_applications(&datasets).expect("query succeeds");
    let pending = queries::pending_applications(&datasets).expect("query succeeds");

    assert_eq!(ints(&granted, columns::APPLICATION_ID), vec![Some(5), Some(1)]);
    assert_eq!(ints(&refused, columns::APPLICATION_ID), vec![Some(2)]);
    assert_eq!(
        ints(&processed, columns::APPLICATION_ID),
        vec![Some(5), Some(1), Some(2)]
    );
    assert_eq!(ints(&pending, columns::APPLICATION_ID), vec![Some(3), Some(4)]);
}

#[test]
fn amount_threshold_is_strict() {
    let large = queries::applications_above(&datasets(), 120_000).expect("query succeeds");

    let amounts: Vec<i64> = ints(&large, columns::OPERATION_AMOUNT)
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(amounts, vec![300_000, 250_000, 180_000]);
    assert!(amounts.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn client_totals_keep_clients_reaching_the_threshold() {
    let totals =
        queries::client_application_totals(&datasets(), 300_000).expect("query succeeds");

    assert_eq!(ints(&totals, columns::CLIENT_ID), vec![Some(10), Some(13)]);
    assert_eq!(ints(&totals, APPLICATION_COUNT), vec![Some(2), Some(1)]);
    assert_eq!(ints(&totals, TOTAL_AMOUNT), vec![Some(340_000), Some(300_000)]);
}

#[test]
fn clients_above_total_exclude_the_threshold_itself() {
    let totals = queries::clients_above_total(&datasets(), 300_000).expect("query succeeds");

    assert_eq!(ints(&totals, columns::CLIENT_ID), vec![Some(10)]);
    assert_eq!(totals.schema().len(), 2);
}

#[test]
fn year_windows_sort_in_the_requested_direction() {
    let datasets = datasets();

    let early = queries::applications_in_years(&datasets, &[2018, 2019], SortDirection::Ascending)
        .expect("query succeeds");
    let late = queries::applications_in_years(&datasets, &[2020, 2021], SortDirection::Descending)
        .expect("query succeeds");

    assert_eq!(ints(&early, columns::APPLICATION_ID), vec![Some(4), Some(1)]);
    assert_eq!(ints(&early, queries::YEAR), vec![Some(2018), Some(2019)]);
    assert_eq!(
        ints(&late, columns::APPLICATION_ID),
        vec![Some(3), Some(2), Some(5)]
    );
}

#[test]
fn date_breakdowns_extract_every_part() {
    let datasets = datasets();

    let parts = queries::request_date_parts(&datasets).expect("query succeeds");
    let periods = queries::request_periods(&datasets).expect("query succeeds");

    assert_eq!(parts.value(0, queries::DAY).expect("column"), Some(&Value::Int(14)));
    assert_eq!(parts.value(0, queries::MONTH).expect("column"), Some(&Value::Int(3)));
    assert_eq!(parts.value(0, queries::YEAR).expect("column"), Some(&Value::Int(2019)));
    assert_eq!(ints(&periods, queries::QUARTER)[..4], [Some(1), Some(2), Some(1), Some(3)]);
    assert_eq!(ints(&periods, queries::DECADE)[0], Some(201));
}

#[test]
fn down_payment_view_keeps_orphans_last() {
    let view = queries::applications_with_down_payment(&datasets()).expect("query succeeds");

    assert_eq!(
        ints(&view, columns::APPLICATION_ID),
        vec![Some(5), Some(1), Some(2), Some(3), Some(4), Some(9)]
    );
    assert_eq!(ints(&view, columns::DOWN_PAYMENT)[3], None);
}

#[test]
fn branch_queries_join_the_directory() {
    let datasets = datasets();

    let top = queries::top_branch_amounts(&datasets, 2).expect("query succeeds");
    let performance = queries::branch_performance(&datasets).expect("query succeeds");

    assert_eq!(ints(&top, columns::BRANCH_ID), vec![Some(6), Some(5)]);
    assert_eq!(
        texts(&top, columns::CITY),
        vec![Some("Lyon".to_string()), Some("Paris".to_string())]
    );
    assert_eq!(
        ints(&performance, columns::BRANCH_ID),
        vec![Some(5), Some(6), Some(7)]
    );
    assert_eq!(
        ints(&performance, TOTAL_AMOUNT),
        vec![Some(430_000), Some(420_000), Some(90_000)]
    );
    assert_eq!(texts(&performance, columns::CITY)[2], None);
}

#[test]
fn very_irregular_income_queries_find_client_eleven() {
    let datasets = datasets();

    let applications =
        queries::very_irregular_income_applications(&datasets).expect("query succeeds");
    let clients = queries::very_irregular_income_clients(&datasets).expect("query succeeds");

    assert_eq!(ints(&applications, columns::CLIENT_ID), vec![Some(11)]);
    assert_eq!(ints(&clients, columns::CLIENT_ID), vec![Some(11)]);
    assert_eq!(ints(&clients, APPLICATION_COUNT), vec![Some(1)]);
    assert_eq!(ints(&clients, TOTAL_AMOUNT), vec![Some(180_000)]);
}

#[test]
fn too_old_at_maturity_uses_the_annual_duration() {
    let too_old =
        queries::applicants_too_old_at_maturity(&datasets(), 82).expect("query succeeds");

    assert_eq!(ints(&too_old, columns::CLIENT_ID), vec![Some(13)]);
    assert_eq!(ints(&too_old, queries::AGE), vec![Some(70)]);
    assert_eq!(ints(&too_old, columns::ANNUAL_DURATION), vec![Some(25)]);
}

#[test]
fn every_catalogued_query_runs() {
    let datasets = datasets();

    for query in ExploratoryQuery::ALL {
        let table = query
            .run(&datasets, &EligibilityConfig::default())
            .expect("query succeeds");
        assert_eq!(table.name(), query.title());
    }
}

#[test]
fn catalogued_age_query_follows_the_classifier_limit() {
    let datasets = datasets();
    let lenient = EligibilityConfig::default();
    let strict = EligibilityConfig {
        max_age_at_maturity: 60,
        ..EligibilityConfig::default()
    };

    let default_limit = ExploratoryQuery::ApplicantsTooOldAtMaturity
        .run(&datasets, &lenient)
        .expect("query succeeds");
    let lowered_limit = ExploratoryQuery::ApplicantsTooOldAtMaturity
        .run(&datasets, &strict)
        .expect("query succeeds");

    assert_eq!(ints(&default_limit, columns::CLIENT_ID), vec![Some(13)]);
    assert_eq!(
        ints(&lowered_limit, columns::CLIENT_ID),
        vec![Some(13), Some(10)]
    );
}
