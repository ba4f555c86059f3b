use super::super::domain::{columns, IncomeRegularity};
use super::config::EligibilityConfig;
use super::policy::{EligibilityRule, RefusalReason};
use super::EligibilityInputs;

/// Result of a single rule against one application.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Verdict {
    Refuse(RefusalReason),
    Pass,
    Indeterminate {
        rule: EligibilityRule,
        missing: Vec<&'static str>,
    },
}

pub(crate) type RuleCheck = fn(&EligibilityInputs, &EligibilityConfig) -> Verdict;

/// Rules in cascade order; the first refusal wins.
pub(crate) const CASCADE: [RuleCheck; 3] = [age_at_maturity, income_regularity, affordability];

pub(crate) fn age_at_maturity(inputs: &EligibilityInputs, config: &EligibilityConfig) -> Verdict {
    match inputs.applicant_age_at_maturity {
        Some(age) if age >= config.max_age_at_maturity => {
            Verdict::Refuse(RefusalReason::AgeAtMaturity {
                age,
                limit: config.max_age_at_maturity,
            })
        }
        Some(_) => Verdict::Pass,
        None => Verdict::Indeterminate {
            rule: EligibilityRule::AgeAtMaturity,
            missing: vec![columns::APPLICANT_AGE_AT_MATURITY],
        },
    }
}

pub(crate) fn income_regularity(inputs: &EligibilityInputs, _config: &EligibilityConfig) -> Verdict {
    match inputs.income_regularity {
        Some(IncomeRegularity::VeryIrregular) => {
            Verdict::Refuse(RefusalReason::VeryIrregularIncome)
        }
        Some(_) => Verdict::Pass,
        None => Verdict::Indeterminate {
            rule: EligibilityRule::IncomeRegularity,
            missing: vec![columns::INCOME_REGULARITY],
        },
    }
}

/// Refuses when the monthly repayment exceeds the configured share of the
/// average monthly income plus one unit per dependent child.
pub(crate) fn affordability(inputs: &EligibilityInputs, config: &EligibilityConfig) -> Verdict {
    let (repayment, income, children) = match (
        inputs.monthly_repayment,
        inputs.average_monthly_income,
        inputs.dependent_children,
    ) {
        (Some(repayment), Some(income), Some(children)) => (repayment, income, children),
        (repayment, income, children) => {
            let missing = [
                (repayment.is_none(), columns::MONTHLY_REPAYMENT),
                (income.is_none(), columns::AVERAGE_MONTHLY_INCOME),
                (children.is_none(), columns::DEPENDENT_CHILDREN),
            ]
            .into_iter()
            .filter_map(|(absent, column)| absent.then_some(column))
            .collect();
            return Verdict::Indeterminate {
                rule: EligibilityRule::Affordability,
                missing,
            };
        }
    };

    let threshold = config.affordability_ratio * income + children as f64;
    if repayment as f64 > threshold {
        Verdict::Refuse(RefusalReason::Unaffordable {
            monthly_repayment: repayment,
            threshold,
        })
    } else {
        Verdict::Pass
    }
}
