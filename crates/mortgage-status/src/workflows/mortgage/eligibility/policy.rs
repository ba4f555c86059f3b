use super::super::domain::LoanStatus;
use super::config::{EligibilityConfig, IndeterminateRule};
use super::rules::{Verdict, CASCADE};
use super::EligibilityInputs;
use serde::{Deserialize, Serialize};

/// The three lender rules, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityRule {
    AgeAtMaturity,
    IncomeRegularity,
    Affordability,
}

impl EligibilityRule {
    pub const fn label(self) -> &'static str {
        match self {
            Self::AgeAtMaturity => "age at maturity",
            Self::IncomeRegularity => "income regularity",
            Self::Affordability => "affordability",
        }
    }
}

/// Classification of one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EligibilityDecision {
    Accepted,
    Refused(RefusalReason),
}

impl EligibilityDecision {
    pub fn status(&self) -> LoanStatus {
        match self {
            EligibilityDecision::Accepted => LoanStatus::Accepted,
            EligibilityDecision::Refused(_) => LoanStatus::Refused,
        }
    }

    pub fn reason(&self) -> Option<&RefusalReason> {
        match self {
            EligibilityDecision::Accepted => None,
            EligibilityDecision::Refused(reason) => Some(reason),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            EligibilityDecision::Accepted => "application accepted".to_string(),
            EligibilityDecision::Refused(reason) => reason.summary(),
        }
    }
}

/// Why an application was refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RefusalReason {
    AgeAtMaturity {
        age: i64,
        limit: i64,
    },
    VeryIrregularIncome,
    Unaffordable {
        monthly_repayment: i64,
        threshold: f64,
    },
    IncompleteRecord {
        rule: EligibilityRule,
        missing: Vec<&'static str>,
    },
}

impl RefusalReason {
    pub const fn code(&self) -> &'static str {
        match self {
            RefusalReason::AgeAtMaturity { .. } => "age_at_maturity",
            RefusalReason::VeryIrregularIncome => "very_irregular_income",
            RefusalReason::Unaffordable { .. } => "unaffordable",
            RefusalReason::IncompleteRecord { .. } => "incomplete_record",
        }
    }

    pub fn summary(&self) -> String {
        match self {
            RefusalReason::AgeAtMaturity { age, limit } => {
                format!("applicant would be {age} at maturity (limit {limit})")
            }
            RefusalReason::VeryIrregularIncome => "income is very irregular".to_string(),
            RefusalReason::Unaffordable {
                monthly_repayment,
                threshold,
            } => format!(
                "monthly repayment {monthly_repayment} exceeds affordability threshold {threshold:.2}"
            ),
            RefusalReason::IncompleteRecord { rule, missing } => format!(
                "{} rule cannot be evaluated without {}",
                rule.label(),
                missing.join(", ")
            ),
        }
    }
}

pub(crate) fn decide_status(
    inputs: &EligibilityInputs,
    config: &EligibilityConfig,
) -> EligibilityDecision {
    for check in CASCADE {
        match check(inputs, config) {
            Verdict::Refuse(reason) => return EligibilityDecision::Refused(reason),
            Verdict::Pass => {}
            Verdict::Indeterminate { rule, missing } => match config.indeterminate {
                IndeterminateRule::Refuse => {
                    return EligibilityDecision::Refused(RefusalReason::IncompleteRecord {
                        rule,
                        missing,
                    })
                }
                IndeterminateRule::FallThrough => {}
            },
        }
    }

    EligibilityDecision::Accepted
}
