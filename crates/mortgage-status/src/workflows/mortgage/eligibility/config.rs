use serde::{Deserialize, Serialize};

/// Thresholds of the lender's eligibility rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub max_age_at_maturity: i64,
    pub affordability_ratio: f64,
    pub indeterminate: IndeterminateRule,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            max_age_at_maturity: 82,
            affordability_ratio: 0.33,
            indeterminate: IndeterminateRule::Refuse,
        }
    }
}

/// What a rule does when one of its inputs is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndeterminateRule {
    /// Refuse the application as an incomplete record.
    Refuse,
    /// Skip the rule and continue the cascade.
    FallThrough,
}

impl IndeterminateRule {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "refuse" | "refused" => Some(Self::Refuse),
            "fall_through" | "fallthrough" | "skip" => Some(Self::FallThrough),
            _ => None,
        }
    }
}
