use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::template::{Estimate, VariableValues};

/// One completed "use template" action, kept in the local history
///
/// The serialized field set is fixed so history written by other clients
/// can be read back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub template_id: String,
    pub variables: VariableValues,
    pub generated_prompt: String,
    pub estimated_tokens: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_cost: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    /// Captures a rendered prompt and its estimate, stamped now
    pub fn new(
        template_id: impl Into<String>,
        variables: VariableValues,
        generated_prompt: String,
        estimate: Estimate,
    ) -> Self {
        Self {
            template_id: template_id.into(),
            variables,
            generated_prompt,
            estimated_tokens: estimate.tokens,
            estimated_cost: estimate.cost,
            timestamp: Utc::now(),
        }
    }
}
