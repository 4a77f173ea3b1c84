use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cost of one estimated token, in dollars (0.00002)
pub const DEFAULT_COST_PER_TOKEN: Decimal = Decimal::from_parts(2, 0, 0, false, 5);

/// Characters per estimated token
const CHARS_PER_TOKEN: u64 = 4;

/// Rough token and cost figures for a rendered prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub tokens: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

/// Heuristic token/cost estimator
///
/// Tokens are `ceil(len / 4)` where `len` counts UTF-16 code units, the same
/// length a browser reports for the string. This is not a tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimator {
    cost_per_token: Decimal,
}

impl Estimator {
    pub fn new(cost_per_token: Decimal) -> Self {
        Self { cost_per_token }
    }

    pub fn cost_per_token(&self) -> Decimal {
        self.cost_per_token
    }

    /// Estimates tokens and cost for a rendered prompt
    ///
    /// # Example
    /// ```
    /// use costkatana_templates::domain::template::Estimator;
    ///
    /// let estimate = Estimator::default().estimate(&"a".repeat(400));
    /// assert_eq!(estimate.tokens, 100);
    /// ```
    pub fn estimate(&self, rendered: &str) -> Estimate {
        let length = rendered.encode_utf16().count() as u64;
        let tokens = length.div_ceil(CHARS_PER_TOKEN);

        // Saturates rather than overflowing for very large configured rates
        let cost = Decimal::from(tokens)
            .checked_mul(self.cost_per_token)
            .unwrap_or(Decimal::MAX);

        Estimate { tokens, cost }
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(DEFAULT_COST_PER_TOKEN)
    }
}

/// Estimates with the default per-token rate
pub fn estimate(rendered: &str) -> Estimate {
    Estimator::default().estimate(rendered)
}
