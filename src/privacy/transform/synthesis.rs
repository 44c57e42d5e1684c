//! Synthetic substitution
//!
//! Numeric fields are scaled by `1 + N(0, sigma)` so aggregate distributions
//! stay plausible without revealing the true value. Non-numeric fields are
//! replaced by a `SYNTHETIC_<field>` placeholder.
//!
//! Known limitation: categorical values are not synthesized from a learned
//! distribution; the placeholder only marks them as substituted.

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::privacy::level::PrivacyLevel;
use rand::distributions::Distribution;
use serde_json::{Number, Value};
use statrs::distribution::Normal;

/// Default standard deviation of the multiplicative noise
pub const DEFAULT_SIGMA: f64 = 0.1;

/// Prefix of the placeholder used for non-numeric fields
pub const SYNTHETIC_PREFIX: &str = "SYNTHETIC_";

/// Multiplicative-noise synthetic substitution
#[derive(Debug, Clone)]
pub struct Synthesis {
    sigma: f64,
    jitter: Normal,
}

impl Synthesis {
    /// Creates the strategy with noise standard deviation `sigma`
    pub fn new(sigma: f64) -> Result<Self, PrivacyError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(PrivacyError::InvalidInput(format!(
                "synthetic sigma must be a positive finite number, got {sigma}"
            )));
        }
        let jitter = Normal::new(0.0, sigma)
            .map_err(|e| PrivacyError::processing("invalid normal distribution parameters", e))?;
        Ok(Self { sigma, jitter })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Transform for Synthesis {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Synthetic
    }

    fn apply(
        &self,
        record: &mut Record,
        fields: &[String],
        ctx: &mut TransformContext<'_>,
    ) -> Result<FieldReport, PrivacyError> {
        let mut report = FieldReport::default();

        for field in fields {
            let Some(value) = record.get_mut(field) else {
                continue;
            };

            *value = match value.as_f64() {
                Some(base) => {
                    let scaled = base * (1.0 + self.jitter.sample(&mut *ctx.rng));
                    Number::from_f64(scaled).map(Value::Number).ok_or_else(|| {
                        PrivacyError::processing_msg(format!(
                            "synthetic value for '{field}' is not finite"
                        ))
                    })?
                }
                None => Value::String(format!("{SYNTHETIC_PREFIX}{field}")),
            };
            report.processed(field);
        }

        Ok(report)
    }
}
