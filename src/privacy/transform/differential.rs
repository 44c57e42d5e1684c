//! Differential privacy (Laplace mechanism)
//!
//! Adds zero-mean Laplace noise with scale `sensitivity / epsilon` to numeric
//! fields. Smaller epsilon means more noise. Non-numeric requested fields are
//! left untouched and reported as warnings.
//!
//! Output is intentionally non-deterministic; noise is drawn from the
//! generator owned by the current call.

use super::{FieldReport, Transform, TransformContext};
use crate::domain::errors::PrivacyError;
use crate::domain::record::Record;
use crate::privacy::level::PrivacyLevel;
use rand::distributions::Distribution;
use serde_json::{Number, Value};
use statrs::distribution::Laplace;

/// Default privacy budget per call
pub const DEFAULT_EPSILON: f64 = 1.0;

/// Default query sensitivity
pub const DEFAULT_SENSITIVITY: f64 = 1.0;

/// Laplace noise for numeric fields
#[derive(Debug, Clone)]
pub struct DifferentialPrivacy {
    epsilon: f64,
    sensitivity: f64,
    noise: Laplace,
}

impl DifferentialPrivacy {
    /// Creates the mechanism
    ///
    /// # Errors
    ///
    /// Returns [`PrivacyError::InvalidInput`] unless both `epsilon` and
    /// `sensitivity` are finite and strictly positive.
    pub fn new(epsilon: f64, sensitivity: f64) -> Result<Self, PrivacyError> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(PrivacyError::InvalidInput(format!(
                "epsilon must be a positive finite number, got {epsilon}"
            )));
        }
        if !(sensitivity.is_finite() && sensitivity > 0.0) {
            return Err(PrivacyError::InvalidInput(format!(
                "sensitivity must be a positive finite number, got {sensitivity}"
            )));
        }
        let noise = Laplace::new(0.0, sensitivity / epsilon)
            .map_err(|e| PrivacyError::processing("invalid Laplace parameters", e))?;
        Ok(Self {
            epsilon,
            sensitivity,
            noise,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Laplace scale `b = sensitivity / epsilon`
    pub fn scale(&self) -> f64 {
        self.sensitivity / self.epsilon
    }
}

impl Transform for DifferentialPrivacy {
    fn level(&self) -> PrivacyLevel {
        PrivacyLevel::Differential
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
            let Some(original) = value.as_f64() else {
                report.warn(field, "non-numeric value left untouched");
                continue;
            };

            let noisy = original + self.noise.sample(&mut *ctx.rng);
            let number = Number::from_f64(noisy).ok_or_else(|| {
                PrivacyError::processing_msg(format!(
                    "noise produced a non-finite value for '{field}'"
                ))
            })?;
            *value = Value::Number(number);
            report.processed(field);
        }

        Ok(report)
    }
}
