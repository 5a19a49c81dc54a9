//! Validation of uploaded RTO status forms.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{AgingMatrix, AgingRow, RtoStatusUpload, StatusCategory, SummaryCounts, SummaryKey, TimeBucket};

/// Errors raised while validating client input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The top-level shape of an upload is wrong.
    #[error("Invalid data structure. \"summary_counts\" and \"aging_matrix\" are required.")]
    InvalidStructure,

    /// A summary count is not a non-negative integer.
    #[error("Invalid value for summary count '{0}'. Must be a non-negative integer.")]
    InvalidSummaryCount(&'static str),

    /// A matrix category row is absent.
    #[error("Missing data for matrix category: {0}")]
    MissingCategory(&'static str),

    /// A matrix cell is not a non-negative integer.
    #[error("Invalid value for matrix field {category}.{bucket}. Must be a non-negative integer.")]
    InvalidMatrixField {
        category: &'static str,
        bucket: &'static str,
    },

    /// A matrix total is not a non-negative integer.
    #[error("Invalid value for matrix total '{0}'. Must be a non-negative integer.")]
    InvalidMatrixTotal(&'static str),

    /// A role name is not recognised.
    #[error("Unknown role '{0}'. Expected one of: admin, manager, engineer, dl.")]
    UnknownRole(String),
}

/// Largest count an upload may carry: 2^53 - 1, the largest integer a
/// browser client can represent exactly.
pub const MAX_COUNT: u64 = 9_007_199_254_740_991;

/// Reads a JSON number holding a non-negative integer up to [`MAX_COUNT`].
///
/// Integral floats such as `3.0` are accepted; strings, booleans,
/// fractions and negative numbers are not.
fn non_negative_integer(value: &Value) -> Option<u64> {
    let n = match value.as_u64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if !(f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= MAX_COUNT as f64) {
                return None;
            }
            f as u64
        }
    };
    (n <= MAX_COUNT).then_some(n)
}

fn object<'a>(value: Option<&'a Value>) -> Result<&'a Map<String, Value>, ValidationError> {
    value
        .and_then(Value::as_object)
        .ok_or(ValidationError::InvalidStructure)
}

impl RtoStatusUpload {
    /// Validates a raw upload body.
    ///
    /// Every summary key and every cell of every matrix category must be
    /// present and hold a non-negative integer. Missing totals read as zero.
    pub fn from_json(body: &Value) -> Result<Self, ValidationError> {
        let body = body.as_object().ok_or(ValidationError::InvalidStructure)?;
        let summary = object(body.get("summary_counts"))?;
        let matrix = object(body.get("aging_matrix"))?;
        let statuses = object(matrix.get("statuses"))?;
        let totals = object(matrix.get("totals"))?;

        let mut summary_counts = SummaryCounts::default();
        for key in SummaryKey::ALL {
            let value = summary
                .get(key.as_str())
                .and_then(non_negative_integer)
                .ok_or(ValidationError::InvalidSummaryCount(key.as_str()))?;
            summary_counts.set(key, value);
        }

        let mut aging_matrix = AgingMatrix::default();
        for category in StatusCategory::ALL {
            let row = statuses
                .get(category.as_str())
                .filter(|row| !row.is_null())
                .ok_or(ValidationError::MissingCategory(category.as_str()))?;

            let mut parsed = AgingRow::default();
            for bucket in TimeBucket::ALL {
                let value = row
                    .get(bucket.as_str())
                    .and_then(non_negative_integer)
                    .ok_or(ValidationError::InvalidMatrixField {
                        category: category.as_str(),
                        bucket: bucket.as_str(),
                    })?;
                parsed.set(bucket, value);
            }
            aging_matrix.statuses.insert(category, parsed);
        }

        for bucket in TimeBucket::ALL {
            if let Some(raw) = totals.get(bucket.as_str()) {
                let value = non_negative_integer(raw)
                    .ok_or(ValidationError::InvalidMatrixTotal(bucket.as_str()))?;
                aging_matrix.totals.set(bucket, value);
            }
        }

        Ok(Self {
            summary_counts,
            aging_matrix,
        })
    }
}
