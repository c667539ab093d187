//! Class label validation
//!
//! Labels end up in an `i16` mask where `-1` marks unlabeled cells, so a
//! label must be a whole number inside the `i16` range other than `-1`.

use super::errors::{VectorError, VectorResult};
use super::point_set::NO_LABEL;

/// Validates a numeric label of feature `index`
pub fn label_from_f64(value: f64, index: usize) -> VectorResult<i16> {
    let invalid = |reason: &str| VectorError::InvalidLabel {
        index,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if !value.is_finite() {
        return Err(invalid("not a finite number"));
    }
    if value.fract() != 0.0 {
        return Err(invalid("not an integer"));
    }
    if value < i16::MIN as f64 || value > i16::MAX as f64 {
        return Err(invalid("outside the 16-bit signed range"));
    }
    let class = value as i16;
    if class == NO_LABEL {
        return Err(invalid("reserved for unlabeled pixels"));
    }
    Ok(class)
}

/// Validates a textual label, as found in DBF and CSV cells
pub fn label_from_str(text: &str, index: usize) -> VectorResult<i16> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(VectorError::InvalidLabel {
            index,
            value: String::new(),
            reason: "missing value".to_string(),
        });
    }
    let value = trimmed.parse::<f64>().map_err(|_| VectorError::InvalidLabel {
        index,
        value: trimmed.to_string(),
        reason: "not a number".to_string(),
    })?;
    label_from_f64(value, index)
}
