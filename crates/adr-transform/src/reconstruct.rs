//! Display reconstruction of encoded feature values.
//!
//! Rules are applied per position, first match wins:
//!
//! 1. exactly `0` becomes `false`;
//! 2. exactly `1` becomes `true`;
//! 3. a non-integral value is unscaled with its column's fitted range and
//!    rounded half-to-even; an unscaled `-1` is the missing sentinel;
//! 4. anything else is passed through.
//!
//! Rules 1 and 2 apply to every column, so a scaled numerical value that lands
//! exactly on 0 or 1 is shown as a boolean. Callers that need the unscaled
//! number must use the scaler directly.

use adr_artifacts::MinMaxScaler;
use adr_model::ReconstructedValue;

use crate::derive::MISSING_SENTINEL;

/// Reconstructs one encoded row for display.
pub fn reconstruct_values(
    columns: &[String],
    row: &[f64],
    scaler: &MinMaxScaler,
) -> Vec<ReconstructedValue> {
    columns
        .iter()
        .zip(row)
        .map(|(name, value)| reconstruct_value(name, *value, scaler))
        .collect()
}

pub fn reconstruct_value(column: &str, value: f64, scaler: &MinMaxScaler) -> ReconstructedValue {
    if value == 0.0 {
        return ReconstructedValue::Flag(false);
    }
    if value == 1.0 {
        return ReconstructedValue::Flag(true);
    }
    if value.fract() != 0.0 {
        return match scaler.inverse(column, value) {
            Some(original) => {
                let rounded = original.round_ties_even();
                if rounded == MISSING_SENTINEL {
                    ReconstructedValue::Missing
                } else {
                    ReconstructedValue::Integer(rounded as i64)
                }
            }
            None => ReconstructedValue::Number(value),
        };
    }
    ReconstructedValue::Number(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> MinMaxScaler {
        MinMaxScaler::new(
            vec!["patient_age".into(), "patient_bmi".into()],
            vec![0.0, -5.0],
            vec![100.0, 95.0],
        )
        .unwrap()
    }

    #[test]
    fn booleans_by_value() {
        let scaler = scaler();
        assert_eq!(
            reconstruct_value("rechallenge_yes", 1.0, &scaler),
            ReconstructedValue::Flag(true)
        );
        assert_eq!(
            reconstruct_value("patient_age", 0.0, &scaler),
            ReconstructedValue::Flag(false)
        );
    }

    #[test]
    fn unscales_by_column_name() {
        let scaler = scaler();
        assert_eq!(
            reconstruct_value("patient_age", 0.37, &scaler),
            ReconstructedValue::Integer(37)
        );
        assert_eq!(
            reconstruct_value("patient_bmi", 0.26, &scaler),
            ReconstructedValue::Integer(21)
        );
    }

    #[test]
    fn sentinel_becomes_missing() {
        let scaler = scaler();
        let scaled = scaler.scale(1, -1.0);
        assert_eq!(
            reconstruct_value("patient_bmi", scaled, &scaler),
            ReconstructedValue::Missing
        );
    }

    #[test]
    fn whole_values_pass_through() {
        let scaler = scaler();
        assert_eq!(
            reconstruct_value("patient_age", 2.0, &scaler),
            ReconstructedValue::Number(2.0)
        );
    }
}
