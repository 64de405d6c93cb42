//! Derived feature calculation.
//!
//! Reproduces the training-time preprocessing on a frame of raw cases:
//! suspected-drug count, categorical casting, date parsing, age imputation,
//! BMI, drug timing deltas, column dropping and missing-value filling.

use adr_model::lenient::parse_date;
use adr_model::{CaseField, ColumnMetadata, DerivedField, Drug, ExposureField};
use chrono::NaiveDate;
use polars::prelude::{AnyValue, Column, DataFrame};
use tracing::debug;

use crate::error::{FeatureError, Result};

/// Value that stands in for a missing numerical feature.
pub const MISSING_SENTINEL: f64 = -1.0;

/// Options that make feature derivation reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureOptions {
    /// Reference date for age derivation from date of birth.
    pub today: NaiveDate,
}

impl FeatureOptions {
    /// Uses the local current date.
    pub fn current() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self::current()
    }
}

/// Applies the derivation steps to a frame built by
/// [`build_case_frame`](crate::frame::build_case_frame).
pub fn derive_features(
    mut df: DataFrame,
    metadata: &ColumnMetadata,
    options: &FeatureOptions,
) -> Result<DataFrame> {
    let height = df.height();

    // 1. suspected drug count
    let mut counts = vec![0_i64; height];
    for drug in Drug::ALL {
        let name = CaseField::Exposure(*drug, ExposureField::Suspected).name();
        for (count, flag) in counts.iter_mut().zip(flag_values(&df, &name)?) {
            if flag == Some(true) {
                *count += 1;
            }
        }
    }
    df.with_column(Column::new(
        DerivedField::NumSuspectedDrugs.name().as_str().into(),
        counts,
    ))?;

    // 2. categorical columns as discrete strings
    for name in &metadata.categorical_columns {
        let values = categorical_strings(require(&df, name)?)?;
        df.with_column(Column::new(name.as_str().into(), values))?;
    }

    // 3. dates
    let onset = date_values(&df, &CaseField::DateOfOnsetOfReaction.name())?;
    let birth = date_values(&df, &CaseField::PatientDateOfBirth.name())?;

    // 4. age
    let age_name = CaseField::PatientAge.name();
    let mut ages = float_values(&df, &age_name)?;
    for (age, dob) in ages.iter_mut().zip(&birth) {
        if age.is_none()
            && let Some(dob) = dob
        {
            *age = Some(age_from_birth(*dob, options.today));
        }
    }
    if let Some(median) = median(ages.iter().flatten().copied()) {
        for age in ages.iter_mut().filter(|age| age.is_none()) {
            *age = Some(median);
        }
    }
    df.with_column(Column::new(age_name.as_str().into(), ages))?;

    // 5. BMI
    let weights = float_values(&df, &CaseField::PatientWeightKg.name())?;
    let heights = float_values(&df, &CaseField::PatientHeightCm.name())?;
    let bmi: Vec<Option<f64>> = weights
        .iter()
        .zip(&heights)
        .map(|(weight, height)| body_mass_index(*weight, *height))
        .collect();
    df.with_column(Column::new(DerivedField::PatientBmi.name().as_str().into(), bmi))?;

    // 6. drug timing deltas
    for drug in Drug::ALL {
        let start = date_values(&df, &CaseField::Exposure(*drug, ExposureField::StartDate).name())?;
        let stop = date_values(&df, &CaseField::Exposure(*drug, ExposureField::StopDate).name())?;
        let deltas = [
            (DerivedField::StartToOnsetDays(*drug), &onset, &start),
            (DerivedField::StopToOnsetDays(*drug), &onset, &stop),
            (DerivedField::StartStopDifference(*drug), &stop, &start),
        ];
        for (field, later, earlier) in deltas {
            let values: Vec<Option<f64>> = later
                .iter()
                .zip(earlier.iter())
                .map(|(later, earlier)| day_difference(*later, *earlier))
                .collect();
            df.with_column(Column::new(field.name().as_str().into(), values))?;
        }
    }

    // 7. drop dates and unused columns
    for name in metadata.date_columns.iter().chain(&metadata.columns_to_drop) {
        require(&df, name)?;
        df.drop_in_place(name)?;
    }

    // 8. sentinel fill
    for name in &metadata.numerical_columns {
        let filled: Vec<f64> = float_values(&df, name)?
            .into_iter()
            .map(|value| value.unwrap_or(MISSING_SENTINEL))
            .collect();
        df.with_column(Column::new(name.as_str().into(), filled))?;
    }

    debug!(rows = height, columns = df.width(), "derived features");
    Ok(df)
}

/// Whole years of 365 days between `dob` and `today`, rounded down.
pub fn age_from_birth(dob: NaiveDate, today: NaiveDate) -> f64 {
    (today - dob).num_days().div_euclid(365) as f64
}

/// `weight / height²`, missing when either input is missing or the result is
/// not finite.
pub fn body_mass_index(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let bmi = weight_kg? / (height_cm? * height_cm?);
    bmi.is_finite().then_some(bmi)
}

fn day_difference(later: Option<NaiveDate>, earlier: Option<NaiveDate>) -> Option<f64> {
    Some((later? - earlier?).num_days() as f64)
}

/// Median of the values, averaging the two middle values for even counts.
pub fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sorted: Vec<f64> = values.collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| FeatureError::MissingColumn {
        column: name.to_string(),
    })
}

pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(require(df, name)?.f64()?.into_iter().collect())
}

pub(crate) fn flag_values(df: &DataFrame, name: &str) -> Result<Vec<Option<bool>>> {
    Ok(require(df, name)?.bool()?.into_iter().collect())
}

fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let values = require(df, name)?
        .str()?
        .into_iter()
        .map(|raw| raw.and_then(parse_date))
        .collect();
    Ok(values)
}

pub(crate) fn categorical_strings(column: &Column) -> Result<Vec<Option<String>>> {
    (0..column.len())
        .map(|idx| Ok(category_token(column.get(idx)?)))
        .collect()
}

/// Renders a cell as the category label the encoder was fitted on. Whole
/// numbers print without a fractional part.
fn category_token(value: AnyValue<'_>) -> Option<String> {
    match value {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        AnyValue::Boolean(b) => Some(if b { "True" } else { "False" }.to_string()),
        AnyValue::Int64(v) => Some(v.to_string()),
        AnyValue::Int32(v) => Some(v.to_string()),
        AnyValue::Float64(v) => Some(format_whole(v)),
        other => Some(other.to_string()),
    }
}

fn format_whole(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_rounds_down_whole_years() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let dob = NaiveDate::from_ymd_opt(1990, 6, 2).unwrap();
        assert_eq!(age_from_birth(dob, today), 34.0);
        let future = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert_eq!(age_from_birth(future, today), -1.0);
    }

    #[test]
    fn bmi_of_zero_height_is_missing() {
        assert_eq!(body_mass_index(Some(70.0), Some(0.0)), None);
        assert_eq!(body_mass_index(Some(70.0), None), None);
        assert_eq!(body_mass_index(Some(64.0), Some(160.0)), Some(64.0 / 25600.0));
    }

    #[test]
    fn median_handles_even_and_empty() {
        assert_eq!(median([3.0, 1.0, 2.0].into_iter()), Some(2.0));
        assert_eq!(median([4.0, 1.0, 2.0, 3.0].into_iter()), Some(2.5));
        assert_eq!(median(std::iter::empty()), None);
    }

    #[test]
    fn category_tokens() {
        assert_eq!(category_token(AnyValue::Int64(2)), Some("2".to_string()));
        assert_eq!(category_token(AnyValue::Float64(3.0)), Some("3".to_string()));
        assert_eq!(category_token(AnyValue::Float64(2.5)), Some("2.5".to_string()));
        assert_eq!(category_token(AnyValue::Null), None);
    }
}
