//! Case records as a polars frame, one column per raw field.

use adr_model::{CaseField, CaseRecord, FieldKind, FieldValue};
use polars::prelude::{Column, DataFrame};

use crate::error::Result;

/// Builds a frame with every raw field of `cases` in report order.
///
/// Text and categorical fields become strings, numbers become `f64`, flags
/// become booleans, and dates are stored as ISO strings to be parsed by the
/// feature step.
pub fn build_case_frame(cases: &[CaseRecord]) -> Result<DataFrame> {
    let fields = CaseField::all();
    let mut columns: Vec<Column> = Vec::with_capacity(fields.len());
    for field in fields {
        let name = field.name();
        let column = match field.kind() {
            FieldKind::Numeric => {
                let values: Vec<Option<f64>> = cases
                    .iter()
                    .map(|case| match case.value(field) {
                        FieldValue::Number(v) => v,
                        _ => None,
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            }
            FieldKind::Boolean => {
                let values: Vec<Option<bool>> = cases
                    .iter()
                    .map(|case| match case.value(field) {
                        FieldValue::Flag(v) => v,
                        _ => None,
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            }
            FieldKind::Date => {
                let values: Vec<Option<String>> = cases
                    .iter()
                    .map(|case| match case.value(field) {
                        FieldValue::Date(v) => v.map(|date| date.format("%Y-%m-%d").to_string()),
                        _ => None,
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            }
            FieldKind::Text | FieldKind::Categorical => {
                let values: Vec<Option<&str>> = cases
                    .iter()
                    .map(|case| match case.value(field) {
                        FieldValue::Text(v) => v,
                        _ => None,
                    })
                    .collect();
                Column::new(name.as_str().into(), values)
            }
        };
        columns.push(column);
    }
    Ok(DataFrame::new(columns)?)
}
