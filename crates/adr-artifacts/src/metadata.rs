//! Loading and validation of `metadata/model_columns.json`.

use std::path::Path;

use adr_model::{ColumnMetadata, FieldKind, column_kind};

use crate::error::{ConfigurationError, Result};

/// Parses and validates column metadata.
///
/// Every expected key must be present, every column name must resolve to a
/// known raw or derived field of the matching kind, and every prediction
/// column must be a boolean, numerical or `<categorical>_<category>` column.
pub fn parse_column_metadata(path: &Path, bytes: &[u8]) -> Result<ColumnMetadata> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| ConfigurationError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
    let object = value
        .as_object()
        .ok_or_else(|| ConfigurationError::invalid(path, "expected a JSON object"))?;
    for key in ColumnMetadata::KEYS {
        if !object.contains_key(*key) {
            return Err(ConfigurationError::MissingKey {
                path: path.to_path_buf(),
                key: (*key).to_string(),
            });
        }
    }

    let metadata: ColumnMetadata =
        serde_json::from_value(value).map_err(|e| ConfigurationError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
    validate_column_metadata(&metadata)?;
    Ok(metadata)
}

pub fn validate_column_metadata(metadata: &ColumnMetadata) -> Result<()> {
    use FieldKind::{Boolean, Categorical, Date, Numeric};

    check_set(
        &metadata.categorical_columns,
        "categorical_columns",
        &[Categorical, Numeric],
    )?;
    check_set(&metadata.numerical_columns, "numerical_columns", &[Numeric])?;
    check_set(&metadata.date_columns, "date_columns", &[Date])?;
    check_set(&metadata.boolean_columns, "boolean_columns", &[Boolean])?;
    check_set(&metadata.columns_to_drop, "columns_to_drop", &[])?;

    for column in &metadata.prediction_columns {
        let defined = metadata.is_boolean(column)
            || metadata.is_numerical(column)
            || metadata.categorical_source(column).is_some();
        if !defined {
            return Err(ConfigurationError::UndefinedPredictionColumn {
                column: column.clone(),
            });
        }
    }
    Ok(())
}

/// Checks that every column is known and, when `kinds` is non-empty, of one
/// of the listed kinds.
fn check_set(columns: &[String], set: &'static str, kinds: &[FieldKind]) -> Result<()> {
    for column in columns {
        let kind = column_kind(column).ok_or_else(|| ConfigurationError::UnknownColumn {
            column: column.clone(),
            set,
        })?;
        if !kinds.is_empty() && !kinds.contains(&kind) {
            return Err(ConfigurationError::ColumnKind {
                column: column.clone(),
                set,
                expected: kind_name(kinds[0]),
            });
        }
    }
    Ok(())
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Categorical => "categorical",
        FieldKind::Numeric => "numeric",
        FieldKind::Date => "date",
        FieldKind::Boolean => "boolean",
    }
}
