//! Display labels for classifier features.

use adr_model::{CaseField, ColumnMetadata, DerivedField, ExposureField};

/// Human-readable label for an encoded feature name.
///
/// One-hot outputs are labelled from their source column and category, for
/// example `known_allergy_no` becomes `Known Allergy (No)`. Names the
/// formatter does not recognize are returned unchanged.
pub fn feature_label(name: &str, metadata: &ColumnMetadata) -> String {
    if let Some(source) = metadata.categorical_source(name) {
        return categorical_label(source, &name[source.len() + 1..]);
    }
    if let Some(field) = DerivedField::from_name(name) {
        return match field {
            DerivedField::NumSuspectedDrugs => "No. of Suspected Drugs".to_string(),
            DerivedField::PatientBmi => "Patient BMI".to_string(),
            DerivedField::StartToOnsetDays(drug) => {
                format!("{}: Start to Onset (days)", drug.display_name())
            }
            DerivedField::StopToOnsetDays(drug) => {
                format!("{}: Stop to Onset (days)", drug.display_name())
            }
            DerivedField::StartStopDifference(drug) => {
                format!("{}: Start-Stop Diff. (days)", drug.display_name())
            }
        };
    }
    match CaseField::from_name(name) {
        Some(CaseField::PatientAge) => "Patient Age".to_string(),
        Some(CaseField::Exposure(drug, ExposureField::Suspected)) => {
            format!("{} Suspected", drug.display_name())
        }
        _ => name.to_string(),
    }
}

fn categorical_label(source: &str, category: &str) -> String {
    match source {
        "num_suspected_drugs" => format!("No. of Suspected Drugs ({category})"),
        "criteria_for_seriousness" => format!("Seriousness: {}", title_case(category)),
        "action_taken" => format!("Action Taken: {}", title_case(category)),
        "outcome" => format!("Outcome: {}", title_case(category)),
        _ => {
            let value = if category == "na" {
                "N/A".to_string()
            } else {
                title_case(category)
            };
            format!("{} ({value})", title_case(&source.replace('_', " ")))
        }
    }
}

/// Capitalizes each word and each hyphenated part, leaving "with" lowercase.
fn title_case(text: &str) -> String {
    text.split(' ')
        .enumerate()
        .map(|(idx, word)| {
            if idx > 0 && word == "with" {
                word.to_string()
            } else {
                word.split('-').map(capitalize).collect::<Vec<_>>().join("-")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> ColumnMetadata {
        ColumnMetadata {
            categorical_columns: vec![
                "known_allergy".into(),
                "dechallenge".into(),
                "criteria_for_seriousness".into(),
                "action_taken".into(),
                "outcome".into(),
                "num_suspected_drugs".into(),
            ],
            numerical_columns: vec!["patient_age".into(), "patient_bmi".into()],
            date_columns: vec![],
            boolean_columns: vec!["rifampicin_suspected".into()],
            columns_to_drop: vec![],
            prediction_columns: vec![],
        }
    }

    #[test]
    fn labels_one_hot_outputs() {
        let metadata = metadata();
        let cases = [
            ("known_allergy_no", "Known Allergy (No)"),
            ("dechallenge_na", "Dechallenge (N/A)"),
            (
                "criteria_for_seriousness_congenital anomaly",
                "Seriousness: Congenital Anomaly",
            ),
            (
                "criteria_for_seriousness_life-threatening",
                "Seriousness: Life-Threatening",
            ),
            ("action_taken_dose increased", "Action Taken: Dose Increased"),
            ("outcome_recovered with sequelae", "Outcome: Recovered with Sequelae"),
            ("num_suspected_drugs_1", "No. of Suspected Drugs (1)"),
        ];
        for (name, label) in cases {
            assert_eq!(feature_label(name, &metadata), label, "{name}");
        }
    }

    #[test]
    fn labels_numeric_and_flag_features() {
        let metadata = metadata();
        assert_eq!(feature_label("patient_age", &metadata), "Patient Age");
        assert_eq!(feature_label("patient_bmi", &metadata), "Patient BMI");
        assert_eq!(
            feature_label("rifampicin_start_to_onset_days", &metadata),
            "Rifampicin: Start to Onset (days)"
        );
        assert_eq!(
            feature_label("isoniazid_start_stop_difference", &metadata),
            "Isoniazid: Start-Stop Diff. (days)"
        );
        assert_eq!(
            feature_label("rifampicin_suspected", &metadata),
            "Rifampicin Suspected"
        );
        assert_eq!(feature_label("mystery", &metadata), "mystery");
    }
}
