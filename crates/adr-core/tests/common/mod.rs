//! Shared fixture: a small artifact directory, background data and config.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use adr_core::{AssessmentConfig, AssessmentContext};
use adr_model::CaseRecord;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const PREDICTION_COLUMNS: [&str; 18] = [
    "patient_age",
    "patient_bmi",
    "rechallenge_na",
    "rechallenge_no",
    "rechallenge_unknown",
    "rechallenge_yes",
    "dechallenge_na",
    "dechallenge_no",
    "dechallenge_unknown",
    "dechallenge_yes",
    "num_suspected_drugs_1",
    "num_suspected_drugs_2",
    "num_suspected_drugs_3",
    "num_suspected_drugs_4",
    "rifampicin_suspected",
    "isoniazid_suspected",
    "pyrazinamide_suspected",
    "ethambutol_suspected",
];

fn write_json(dir: &Path, rel: &str, value: &Value) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

/// Row of classifier weights with the given `(column, weight)` entries.
fn coef(entries: &[(&str, f64)]) -> Vec<f64> {
    PREDICTION_COLUMNS
        .iter()
        .map(|column| {
            entries
                .iter()
                .find(|(name, _)| name == column)
                .map_or(0.0, |(_, weight)| *weight)
        })
        .collect()
}

pub fn write_artifacts(dir: &Path) {
    let challenge = ["na", "no", "unknown", "yes"];
    write_json(
        dir,
        "metadata/model_columns.json",
        &json!({
            "categorical_columns": ["rechallenge", "dechallenge", "num_suspected_drugs"],
            "numerical_columns": ["patient_age", "patient_bmi"],
            "date_columns": ["created_at"],
            "boolean_columns": [
                "rifampicin_suspected",
                "isoniazid_suspected",
                "pyrazinamide_suspected",
                "ethambutol_suspected"
            ],
            "columns_to_drop": ["patient_name"],
            "prediction_columns": PREDICTION_COLUMNS,
        }),
    );
    write_json(
        dir,
        "encoders/one_hot_encoder.json",
        &json!({"columns": [
            {"name": "rechallenge", "categories": challenge},
            {"name": "dechallenge", "categories": challenge},
            {"name": "num_suspected_drugs", "categories": ["1", "2", "3", "4"]}
        ]}),
    );
    write_json(
        dir,
        "encoders/ordinal_encoder.json",
        &json!({"categories": ["certain", "likely", "possible", "unlikely"]}),
    );
    write_json(
        dir,
        "scalers/minmax_scaler.json",
        &json!({
            "feature_names": ["patient_age", "patient_bmi"],
            "data_min": [-1.0, -1.0],
            "data_max": [99.0, 0.01]
        }),
    );
    write_json(
        dir,
        "model/classifier.json",
        &json!({
            "type": "logistic_regression",
            "coef": [
                coef(&[("rechallenge_yes", 3.0), ("dechallenge_yes", 2.0)]),
                coef(&[("dechallenge_yes", 3.0), ("patient_age", 0.5)]),
                coef(&[("dechallenge_no", 2.0), ("rechallenge_unknown", 1.0)]),
                coef(&[("rechallenge_no", 2.0), ("dechallenge_no", 2.0)]),
            ],
            "intercept": [0.0, 0.0, 0.0, 0.0]
        }),
    );
}

/// Training-format background rows; every row has a suspected drug.
pub fn write_background(path: &Path) {
    let mut csv = String::from(
        "patient_name,patient_gender,known_allergy,pregnancy_status,is_serious,\
         criteria_for_seriousness,patient_age,patient_weight_kg,patient_height_cm,\
         rifampicin_suspected,isoniazid_suspected,pyrazinamide_suspected,ethambutol_suspected,\
         rechallenge,dechallenge,created_at\n",
    );
    let challenges = ["yes", "no", "unknown", "na"];
    for idx in 0..16 {
        let age = 20 + idx * 3;
        let weight = 50 + idx * 2;
        let rechallenge = challenges[idx % 4];
        let dechallenge = challenges[(idx / 4) % 4];
        let isoniazid = if idx % 3 == 0 { "True" } else { "False" };
        csv.push_str(&format!(
            "Patient {idx},female,no,not pregnant,no,hospitalisation,{age},{weight},165,\
             True,{isoniazid},,False,{rechallenge},{dechallenge},2024-01-0{}\n",
            idx % 9 + 1
        ));
    }
    fs::write(path, csv).unwrap();
}

pub struct Fixture {
    pub dir: TempDir,
    pub config: AssessmentConfig,
}

pub fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    write_artifacts(&dir.path().join("artifacts"));
    write_background(&dir.path().join("data.csv"));
    let config_path = dir.path().join("assessment.toml");
    fs::write(
        &config_path,
        "artifacts_dir = \"artifacts\"\n\
         background_path = \"data.csv\"\n\n\
         [explainer]\n\
         background_clusters = 4\n\
         seed = 11\n\n\
         [features]\n\
         today = \"2024-06-01\"\n",
    )
    .unwrap();
    let config = AssessmentConfig::load(&config_path).unwrap();
    Fixture { dir, config }
}

pub fn context() -> (Fixture, AssessmentContext) {
    let fixture = fixture();
    let context = AssessmentContext::initialize(&fixture.config).unwrap();
    (fixture, context)
}

/// A case that passes the eligibility gate, with `overrides` applied.
pub fn case(overrides: Value) -> CaseRecord {
    let mut base = json!({
        "patient_name": "Test Patient",
        "patient_gender": "male",
        "known_allergy": "no",
        "pregnancy_status": "not applicable",
        "is_serious": "yes",
        "criteria_for_seriousness": "hospitalisation",
        "patient_age": 60,
        "rifampicin_suspected": true,
        "rechallenge": "yes",
        "dechallenge": "yes"
    });
    for (key, value) in overrides.as_object().unwrap() {
        base[key] = value.clone();
    }
    serde_json::from_value(base).unwrap()
}
