//! End-to-end assessment against a small artifact directory.

mod common;

use std::fs;
use std::sync::Arc;

use adr_artifacts::{ArtifactBundle, ConfigurationError};
use adr_core::{AssessmentContext, AssessmentError, feature_label, predict};
use adr_explain::{Background, KernelConfig};
use adr_ingest::IngestError;
use adr_model::{CausalityLevel, ReconstructedValue};
use adr_transform::{FeatureError, FeatureOptions};
use serde_json::json;

use common::{PREDICTION_COLUMNS, case, context, fixture};

#[test]
fn initializes_from_config_file() {
    let (_fixture, context) = context();

    assert_eq!(context.model_id(), "final_ml_model@champion");
    let base: f64 = context.base_values().iter().sum();
    assert_eq!(context.base_values().len(), 4);
    assert!((base - 1.0).abs() < 1e-9);
}

#[test]
fn case_without_suspected_flags_is_unclassified() {
    let (_fixture, context) = context();
    let assessment = context
        .assess(&case(json!({"rifampicin_suspected": null})))
        .unwrap();

    assert_eq!(assessment.level, CausalityLevel::Unclassified);
    assert!(assessment.explanation.is_none());
}

#[test]
fn explicit_false_flags_reach_the_codec() {
    let (_fixture, context) = context();
    let record = case(json!({
        "rifampicin_suspected": false,
        "isoniazid_suspected": false
    }));

    // The fixture encoder was fitted on counts 1 to 4, so a zero count is
    // rejected by the codec rather than by the gate.
    let err = context.assess(&record).unwrap_err();
    assert!(matches!(
        err,
        AssessmentError::Feature(FeatureError::UnknownCategory { column, value })
            if column == "num_suspected_drugs" && value == "0"
    ));
}

#[test]
fn unknown_challenges_are_unclassified() {
    let (_fixture, context) = context();
    let assessment = context
        .assess(&case(json!({"rechallenge": "unknown", "dechallenge": "unknown"})))
        .unwrap();
    assert_eq!(assessment.level, CausalityLevel::Unclassified);

    let one_known = context
        .assess(&case(json!({"rechallenge": "unknown", "dechallenge": "yes"})))
        .unwrap();
    assert!(one_known.is_classified());
}

#[test]
fn positive_challenges_are_certain_with_explanation() {
    let (_fixture, context) = context();
    let assessment = context.assess(&case(json!({}))).unwrap();

    assert_eq!(assessment.level, CausalityLevel::Certain);
    let explanation = assessment.explanation.unwrap();
    assert_eq!(explanation.n_classes(), 4);
    assert_eq!(explanation.n_features(), PREDICTION_COLUMNS.len());
    assert_eq!(explanation.feature_names(), PREDICTION_COLUMNS);

    let values = explanation.feature_values();
    assert_eq!(values[0], ReconstructedValue::Integer(60));
    assert_eq!(values[5], ReconstructedValue::Flag(true));
    assert_eq!(values[3], ReconstructedValue::Flag(false));

    let rankings = explanation.class_rankings(context.artifacts().ordinal.levels());
    assert_eq!(rankings[0].label, Some(CausalityLevel::Certain));
}

#[test]
fn negative_challenges_are_unlikely() {
    let (_fixture, context) = context();
    let assessment = context
        .assess(&case(json!({"rechallenge": "no", "dechallenge": "no"})))
        .unwrap();
    assert_eq!(assessment.level, CausalityLevel::Unlikely);
}

#[test]
fn contributions_add_up_to_predicted_probabilities() {
    let (_fixture, context) = context();
    let record = case(json!({"rechallenge": "na", "dechallenge": "no", "isoniazid_suspected": true}));

    let matrix = context.encode(std::slice::from_ref(&record)).unwrap();
    let prediction = predict(context.artifacts(), matrix.row(0).unwrap()).unwrap();
    let explanation = context.assess(&record).unwrap().explanation.unwrap();

    for (class, probability) in prediction.probabilities.iter().enumerate() {
        let total = explanation.shap_values_and_base_values_sum_per_class()[class];
        assert!(
            (total - probability).abs() < 1e-8,
            "class {class}: {total} vs {probability}"
        );
        assert_eq!(
            explanation.base_values()[class],
            context.base_values()[class]
        );
    }
}

#[test]
fn assessment_is_deterministic() {
    let (_fixture, context) = context();
    let record = case(json!({"dechallenge": "unknown", "patient_age": 33}));
    assert_eq!(
        context.assess(&record).unwrap(),
        context.assess(&record).unwrap()
    );
}

#[test]
fn batch_assesses_each_case() {
    let (_fixture, context) = context();
    let cases = vec![
        case(json!({})),
        case(json!({"rifampicin_suspected": null})),
        case(json!({"rechallenge": "no", "dechallenge": "no"})),
    ];
    let levels: Vec<CausalityLevel> = context
        .assess_batch(&cases)
        .into_iter()
        .map(|result| result.unwrap().level)
        .collect();
    assert_eq!(
        levels,
        vec![
            CausalityLevel::Certain,
            CausalityLevel::Unclassified,
            CausalityLevel::Unlikely
        ]
    );
}

#[test]
fn override_replaces_predicted_level() {
    let (_fixture, context) = context();
    let assessment = context
        .assess(&case(json!({})))
        .unwrap()
        .override_level(CausalityLevel::Unclassifiable);
    assert_eq!(assessment.level, CausalityLevel::Unclassifiable);
    assert!(assessment.explanation.is_none());
}

#[test]
fn missing_background_file_is_fatal() {
    let fixture = fixture();
    fs::remove_file(fixture.dir.path().join("data.csv")).unwrap();

    let err = AssessmentContext::initialize(&fixture.config).unwrap_err();
    assert!(matches!(
        err,
        AssessmentError::Ingest(IngestError::FileNotFound { .. })
    ));
}

#[test]
fn empty_background_is_fatal() {
    let fixture = fixture();
    fs::write(
        fixture.dir.path().join("data.csv"),
        "patient_gender,known_allergy,pregnancy_status,is_serious,criteria_for_seriousness\n",
    )
    .unwrap();

    let err = AssessmentContext::initialize(&fixture.config).unwrap_err();
    assert!(matches!(err, AssessmentError::EmptyBackground { .. }));
}

#[test]
fn background_width_must_match_model() {
    let fixture = fixture();
    let bundle = ArtifactBundle::load(&fixture.config.artifacts_dir).unwrap();
    let background = Background::uniform(vec![vec![0.0; 3]]).unwrap();

    let err = AssessmentContext::from_parts(
        Arc::new(bundle),
        background,
        FeatureOptions::default(),
        KernelConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AssessmentError::Configuration(ConfigurationError::SchemaMismatch { .. })
    ));
}

#[test]
fn top_contributions_use_display_labels() {
    let (_fixture, context) = context();
    let explanation = context.assess(&case(json!({}))).unwrap().explanation.unwrap();
    let metadata = &context.artifacts().metadata;

    let top = explanation.top_contributions(0, 1);
    assert_eq!(top[0].feature, "rechallenge_yes");
    assert_eq!(top[0].value, ReconstructedValue::Flag(true));
    insta::assert_snapshot!(feature_label(&top[0].feature, metadata), @"Rechallenge (Yes)");
}
