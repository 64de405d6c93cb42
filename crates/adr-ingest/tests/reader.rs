//! Integration tests for case file readers.

use std::fs;
use std::path::PathBuf;

use adr_ingest::{IngestError, read_case_csv, read_case_json, read_cases};
use adr_model::{Drug, Rechallenge};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

const HEADER: &str = "\u{feff}patient_gender , known_allergy,pregnancy_status,is_serious,criteria_for_seriousness,rifampicin_suspected,rifampicin_start_date,date_of_onset_of_reaction,rechallenge,patient_weight_kg";

#[test]
fn reads_csv_with_bom_and_padded_headers() {
    let dir = TempDir::new().unwrap();
    let contents = format!(
        "{HEADER}\nfemale,no,not pregnant,yes,hospitalisation,True,2024-01-05,2024-02-01, yes ,61.5\nmale,yes,not applicable,no,disability,False,,,unknown,\n"
    );
    let path = write(&dir, "cases.csv", &contents);

    let cases = read_case_csv(&path).unwrap();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].rechallenge, Rechallenge::Yes);
    assert_eq!(cases[0].patient_weight_kg, Some(61.5));
    assert_eq!(
        cases[0]
            .exposure(Drug::Rifampicin)
            .start_date
            .map(|d| d.to_string()),
        Some("2024-01-05".to_string())
    );
    assert_eq!(cases[1].rifampicin_suspected, Some(false));
    assert_eq!(cases[1].patient_weight_kg, None);
}

#[test]
fn csv_row_error_reports_line() {
    let dir = TempDir::new().unwrap();
    let contents = format!(
        "{HEADER}\nfemale,no,not pregnant,yes,hospitalisation,True,,,yes,\nfemale,no,not pregnant,yes,hospitalisation,True,,,sometimes,\n"
    );
    let path = write(&dir, "cases.csv", &contents);

    let err = read_case_csv(&path).unwrap_err();
    match err {
        IngestError::Record { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn reads_json_array_and_single_object() {
    let dir = TempDir::new().unwrap();
    let case = r#"{
        "patient_gender": "male",
        "known_allergy": "no",
        "pregnancy_status": "not applicable",
        "is_serious": "no",
        "criteria_for_seriousness": "death",
        "ethambutol_suspected": true,
        "dechallenge": "yes"
    }"#;
    let many = write(&dir, "cases.json", &format!("[{case}, {case}]"));
    let one = write(&dir, "case.json", case);

    assert_eq!(read_case_json(&many).unwrap().len(), 2);
    let single = read_cases(&one).unwrap();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].suspected_drug_count(), 1);
}

#[test]
fn rejects_unknown_extension_and_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "cases.xlsx", "");
    assert!(matches!(
        read_cases(&path),
        Err(IngestError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        read_cases(&dir.path().join("absent.csv")),
        Err(IngestError::FileNotFound { .. })
    ));
}
