//! Raw ADR case records and the typed field registry.
//!
//! [`CaseRecord`] mirrors one submitted adverse drug reaction report. Column
//! names used by the trained artifacts are resolved against [`CaseField`] and
//! [`DerivedField`] once, when the column metadata is loaded, so a renamed or
//! misspelled column fails at a single validation point instead of deep inside
//! feature construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{
    ActionTaken, CriteriaForSeriousness, Dechallenge, Drug, Gender, IsSerious, KnownAllergy,
    Outcome, PregnancyStatus, Rechallenge, Severity,
};
use crate::lenient;

/// One raw adverse drug reaction report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    // Personal details
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub patient_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub inpatient_or_outpatient_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub patient_date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub patient_age: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub patient_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub ward_or_clinic: Option<String>,
    pub patient_gender: Gender,
    pub known_allergy: KnownAllergy,
    pub pregnancy_status: PregnancyStatus,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub patient_weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub patient_height_cm: Option<f64>,

    // Suspected adverse reaction
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub date_of_onset_of_reaction: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub description_of_reaction: Option<String>,

    // Rifampicin
    #[serde(default, deserialize_with = "lenient::optional_flag")]
    pub rifampicin_suspected: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub rifampicin_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub rifampicin_stop_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub rifampicin_dose_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub rifampicin_frequency_number: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub rifampicin_route: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub rifampicin_batch_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub rifampicin_manufacturer: Option<String>,

    // Isoniazid
    #[serde(default, deserialize_with = "lenient::optional_flag")]
    pub isoniazid_suspected: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub isoniazid_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub isoniazid_stop_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub isoniazid_dose_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub isoniazid_frequency_number: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub isoniazid_route: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub isoniazid_batch_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub isoniazid_manufacturer: Option<String>,

    // Pyrazinamide
    #[serde(default, deserialize_with = "lenient::optional_flag")]
    pub pyrazinamide_suspected: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub pyrazinamide_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub pyrazinamide_stop_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub pyrazinamide_dose_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub pyrazinamide_frequency_number: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub pyrazinamide_route: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub pyrazinamide_batch_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub pyrazinamide_manufacturer: Option<String>,

    // Ethambutol
    #[serde(default, deserialize_with = "lenient::optional_flag")]
    pub ethambutol_suspected: Option<bool>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub ethambutol_start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub ethambutol_stop_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub ethambutol_dose_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub ethambutol_frequency_number: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub ethambutol_route: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub ethambutol_batch_no: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub ethambutol_manufacturer: Option<String>,

    // Rechallenge / dechallenge
    #[serde(default)]
    pub rechallenge: Rechallenge,
    #[serde(default)]
    pub dechallenge: Dechallenge,

    // Grading of the reaction
    #[serde(default)]
    pub severity: Severity,
    pub is_serious: IsSerious,
    pub criteria_for_seriousness: CriteriaForSeriousness,
    #[serde(default)]
    pub action_taken: ActionTaken,
    #[serde(default)]
    pub outcome: Outcome,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub comments: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub created_at: Option<NaiveDate>,
}

/// Borrowed view of one drug's exposure sub-record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrugExposure<'a> {
    pub drug: Drug,
    pub suspected: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub stop_date: Option<NaiveDate>,
    pub dose_amount: Option<f64>,
    pub frequency_number: Option<f64>,
    pub route: Option<&'a str>,
    pub batch_no: Option<&'a str>,
    pub manufacturer: Option<&'a str>,
}

impl CaseRecord {
    /// Returns the exposure sub-record for `drug`.
    pub fn exposure(&self, drug: Drug) -> DrugExposure<'_> {
        let (suspected, start, stop, dose, frequency, route, batch, manufacturer) = match drug {
            Drug::Rifampicin => (
                self.rifampicin_suspected,
                self.rifampicin_start_date,
                self.rifampicin_stop_date,
                self.rifampicin_dose_amount,
                self.rifampicin_frequency_number,
                &self.rifampicin_route,
                &self.rifampicin_batch_no,
                &self.rifampicin_manufacturer,
            ),
            Drug::Isoniazid => (
                self.isoniazid_suspected,
                self.isoniazid_start_date,
                self.isoniazid_stop_date,
                self.isoniazid_dose_amount,
                self.isoniazid_frequency_number,
                &self.isoniazid_route,
                &self.isoniazid_batch_no,
                &self.isoniazid_manufacturer,
            ),
            Drug::Pyrazinamide => (
                self.pyrazinamide_suspected,
                self.pyrazinamide_start_date,
                self.pyrazinamide_stop_date,
                self.pyrazinamide_dose_amount,
                self.pyrazinamide_frequency_number,
                &self.pyrazinamide_route,
                &self.pyrazinamide_batch_no,
                &self.pyrazinamide_manufacturer,
            ),
            Drug::Ethambutol => (
                self.ethambutol_suspected,
                self.ethambutol_start_date,
                self.ethambutol_stop_date,
                self.ethambutol_dose_amount,
                self.ethambutol_frequency_number,
                &self.ethambutol_route,
                &self.ethambutol_batch_no,
                &self.ethambutol_manufacturer,
            ),
        };
        DrugExposure {
            drug,
            suspected,
            start_date: start,
            stop_date: stop,
            dose_amount: dose,
            frequency_number: frequency,
            route: route.as_deref(),
            batch_no: batch.as_deref(),
            manufacturer: manufacturer.as_deref(),
        }
    }

    /// Iterates the four exposure sub-records in canonical drug order.
    pub fn exposures(&self) -> impl Iterator<Item = DrugExposure<'_>> {
        Drug::ALL.iter().map(|drug| self.exposure(*drug))
    }

    /// Number of drugs explicitly flagged as suspected.
    pub fn suspected_drug_count(&self) -> usize {
        self.exposures()
            .filter(|exposure| exposure.suspected == Some(true))
            .count()
    }

    /// Reads one raw field through the typed registry.
    pub fn value(&self, field: CaseField) -> FieldValue<'_> {
        match field {
            CaseField::PatientName => FieldValue::Text(self.patient_name.as_deref()),
            CaseField::InpatientOrOutpatientNumber => {
                FieldValue::Text(self.inpatient_or_outpatient_number.as_deref())
            }
            CaseField::PatientDateOfBirth => FieldValue::Date(self.patient_date_of_birth),
            CaseField::PatientAge => FieldValue::Number(self.patient_age),
            CaseField::PatientAddress => FieldValue::Text(self.patient_address.as_deref()),
            CaseField::WardOrClinic => FieldValue::Text(self.ward_or_clinic.as_deref()),
            CaseField::PatientGender => FieldValue::Text(Some(self.patient_gender.as_str())),
            CaseField::KnownAllergy => FieldValue::Text(Some(self.known_allergy.as_str())),
            CaseField::PregnancyStatus => FieldValue::Text(Some(self.pregnancy_status.as_str())),
            CaseField::PatientWeightKg => FieldValue::Number(self.patient_weight_kg),
            CaseField::PatientHeightCm => FieldValue::Number(self.patient_height_cm),
            CaseField::DateOfOnsetOfReaction => FieldValue::Date(self.date_of_onset_of_reaction),
            CaseField::DescriptionOfReaction => {
                FieldValue::Text(self.description_of_reaction.as_deref())
            }
            CaseField::Exposure(drug, part) => {
                let exposure = self.exposure(drug);
                match part {
                    ExposureField::Suspected => FieldValue::Flag(exposure.suspected),
                    ExposureField::StartDate => FieldValue::Date(exposure.start_date),
                    ExposureField::StopDate => FieldValue::Date(exposure.stop_date),
                    ExposureField::DoseAmount => FieldValue::Number(exposure.dose_amount),
                    ExposureField::FrequencyNumber => {
                        FieldValue::Number(exposure.frequency_number)
                    }
                    ExposureField::Route => FieldValue::Text(exposure.route),
                    ExposureField::BatchNo => FieldValue::Text(exposure.batch_no),
                    ExposureField::Manufacturer => FieldValue::Text(exposure.manufacturer),
                }
            }
            CaseField::Rechallenge => FieldValue::Text(Some(self.rechallenge.as_str())),
            CaseField::Dechallenge => FieldValue::Text(Some(self.dechallenge.as_str())),
            CaseField::Severity => FieldValue::Text(Some(self.severity.as_str())),
            CaseField::IsSerious => FieldValue::Text(Some(self.is_serious.as_str())),
            CaseField::CriteriaForSeriousness => {
                FieldValue::Text(Some(self.criteria_for_seriousness.as_str()))
            }
            CaseField::ActionTaken => FieldValue::Text(Some(self.action_taken.as_str())),
            CaseField::Outcome => FieldValue::Text(Some(self.outcome.as_str())),
            CaseField::Comments => FieldValue::Text(self.comments.as_deref()),
            CaseField::CreatedAt => FieldValue::Date(self.created_at),
        }
    }
}

/// Storage kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text (names, addresses, batch numbers).
    Text,
    /// Closed vocabulary from the reporting form.
    Categorical,
    Numeric,
    Date,
    Boolean,
}

/// A single field value read from a [`CaseRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
    Date(Option<NaiveDate>),
    Flag(Option<bool>),
}

/// Part of a drug exposure sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExposureField {
    Suspected,
    StartDate,
    StopDate,
    DoseAmount,
    FrequencyNumber,
    Route,
    BatchNo,
    Manufacturer,
}

impl ExposureField {
    pub const ALL: &'static [ExposureField] = &[
        ExposureField::Suspected,
        ExposureField::StartDate,
        ExposureField::StopDate,
        ExposureField::DoseAmount,
        ExposureField::FrequencyNumber,
        ExposureField::Route,
        ExposureField::BatchNo,
        ExposureField::Manufacturer,
    ];

    fn suffix(&self) -> &'static str {
        match self {
            ExposureField::Suspected => "suspected",
            ExposureField::StartDate => "start_date",
            ExposureField::StopDate => "stop_date",
            ExposureField::DoseAmount => "dose_amount",
            ExposureField::FrequencyNumber => "frequency_number",
            ExposureField::Route => "route",
            ExposureField::BatchNo => "batch_no",
            ExposureField::Manufacturer => "manufacturer",
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            ExposureField::Suspected => FieldKind::Boolean,
            ExposureField::StartDate | ExposureField::StopDate => FieldKind::Date,
            ExposureField::DoseAmount | ExposureField::FrequencyNumber => FieldKind::Numeric,
            ExposureField::Route | ExposureField::BatchNo | ExposureField::Manufacturer => {
                FieldKind::Text
            }
        }
    }
}

/// Raw field of a [`CaseRecord`], addressable by its column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseField {
    PatientName,
    InpatientOrOutpatientNumber,
    PatientDateOfBirth,
    PatientAge,
    PatientAddress,
    WardOrClinic,
    PatientGender,
    KnownAllergy,
    PregnancyStatus,
    PatientWeightKg,
    PatientHeightCm,
    DateOfOnsetOfReaction,
    DescriptionOfReaction,
    Exposure(Drug, ExposureField),
    Rechallenge,
    Dechallenge,
    Severity,
    IsSerious,
    CriteriaForSeriousness,
    ActionTaken,
    Outcome,
    Comments,
    CreatedAt,
}

impl CaseField {
    /// All raw fields in report order.
    pub fn all() -> Vec<CaseField> {
        let mut fields = vec![
            CaseField::PatientName,
            CaseField::InpatientOrOutpatientNumber,
            CaseField::PatientDateOfBirth,
            CaseField::PatientAge,
            CaseField::PatientAddress,
            CaseField::WardOrClinic,
            CaseField::PatientGender,
            CaseField::KnownAllergy,
            CaseField::PregnancyStatus,
            CaseField::PatientWeightKg,
            CaseField::PatientHeightCm,
            CaseField::DateOfOnsetOfReaction,
            CaseField::DescriptionOfReaction,
        ];
        for drug in Drug::ALL {
            for part in ExposureField::ALL {
                fields.push(CaseField::Exposure(*drug, *part));
            }
        }
        fields.extend([
            CaseField::Rechallenge,
            CaseField::Dechallenge,
            CaseField::Severity,
            CaseField::IsSerious,
            CaseField::CriteriaForSeriousness,
            CaseField::ActionTaken,
            CaseField::Outcome,
            CaseField::Comments,
            CaseField::CreatedAt,
        ]);
        fields
    }

    /// Column name used in exports and artifact metadata.
    pub fn name(&self) -> String {
        let name = match self {
            CaseField::PatientName => "patient_name",
            CaseField::InpatientOrOutpatientNumber => "inpatient_or_outpatient_number",
            CaseField::PatientDateOfBirth => "patient_date_of_birth",
            CaseField::PatientAge => "patient_age",
            CaseField::PatientAddress => "patient_address",
            CaseField::WardOrClinic => "ward_or_clinic",
            CaseField::PatientGender => "patient_gender",
            CaseField::KnownAllergy => "known_allergy",
            CaseField::PregnancyStatus => "pregnancy_status",
            CaseField::PatientWeightKg => "patient_weight_kg",
            CaseField::PatientHeightCm => "patient_height_cm",
            CaseField::DateOfOnsetOfReaction => "date_of_onset_of_reaction",
            CaseField::DescriptionOfReaction => "description_of_reaction",
            CaseField::Exposure(drug, part) => {
                return format!("{}_{}", drug.as_str(), part.suffix());
            }
            CaseField::Rechallenge => "rechallenge",
            CaseField::Dechallenge => "dechallenge",
            CaseField::Severity => "severity",
            CaseField::IsSerious => "is_serious",
            CaseField::CriteriaForSeriousness => "criteria_for_seriousness",
            CaseField::ActionTaken => "action_taken",
            CaseField::Outcome => "outcome",
            CaseField::Comments => "comments",
            CaseField::CreatedAt => "created_at",
        };
        name.to_string()
    }

    pub fn from_name(name: &str) -> Option<CaseField> {
        Self::all().into_iter().find(|field| field.name() == name)
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            CaseField::PatientName
            | CaseField::InpatientOrOutpatientNumber
            | CaseField::PatientAddress
            | CaseField::WardOrClinic
            | CaseField::DescriptionOfReaction
            | CaseField::Comments => FieldKind::Text,
            CaseField::PatientDateOfBirth
            | CaseField::DateOfOnsetOfReaction
            | CaseField::CreatedAt => FieldKind::Date,
            CaseField::PatientAge | CaseField::PatientWeightKg | CaseField::PatientHeightCm => {
                FieldKind::Numeric
            }
            CaseField::Exposure(_, part) => part.kind(),
            CaseField::PatientGender
            | CaseField::KnownAllergy
            | CaseField::PregnancyStatus
            | CaseField::Rechallenge
            | CaseField::Dechallenge
            | CaseField::Severity
            | CaseField::IsSerious
            | CaseField::CriteriaForSeriousness
            | CaseField::ActionTaken
            | CaseField::Outcome => FieldKind::Categorical,
        }
    }
}

/// Feature computed from raw fields rather than read from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedField {
    NumSuspectedDrugs,
    PatientBmi,
    /// Days from drug start to reaction onset.
    StartToOnsetDays(Drug),
    /// Days from drug stop to reaction onset.
    StopToOnsetDays(Drug),
    /// Days between drug start and stop.
    StartStopDifference(Drug),
}

impl DerivedField {
    pub fn all() -> Vec<DerivedField> {
        let mut fields = vec![DerivedField::NumSuspectedDrugs, DerivedField::PatientBmi];
        for drug in Drug::ALL {
            fields.push(DerivedField::StartToOnsetDays(*drug));
            fields.push(DerivedField::StopToOnsetDays(*drug));
            fields.push(DerivedField::StartStopDifference(*drug));
        }
        fields
    }

    pub fn name(&self) -> String {
        match self {
            DerivedField::NumSuspectedDrugs => "num_suspected_drugs".to_string(),
            DerivedField::PatientBmi => "patient_bmi".to_string(),
            DerivedField::StartToOnsetDays(drug) => format!("{}_start_to_onset_days", drug.as_str()),
            DerivedField::StopToOnsetDays(drug) => format!("{}_stop_to_onset_days", drug.as_str()),
            DerivedField::StartStopDifference(drug) => {
                format!("{}_start_stop_difference", drug.as_str())
            }
        }
    }

    pub fn from_name(name: &str) -> Option<DerivedField> {
        Self::all().into_iter().find(|field| field.name() == name)
    }
}

/// Returns the kind of a raw or derived column, or `None` for unknown names.
pub fn column_kind(name: &str) -> Option<FieldKind> {
    if let Some(field) = CaseField::from_name(name) {
        return Some(field.kind());
    }
    DerivedField::from_name(name).map(|_| FieldKind::Numeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_round_trip() {
        for field in CaseField::all() {
            assert_eq!(CaseField::from_name(&field.name()), Some(field));
        }
        for field in DerivedField::all() {
            assert_eq!(DerivedField::from_name(&field.name()), Some(field));
        }
    }

    #[test]
    fn exposure_names_follow_drug_prefix() {
        let field = CaseField::Exposure(Drug::Pyrazinamide, ExposureField::StopDate);
        assert_eq!(field.name(), "pyrazinamide_stop_date");
        assert_eq!(field.kind(), FieldKind::Date);
        assert_eq!(
            DerivedField::StartStopDifference(Drug::Ethambutol).name(),
            "ethambutol_start_stop_difference"
        );
    }

    #[test]
    fn column_kind_covers_raw_and_derived() {
        assert_eq!(column_kind("rifampicin_suspected"), Some(FieldKind::Boolean));
        assert_eq!(column_kind("patient_bmi"), Some(FieldKind::Numeric));
        assert_eq!(column_kind("rechallenge"), Some(FieldKind::Categorical));
        assert_eq!(column_kind("patient_shoe_size"), None);
    }
}
