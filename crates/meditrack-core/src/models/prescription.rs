//! Prescription models.
//!
//! [`PrescriptionRecord`] mirrors whatever the backend returns. Only records
//! that pass [`PrescriptionRecord::validate`] become a [`Prescription`] and
//! reach any view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::normalize_name;
use super::wire;

/// One medicine entry on a prescription.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicineLine {
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub dosage: String,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub instructions: String,
}

impl MedicineLine {
    /// Create a line with all fields set.
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            instructions: instructions.into(),
        }
    }

    /// Check if the line names a medicine (blank lines are never submitted).
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Populated reference to the prescribing doctor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorRef {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A prescription exactly as the backend returned it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRecord {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "wire::doctor_ref")]
    pub doctor_id: Option<DoctorRef>,
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Stable patient identifier, when the backend provides one
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub medicines: Option<Vec<MedicineLine>>,
    #[serde(default)]
    pub uploaded_file: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A well-formed prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub id: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: String,
    pub patient_name: String,
    pub patient_id: Option<String>,
    /// Never empty
    pub medicines: Vec<MedicineLine>,
    pub uploaded_file: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PrescriptionRecord {
    /// Check the structural requirements: doctor name, non-blank patient
    /// name and at least one medicine line.
    pub fn is_valid(&self) -> bool {
        let has_doctor = self
            .doctor_id
            .as_ref()
            .and_then(|d| d.name.as_deref())
            .is_some_and(|name| !name.is_empty());
        let has_patient = self
            .patient_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        let has_medicines = self.medicines.as_ref().is_some_and(|m| !m.is_empty());

        has_doctor && has_patient && has_medicines
    }

    /// Convert to a [`Prescription`], or `None` if the record is malformed.
    pub fn validate(&self) -> Option<Prescription> {
        if !self.is_valid() {
            return None;
        }
        let doctor = self.doctor_id.as_ref()?;

        Some(Prescription {
            id: self.id.clone(),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.name.clone()?,
            patient_name: self.patient_name.clone()?,
            patient_id: self.patient_id.clone(),
            medicines: self.medicines.clone()?,
            uploaded_file: self.uploaded_file.clone(),
            created_at: self.created_at,
        })
    }
}

impl Prescription {
    /// Patient name key used for ownership comparisons.
    pub fn patient_key(&self) -> String {
        normalize_name(&self.patient_name)
    }

    /// Names of all prescribed medicines, in order.
    pub fn medicine_names(&self) -> impl Iterator<Item = &str> {
        self.medicines.iter().map(|m| m.name.as_str())
    }
}

/// Keep only well-formed prescriptions, preserving order.
pub fn valid_prescriptions(records: &[PrescriptionRecord]) -> Vec<Prescription> {
    let valid: Vec<Prescription> = records.iter().filter_map(|r| r.validate()).collect();
    if valid.len() < records.len() {
        tracing::debug!(
            discarded = records.len() - valid.len(),
            "discarded malformed prescriptions"
        );
    }
    valid
}
