//! Prescription draft builder.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Identity, MedicineLine, Role};

/// Reasons a draft cannot be submitted. All are raised before any request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Doctor not logged in")]
    NotAuthenticated,

    #[error("Enter patient name")]
    EmptyPatientName,

    #[error("Add at least one medicine")]
    NoValidMedicines,

    #[error("Unknown medicine field: {0}")]
    UnknownField(String),
}

/// Editable field of a draft line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Name,
    Dosage,
    Instructions,
}

impl FromStr for LineField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(LineField::Name),
            "dosage" => Ok(LineField::Dosage),
            "instructions" => Ok(LineField::Instructions),
            other => Err(DraftError::UnknownField(other.to_string())),
        }
    }
}

/// A file attached to the draft (e.g. a scan of a handwritten prescription).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Everything needed for the multipart `POST /api/prescriptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrescriptionSubmission {
    pub doctor_id: String,
    /// Trimmed
    pub patient_name: String,
    /// Only lines with a name, in draft order
    pub medicines: Vec<MedicineLine>,
    #[serde(skip)]
    pub attachment: Option<Attachment>,
}

impl PrescriptionSubmission {
    /// The `medicines` form field.
    pub fn medicines_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.medicines)
    }
}

/// An unsaved prescription being assembled by a doctor.
///
/// Starts with one blank line. Lines can be removed down to zero; the
/// submission check rejects drafts with no named line.
#[derive(Debug, Clone)]
pub struct PrescriptionDraft {
    draft_id: String,
    patient_name: String,
    lines: Vec<MedicineLine>,
    attachment: Option<Attachment>,
}

impl Default for PrescriptionDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl PrescriptionDraft {
    pub fn new() -> Self {
        Self {
            draft_id: uuid::Uuid::new_v4().to_string(),
            patient_name: String::new(),
            lines: vec![MedicineLine::default()],
            attachment: None,
        }
    }

    /// Local ID for log correlation; changes on every reset.
    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn set_patient_name(&mut self, name: impl Into<String>) {
        self.patient_name = name.into();
    }

    pub fn lines(&self) -> &[MedicineLine] {
        &self.lines
    }

    /// Append a blank line.
    pub fn add_line(&mut self) {
        self.lines.push(MedicineLine::default());
    }

    /// Remove the line at `index`. Out of range is a no-op returning false.
    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        true
    }

    /// Update one field of one line. Out of range is a no-op returning false.
    pub fn set_field(&mut self, index: usize, field: LineField, value: impl Into<String>) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        let value = value.into();
        match field {
            LineField::Name => line.name = value,
            LineField::Dosage => line.dosage = value,
            LineField::Instructions => line.instructions = value,
        }
        true
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.attachment = Some(attachment);
    }

    pub fn detach(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Lines that will be submitted.
    pub fn valid_lines(&self) -> impl Iterator<Item = &MedicineLine> {
        self.lines.iter().filter(|line| line.has_name())
    }

    /// Validate the draft and build the submission payload.
    ///
    /// Blank lines are dropped rather than failing the submission.
    pub fn prepare(&self, doctor: Option<&Identity>) -> Result<PrescriptionSubmission, DraftError> {
        let doctor = doctor
            .filter(|d| d.has_role(Role::Doctor) && !d.id.is_empty())
            .ok_or(DraftError::NotAuthenticated)?;

        let patient_name = self.patient_name.trim();
        if patient_name.is_empty() {
            return Err(DraftError::EmptyPatientName);
        }

        let medicines: Vec<MedicineLine> = self.valid_lines().cloned().collect();
        if medicines.is_empty() {
            return Err(DraftError::NoValidMedicines);
        }

        Ok(PrescriptionSubmission {
            doctor_id: doctor.id.clone(),
            patient_name: patient_name.to_string(),
            medicines,
            attachment: self.attachment.clone(),
        })
    }

    /// Back to a single blank line with no patient or attachment.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
