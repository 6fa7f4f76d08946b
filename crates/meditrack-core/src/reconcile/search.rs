//! Free-text search over prescriptions and medicines.
//!
//! Matching is case-insensitive substring containment over a fixed field set
//! per view. No tokenizing, no edit distance.

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

use crate::models::{Medicine, Prescription};

/// Display pattern for creation timestamps (`3/1/2024, 10:15:00 AM`).
pub const DEFAULT_TIMESTAMP_PATTERN: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Timezone a viewer reads timestamps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerZone {
    Local,
    Fixed(FixedOffset),
}

/// How creation timestamps are rendered, and therefore searched.
///
/// The same instant formats differently per zone, so a query can match for
/// one viewer and not another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFormat {
    zone: ViewerZone,
    pattern: String,
}

impl Default for TimestampFormat {
    fn default() -> Self {
        Self::local()
    }
}

impl TimestampFormat {
    /// The machine's local timezone.
    pub fn local() -> Self {
        Self {
            zone: ViewerZone::Local,
            pattern: DEFAULT_TIMESTAMP_PATTERN.to_string(),
        }
    }

    pub fn utc() -> Self {
        Self::fixed(Utc.fix())
    }

    pub fn fixed(offset: FixedOffset) -> Self {
        Self {
            zone: ViewerZone::Fixed(offset),
            pattern: DEFAULT_TIMESTAMP_PATTERN.to_string(),
        }
    }

    /// Replace the strftime pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn format(&self, instant: &DateTime<Utc>) -> String {
        match self.zone {
            ViewerZone::Local => instant
                .with_timezone(&Local)
                .format(&self.pattern)
                .to_string(),
            ViewerZone::Fixed(offset) => instant
                .with_timezone(&offset)
                .format(&self.pattern)
                .to_string(),
        }
    }

    /// Format an optional timestamp; missing ones render empty.
    pub fn format_opt(&self, instant: Option<&DateTime<Utc>>) -> String {
        instant.map(|i| self.format(i)).unwrap_or_default()
    }
}

/// Which dashboard a prescription search runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrescriptionScope {
    /// Doctor name, medicine names, creation time
    Patient,
    /// Patient name, creation time
    Doctor,
    /// Patient name, doctor name, medicine names
    Pharmacy,
}

/// A search query, lower-cased once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }

    /// An empty query matches every record.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches_text(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    pub fn matches_prescription(
        &self,
        prescription: &Prescription,
        scope: PrescriptionScope,
        timestamps: &TimestampFormat,
    ) -> bool {
        if self.is_empty() {
            return true;
        }

        let any_medicine = || prescription.medicine_names().any(|n| self.matches_text(n));
        let created = || {
            prescription
                .created_at
                .as_ref()
                .is_some_and(|t| self.matches_text(&timestamps.format(t)))
        };

        match scope {
            PrescriptionScope::Patient => {
                self.matches_text(&prescription.doctor_name) || any_medicine() || created()
            }
            PrescriptionScope::Doctor => {
                self.matches_text(&prescription.patient_name) || created()
            }
            PrescriptionScope::Pharmacy => {
                self.matches_text(&prescription.patient_name)
                    || self.matches_text(&prescription.doctor_name)
                    || any_medicine()
            }
        }
    }

    pub fn matches_medicine(&self, medicine: &Medicine) -> bool {
        self.is_empty() || self.matches_text(&medicine.name)
    }
}

/// Prescriptions matching `query` in the given scope, in input order.
pub fn filter_prescriptions<'a>(
    prescriptions: &'a [Prescription],
    query: &str,
    scope: PrescriptionScope,
    timestamps: &TimestampFormat,
) -> Vec<&'a Prescription> {
    let query = SearchQuery::new(query);
    prescriptions
        .iter()
        .filter(|p| query.matches_prescription(p, scope, timestamps))
        .collect()
}

/// Medicines whose name contains `query`, in input order.
pub fn filter_medicines<'a>(medicines: &'a [Medicine], query: &str) -> Vec<&'a Medicine> {
    let query = SearchQuery::new(query);
    medicines
        .iter()
        .filter(|m| query.matches_medicine(m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicineLine;
    use chrono::TimeZone;

    fn prescription() -> Prescription {
        Prescription {
            id: Some("p1".into()),
            doctor_id: Some("d1".into()),
            doctor_name: "Dr. Meera Rao".into(),
            patient_name: "Asha Kumar".into(),
            patient_id: None,
            medicines: vec![
                MedicineLine::new("Paracetamol", "500mg", "after food"),
                MedicineLine::new("Cetirizine", "10mg", "at night"),
            ],
            uploaded_file: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()),
        }
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let p = prescription();
        let utc = TimestampFormat::utc();
        for scope in [PrescriptionScope::Patient, PrescriptionScope::Doctor, PrescriptionScope::Pharmacy] {
            assert!(SearchQuery::new("").matches_prescription(&p, scope, &utc));
        }
    }

    #[test]
    fn test_patient_scope_fields() {
        let p = prescription();
        let utc = TimestampFormat::utc();
        let scope = PrescriptionScope::Patient;

        assert!(SearchQuery::new("MEERA").matches_prescription(&p, scope, &utc));
        assert!(SearchQuery::new("cetiri").matches_prescription(&p, scope, &utc));
        assert!(SearchQuery::new("3/1/2024").matches_prescription(&p, scope, &utc));
        // Patient name is not searched in the patient view
        assert!(!SearchQuery::new("asha").matches_prescription(&p, scope, &utc));
    }

    #[test]
    fn test_doctor_scope_fields() {
        let p = prescription();
        let utc = TimestampFormat::utc();
        let scope = PrescriptionScope::Doctor;

        assert!(SearchQuery::new("kumar").matches_prescription(&p, scope, &utc));
        assert!(SearchQuery::new("10:15:00 am").matches_prescription(&p, scope, &utc));
        assert!(!SearchQuery::new("paracetamol").matches_prescription(&p, scope, &utc));
        assert!(!SearchQuery::new("meera").matches_prescription(&p, scope, &utc));
    }

    #[test]
    fn test_pharmacy_scope_fields() {
        let p = prescription();
        let utc = TimestampFormat::utc();
        let scope = PrescriptionScope::Pharmacy;

        assert!(SearchQuery::new("asha").matches_prescription(&p, scope, &utc));
        assert!(SearchQuery::new("rao").matches_prescription(&p, scope, &utc));
        assert!(SearchQuery::new("PARA").matches_prescription(&p, scope, &utc));
        assert!(!SearchQuery::new("2024").matches_prescription(&p, scope, &utc));
    }

    #[test]
    fn test_timestamp_depends_on_viewer_zone() {
        let p = prescription();
        let ist = TimestampFormat::fixed(FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        let utc = TimestampFormat::utc();
        let query = SearchQuery::new("3:45:00 pm");

        assert!(query.matches_prescription(&p, PrescriptionScope::Doctor, &ist));
        assert!(!query.matches_prescription(&p, PrescriptionScope::Doctor, &utc));
    }

    #[test]
    fn test_missing_timestamp_never_matches_date_query() {
        let mut p = prescription();
        p.created_at = None;
        let utc = TimestampFormat::utc();
        assert!(!SearchQuery::new("2024").matches_prescription(&p, PrescriptionScope::Doctor, &utc));
        assert_eq!(utc.format_opt(None), "");
    }

    #[test]
    fn test_filter_medicines() {
        let medicines = vec![
            Medicine::new("m1", "Paracetamol", 5),
            Medicine::new("m2", "Amoxicillin", 0),
            Medicine::new("m3", "Para-aminosalicylic acid", 1),
        ];
        let hits: Vec<&str> = filter_medicines(&medicines, "PARA")
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(hits, vec!["m1", "m3"]);
        assert_eq!(filter_medicines(&medicines, "").len(), 3);
    }
}
