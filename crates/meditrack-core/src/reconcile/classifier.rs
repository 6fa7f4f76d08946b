//! Partition prescriptions into the session user's own and everyone else's.

use serde::{Deserialize, Serialize};

use crate::models::{valid_prescriptions, Identity, Prescription, PrescriptionRecord};

/// Valid prescriptions split by ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Partition {
    /// Owned by the session identity, most recent first
    pub mine: Vec<Prescription>,
    /// Everything else, in backend order
    pub others: Vec<Prescription>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.mine.len() + self.others.len()
    }
}

/// Check if a prescription belongs to the given identity.
///
/// The stable patient ID decides when both sides carry one. Otherwise the
/// trimmed, lower-cased patient name must equal the identity's name, which
/// conflates patients who share a display name.
pub fn is_owned_by(prescription: &Prescription, identity: &Identity) -> bool {
    match prescription.patient_id.as_deref() {
        Some(patient_id) if !patient_id.is_empty() && !identity.id.is_empty() => {
            patient_id == identity.id
        }
        _ => prescription.patient_key() == identity.name_key(),
    }
}

/// Classify raw backend records relative to the session identity.
///
/// Malformed records are dropped first. Without an identity every valid
/// prescription lands in `others`.
pub fn classify(records: &[PrescriptionRecord], identity: Option<&Identity>) -> Partition {
    partition(valid_prescriptions(records), identity)
}

/// Partition already-validated prescriptions.
pub fn partition(prescriptions: Vec<Prescription>, identity: Option<&Identity>) -> Partition {
    let Some(identity) = identity else {
        return Partition {
            mine: Vec::new(),
            others: prescriptions,
        };
    };

    let (mut mine, others): (Vec<_>, Vec<_>) = prescriptions
        .into_iter()
        .partition(|p| is_owned_by(p, identity));

    // Stable: timestamps collide at second resolution, ties keep input order.
    // Missing timestamps sort last.
    mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Partition { mine, others }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoctorRef, MedicineLine, Role};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, patient: &str, day: (i32, u32, u32)) -> PrescriptionRecord {
        PrescriptionRecord {
            id: Some(id.into()),
            doctor_id: Some(DoctorRef {
                id: Some("d1".into()),
                name: Some("Dr. Rao".into()),
            }),
            patient_name: Some(patient.into()),
            medicines: Some(vec![MedicineLine::new("Aspirin", "75mg", "")]),
            created_at: Some(Utc.with_ymd_and_hms(day.0, day.1, day.2, 9, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    fn ids(prescriptions: &[Prescription]) -> Vec<&str> {
        prescriptions.iter().filter_map(|p| p.id.as_deref()).collect()
    }

    #[test]
    fn test_mine_sorted_most_recent_first() {
        let records = vec![
            record("t1", "Asha", (2024, 1, 1)),
            record("t2", "Asha", (2024, 3, 1)),
            record("t3", "Asha", (2024, 2, 1)),
        ];
        let asha = Identity::new("u1", "Asha", Role::Patient);

        let result = classify(&records, Some(&asha));
        assert_eq!(ids(&result.mine), vec!["t2", "t3", "t1"]);
        assert!(result.others.is_empty());
    }

    #[test]
    fn test_name_match_trims_and_ignores_case() {
        let records = vec![record("p1", "  asha ", (2024, 1, 1))];
        let asha = Identity::new("u1", "ASHA", Role::Patient);
        assert_eq!(classify(&records, Some(&asha)).mine.len(), 1);
    }

    #[test]
    fn test_others_keep_backend_order() {
        let records = vec![
            record("o1", "Ben", (2024, 1, 1)),
            record("m1", "Asha", (2024, 1, 5)),
            record("o2", "Chen", (2024, 6, 1)),
            record("o3", "Ben", (2023, 1, 1)),
        ];
        let asha = Identity::new("u1", "Asha", Role::Patient);

        let result = classify(&records, Some(&asha));
        assert_eq!(ids(&result.mine), vec!["m1"]);
        assert_eq!(ids(&result.others), vec!["o1", "o2", "o3"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            record("a", "Asha", (2024, 1, 1)),
            record("b", "Asha", (2024, 1, 1)),
            record("c", "Asha", (2024, 1, 1)),
        ];
        let asha = Identity::new("u1", "Asha", Role::Patient);
        assert_eq!(ids(&classify(&records, Some(&asha)).mine), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_timestamp_sorts_last() {
        let mut undated = record("undated", "Asha", (2024, 1, 1));
        undated.created_at = None;
        let records = vec![undated, record("dated", "Asha", (2020, 1, 1))];
        let asha = Identity::new("u1", "Asha", Role::Patient);
        assert_eq!(ids(&classify(&records, Some(&asha)).mine), vec!["dated", "undated"]);
    }

    #[test]
    fn test_no_identity_puts_everything_in_others() {
        let records = vec![record("p1", "Asha", (2024, 1, 1)), record("p2", "Ben", (2024, 1, 2))];
        let result = classify(&records, None);
        assert!(result.mine.is_empty());
        assert_eq!(ids(&result.others), vec!["p1", "p2"]);
    }

    #[test]
    fn test_malformed_records_excluded() {
        let mut no_doctor = record("bad1", "Asha", (2024, 1, 1));
        no_doctor.doctor_id = None;
        let mut no_lines = record("bad2", "Ben", (2024, 1, 1));
        no_lines.medicines = Some(vec![]);
        let records = vec![no_doctor, no_lines, record("ok", "Ben", (2024, 1, 1))];
        let asha = Identity::new("u1", "Asha", Role::Patient);

        let result = classify(&records, Some(&asha));
        assert_eq!(result.total(), 1);
        assert_eq!(ids(&result.others), vec!["ok"]);
    }

    #[test]
    fn test_patient_id_takes_precedence_over_name() {
        let mut namesake = record("namesake", "Asha", (2024, 1, 1));
        namesake.patient_id = Some("u2".into());
        let mut own = record("own", "Asha", (2024, 1, 2));
        own.patient_id = Some("u1".into());
        let legacy = record("legacy", "Asha", (2024, 1, 3));

        let asha = Identity::new("u1", "Asha", Role::Patient);
        let result = classify(&[namesake, own, legacy], Some(&asha));
        assert_eq!(ids(&result.mine), vec!["legacy", "own"]);
        assert_eq!(ids(&result.others), vec!["namesake"]);
    }
}
