//! Doctor dashboard: write prescriptions and review the ones already issued.

use meditrack_core::models::valid_prescriptions;
use meditrack_core::reconcile::filter_prescriptions;
use meditrack_core::{Identity, Prescription, PrescriptionDraft, PrescriptionScope, Role, TimestampFormat};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::scope::{ScopeHandle, ViewScope};

/// Progress of the last submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Submitted {
        id: String,
    },
    Failed(String),
}

pub struct DoctorDashboard {
    api: ApiClient,
    identity: Option<Identity>,
    timestamps: TimestampFormat,
    scope: ViewScope,
    draft: PrescriptionDraft,
    prescriptions: Vec<Prescription>,
    status: SubmissionStatus,
}

impl DoctorDashboard {
    pub fn new(api: ApiClient, identity: Option<Identity>, timestamps: TimestampFormat) -> Self {
        Self {
            api,
            identity,
            timestamps,
            scope: ViewScope::new("doctor"),
            draft: PrescriptionDraft::new(),
            prescriptions: Vec::new(),
            status: SubmissionStatus::Idle,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    fn doctor_id(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .filter(|i| i.has_role(Role::Doctor) && !i.id.is_empty())
            .map(|i| i.id.as_str())
    }

    /// Refetch this doctor's prescriptions.
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let doctor_id = self
            .doctor_id()
            .ok_or(ClientError::NotAuthenticated("doctor"))?;
        let records = self
            .scope
            .run(self.api.list_prescriptions(Some(doctor_id)))
            .await?;
        self.prescriptions = valid_prescriptions(&records);
        debug!(count = self.prescriptions.len(), "doctor prescriptions loaded");
        Ok(())
    }

    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    /// Issued prescriptions matching `query` on patient name or creation time.
    pub fn search(&self, query: &str) -> Vec<&Prescription> {
        filter_prescriptions(
            &self.prescriptions,
            query,
            PrescriptionScope::Doctor,
            &self.timestamps,
        )
    }

    pub fn format_created(&self, prescription: &Prescription) -> String {
        self.timestamps.format_opt(prescription.created_at.as_ref())
    }

    pub fn draft(&self) -> &PrescriptionDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PrescriptionDraft {
        &mut self.draft
    }

    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Send the draft. On acknowledgement the draft is reset and the list
    /// refetched; on any failure the draft is kept for correction.
    pub async fn submit(&mut self) -> ClientResult<String> {
        let submission = match self.draft.prepare(self.identity.as_ref()) {
            Ok(submission) => submission,
            Err(e) => {
                let e = ClientError::from(e);
                self.status = SubmissionStatus::Failed(e.user_message());
                return Err(e);
            }
        };

        self.status = SubmissionStatus::Submitting;
        match self.scope.run(self.api.create_prescription(&submission)).await {
            Ok(id) => {
                self.draft.reset();
                self.status = SubmissionStatus::Submitted { id: id.clone() };
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "refresh after submission failed");
                }
                Ok(id)
            }
            Err(ClientError::Cancelled) => {
                self.status = SubmissionStatus::Idle;
                Err(ClientError::Cancelled)
            }
            Err(e) => {
                self.status = SubmissionStatus::Failed(e.user_message());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meditrack_core::LineField;

    fn dashboard(identity: Option<Identity>) -> DoctorDashboard {
        // Unroutable; these tests must fail before any request is made.
        let api = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        DoctorDashboard::new(api, identity, TimestampFormat::utc())
    }

    #[tokio::test]
    async fn test_submit_without_doctor_is_blocked_locally() {
        let mut view = dashboard(Some(Identity::new("p1", "Asha", Role::Patient)));
        view.draft_mut().set_patient_name("Asha");
        view.draft_mut().set_field(0, LineField::Name, "Ibuprofen");

        let err = view.submit().await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            view.status(),
            &SubmissionStatus::Failed("Doctor not logged in".into())
        );
    }

    #[tokio::test]
    async fn test_submit_with_blank_patient_keeps_draft() {
        let mut view = dashboard(Some(Identity::new("d1", "Dr. Rao", Role::Doctor)));
        view.draft_mut().set_patient_name("   ");
        view.draft_mut().set_field(0, LineField::Name, "Ibuprofen");

        let err = view.submit().await.unwrap_err();
        assert!(matches!(err, ClientError::Draft(_)));
        assert_eq!(view.draft().lines()[0].name, "Ibuprofen");
    }

    #[tokio::test]
    async fn test_refresh_requires_doctor() {
        let mut view = dashboard(None);
        let err = view.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated("doctor")));
    }
}
