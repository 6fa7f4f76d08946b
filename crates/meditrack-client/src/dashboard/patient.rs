//! Patient dashboard: own prescriptions with stock availability.

use meditrack_core::models::valid_prescriptions;
use meditrack_core::reconcile::{partition, SearchQuery};
use meditrack_core::{
    Identity, Partition, Prescription, PrescriptionScope, StockAudience, StockIndex, StockStatus,
    TimestampFormat,
};
use tracing::debug;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::scope::{ScopeHandle, ViewScope};

pub struct PatientDashboard {
    api: ApiClient,
    identity: Option<Identity>,
    timestamps: TimestampFormat,
    scope: ViewScope,
    prescriptions: Partition,
    stock: StockIndex,
    query: String,
}

impl PatientDashboard {
    pub fn new(api: ApiClient, identity: Option<Identity>, timestamps: TimestampFormat) -> Self {
        Self {
            api,
            identity,
            timestamps,
            scope: ViewScope::new("patient"),
            prescriptions: Partition::default(),
            stock: StockIndex::default(),
            query: String::new(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Fetch prescriptions and inventory concurrently.
    ///
    /// Each response fills its own slot, so one failing does not discard
    /// the other. The first error is returned.
    pub async fn load(&mut self) -> ClientResult<()> {
        let api = &self.api;
        let (records, medicines) = self
            .scope
            .run(async {
                Ok::<_, ClientError>(tokio::join!(
                    api.list_prescriptions(None),
                    api.list_medicines()
                ))
            })
            .await?;

        let mut first_error = None;
        match records {
            Ok(records) => {
                self.prescriptions =
                    partition(valid_prescriptions(&records), self.identity.as_ref());
                debug!(
                    mine = self.prescriptions.mine.len(),
                    others = self.prescriptions.others.len(),
                    "patient prescriptions loaded"
                );
            }
            Err(e) => first_error = Some(e),
        }
        match medicines {
            Ok(medicines) => self.stock = StockIndex::build(&medicines),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Own prescriptions matching the current query, most recent first.
    pub fn mine(&self) -> Vec<&Prescription> {
        let query = SearchQuery::new(&self.query);
        self.prescriptions
            .mine
            .iter()
            .filter(|p| query.matches_prescription(p, PrescriptionScope::Patient, &self.timestamps))
            .collect()
    }

    /// Everyone else's valid prescriptions, unfiltered.
    pub fn others(&self) -> &[Prescription] {
        &self.prescriptions.others
    }

    pub fn stock(&self, medicine_name: &str) -> StockStatus {
        self.stock.lookup(medicine_name)
    }

    pub fn stock_label(&self, medicine_name: &str) -> String {
        self.stock(medicine_name).label(StockAudience::Patient)
    }

    pub fn format_created(&self, prescription: &Prescription) -> String {
        self.timestamps.format_opt(prescription.created_at.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dashboard() {
        let api = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        let view = PatientDashboard::new(api, None, TimestampFormat::utc());
        assert!(view.mine().is_empty());
        assert!(view.others().is_empty());
        assert_eq!(view.stock_label("Paracetamol"), "Not in database");
    }
}
