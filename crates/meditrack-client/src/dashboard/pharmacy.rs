//! Pharmacy dashboard: inventory management and prescription cross-reference.

use meditrack_core::models::valid_prescriptions;
use meditrack_core::reconcile::{filter_medicines, filter_prescriptions};
use meditrack_core::{
    Identity, Medicine, MedicineForm, Prescription, PrescriptionScope, StockAudience, StockIndex,
    StockStatus, TimestampFormat,
};
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::scope::{ScopeHandle, ViewScope};

pub struct PharmacyDashboard {
    api: ApiClient,
    identity: Option<Identity>,
    timestamps: TimestampFormat,
    scope: ViewScope,
    medicines: Vec<Medicine>,
    stock: StockIndex,
    prescriptions: Vec<Prescription>,
    form: MedicineForm,
    medicine_query: String,
    prescription_query: String,
    show_prescriptions: bool,
}

impl PharmacyDashboard {
    pub fn new(api: ApiClient, identity: Option<Identity>, timestamps: TimestampFormat) -> Self {
        Self {
            api,
            identity,
            timestamps,
            scope: ViewScope::new("pharmacy"),
            medicines: Vec::new(),
            stock: StockIndex::default(),
            prescriptions: Vec::new(),
            form: MedicineForm::default(),
            medicine_query: String::new(),
            prescription_query: String::new(),
            show_prescriptions: false,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn scope_handle(&self) -> ScopeHandle {
        self.scope.handle()
    }

    /// Fetch inventory and prescriptions concurrently. Returns the first
    /// error after applying whichever response succeeded.
    pub async fn load(&mut self) -> ClientResult<()> {
        let api = &self.api;
        let (medicines, records) = self
            .scope
            .run(async {
                Ok::<_, ClientError>(tokio::join!(
                    api.list_medicines(),
                    api.list_prescriptions(None)
                ))
            })
            .await?;

        let mut first_error = None;
        match medicines {
            Ok(medicines) => self.set_medicines(medicines),
            Err(e) => first_error = Some(e),
        }
        match records {
            Ok(records) => self.prescriptions = valid_prescriptions(&records),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Refetch the inventory and rebuild the stock index from it.
    pub async fn reload_medicines(&mut self) -> ClientResult<()> {
        let medicines = self.scope.run(self.api.list_medicines()).await?;
        self.set_medicines(medicines);
        Ok(())
    }

    fn set_medicines(&mut self, medicines: Vec<Medicine>) {
        self.stock = StockIndex::build(&medicines);
        self.medicines = medicines;
        debug!(count = self.medicines.len(), "inventory loaded");
    }

    pub fn medicines(&self) -> &[Medicine] {
        &self.medicines
    }

    pub fn prescriptions(&self) -> &[Prescription] {
        &self.prescriptions
    }

    pub fn form(&self) -> &MedicineForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut MedicineForm {
        &mut self.form
    }

    /// Validate the form and create the medicine. On success the inventory
    /// is reloaded and the form cleared; on failure the inputs are kept.
    pub async fn add_medicine(&mut self) -> ClientResult<()> {
        let medicine = self.form.validate()?;
        self.scope.run(self.api.add_medicine(&medicine)).await?;
        self.form.clear();
        self.reload_medicines().await
    }

    /// Delete a medicine, then reload the inventory whatever the outcome.
    pub async fn delete_medicine(&mut self, id: &str) -> ClientResult<()> {
        let deleted = self.scope.run(self.api.delete_medicine(id)).await;
        if matches!(deleted, Err(ClientError::Cancelled)) {
            return deleted;
        }
        if let Err(e) = &deleted {
            warn!(medicine_id = id, error = %e, "delete failed, reloading anyway");
        }
        let reloaded = self.reload_medicines().await;
        deleted.and(reloaded)
    }

    pub fn set_medicine_query(&mut self, query: impl Into<String>) {
        self.medicine_query = query.into();
    }

    pub fn set_prescription_query(&mut self, query: impl Into<String>) {
        self.prescription_query = query.into();
    }

    /// Inventory rows whose name matches the medicine query.
    pub fn filtered_medicines(&self) -> Vec<&Medicine> {
        filter_medicines(&self.medicines, &self.medicine_query)
    }

    /// Prescriptions matching the prescription query on patient, doctor or
    /// medicine names.
    pub fn filtered_prescriptions(&self) -> Vec<&Prescription> {
        filter_prescriptions(
            &self.prescriptions,
            &self.prescription_query,
            PrescriptionScope::Pharmacy,
            &self.timestamps,
        )
    }

    pub fn stock(&self, medicine_name: &str) -> StockStatus {
        self.stock.lookup(medicine_name)
    }

    pub fn stock_label(&self, medicine_name: &str) -> String {
        self.stock(medicine_name).label(StockAudience::Pharmacy)
    }

    pub fn prescriptions_visible(&self) -> bool {
        self.show_prescriptions
    }

    /// Flip the prescription list's visibility. Returns the new state.
    pub fn toggle_prescriptions(&mut self) -> bool {
        self.show_prescriptions = !self.show_prescriptions;
        self.show_prescriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meditrack_core::InventoryError;

    fn dashboard() -> PharmacyDashboard {
        let api = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        PharmacyDashboard::new(api, None, TimestampFormat::utc())
    }

    #[tokio::test]
    async fn test_add_with_missing_field_keeps_inputs() {
        let mut view = dashboard();
        *view.form_mut() = MedicineForm::new("Paracetamol", "", "12", "5");

        let err = view.add_medicine().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Inventory(InventoryError::MissingField("manufacturer"))
        ));
        assert_eq!(view.form().name, "Paracetamol");
    }

    #[test]
    fn test_toggle_prescriptions() {
        let mut view = dashboard();
        assert!(!view.prescriptions_visible());
        assert!(view.toggle_prescriptions());
        assert!(view.prescriptions_visible());
        assert!(!view.toggle_prescriptions());
    }

    #[test]
    fn test_stock_label_before_load() {
        assert_eq!(dashboard().stock_label("Aspirin"), "Not in system");
    }
}
