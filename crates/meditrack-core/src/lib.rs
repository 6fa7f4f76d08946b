//! MediTrack Core Library
//!
//! Client-side reconciliation for a doctor / patient / pharmacy prescription
//! workflow. The backend owns persistence and authorization; this crate owns
//! the rules applied to what it returns.
//!
//! # Architecture
//!
//! ```text
//!   GET /api/prescriptions          GET /api/medicines
//!            │                               │
//!     decode_records                  decode_records
//!            │                               │
//!     validity filter                  StockIndex::build
//!            │                               │
//!   classify (mine / others) ◄── Identity    │
//!            │                               │
//!      SearchQuery filter ───── lookup ──────┘
//!            │
//!         render
//!
//!   PrescriptionDraft ──prepare──► multipart POST ──ack──► reset + refetch
//!   MedicineForm ───────validate─► JSON POST ──────ok───► clear + refetch
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed client state (session identity)
//! - [`models`]: Domain types (Identity, Medicine, Prescription, etc.)
//! - [`reconcile`]: Stock index, prescription classifier, search filter
//! - [`editor`]: Prescription draft builder and inventory form

pub mod db;
pub mod editor;
pub mod models;
pub mod reconcile;

// Re-export commonly used types
pub use db::Database;
pub use editor::{
    Attachment, DraftError, InventoryError, LineField, MedicineForm, PrescriptionDraft,
    PrescriptionSubmission,
};
pub use models::{
    Identity, Medicine, MedicineLine, NewMedicine, Prescription, PrescriptionRecord, Role,
};
pub use reconcile::{
    classify, Partition, PrescriptionScope, SearchQuery, StockAudience, StockIndex, StockStatus,
    TimestampFormat,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MeditrackError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<db::DbError> for MeditrackError {
    fn from(e: db::DbError) -> Self {
        MeditrackError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for MeditrackError {
    fn from(e: serde_json::Error) -> Self {
        MeditrackError::SerializationError(e.to_string())
    }
}

impl From<DraftError> for MeditrackError {
    fn from(e: DraftError) -> Self {
        MeditrackError::ValidationError(e.to_string())
    }
}

impl From<InventoryError> for MeditrackError {
    fn from(e: InventoryError) -> Self {
        MeditrackError::ValidationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for MeditrackError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MeditrackError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

fn decode_json_list<T: serde::de::DeserializeOwned>(
    json: &str,
    kind: &str,
) -> Result<Vec<T>, MeditrackError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(models::decode_records(values, kind))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create the session store at the given path.
#[uniffi::export]
pub fn open_session_store(path: String) -> Result<Arc<MeditrackCore>, MeditrackError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(MeditrackCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory session store (for testing).
#[uniffi::export]
pub fn open_session_store_in_memory() -> Result<Arc<MeditrackCore>, MeditrackError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(MeditrackCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Split a `GET /api/prescriptions` body into the identity's own and others'.
#[uniffi::export]
pub fn classify_prescriptions(
    prescriptions_json: String,
    identity: Option<FfiIdentity>,
) -> Result<FfiPartition, MeditrackError> {
    let records: Vec<PrescriptionRecord> = decode_json_list(&prescriptions_json, "prescription")?;
    let identity = identity.map(Identity::from);
    Ok(classify(&records, identity.as_ref()).into())
}

/// Medicines from a `GET /api/medicines` body whose name contains `query`.
#[uniffi::export]
pub fn filter_medicines(medicines_json: String, query: String) -> Result<Vec<FfiMedicine>, MeditrackError> {
    let medicines: Vec<Medicine> = decode_json_list(&medicines_json, "medicine")?;
    Ok(reconcile::filter_medicines(&medicines, &query)
        .into_iter()
        .cloned()
        .map(Into::into)
        .collect())
}

/// Validate the add-medicine form.
#[uniffi::export]
pub fn validate_medicine_form(
    name: String,
    manufacturer: String,
    price: String,
    quantity: String,
) -> Result<FfiNewMedicine, MeditrackError> {
    let medicine = MedicineForm::new(name, manufacturer, price, quantity).validate()?;
    Ok(medicine.into())
}

// =========================================================================
// Main API Objects
// =========================================================================

/// Thread-safe session store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MeditrackCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl MeditrackCore {
    /// Identity persisted by the last login, if any.
    pub fn current_identity(&self) -> Result<Option<FfiIdentity>, MeditrackError> {
        let db = self.db.lock()?;
        Ok(db.load_identity()?.map(Into::into))
    }

    /// Persist the identity returned by a login.
    pub fn save_identity(&self, identity: FfiIdentity) -> Result<(), MeditrackError> {
        let db = self.db.lock()?;
        db.save_identity(&identity.into())?;
        Ok(())
    }

    /// Log out.
    pub fn clear_identity(&self) -> Result<bool, MeditrackError> {
        let db = self.db.lock()?;
        Ok(db.clear_identity()?)
    }
}

/// Stock index built from a `GET /api/medicines` body.
#[derive(uniffi::Object)]
pub struct FfiStockIndex {
    index: StockIndex,
}

#[uniffi::export]
impl FfiStockIndex {
    #[uniffi::constructor]
    pub fn new(medicines_json: String) -> Result<Arc<Self>, MeditrackError> {
        let medicines: Vec<Medicine> = decode_json_list(&medicines_json, "medicine")?;
        Ok(Arc::new(Self {
            index: StockIndex::build(&medicines),
        }))
    }

    pub fn lookup(&self, name: String) -> FfiStockLookup {
        self.index.lookup(&name).into()
    }
}

/// Prescription draft held on the Rust side.
#[derive(uniffi::Object)]
pub struct FfiPrescriptionDraft {
    draft: Mutex<PrescriptionDraft>,
}

#[uniffi::export]
impl FfiPrescriptionDraft {
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            draft: Mutex::new(PrescriptionDraft::new()),
        })
    }

    pub fn set_patient_name(&self, name: String) -> Result<(), MeditrackError> {
        self.draft.lock()?.set_patient_name(name);
        Ok(())
    }

    pub fn add_line(&self) -> Result<(), MeditrackError> {
        self.draft.lock()?.add_line();
        Ok(())
    }

    pub fn remove_line(&self, index: u32) -> Result<bool, MeditrackError> {
        Ok(self.draft.lock()?.remove_line(index as usize))
    }

    pub fn set_field(&self, index: u32, field: String, value: String) -> Result<bool, MeditrackError> {
        let field: LineField = field.parse()?;
        Ok(self.draft.lock()?.set_field(index as usize, field, value))
    }

    pub fn lines(&self) -> Result<Vec<FfiMedicineLine>, MeditrackError> {
        Ok(self
            .draft
            .lock()?
            .lines()
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Validate and return the payload fields (without the attachment).
    pub fn prepare(&self, doctor: Option<FfiIdentity>) -> Result<FfiSubmission, MeditrackError> {
        let doctor = doctor.map(Identity::from);
        let submission = self.draft.lock()?.prepare(doctor.as_ref())?;
        Ok(FfiSubmission {
            medicines_json: submission.medicines_json()?,
            doctor_id: submission.doctor_id,
            patient_name: submission.patient_name,
        })
    }

    pub fn reset(&self) -> Result<(), MeditrackError> {
        self.draft.lock()?.reset();
        Ok(())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiRole {
    Doctor,
    Patient,
    Pharmacy,
}

impl From<Role> for FfiRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Doctor => FfiRole::Doctor,
            Role::Patient => FfiRole::Patient,
            Role::Pharmacy => FfiRole::Pharmacy,
        }
    }
}

impl From<FfiRole> for Role {
    fn from(role: FfiRole) -> Self {
        match role {
            FfiRole::Doctor => Role::Doctor,
            FfiRole::Patient => Role::Patient,
            FfiRole::Pharmacy => Role::Pharmacy,
        }
    }
}

/// FFI-safe identity.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiIdentity {
    pub id: String,
    pub name: String,
    pub role: FfiRole,
}

impl From<Identity> for FfiIdentity {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            role: identity.role.into(),
        }
    }
}

impl From<FfiIdentity> for Identity {
    fn from(identity: FfiIdentity) -> Self {
        Identity::new(identity.id, identity.name, identity.role.into())
    }
}

/// FFI-safe medicine.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicine {
    pub id: String,
    pub name: String,
    pub manufacturer: String,
    pub price: f64,
    pub quantity: i64,
}

impl From<Medicine> for FfiMedicine {
    fn from(medicine: Medicine) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            manufacturer: medicine.manufacturer,
            price: medicine.price,
            quantity: medicine.quantity,
        }
    }
}

/// FFI-safe validated medicine form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewMedicine {
    pub name: String,
    pub manufacturer: String,
    pub price: f64,
    pub quantity: i64,
}

impl From<NewMedicine> for FfiNewMedicine {
    fn from(medicine: NewMedicine) -> Self {
        Self {
            name: medicine.name,
            manufacturer: medicine.manufacturer,
            price: medicine.price,
            quantity: medicine.quantity,
        }
    }
}

/// FFI-safe stock lookup result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStockLookup {
    pub found: bool,
    pub in_stock: bool,
    pub quantity: Option<i64>,
}

impl From<StockStatus> for FfiStockLookup {
    fn from(status: StockStatus) -> Self {
        Self {
            found: status.is_found(),
            in_stock: status.in_stock(),
            quantity: status.quantity(),
        }
    }
}

/// FFI-safe medicine line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicineLine {
    pub name: String,
    pub dosage: String,
    pub instructions: String,
}

impl From<MedicineLine> for FfiMedicineLine {
    fn from(line: MedicineLine) -> Self {
        Self {
            name: line.name,
            dosage: line.dosage,
            instructions: line.instructions,
        }
    }
}

/// FFI-safe prescription.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPrescription {
    pub id: Option<String>,
    pub doctor_name: String,
    pub patient_name: String,
    pub medicines: Vec<FfiMedicineLine>,
    pub uploaded_file: Option<String>,
    /// RFC 3339
    pub created_at: Option<String>,
}

impl From<Prescription> for FfiPrescription {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            doctor_name: p.doctor_name,
            patient_name: p.patient_name,
            medicines: p.medicines.into_iter().map(Into::into).collect(),
            uploaded_file: p.uploaded_file,
            created_at: p.created_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// FFI-safe ownership partition.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPartition {
    pub mine: Vec<FfiPrescription>,
    pub others: Vec<FfiPrescription>,
}

impl From<Partition> for FfiPartition {
    fn from(partition: Partition) -> Self {
        Self {
            mine: partition.mine.into_iter().map(Into::into).collect(),
            others: partition.others.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-safe submission fields.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSubmission {
    pub doctor_id: String,
    pub patient_name: String,
    pub medicines_json: String,
}
