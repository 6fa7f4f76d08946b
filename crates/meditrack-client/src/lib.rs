//! MediTrack Client
//!
//! Talks to the MediTrack backend on behalf of the three roles:
//! - Doctors write prescriptions and review the ones they issued
//! - Patients see their own prescriptions with stock availability
//! - Pharmacies manage inventory and cross-reference prescriptions
//!
//! ## Layout
//!
//! ```text
//! ClientConfig ──► ApiClient ──► Dashboards (view models, one ViewScope each)
//!                      ▲              ▲
//!                   Session ──── Identity (hydrated once, passed explicitly)
//! ```
//!
//! All reconciliation (stock lookup, ownership, search) comes from
//! `meditrack_core`; this crate only fetches, submits and holds view state.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod route;
pub mod scope;
pub mod session;

pub use api::{ApiClient, SignupRequest};
pub use config::{ClientConfig, ConfigError};
pub use dashboard::{DoctorDashboard, PatientDashboard, PharmacyDashboard, SubmissionStatus};
pub use error::{ClientError, ClientResult};
pub use route::Route;
pub use scope::{ScopeHandle, ViewScope};
pub use session::Session;
