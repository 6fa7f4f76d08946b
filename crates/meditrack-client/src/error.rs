//! Client errors.
//!
//! Three kinds reach the user: local validation (nothing was sent), transport
//! failures (reported generically) and backend rejections (local state kept
//! for correction).

use meditrack_core::db::DbError;
use meditrack_core::models::UnknownRole;
use meditrack_core::{DraftError, InventoryError};
use thiserror::Error;

/// Errors raised by the API client, session and dashboards.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Draft(#[from] DraftError),

    #[error("{0}")]
    Inventory(#[from] InventoryError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Response carried no identifier")]
    MissingIdentifier,

    #[error("{0}")]
    UnknownRole(#[from] UnknownRole),

    #[error("Not logged in as {0}")]
    NotAuthenticated(&'static str),

    #[error("Session store error: {0}")]
    Session(#[from] DbError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cancelled: view closed before the response arrived")]
    Cancelled,
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Raised locally before any request was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::Draft(_) | ClientError::Inventory(_) | ClientError::NotAuthenticated(_)
        )
    }

    /// Message shown to the user. Transport details are not surfaced.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Draft(e) => e.to_string(),
            ClientError::Inventory(e) => e.to_string(),
            ClientError::NotAuthenticated(role) => format!("Not logged in as {}", role),
            ClientError::Network(_) => "Network error. Please try again.".to_string(),
            ClientError::Rejected(msg) if !msg.is_empty() => msg.clone(),
            ClientError::Rejected(_) | ClientError::MissingIdentifier => {
                "Request failed".to_string()
            }
            ClientError::UnknownRole(e) => e.to_string(),
            ClientError::Cancelled => String::new(),
            other => other.to_string(),
        }
    }
}
