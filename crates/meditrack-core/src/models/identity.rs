//! Session identity models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Pharmacy,
}

/// Raised when the backend reports a role this client does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Pharmacy => "pharmacy",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            "pharmacy" => Ok(Role::Pharmacy),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// The logged-in user. Set once at login and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Backend user ID
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name, also used for legacy prescription ownership
    pub name: String,
    /// Dashboard this user is routed to
    pub role: Role,
}

impl Identity {
    /// Create a new identity.
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// Name key used for ownership comparisons (trimmed, lower-cased).
    pub fn name_key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Check whether this identity has the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Normalize a display name for comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Doctor".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!(" pharmacy ".parse::<Role>(), Ok(Role::Pharmacy));
        assert_eq!(
            "nurse".parse::<Role>(),
            Err(UnknownRole("nurse".into()))
        );
    }

    #[test]
    fn test_identity_accepts_mongo_id() {
        let json = r#"{"_id":"u1","name":"Asha","role":"patient","email":"a@x.io"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity, Identity::new("u1", "Asha", Role::Patient));

        let round_trip = serde_json::to_string(&identity).unwrap();
        assert!(round_trip.contains(r#""_id":"u1""#));
    }

    #[test]
    fn test_name_key() {
        let identity = Identity::new("u1", "  Asha Rao ", Role::Patient);
        assert_eq!(identity.name_key(), "asha rao");
    }
}
