//! Role routing.

use std::fmt;

use meditrack_core::{Identity, Role};

/// Screen shown for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Doctor,
    Patient,
    Pharmacy,
}

impl Route {
    /// Dashboard for the identity's role; login when there is no identity.
    pub fn for_identity(identity: Option<&Identity>) -> Self {
        match identity.map(|i| i.role) {
            None => Route::Login,
            Some(Role::Doctor) => Route::Doctor,
            Some(Role::Patient) => Route::Patient,
            Some(Role::Pharmacy) => Route::Pharmacy,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Doctor => "/doctor",
            Route::Patient => "/patient",
            Route::Pharmacy => "/pharmacy",
        }
    }

    /// Role a session needs to open this route.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Login => None,
            Route::Doctor => Some(Role::Doctor),
            Route::Patient => Some(Role::Patient),
            Route::Pharmacy => Some(Role::Pharmacy),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
