//! Session lifecycle: hydrate at startup, replace at login, clear at logout.
//!
//! The session is the only owner of the identity. Dashboards get a copy
//! when they are built and never read the store themselves.

use meditrack_core::{Database, Identity};
use tracing::{debug, info};

use crate::api::{ApiClient, SignupRequest};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::route::Route;

pub struct Session {
    store: Database,
    identity: Option<Identity>,
}

impl Session {
    /// Read the cached identity once from an open store.
    pub fn hydrate(store: Database) -> ClientResult<Self> {
        let identity = store.load_identity()?;
        match &identity {
            Some(i) => debug!(role = %i.role, "restored session"),
            None => debug!("no stored session"),
        }
        Ok(Self { store, identity })
    }

    /// Open the configured store and hydrate from it.
    pub fn open(config: &ClientConfig) -> ClientResult<Self> {
        Self::hydrate(Database::open(&config.session_db)?)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn route(&self) -> Route {
        Route::for_identity(self.identity())
    }

    /// Authenticate and persist the identity, replacing any previous one.
    ///
    /// On failure the previous session is left untouched.
    pub async fn login(&mut self, api: &ApiClient, email: &str, password: &str) -> ClientResult<&Identity> {
        let identity = api.login(email, password).await?;
        self.store.save_identity(&identity)?;
        info!(role = %identity.role, "session started");
        Ok(&*self.identity.insert(identity))
    }

    /// Forget the identity. Returns whether one was stored.
    pub fn logout(&mut self) -> ClientResult<bool> {
        let cleared = self.store.clear_identity()?;
        if self.identity.take().is_some() || cleared {
            info!("session ended");
        }
        Ok(cleared)
    }

    /// Register an account. Does not log in.
    pub async fn signup(&self, api: &ApiClient, request: &SignupRequest) -> ClientResult<String> {
        let message = api.signup(request).await?;
        info!(role = %request.role, "signup completed");
        Ok(message)
    }
}
