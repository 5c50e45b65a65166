//! Authenticator implementation
//!
//! Applies the current token to outgoing requests. The token can be replaced
//! at runtime (re-login, token refresh from the account store) and every
//! clone of the authenticator observes the change.

use super::types::{Credentials, TokenLocation};
use crate::types::Forge;
use reqwest::RequestBuilder;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

/// Query parameter Gitee reads the token from
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Authenticator handles applying authentication to HTTP requests
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<RwLock<Credentials>>,
    /// Placement for a token set on an anonymous authenticator
    token_location: TokenLocation,
    /// Bumped on every credential change
    changes: Arc<watch::Sender<u64>>,
}

impl Authenticator {
    /// Create a new authenticator with the given credentials
    pub fn new(credentials: Credentials) -> Self {
        let token_location = match &credentials {
            Credentials::Token { location, .. } => *location,
            Credentials::None => TokenLocation::default(),
        };
        let (changes, _) = watch::channel(0);
        Self {
            credentials: Arc::new(RwLock::new(credentials)),
            token_location,
            changes: Arc::new(changes),
        }
    }

    /// Anonymous authenticator
    pub fn anonymous() -> Self {
        Self::new(Credentials::None)
    }

    /// Anonymous authenticator placing later tokens the way `forge` expects
    pub fn for_forge(forge: Forge) -> Self {
        Self {
            token_location: TokenLocation::for_forge(forge),
            ..Self::anonymous()
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match &*self.credentials.read().await {
            Credentials::None => req,
            Credentials::Token {
                token,
                location: TokenLocation::Header,
            } => req.bearer_auth(token),
            Credentials::Token {
                token,
                location: TokenLocation::Query,
            } => req.query(&[(ACCESS_TOKEN_PARAM, token)]),
        }
    }

    /// Replace the token, keeping its placement
    ///
    /// Without a current token, the placement chosen at construction applies.
    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        {
            let mut credentials = self.credentials.write().await;
            let location = match &*credentials {
                Credentials::Token { location, .. } => *location,
                Credentials::None => self.token_location,
            };
            *credentials = Credentials::Token { token, location };
        }
        debug!("Access token replaced");
        self.notify();
    }

    /// Replace the credentials entirely
    pub async fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write().await = credentials;
        debug!("Credentials replaced");
        self.notify();
    }

    /// Snapshot of the current credentials
    pub async fn credentials(&self) -> Credentials {
        self.credentials.read().await.clone()
    }

    /// Subscribe to credential changes. The value is a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("version", &*self.changes.borrow())
            .finish_non_exhaustive()
    }
}
