//! Access token storage

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage of access tokens keyed by account id
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, account: &Uuid) -> Option<String>;

    async fn set(&self, account: &Uuid, token: String);

    async fn remove(&self, account: &Uuid);
}

/// Tokens kept for the lifetime of the process
#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn get(&self, account: &Uuid) -> Option<String> {
        self.tokens.read().await.get(account).cloned()
    }

    async fn set(&self, account: &Uuid, token: String) {
        self.tokens.write().await.insert(*account, token);
    }

    async fn remove(&self, account: &Uuid) {
        self.tokens.write().await.remove(account);
    }
}

impl std::fmt::Debug for InMemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTokenStore").finish_non_exhaustive()
    }
}
