//! Account manager implementation
//!
//! Provides file-based persistence of the account list with atomic writes.
//! Tokens go to the `TokenStore`, never to the file.

use super::tokens::{InMemoryTokenStore, TokenStore};
use super::types::{Account, AccountsState};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::{ExecutorConfig, RequestExecutor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Known accounts, the default one, and their tokens
pub struct AccountManager {
    /// Path to the accounts file, empty when in memory
    path: PathBuf,
    state: Arc<RwLock<AccountsState>>,
    tokens: Arc<dyn TokenStore>,
}

impl AccountManager {
    /// Create a manager persisting to `path`, starting empty
    pub fn new(path: impl AsRef<Path>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: Arc::new(RwLock::new(AccountsState::default())),
            tokens,
        }
    }

    /// Create a manager without file persistence
    pub fn in_memory() -> Self {
        Self::new(PathBuf::new(), Arc::new(InMemoryTokenStore::new()))
    }

    /// Create a manager from a file, loading existing accounts if present
    pub async fn from_file(path: impl AsRef<Path>, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let manager = Self::new(path, tokens);
        manager.load().await?;
        Ok(manager)
    }

    /// Reload the account list from the file
    pub async fn load(&self) -> Result<()> {
        if self.is_in_memory() || !self.path.exists() {
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::account(format!("Failed to read accounts file: {e}")))?;
        let loaded: AccountsState = serde_json::from_str(&contents)
            .map_err(|e| Error::account(format!("Failed to parse accounts file: {e}")))?;

        debug!(
            "Loaded {} accounts from {}",
            loaded.accounts.len(),
            self.path.display()
        );
        *self.state.write().await = loaded;
        Ok(())
    }

    /// Write the account list to the file
    pub async fn save(&self) -> Result<()> {
        let state = self.state.read().await;
        self.persist(&state).await
    }

    /// Write `state` to the file, leaving the previous file intact on failure
    async fn persist(&self, state: &AccountsState) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| Error::account(format!("Failed to serialize accounts: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::account(format!("Failed to write accounts file: {e}")))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::account(format!("Failed to rename accounts file: {e}")))?;

        Ok(())
    }

    pub async fn accounts(&self) -> Vec<Account> {
        self.state.read().await.accounts.clone()
    }

    /// Register an account with its token
    ///
    /// The first account added becomes the default. Adding the same login on
    /// the same server twice fails.
    pub async fn add_account(&self, account: Account, token: impl Into<String>) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.find_same(&account) {
            return Err(Error::account(format!(
                "Account '{existing}' already exists"
            )));
        }

        let mut updated = state.clone();
        if updated.accounts.is_empty() {
            updated.default_account = Some(account.id);
        }
        updated.accounts.push(account.clone());
        self.persist(&updated).await?;
        *state = updated;

        self.tokens.set(&account.id, token.into()).await;
        info!("Added account {account}");
        Ok(())
    }

    /// Replace the token of a known account
    pub async fn update_token(&self, account: &Uuid, token: impl Into<String>) -> Result<()> {
        let account = self.require(account).await?;
        self.tokens.set(&account.id, token.into()).await;
        info!("Updated token of account {account}");
        Ok(())
    }

    /// Forget an account and its token. Returns whether it existed.
    pub async fn remove_account(&self, account: &Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.contains(account) {
            return Ok(false);
        }

        let mut updated = state.clone();
        updated.accounts.retain(|a| &a.id != account);
        if updated.default_account.as_ref() == Some(account) {
            updated.default_account = None;
        }
        self.persist(&updated).await?;
        *state = updated;

        self.tokens.remove(account).await;
        info!("Removed account {account}");
        Ok(true)
    }

    /// First account with the given login, on any server
    pub async fn find_by_name(&self, name: &str) -> Option<Account> {
        self.state
            .read()
            .await
            .accounts
            .iter()
            .find(|a| a.name == name)
            .cloned()
    }

    /// Make a known account the default, or clear the default with `None`
    pub async fn set_default(&self, account: Option<&Uuid>) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(id) = account {
            if !state.contains(id) {
                return Err(Error::AccountNotFound {
                    name: id.to_string(),
                });
            }
        }

        let updated = AccountsState {
            default_account: account.copied(),
            ..state.clone()
        };
        self.persist(&updated).await?;
        *state = updated;
        Ok(())
    }

    pub async fn default_account(&self) -> Option<Account> {
        let state = self.state.read().await;
        state.default_account.and_then(|id| state.get(&id).cloned())
    }

    pub async fn token_for(&self, account: &Account) -> Option<String> {
        self.tokens.get(&account.id).await
    }

    /// Executor authenticated as `account`
    pub async fn executor_for(
        &self,
        account: &Account,
        config: ExecutorConfig,
    ) -> Result<RequestExecutor> {
        let token = self
            .token_for(account)
            .await
            .ok_or_else(|| Error::MissingToken {
                account: account.name.clone(),
            })?;
        let credentials = Credentials::for_forge(account.server.forge(), token);
        RequestExecutor::new(config, credentials)
    }

    /// Get the accounts file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    async fn require(&self, id: &Uuid) -> Result<Account> {
        self.state
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound {
                name: id.to_string(),
            })
    }
}

impl Clone for AccountManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
