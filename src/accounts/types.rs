//! Account types
//!
//! These types are serialized to JSON and persisted between runs. Tokens are
//! never part of them.

use crate::types::ServerPath;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A login on one server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, also the token store key
    pub id: Uuid,
    /// Login name
    pub name: String,
    /// Server the account belongs to
    pub server: ServerPath,
}

impl Account {
    /// Create an account with a fresh id
    pub fn new(name: impl Into<String>, server: ServerPath) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            server,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.server)
    }
}

/// Persisted account list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsState {
    #[serde(default)]
    pub accounts: Vec<Account>,

    /// Id of the default account
    #[serde(default)]
    pub default_account: Option<Uuid>,
}

impl AccountsState {
    pub fn get(&self, id: &Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.id == id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Account with the same login on the same server
    pub fn find_same(&self, account: &Account) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.name == account.name && a.server == account.server)
    }
}
