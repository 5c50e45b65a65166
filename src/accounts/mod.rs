//! Account management module
//!
//! Keeps the list of known accounts and the default one, and hands out
//! executors authenticated as a given account.
//!
//! # Overview
//!
//! The accounts module provides:
//! - `Account` - A named login on one server
//! - `AccountManager` - JSON-file persistence of the account list
//! - `TokenStore` - Where access tokens live, kept apart from the account file

mod manager;
mod tokens;
mod types;

pub use manager::AccountManager;
pub use tokens::{InMemoryTokenStore, TokenStore};
pub use types::{Account, AccountsState};
