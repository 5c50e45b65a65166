//! Authentication module
//!
//! Supports: anonymous access and personal access tokens, sent either as an
//! `Authorization: Bearer` header (GitHub) or as the `access_token` query
//! parameter (Gitee).
//!
//! The `Authenticator` keeps the token swappable at runtime and notifies
//! subscribers when it changes.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{Credentials, TokenLocation};
