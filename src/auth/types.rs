//! Auth configuration types

use crate::types::Forge;
use serde::{Deserialize, Serialize};

/// Where the access token is placed on a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLocation {
    /// `Authorization: Bearer <token>`
    #[default]
    Header,
    /// `?access_token=<token>`
    Query,
}

impl TokenLocation {
    /// Placement each forge expects
    pub fn for_forge(forge: Forge) -> Self {
        match forge {
            Forge::Gitee => TokenLocation::Query,
            Forge::GitHub | Forge::GitHubEnterprise => TokenLocation::Header,
        }
    }
}

/// Credentials attached to every request of an executor
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// Anonymous access
    #[default]
    None,

    /// Personal access / OAuth token
    Token {
        /// The token value
        token: String,
        /// Where to place it
        location: TokenLocation,
    },
}

impl Credentials {
    /// Token sent in the `Authorization` header
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
            location: TokenLocation::Header,
        }
    }

    /// Token placed the way the given forge expects
    pub fn for_forge(forge: Forge, token: impl Into<String>) -> Self {
        Self::Token {
            token: token.into(),
            location: TokenLocation::for_forge(forge),
        }
    }

    /// Whether a token is present
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Token { .. })
    }
}

// Keep tokens out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Token { location, .. } => f
                .debug_struct("Token")
                .field("token", &"***")
                .field("location", location)
                .finish(),
        }
    }
}
