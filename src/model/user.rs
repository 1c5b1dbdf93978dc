//! Account-holder variants.

use serde::{Deserialize, Serialize};

use super::alias::{AliasHolder, Pointer};

/// A natural person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPerson {
    pub id: u64,
    pub display_name: String,
    #[serde(default)]
    pub alias: Vec<Pointer>,
}

/// A company account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCompany {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub alias: Vec<Pointer>,
}

/// A user that exists only as an API key granted by another user.
///
/// API-key users have no aliases of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApiKey {
    pub id: u64,
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl AliasHolder for UserPerson {
    fn aliases(&self) -> &[Pointer] {
        &self.alias
    }
}

impl AliasHolder for UserCompany {
    fn aliases(&self) -> &[Pointer] {
        &self.alias
    }
}

impl AliasHolder for UserApiKey {
    fn aliases(&self) -> &[Pointer] {
        &[]
    }
}

/// The user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserHolder {
    #[serde(rename = "UserPerson")]
    Person(UserPerson),
    #[serde(rename = "UserCompany")]
    Company(UserCompany),
    #[serde(rename = "UserApiKey")]
    ApiKey(UserApiKey),
}

impl UserHolder {
    /// Remote id of the user.
    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            Self::Person(user) => user.id,
            Self::Company(user) => user.id,
            Self::ApiKey(user) => user.id,
        }
    }

    /// Human-readable name for summaries.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Person(user) => &user.display_name,
            Self::Company(user) => &user.name,
            Self::ApiKey(user) => user.requested_by.as_deref().unwrap_or("API key user"),
        }
    }

    /// Variant name as the remote spells it.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Person(_) => "UserPerson",
            Self::Company(_) => "UserCompany",
            Self::ApiKey(_) => "UserApiKey",
        }
    }

    fn holder(&self) -> &dyn AliasHolder {
        match self {
            Self::Person(user) => user,
            Self::Company(user) => user,
            Self::ApiKey(user) => user,
        }
    }
}

impl AliasHolder for UserHolder {
    fn aliases(&self) -> &[Pointer] {
        self.holder().aliases()
    }
}
