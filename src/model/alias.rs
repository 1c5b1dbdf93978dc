//! Aliases and the capability of holding them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of alias a [`Pointer`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointerKind {
    /// International bank account number.
    Iban,
    /// Email address.
    Email,
    /// Phone number in E.164 format.
    PhoneNumber,
    /// Any alias type this client does not know about.
    #[serde(other)]
    Other,
}

impl fmt::Display for PointerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Iban => "IBAN",
            Self::Email => "EMAIL",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// An alias pointing at a user or an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    /// Alias type.
    #[serde(rename = "type")]
    pub kind: PointerKind,
    /// Alias value (the IBAN, address or number itself).
    pub value: String,
    /// Display name attached to the alias, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Pointer {
    /// Create an alias without a display name.
    pub fn new(kind: PointerKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            name: None,
        }
    }

    /// Shorthand for an email alias.
    pub fn email(value: impl Into<String>) -> Self {
        Self::new(PointerKind::Email, value)
    }

    /// Shorthand for an IBAN alias.
    pub fn iban(value: impl Into<String>) -> Self {
        Self::new(PointerKind::Iban, value)
    }
}

/// Anything that exposes a list of aliases.
///
/// Implemented by every account-holder variant and by monetary accounts, so
/// callers ask for aliases without inspecting which concrete type they hold.
pub trait AliasHolder {
    /// All aliases of this holder, possibly empty.
    fn aliases(&self) -> &[Pointer];

    /// First alias of the given kind.
    fn alias_of_kind(&self, kind: PointerKind) -> Option<&Pointer> {
        self.aliases().iter().find(|pointer| pointer.kind == kind)
    }
}
