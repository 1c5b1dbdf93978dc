//! Credential store for persisting identities and sessions between runs.
//!
//! # Features
//!
//! * **Integrity**: Each credential file is wrapped in an envelope with a SHA256 checksum.
//! * **Versioning**: Records carry a version marker; unknown versions are rejected.
//! * **Atomicity**: Saves go through a temp file and a rename.
//!
//! # Architecture
//!
//! * [`record`]: The serializable credential record.
//! * [`io`]: Loading, saving and deleting credential files.

pub mod io;
pub mod record;

pub use io::{CredentialStore, StoreError};
pub use record::{CredentialRecord, CREDENTIAL_VERSION};
