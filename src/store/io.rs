//! I/O operations for credential files.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::record::CredentialRecord;

/// Errors raised by the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but does not hold a well-formed record.
    #[error("credential file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// A real filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Envelope for credential files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct CredentialEnvelope {
    /// SHA256 checksum of the compact serialized record.
    checksum: String,
    /// The actual record.
    record: CredentialRecord,
}

fn checksum(record: &CredentialRecord) -> Result<String, serde_json::Error> {
    // MUST use compact serialization on both the write and the verify side
    let json = serde_json::to_string(record)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Directory of credential files, one per environment.
///
/// The store does no locking; concurrent processes sharing a file race.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the store reads from and writes to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a credential file.
    #[must_use]
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    #[must_use]
    pub fn exists(&self, file_name: &str) -> bool {
        self.path_for(file_name).is_file()
    }

    /// Loads a record and verifies its integrity.
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] if the content is not a well-formed record of
    /// the current version; [`StoreError::Io`] if the file cannot be read.
    pub fn load(&self, file_name: &str) -> Result<CredentialRecord, StoreError> {
        let path = self.path_for(file_name);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => StoreError::corrupt(&path, "file is not valid UTF-8"),
            _ => StoreError::io(&path, e),
        })?;

        let envelope: CredentialEnvelope = serde_json::from_str(&content)
            .map_err(|e| StoreError::corrupt(&path, format!("failed to parse envelope: {}", e)))?;

        let calculated = checksum(&envelope.record)
            .map_err(|e| StoreError::corrupt(&path, format!("failed to re-serialize record: {}", e)))?;
        if calculated != envelope.checksum {
            return Err(StoreError::corrupt(&path, "integrity check failed: checksum mismatch"));
        }

        let record = envelope.record;
        record
            .validate()
            .map_err(|reason| StoreError::corrupt(&path, reason))?;

        log::debug!("Loaded credential file {}", path.display());
        Ok(record)
    }

    /// Saves a record, replacing any previous file atomically.
    ///
    /// The record is written to a sibling temp file, synced, then renamed over
    /// the target, so a crash mid-write leaves either the old file or the new
    /// one, never a partial one.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] on any filesystem failure.
    pub fn save(&self, file_name: &str, record: &CredentialRecord) -> Result<(), StoreError> {
        let path = self.path_for(file_name);
        let json = Self::to_json(record).map_err(|e| {
            StoreError::io(&path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        }

        let temp_path = temp_path_for(&path);
        let written = write_synced(&temp_path, json.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::io(&path, e));
        }

        log::debug!("Saved credential file {}", path.display());
        Ok(())
    }

    /// Deletes a credential file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] on any failure other than the file not existing.
    pub fn delete(&self, file_name: &str) -> Result<(), StoreError> {
        let path = self.path_for(file_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("Deleted credential file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    /// Serializes a record into its checksummed envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized.
    pub fn to_json(record: &CredentialRecord) -> Result<String, serde_json::Error> {
        let envelope = CredentialEnvelope {
            checksum: checksum(record)?,
            record: record.clone(),
        };
        serde_json::to_string_pretty(&envelope)
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
