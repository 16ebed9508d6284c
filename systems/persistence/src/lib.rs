#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Save blob codec and storage slots.
//!
//! A blob is a single line of the form `echo:v1:<payload>` where the payload
//! is the base64 encoded JSON form of a [`SaveState`]. Decoding sanitises the
//! state before handing it back.

mod schema;

use std::fmt;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use log::warn;
use thiserror::Error;

pub use schema::{
    EnemyRecord, LayoutHints, SaveState, TileRecord, TurretRecord, ZoneRecord, SAVE_VERSION,
};

const BLOB_DOMAIN: &str = "echo";
const BLOB_VERSION: &str = "v1";
/// Prefix emitted before the encoded payload.
pub const BLOB_HEADER: &str = "echo:v1";
const FIELD_DELIMITER: char = ':';

/// Errors raised while encoding, decoding, or storing saves.
#[derive(Debug, Error)]
pub enum SaveError {
    /// The blob was empty or whitespace.
    #[error("save blob was empty")]
    EmptyPayload,
    /// A header segment was missing.
    #[error("save blob is missing the {0}")]
    Missing(&'static str),
    /// The blob carried a foreign prefix.
    #[error("save prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The blob was written by an unknown version.
    #[error("save version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The payload was not valid base64.
    #[error("could not decode save payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload was not a valid save document.
    #[error("could not parse save payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The state could not be serialised.
    #[error("could not serialise save: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The storage backend refused the operation.
    #[error("save storage failed: {0}")]
    Storage(String),
}

/// Encodes a save state into a single-line blob.
pub fn encode(state: &SaveState) -> Result<String, SaveError> {
    let json = serde_json::to_vec(state).map_err(SaveError::Serialize)?;
    let payload = STANDARD_NO_PAD.encode(json);
    Ok(format!("{BLOB_HEADER}{FIELD_DELIMITER}{payload}"))
}

/// Decodes and sanitises a blob produced by [`encode`].
pub fn decode(blob: &str) -> Result<SaveState, SaveError> {
    let trimmed = blob.trim();
    if trimmed.is_empty() {
        return Err(SaveError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().ok_or(SaveError::Missing("prefix"))?;
    let version = parts.next().ok_or(SaveError::Missing("version"))?;
    let payload = parts.next().ok_or(SaveError::Missing("payload"))?;

    if domain != BLOB_DOMAIN {
        return Err(SaveError::InvalidPrefix(domain.to_owned()));
    }
    if version != BLOB_VERSION {
        return Err(SaveError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let state: SaveState = serde_json::from_slice(&bytes).map_err(SaveError::InvalidPayload)?;
    Ok(state.sanitized())
}

/// Storage backend holding at most one save blob.
pub trait SaveSlot: fmt::Debug {
    /// Replaces the stored blob.
    fn write(&mut self, blob: &str) -> Result<(), SaveError>;

    /// Returns the stored blob, if any.
    fn read(&self) -> Result<Option<String>, SaveError>;
}

/// Encodes `state` into `slot`, logging and swallowing failures.
///
/// Returns whether the write succeeded.
pub fn write_best_effort(slot: &mut dyn SaveSlot, state: &SaveState) -> bool {
    match encode(state).and_then(|blob| slot.write(&blob)) {
        Ok(()) => true,
        Err(error) => {
            warn!("save skipped: {error}");
            false
        }
    }
}

/// In-memory slot, optionally refusing writes to simulate exhausted storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemorySlot {
    blob: Option<String>,
    refuse_writes: bool,
    writes: u32,
}

impl MemorySlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot whose writes always fail.
    #[must_use]
    pub fn refusing() -> Self {
        Self {
            refuse_writes: true,
            ..Self::default()
        }
    }

    /// Number of successful writes.
    #[must_use]
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl SaveSlot for MemorySlot {
    fn write(&mut self, blob: &str) -> Result<(), SaveError> {
        if self.refuse_writes {
            return Err(SaveError::Storage("quota exceeded".to_owned()));
        }
        self.blob = Some(blob.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn read(&self) -> Result<Option<String>, SaveError> {
        Ok(self.blob.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blobs_carry_the_header() {
        let blob = encode(&SaveState::default()).expect("default state encodes");
        assert!(blob.starts_with(&format!("{BLOB_HEADER}:")));
        assert_eq!(decode(&blob).expect("blob decodes"), SaveState::default());
    }

    #[test]
    fn foreign_prefixes_and_versions_are_rejected() {
        assert!(matches!(decode("   "), Err(SaveError::EmptyPayload)));
        assert!(matches!(
            decode("tower:v1:abc"),
            Err(SaveError::InvalidPrefix(prefix)) if prefix == "tower"
        ));
        assert!(matches!(
            decode("echo:v9:abc"),
            Err(SaveError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(decode("echo"), Err(SaveError::Missing("version"))));
        assert!(matches!(
            decode("echo:v1:%%%"),
            Err(SaveError::InvalidEncoding(_))
        ));
        let not_json = STANDARD_NO_PAD.encode(b"[1, 2");
        assert!(matches!(
            decode(&format!("echo:v1:{not_json}")),
            Err(SaveError::InvalidPayload(_))
        ));
    }

    #[test]
    fn best_effort_writes_swallow_failures() {
        let mut slot = MemorySlot::refusing();
        assert!(!write_best_effort(&mut slot, &SaveState::default()));
        assert_eq!(slot.read().expect("read succeeds"), None);

        let mut slot = MemorySlot::new();
        assert!(write_best_effort(&mut slot, &SaveState::default()));
        assert_eq!(slot.writes(), 1);
    }
}
