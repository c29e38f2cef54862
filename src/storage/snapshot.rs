//! Serialized transcript format
//!
//! Writes `{"version": 1, "turns": [...]}`. Reads that envelope or the bare
//! `[{role, content}, ...]` array written by earlier clients.

use crate::state_machine::Turn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    turns: &'a [Turn],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    turns: Vec<Turn>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTranscript {
    Versioned(Snapshot),
    Legacy(Vec<Turn>),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid transcript JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported transcript version: {0}")]
    UnsupportedVersion(u32),
    #[error("Transcript has no turns")]
    Empty,
}

pub fn encode_transcript(turns: &[Turn]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        turns,
    })
}

pub fn decode_transcript(raw: &str) -> Result<Vec<Turn>, SnapshotError> {
    let turns = match serde_json::from_str(raw)? {
        StoredTranscript::Versioned(snapshot) if snapshot.version == SNAPSHOT_VERSION => {
            snapshot.turns
        }
        StoredTranscript::Versioned(snapshot) => {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version))
        }
        StoredTranscript::Legacy(turns) => turns,
    };

    if turns.is_empty() {
        return Err(SnapshotError::Empty);
    }
    Ok(turns)
}
