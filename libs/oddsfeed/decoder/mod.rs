//! Feed envelope decoding.
//!
//! An envelope is either a full snapshot (`INITIAL_DUMP`) or an incremental
//! update (`UPDATE`) and carries a list of tagged items. Item decoding is
//! failure-isolated: one malformed or unrecognized item is dropped with a
//! diagnostic and the rest of the batch decodes normally. A batch with zero
//! usable records is valid.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::records::EntityRecord;

/// Envelope-level failures. Per-item failures never surface here.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid feed envelope: {0}")]
    Envelope(#[from] serde_json::Error),
}

/// Snapshot vs. incremental discrimination.
///
/// The mapping is deliberate: an unrecognized message type is treated as an
/// update, because misreading it as a snapshot would wipe resident state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Snapshot,
    Update,
}

impl BatchKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "INITIAL_DUMP" => BatchKind::Snapshot,
            "UPDATE" => BatchKind::Update,
            other => {
                warn!(message_type = %other, "unrecognized messageType, treating as update");
                BatchKind::Update
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    #[serde(default)]
    #[allow(dead_code)]
    version: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    format: Option<String>,
    message_type: String,
    #[serde(default)]
    records: Vec<Value>,
}

/// Result of decoding one envelope.
#[derive(Debug)]
pub struct DecodedBatch {
    pub kind: BatchKind,
    /// Successfully decoded records, in envelope order.
    pub records: Vec<EntityRecord>,
    /// Items dropped: unknown kinds plus malformed payloads.
    pub skipped: usize,
}

/// Decode a raw envelope into typed records.
pub fn decode_envelope(payload: &str) -> Result<DecodedBatch, DecodeError> {
    let raw: RawEnvelope = serde_json::from_str(payload)?;
    let kind = BatchKind::from_tag(&raw.message_type);

    let mut records = Vec::with_capacity(raw.records.len());
    let mut skipped = 0;

    for item in raw.records {
        match EntityRecord::from_value(item) {
            Ok(EntityRecord::Unknown { kind }) => {
                debug!(kind = %kind, "skipping unrecognized record kind");
                skipped += 1;
            }
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(error = %err, "dropping malformed feed record");
                skipped += 1;
            }
        }
    }

    Ok(DecodedBatch {
        kind,
        records,
        skipped,
    })
}
