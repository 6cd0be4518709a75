//! Serialized form of the history slot.
//!
//! Current payloads are an envelope `{"schemaVersion": 1, "results": [...]}`.
//! Bare arrays of results, as written by the original browser build, are still
//! read and get rewritten as an envelope on the next append.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HistoryDecodeError;
use crate::models::CalculationResult;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    schema_version: u32,
    results: &'a [CalculationResult],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    schema_version: u32,
    results: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPayload {
    Versioned(Envelope),
    Legacy(Vec<Value>),
}

/// Results recovered from a payload plus a note for every entry that was
/// skipped.
#[derive(Debug, Default)]
pub struct Decoded {
    pub results: Vec<CalculationResult>,
    pub skipped: Vec<String>,
}

pub fn encode(results: &[CalculationResult]) -> Result<String> {
    serde_json::to_string_pretty(&EnvelopeRef {
        schema_version: CURRENT_SCHEMA_VERSION,
        results,
    })
    .context("failed to serialize calculation history")
}

/// Decode a stored payload. `Err` means the payload as a whole is unusable;
/// individual bad entries only land in [`Decoded::skipped`].
pub fn decode(payload: &str) -> Result<Decoded, HistoryDecodeError> {
    let stored: StoredPayload = serde_json::from_str(payload)
        .map_err(|err| HistoryDecodeError::Unreadable(err.to_string()))?;

    let entries = match stored {
        StoredPayload::Versioned(envelope) => {
            if envelope.schema_version == 0 || envelope.schema_version > CURRENT_SCHEMA_VERSION {
                return Err(HistoryDecodeError::UnsupportedVersion {
                    found: envelope.schema_version,
                    supported: CURRENT_SCHEMA_VERSION,
                });
            }
            envelope.results
        }
        StoredPayload::Legacy(entries) => entries,
    };

    let mut decoded = Decoded::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<CalculationResult>(entry) {
            Ok(result) => match result.validate() {
                Ok(()) => decoded.results.push(result),
                Err(reason) => decoded.skipped.push(format!("entry {index}: {reason}")),
            },
            Err(err) => decoded.skipped.push(format!("entry {index}: {err}")),
        }
    }

    Ok(decoded)
}
