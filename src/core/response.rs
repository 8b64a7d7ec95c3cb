//! batchexecute response parsing
//!
//! A response body looks like
//!
//! ```text
//! )]}'
//!
//! 1234
//! [["wrb.fr","MkEWBc","[[...payload...]]",null,null,null,"1"]]
//! 56
//! [["di",42],["af.httprm",41,"-123",7]]
//! 25
//! [["e",4,null,null,1234]]
//! ```
//!
//! Only `wrb.fr` records carry results. Each one ends with the base-36
//! correlation index of the sub-request it answers, and its third element is
//! a JSON document encoded as a string.

use serde_json::Value;
use tracing::{debug, trace};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::SpeechAudio;
use crate::core::request::decode_index;

/// Length of the anti-hijacking prefix in front of every body
pub const PREAMBLE_LEN: usize = 6;

/// First element of a result record
pub const RECORD_MARKER: &str = "wrb.fr";

/// A result record, correlated back to its input position
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRecord {
    pub index: usize,
    /// Inner document, already decoded from its string form
    pub payload: Value,
}

/// Extract every result record from a raw body, in the order they appear
pub fn parse_records(body: &str) -> Result<Vec<RpcRecord>> {
    let body = body.get(PREAMBLE_LEN..).unwrap_or_default();
    let mut records = Vec::new();

    for chunk in body.split('\n') {
        if !is_result_chunk(chunk) {
            trace!("Skipping chunk: {:.40}", chunk);
            continue;
        }

        let chunk: Value = serde_json::from_str(chunk)
            .map_err(|e| TranslationError::decode(format!("malformed chunk: {}", e)))?;
        let Some(entries) = chunk.as_array() else {
            return Err(TranslationError::decode("chunk is not an array"));
        };

        for entry in entries {
            if let Some(record) = parse_record(entry)? {
                records.push(record);
            }
        }
    }

    debug!("Parsed {} result record(s)", records.len());
    Ok(records)
}

/// Chunks start with `[`; error trailers look like `[["e",...`
fn is_result_chunk(chunk: &str) -> bool {
    let mut chars = chunk.chars();
    chars.next() == Some('[') && chars.nth(2) != Some('e')
}

fn parse_record(entry: &Value) -> Result<Option<RpcRecord>> {
    let Some(fields) = entry.as_array() else {
        return Ok(None);
    };
    if fields.first().and_then(Value::as_str) != Some(RECORD_MARKER) {
        return Ok(None);
    }

    let encoded_index = fields
        .last()
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::decode("record has no correlation index"))?;
    let index = decode_index(encoded_index).ok_or_else(|| {
        TranslationError::decode(format!("invalid correlation index {:?}", encoded_index))
    })?;

    let payload = fields
        .get(2)
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::decode(format!("record {} has no payload", index)))?;
    let payload = serde_json::from_str(payload).map_err(|e| {
        TranslationError::decode(format!("malformed payload in record {}: {}", index, e))
    })?;

    Ok(Some(RpcRecord { index, payload }))
}

/// Place decoded records by correlation index into a vector of `len` results.
///
/// A later record for the same index replaces an earlier one.
pub fn order_by_index<T>(records: Vec<(usize, T)>, len: usize) -> Result<Vec<T>> {
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();

    for (index, value) in records {
        let slot = slots.get_mut(index).ok_or_else(|| {
            TranslationError::decode(format!(
                "correlation index {} out of range for {} input(s)",
                index, len
            ))
        })?;
        *slot = Some(value);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(TranslationError::MissingResult { index }))
        .collect()
}

/// Speak payloads carry the base64 audio as their first element
pub fn decode_speech(payload: &Value) -> Result<SpeechAudio> {
    payload
        .get(0)
        .and_then(Value::as_str)
        .map(|audio| SpeechAudio(audio.to_string()))
        .ok_or_else(|| TranslationError::decode("speak payload has no audio"))
}
