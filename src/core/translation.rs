//! Decoding of translate payloads
//!
//! The payload of a `MkEWBc` record is a deeply nested array. Each accessor
//! below reads exactly one upstream field and treats `null` the same as a
//! missing position.

use serde_json::Value;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{SourceText, TranslationResult};

/// `payload[path...]`, or `None` if any step is missing or null
fn at<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |node, &i| node.get(i))
        .filter(|node| !node.is_null())
}

/// `payload[1][0][0]`: the main translation entry
fn translation_entry(payload: &Value) -> Option<&Value> {
    at(payload, &[1, 0, 0])
}

/// `payload[1][0][0][5]`: per-sentence fragments, each `[text, ...]`
fn sentence_fragments(payload: &Value) -> Option<&Vec<Value>> {
    at(payload, &[1, 0, 0, 5]).and_then(Value::as_array)
}

/// `payload[1][0][0][0]`: whole translated text, used when fragments are absent
fn whole_text(payload: &Value) -> Option<&str> {
    at(payload, &[1, 0, 0, 0]).and_then(Value::as_str)
}

/// `payload[1][0][0][1]`: pronunciation of the translation
fn pronunciation(payload: &Value) -> Option<&str> {
    at(payload, &[1, 0, 0, 1]).and_then(Value::as_str)
}

/// `payload[0][1][1][0]`: source language the service thinks was meant
fn suggested_language(payload: &Value) -> Option<&str> {
    at(payload, &[0, 1, 1, 0]).and_then(Value::as_str)
}

/// `payload[1][3]`: source language echoed back, `"auto"` when detection was requested
fn echoed_language(payload: &Value) -> Option<&str> {
    at(payload, &[1, 3]).and_then(Value::as_str)
}

/// `payload[2]`: detected source language
fn detected_language(payload: &Value) -> Option<&str> {
    at(payload, &[2]).and_then(Value::as_str)
}

/// `payload[0][1][0]`: spelling correction block, `[[_, marked_text], _, flag]`
fn correction(payload: &Value) -> Option<&Value> {
    at(payload, &[0, 1, 0])
}

/// Falsy fragments are dropped; the service splits at ". " so the rest is joined with a space
pub fn join_fragments(fragments: &[Value]) -> String {
    fragments
        .iter()
        .filter_map(|fragment| fragment.get(0).and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace `<b>`/`<b><i>` with `[` and `</b>`/`</i></b>` with `]`
pub fn mark_corrections(text: &str) -> String {
    text.replace("<b><i>", "[")
        .replace("<b>", "[")
        .replace("</i></b>", "]")
        .replace("</b>", "]")
}

/// Build a [`TranslationResult`] from a decoded `MkEWBc` payload
pub fn decode_translation(payload: Value) -> Result<TranslationResult> {
    if translation_entry(&payload).is_none() {
        return Err(TranslationError::decode("translate payload has no translation"));
    }

    let text = match sentence_fragments(&payload) {
        Some(fragments) => join_fragments(fragments),
        None => whole_text(&payload).unwrap_or_default().to_string(),
    };
    let pronunciation = pronunciation(&payload).map(str::to_string);

    let iso = source_language(&payload);
    let source_text = source_text(&payload)?;

    let mut result = TranslationResult::new(Value::Null);
    result.text = text;
    result.pronunciation = pronunciation;
    result.from.language.iso = iso.to_string();
    // reported as a suggestion whichever branch supplied the iso
    result.from.language.did_you_mean = true;
    result.from.text = source_text;
    result.raw = payload;
    Ok(result)
}

/// Suggested language first, then the detected one when `auto` was requested
fn source_language(payload: &Value) -> &str {
    if let Some(iso) = suggested_language(payload) {
        return iso;
    }

    match echoed_language(payload) {
        Some("auto") => detected_language(payload).unwrap_or_default(),
        Some(iso) => iso,
        None => "",
    }
}

fn source_text(payload: &Value) -> Result<SourceText> {
    let Some(block) = correction(payload) else {
        return Ok(SourceText::default());
    };

    let marked = at(block, &[0, 1])
        .and_then(Value::as_str)
        .ok_or_else(|| TranslationError::decode("correction block has no text"))?;

    let auto_corrected = block.get(2).and_then(Value::as_i64) == Some(1);

    Ok(SourceText {
        auto_corrected,
        value: Some(mark_corrections(marked)),
        did_you_mean: !auto_corrected,
    })
}
