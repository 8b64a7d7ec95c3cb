//! Core data models for translation

use base64::Engine;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Container shape of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchShape {
    /// One bare value
    Single,
    /// Ordered sequence
    Sequence,
    /// Mapping from keys to values
    Keyed,
}

impl fmt::Display for BatchShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchShape::Single => write!(f, "single"),
            BatchShape::Sequence => write!(f, "sequence"),
            BatchShape::Keyed => write!(f, "keyed"),
        }
    }
}

/// Input or output of a batched call.
///
/// The output of `translate`/`speak` always has the same variant as its input,
/// and keyed batches keep the insertion order of their keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Batch<T> {
    Single(T),
    Sequence(Vec<T>),
    Keyed(IndexMap<String, T>),
}

impl<T> Batch<T> {
    pub fn shape(&self) -> BatchShape {
        match self {
            Batch::Single(_) => BatchShape::Single,
            Batch::Sequence(_) => BatchShape::Sequence,
            Batch::Keyed(_) => BatchShape::Keyed,
        }
    }

    /// Number of items in the batch
    pub fn len(&self) -> usize {
        match self {
            Batch::Single(_) => 1,
            Batch::Sequence(items) => items.len(),
            Batch::Keyed(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items in iteration order; position `i` is the correlation index of the item
    pub fn values(&self) -> Vec<&T> {
        match self {
            Batch::Single(item) => vec![item],
            Batch::Sequence(items) => items.iter().collect(),
            Batch::Keyed(items) => items.values().collect(),
        }
    }

    /// Rebuild a batch of the same shape from results ordered by position.
    ///
    /// Keyed batches map position `i` to the `i`-th key of `self`. Returns
    /// `None` when the number of values does not match the batch length.
    pub fn with_values<R>(&self, values: Vec<R>) -> Option<Batch<R>> {
        if values.len() != self.len() {
            return None;
        }

        let batch = match self {
            Batch::Single(_) => Batch::Single(values.into_iter().next()?),
            Batch::Sequence(_) => Batch::Sequence(values),
            Batch::Keyed(items) => Batch::Keyed(items.keys().cloned().zip(values).collect()),
        };
        Some(batch)
    }

    /// Unwrap a `Single` batch
    pub fn into_single(self) -> Option<T> {
        match self {
            Batch::Single(item) => Some(item),
            _ => None,
        }
    }

    /// Flatten into a vector in iteration order
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Batch::Single(item) => vec![item],
            Batch::Sequence(items) => items,
            Batch::Keyed(items) => items.into_values().collect(),
        }
    }
}

/// One text to translate or speak, with optional per-item overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_from: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_to: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_correct: Option<bool>,
}

impl BatchItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_force_from(mut self, force: bool) -> Self {
        self.force_from = Some(force);
        self
    }

    pub fn with_force_to(mut self, force: bool) -> Self {
        self.force_to = Some(force);
        self
    }

    pub fn with_auto_correct(mut self, auto_correct: bool) -> Self {
        self.auto_correct = Some(auto_correct);
        self
    }
}

impl From<&str> for BatchItem {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for BatchItem {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Batch<BatchItem> {
    fn from(text: &str) -> Self {
        Batch::Single(text.into())
    }
}

impl From<String> for Batch<BatchItem> {
    fn from(text: String) -> Self {
        Batch::Single(text.into())
    }
}

impl From<BatchItem> for Batch<BatchItem> {
    fn from(item: BatchItem) -> Self {
        Batch::Single(item)
    }
}

impl<S: Into<BatchItem>> From<Vec<S>> for Batch<BatchItem> {
    fn from(items: Vec<S>) -> Self {
        Batch::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<BatchItem>> From<IndexMap<String, S>> for Batch<BatchItem> {
    fn from(items: IndexMap<String, S>) -> Self {
        Batch::Keyed(items.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Detected or declared source language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLanguage {
    /// True when the service suggested a different source language
    pub did_you_mean: bool,
    pub iso: String,
}

/// Correction the service proposed for the source text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceText {
    pub auto_corrected: bool,
    /// Corrected text, with corrected spans wrapped in `[` and `]`
    pub value: Option<String>,
    pub did_you_mean: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub language: SourceLanguage,
    pub text: SourceText,
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub text: String,
    pub pronunciation: Option<String>,
    pub from: SourceInfo,
    /// Decoded payload as returned by the service
    pub raw: Value,
}

impl TranslationResult {
    /// Empty result wrapping a raw payload; fields are filled in by the decoder
    pub fn new(raw: Value) -> Self {
        Self {
            text: String::new(),
            pronunciation: None,
            from: SourceInfo {
                language: SourceLanguage {
                    did_you_mean: false,
                    iso: String::new(),
                },
                text: SourceText::default(),
            },
            raw,
        }
    }
}

/// Base64-encoded MP3 returned by the speak RPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeechAudio(pub String);

impl SpeechAudio {
    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// Decode the payload into raw MP3 bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.0)
    }
}
