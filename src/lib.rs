//! gtranslate-batch - batched translation and text-to-speech
//!
//! This library drives the web translator's `batchexecute` RPC. Any number of
//! texts are sent in one request and the answers are handed back in the same
//! shape as the input: a single value, an ordered sequence or a keyed map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod core;
pub mod cli;

// Re-export key types for convenience
pub use crate::core::{
    client::AsyncTranslator,
    config::{RequestOptions, TranslatorConfig},
    errors::{LanguageField, Result, TranslationError},
    languages::{GoogleLanguages, LanguageResolver},
    models::{Batch, BatchItem, BatchShape, SpeechAudio, TranslationResult},
    transport::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
