//! CLI command definitions and handlers

use clap::Subcommand;
use std::path::PathBuf;

use crate::core::client::AsyncTranslator;
use crate::core::config::TranslatorConfig;
use crate::core::models::{Batch, TranslationResult};

/// Commands for the gtranslate CLI
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate one or more texts in a single request
    Translate {
        /// Texts to translate
        #[arg(required = true)]
        text: Vec<String>,

        /// Source language, name or code (default: auto)
        #[arg(short, long)]
        from: Option<String>,

        /// Target language, name or code (default: en)
        #[arg(short, long)]
        to: Option<String>,

        /// Send the source language as given, without checking it
        #[arg(long)]
        force_from: bool,

        /// Send the target language as given, without checking it
        #[arg(long)]
        force_to: bool,

        /// Let the service correct typos in the source text
        #[arg(long)]
        auto_correct: bool,

        /// Print full results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Turn text into speech and save it as MP3
    Speak {
        /// Texts to speak; their audio is written back to back
        #[arg(required = true)]
        text: Vec<String>,

        /// Spoken language, name or code (default: en)
        #[arg(short, long)]
        to: Option<String>,

        /// Send the language as given, without checking it
        #[arg(long)]
        force_to: bool,

        /// Output file (default: speech.mp3)
        #[arg(short, long, default_value = "speech.mp3")]
        output: PathBuf,
    },

    /// List supported languages
    Languages,
}

/// Handle translate command
#[allow(clippy::too_many_arguments)]
pub async fn handle_translate(
    mut config: TranslatorConfig,
    text: Vec<String>,
    from: Option<String>,
    to: Option<String>,
    force_from: bool,
    force_to: bool,
    auto_correct: bool,
    json: bool,
) -> anyhow::Result<()> {
    use tracing::info;

    if let Some(from) = from {
        config.from = from;
    }
    if let Some(to) = to {
        config.to = to;
    }
    config.force_from |= force_from;
    config.force_to |= force_to;
    config.auto_correct |= auto_correct;

    info!("Translating {} text(s) from {} to {}", text.len(), config.from, config.to);

    let translator = AsyncTranslator::new(config)?;
    let results = translator.translate(text).await?.into_vec();

    if json {
        println!("{}", serde_json::to_string_pretty(&Batch::Sequence(results))?);
        return Ok(());
    }

    for result in &results {
        print_translation(result);
    }

    Ok(())
}

fn print_translation(result: &TranslationResult) {
    println!("{}", result.text);

    if let Some(pronunciation) = &result.pronunciation {
        println!("   Pronunciation: {}", pronunciation);
    }

    if let Some(corrected) = &result.from.text.value {
        if result.from.text.auto_corrected {
            println!("   Auto-corrected: {}", corrected);
        } else if result.from.text.did_you_mean {
            println!("   Did you mean: {}", corrected);
        }
    }
}

/// Handle speak command
pub async fn handle_speak(
    mut config: TranslatorConfig,
    text: Vec<String>,
    to: Option<String>,
    force_to: bool,
    output: PathBuf,
) -> anyhow::Result<()> {
    use tracing::info;

    if let Some(to) = to {
        config.to = to;
    }
    config.force_to |= force_to;

    info!("Speaking {} text(s) in {}", text.len(), config.to);

    let translator = AsyncTranslator::new(config)?;
    let audio = translator.speak(text).await?.into_vec();

    let mut bytes = Vec::new();
    for part in &audio {
        bytes.extend(part.decode()?);
    }

    tokio::fs::write(&output, &bytes).await?;

    println!("✅ Saved {} bytes of audio to {}", bytes.len(), output.display());

    Ok(())
}

/// Handle languages command
pub fn handle_languages() {
    use crate::core::languages::SUPPORTED_LANGUAGES;

    for (code, name) in SUPPORTED_LANGUAGES {
        println!("  {:9} {}", code, name);
    }
}
