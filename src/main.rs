//! Main entry point for the gtranslate CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gtranslate_batch::cli::commands::{self, Commands};
use gtranslate_batch::TranslatorConfig;

/// Batched translation and text-to-speech from the command line
#[derive(Parser, Debug)]
#[command(name = "gtranslate", version, about, long_about = None)]
struct Args {
    /// Service domain suffix, e.g. com, de, co.jp (defaults to GTRANSLATE_TLD or com)
    #[arg(long)]
    tld: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("gtranslate_batch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gtranslate_batch=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::from_env()?,
    };
    if let Some(tld) = args.tld {
        config.tld = tld;
    }

    // Execute command
    match args.command {
        Some(Commands::Translate {
            text,
            from,
            to,
            force_from,
            force_to,
            auto_correct,
            json,
        }) => {
            commands::handle_translate(
                config,
                text,
                from,
                to,
                force_from,
                force_to,
                auto_correct,
                json,
            )
            .await?;
        }
        Some(Commands::Speak {
            text,
            to,
            force_to,
            output,
        }) => {
            commands::handle_speak(config, text, to, force_to, output).await?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages();
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
