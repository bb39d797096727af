use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use client::{ApiClient, Controller, RetryPolicy, TextApi};
use shared_types::Tone;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tonefix", version, about = "Proofread text or rewrite its tone")]
struct Cli {
    /// Base URL of the tonefix proxy
    #[arg(long, env = "TONEFIX_SERVER", default_value = "http://localhost:3000", global = true)]
    server: String,

    /// Retries after the first failed attempt
    #[arg(long, default_value_t = 3, global = true)]
    retries: u32,

    /// Wait before the first retry, doubled on each further retry
    #[arg(long, default_value_t = 1000, global = true)]
    initial_delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Correct grammar, spelling and punctuation
    Correct {
        /// Also print the original with corrected words marked as HTML
        #[arg(long)]
        html: bool,

        /// Rewrite the corrected text in this tone afterwards
        #[arg(long)]
        tone: Option<String>,

        /// Input file, stdin when omitted
        file: Option<PathBuf>,
    },
    /// Rewrite text in a tone (professional, friendly, concise, or any label)
    Tone {
        #[arg(long)]
        tone: String,

        /// Input file, stdin when omitted
        file: Option<PathBuf>,
    },
}

fn read_input(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let policy = RetryPolicy::new(cli.retries, Duration::from_millis(cli.initial_delay_ms));
    let api = Arc::new(ApiClient::with_policy(cli.server.clone(), policy));

    match cli.command {
        Command::Correct { html, tone, file } => {
            let input = read_input(file.as_ref())?;
            let controller = Controller::new(api);
            controller.set_input(input);
            controller.correct().await?;
            if let Some(tone) = tone {
                controller.change_tone(Tone::from_label(&tone)).await?;
            }

            let view = controller.view();
            let result = view
                .result
                .context("correction finished without a result")?;
            println!("{}", result.output_text);
            if html {
                println!();
                println!("{}", result.highlighted_html);
            }
            if !result.wrong_words.is_empty() {
                eprintln!("changed: {}", result.wrong_words.join(", "));
            }
        }
        Command::Tone { tone, file } => {
            let input = read_input(file.as_ref())?;
            if input.trim().is_empty() {
                anyhow::bail!("Please enter some text to rewrite.");
            }
            let response = api.change_tone(&input, &Tone::from_label(&tone)).await?;
            println!("{}", response.new_text);
        }
    }

    Ok(())
}
