//! CLI administration tool for share-links.
//!
//! Works directly on the configured stores, without going through the HTTP
//! API (and therefore without its origin checks and rate limits).
//!
//! # Usage
//!
//! ```bash
//! # Show where a code points
//! cargo run --bin share-links-admin -- link resolve amber-coral-nova
//!
//! # Find the code indexed for a URL
//! cargo run --bin share-links-admin -- link lookup "https://app.example/#plan"
//!
//! # Draw sample codes
//! cargo run --bin share-links-admin -- code sample -n 10
//!
//! # Inspect or reset telemetry
//! cargo run --bin share-links-admin -- telemetry show
//! cargo run --bin share-links-admin -- telemetry reset
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `APP_ORIGIN`, `LINKS_STORE_URL`, `TELEMETRY_STORE_URL`
//! and the retry settings.

use share_links::application::services::{LinkService, TelemetryService};
use share_links::config::Config;
use share_links::domain::short_code::{CodeShape, ShortCode};
use share_links::domain::telemetry::TelemetryPolicy;
use share_links::infrastructure::kv;
use share_links::utils::code_generator::{CodeSource, RandomCodes};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;

/// CLI tool for managing share-links.
#[derive(Parser)]
#[command(name = "share-links-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect short links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Short code utilities
    Code {
        #[command(subcommand)]
        action: CodeAction,
    },

    /// Inspect or reset usage counters
    Telemetry {
        #[command(subcommand)]
        action: TelemetryAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show the URL a code points at
    Resolve {
        /// Short code (word, hex or legacy shape)
        code: String,
    },

    /// Show the code indexed for a URL
    Lookup {
        /// Full application URL
        url: String,
    },
}

#[derive(Subcommand)]
enum CodeAction {
    /// Draw sample word codes (nothing is stored)
    Sample {
        /// Number of codes to draw
        #[arg(short, long, default_value_t = 5)]
        n: usize,
    },
}

#[derive(Subcommand)]
enum TelemetryAction {
    /// Print the current aggregate
    Show,

    /// Replace the aggregate with an empty object
    Reset {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Code { action } => handle_code_action(action),
        Commands::Link { action } => {
            let config = load_config()?;
            handle_link_action(action, &config).await
        }
        Commands::Telemetry { action } => {
            let config = load_config()?;
            handle_telemetry_action(action, &config).await
        }
    }
}

fn load_config() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}

async fn link_service(config: &Config) -> Result<LinkService> {
    let url = config
        .links_store_url
        .as_deref()
        .context("LINKS_STORE_URL must be set")?;
    warn_if_memory(url);

    let store = kv::connect(url, "links")
        .await
        .context("Failed to open links store")?;

    Ok(LinkService::new(
        store,
        Arc::new(RandomCodes),
        config.retry_policy(),
        config.app_origin.clone(),
    ))
}

async fn telemetry_service(config: &Config) -> Result<TelemetryService> {
    let url = config
        .telemetry_store_url
        .as_deref()
        .context("TELEMETRY_STORE_URL must be set")?;
    warn_if_memory(url);

    let store = kv::connect(url, "telemetry")
        .await
        .context("Failed to open telemetry store")?;

    Ok(TelemetryService::new(
        store,
        TelemetryPolicy::default(),
        config.retry_policy(),
    ))
}

fn warn_if_memory(url: &str) {
    if url.starts_with("memory://") {
        println!(
            "{}",
            "Note: memory:// stores are per-process; this tool sees an empty store.".yellow()
        );
    }
}

/// Dispatches link inspection commands.
async fn handle_link_action(action: LinkAction, config: &Config) -> Result<()> {
    let service = link_service(config).await?;

    match action {
        LinkAction::Resolve { code } => {
            let code = ShortCode::parse(&code).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("{}", "Resolve".bright_blue().bold());
            println!();
            println!("  Code:  {} ({})", code.as_str().cyan(), shape_label(code.shape()));

            match service.resolve(&code).await {
                Ok(url) => {
                    println!("  URL:   {}", url.bright_white());
                    println!("  Short: {}", config.short_url(code.as_str()).bright_black());
                }
                Err(e) => println!("  {}", e.to_string().red()),
            }
        }
        LinkAction::Lookup { url } => {
            println!("{}", "Reverse lookup".bright_blue().bold());
            println!();

            let found = service
                .find_code(&url)
                .await
                .map_err(|e| anyhow::anyhow!("{e}"))?;

            match found {
                Some(code) => {
                    println!("  Code:  {} ({})", code.as_str().cyan(), shape_label(code.shape()));
                    if !code.is_current_shape() {
                        println!(
                            "  {}",
                            "Legacy code: the next create for this URL mints a new one".yellow()
                        );
                    }
                }
                None => println!("  {}", "No code indexed for this URL".yellow()),
            }
        }
    }

    println!();
    Ok(())
}

/// Prints freshly drawn word codes.
fn handle_code_action(action: CodeAction) -> Result<()> {
    match action {
        CodeAction::Sample { n } => {
            println!("{}", "Sample codes".bright_blue().bold());
            println!();
            let codes = RandomCodes;
            for _ in 0..n {
                println!("  {}", codes.word_code().cyan());
            }
            println!();
        }
    }
    Ok(())
}

/// Dispatches telemetry commands.
async fn handle_telemetry_action(action: TelemetryAction, config: &Config) -> Result<()> {
    let service = telemetry_service(config).await?;

    match action {
        TelemetryAction::Show => {
            let aggregate = service.snapshot().await;
            println!("{}", "Telemetry".bright_blue().bold());
            println!();

            if aggregate.is_empty() {
                println!("  {}", "No counters recorded".yellow());
            } else {
                println!("{}", serde_json::to_string_pretty(&aggregate)?);
            }
            println!();
        }
        TelemetryAction::Reset { yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Reset all telemetry counters?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "Cancelled".red());
                    return Ok(());
                }
            }

            service
                .reset()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to reset telemetry: {e}"))?;

            println!("{}", "Telemetry counters reset".green().bold());
        }
    }

    Ok(())
}

fn shape_label(shape: CodeShape) -> &'static str {
    match shape {
        CodeShape::Words => "words",
        CodeShape::Hex => "hex",
        CodeShape::Legacy => "legacy",
    }
}
