//! dnt-blurb-bot: post a Death & Taxes staple blurb for a new white card.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dnt_blurb::core::pipeline::BlurbEngine;
use dnt_blurb_bot::catalog::{CatalogCard, ScryfallClient};
use dnt_blurb_bot::config::BotConfig;
use dnt_blurb_bot::job::{Bot, JobOptions, RunOutcome};
use dnt_blurb_bot::social::XClient;
use dnt_blurb_bot::{logging, schedule};

#[derive(Parser, Debug)]
#[command(
    name = "dnt-blurb-bot",
    version,
    about = "Posts newly spoiled white cards as Death & Taxes staples",
    long_about = None
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    /// Extra phrase book merged over the built-in one.
    #[arg(long, global = true)]
    phrases: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the posting job once.
    Run {
        /// Compose and log without uploading or posting.
        #[arg(long)]
        dry_run: bool,

        /// Seed for card selection and caption generation.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the posting job on a cron schedule until interrupted.
    Schedule {
        /// Cron expression, seconds first, evaluated in UTC
        /// (e.g. "0 0 15 * * *" for 15:00 daily).
        #[arg(long)]
        cron: String,

        /// Compose and log without uploading or posting.
        #[arg(long)]
        dry_run: bool,

        /// Also run once immediately at startup.
        #[arg(long)]
        now: bool,
    },

    /// Print captions and alt text for a card stored as catalog JSON.
    Preview {
        /// Path to a Scryfall card JSON object.
        #[arg(long)]
        card: PathBuf,

        /// Number of captions to print.
        #[arg(long, default_value_t = 3)]
        count: usize,

        /// RNG seed.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_warnings) = BotConfig::load();
    logging::init(&config.log_level, cli.json_logs);
    for warning in &config_warnings {
        warn!("{}", warning);
    }

    match cli.command {
        Commands::Run { dry_run, seed } => {
            let mut bot = build_bot(&config, cli.phrases.as_ref(), dry_run, seed)?;
            let today = Local::now().date_naive();
            match bot.run_once(Utc::now(), today).await? {
                RunOutcome::NothingNew => {}
                RunOutcome::DryRun {
                    caption, alt_texts, ..
                } => {
                    println!("{}", caption);
                    for alt in alt_texts {
                        println!("\n---\n{}", alt);
                    }
                }
                RunOutcome::Posted { card, post_id, .. } => {
                    info!(%card, %post_id, "done");
                }
            }
        }
        Commands::Schedule { cron, dry_run, now } => {
            let schedule = schedule::parse_schedule(&cron)?;
            let mut bot = build_bot(&config, cli.phrases.as_ref(), dry_run, None)?;
            info!(%cron, dry_run, "scheduler started");
            schedule::run_forever(&mut bot, &schedule, now).await?;
        }
        Commands::Preview { card, count, seed } => {
            let mut engine = build_engine(cli.phrases.as_ref(), seed)?;
            let contents = std::fs::read_to_string(&card)
                .with_context(|| format!("failed to read {}", card.display()))?;
            let record: CatalogCard = serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse {}", card.display()))?;
            let subject = record.to_subject()?;

            for caption in engine.caption_variants(&subject, count)? {
                println!("{}\n\n======\n", caption);
            }
            for alt in engine.alt_texts(&subject)? {
                println!("{}\n", alt);
            }
        }
    }

    Ok(())
}

fn build_engine(phrases: Option<&PathBuf>, seed: Option<u64>) -> Result<BlurbEngine> {
    let mut builder = BlurbEngine::builder();
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    if let Some(path) = phrases {
        builder = builder.phrase_file(path);
    }
    builder.build().context("failed to build caption engine")
}

fn build_bot(
    config: &BotConfig,
    phrases: Option<&PathBuf>,
    dry_run: bool,
    seed: Option<u64>,
) -> Result<Bot> {
    config.validate(dry_run)?;
    let engine = build_engine(phrases, seed)?;

    let catalog = ScryfallClient::new(&config.scryfall_base, &config.user_agent)
        .context("failed to create catalog client")?;
    let platform = XClient::new(
        &config.x_api_base,
        config.account_id.as_deref().unwrap_or_default(),
        config.access_token.clone(),
        &config.user_agent,
    )
    .context("failed to create platform client")?;

    Ok(Bot::new(
        engine,
        Box::new(catalog),
        Box::new(platform),
        JobOptions {
            dry_run,
            history_months: config.history_months,
        },
    ))
}
