//! One posting run: history, candidates, selection, text, upload, post.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use dnt_blurb::core::pipeline::BlurbEngine;

use crate::catalog::{filter_unmentioned, Catalog};
use crate::history::mentioned_names;
use crate::social::Platform;

/// Knobs for a run.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Compose and log, but upload and post nothing.
    pub dry_run: bool,
    /// History lookback.
    pub history_months: u32,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            history_months: 2,
        }
    }
}

/// What a run ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every candidate had been posted about already (or there were none).
    NothingNew,
    /// Dry run: the post that would have been made.
    DryRun {
        card: String,
        caption: String,
        alt_texts: Vec<String>,
    },
    /// A post went out.
    Posted {
        card: String,
        post_id: String,
        media_ids: Vec<String>,
    },
}

/// The bot: a generator plus the two services it talks to.
pub struct Bot {
    engine: BlurbEngine,
    catalog: Box<dyn Catalog>,
    platform: Box<dyn Platform>,
    options: JobOptions,
    rng: StdRng,
}

impl Bot {
    pub fn new(
        engine: BlurbEngine,
        catalog: Box<dyn Catalog>,
        platform: Box<dyn Platform>,
        options: JobOptions,
    ) -> Self {
        // Card selection follows the caption seed so seeded runs repeat.
        let rng = match engine.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            engine,
            catalog,
            platform,
            options,
            rng,
        }
    }

    /// Run once. `now` bounds the history window; `today` is the release
    /// date cutoff for candidates.
    pub async fn run_once(&mut self, now: DateTime<Utc>, today: NaiveDate) -> Result<RunOutcome> {
        let since = now
            .checked_sub_months(Months::new(self.options.history_months))
            .unwrap_or(now);

        let posts = match self.platform.recent_posts(since).await {
            Ok(posts) => posts,
            Err(e) if self.options.dry_run => {
                warn!(error = %e, "could not read history, continuing dry run without it");
                Vec::new()
            }
            Err(e) => return Err(e).context("failed to read posting history"),
        };
        let mentioned = mentioned_names(&posts);
        info!(posts = posts.len(), mentioned = mentioned.len(), "history scanned");

        let candidates = self
            .catalog
            .candidates(today)
            .await
            .context("failed to fetch candidate cards")?;
        let total = candidates.len();
        let remaining = filter_unmentioned(candidates, &mentioned);
        info!(total, remaining = remaining.len(), "candidates filtered");

        let Some(card) = remaining.choose(&mut self.rng) else {
            info!("No new cards to post about");
            return Ok(RunOutcome::NothingNew);
        };
        info!(card = %card.name, layout = %card.layout, "card selected");

        let subject = card.to_subject()?;
        let image_urls = card.image_urls()?;
        let alt_texts = self
            .engine
            .alt_texts(&subject)
            .context("failed to describe card")?;
        if image_urls.len() != alt_texts.len() {
            bail!(
                "card '{}' has {} images but {} faces",
                card.name,
                image_urls.len(),
                alt_texts.len()
            );
        }
        let caption = self
            .engine
            .caption(&subject)
            .context("failed to compose caption")?;

        if self.options.dry_run {
            info!(card = %card.name, %caption, "dry run caption");
            for (face, alt) in alt_texts.iter().enumerate() {
                info!(face, alt_text = %alt, "dry run alt text");
            }
            return Ok(RunOutcome::DryRun {
                card: card.name.clone(),
                caption,
                alt_texts,
            });
        }

        let mut media_ids = Vec::with_capacity(image_urls.len());
        for (url, alt) in image_urls.iter().zip(&alt_texts) {
            let image = self
                .catalog
                .image(url)
                .await
                .with_context(|| format!("failed to download {}", url))?;
            let media_id = self
                .platform
                .upload_image(image, alt)
                .await
                .context("failed to upload image")?;
            media_ids.push(media_id);
        }

        let post_id = self
            .platform
            .publish(&caption, &media_ids)
            .await
            .context("failed to publish post")?;

        Ok(RunOutcome::Posted {
            card: card.name.clone(),
            post_id,
            media_ids,
        })
    }
}
