//! Cron-driven run loop.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use tracing::{error, info, warn};

use crate::job::{Bot, RunOutcome};

/// Parse a `cron` expression (seconds field first, UTC).
pub fn parse_schedule(expr: &str) -> Result<cron::Schedule> {
    cron::Schedule::from_str(expr).with_context(|| format!("invalid cron expression '{}'", expr))
}

/// First fire time strictly after `after`.
pub fn next_fire(schedule: &cron::Schedule, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    schedule.after(&after).next()
}

/// Run the bot on `schedule` until Ctrl-C. A failed run is logged and the
/// loop carries on.
pub async fn run_forever(bot: &mut Bot, schedule: &cron::Schedule, run_now: bool) -> Result<()> {
    if run_now {
        run_logged(bot).await;
    }

    loop {
        let now = Utc::now();
        let Some(next) = next_fire(schedule, now) else {
            warn!("schedule has no upcoming fire times, stopping");
            return Ok(());
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        info!(next = %next, wait_secs = wait.as_secs(), "next run scheduled");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                run_logged(bot).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal, stopping scheduler");
                return Ok(());
            }
        }
    }
}

async fn run_logged(bot: &mut Bot) {
    let today = Local::now().date_naive();
    match bot.run_once(Utc::now(), today).await {
        Ok(RunOutcome::NothingNew) => {}
        Ok(RunOutcome::DryRun { card, .. }) => info!(%card, "dry run finished"),
        Ok(RunOutcome::Posted { card, post_id, .. }) => info!(%card, %post_id, "run finished"),
        Err(e) => error!(error = %format!("{:#}", e), "run failed"),
    }
}
