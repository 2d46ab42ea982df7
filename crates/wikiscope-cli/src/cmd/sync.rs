//! `wks sync` — manual cache refresh.

use anyhow::Result;
use chrono::Utc;
use clap::Args;

use wikiscope_core::{SyncOutcome, staleness_label};

use crate::output::{OutputMode, render, render_error};

#[derive(Args, Debug)]
pub struct SyncArgs {}

pub async fn run_sync(_args: &SyncArgs, output: OutputMode) -> Result<()> {
    let mut browser = super::open_browser()?;
    let client = super::client()?;
    let outcome = browser.sync(&client).await?;

    if outcome == SyncOutcome::Failed {
        let message = browser.last_error().unwrap_or("unknown error").to_string();
        render_error(output, &message)?;
        anyhow::bail!("sync failed");
    }

    let entry = browser.entry();
    let summary = serde_json::json!({
        "projects": entry.projects.len(),
        "synced_at": entry.last_synced_at,
    });
    render(output, &summary, |_, w| {
        let staleness = entry
            .last_synced_at
            .map_or_else(|| "never".to_string(), |t| staleness_label(t, Utc::now()));
        writeln!(
            w,
            "synced {} projects ({} ago)",
            entry.projects.len(),
            staleness
        )
    })
}
