//! One module per subcommand: `XxxArgs` (clap) plus `run_xxx`.

pub mod browse;
pub mod completions;
pub mod groups;
pub mod login;
pub mod logout;
pub mod projects;
pub mod status;
pub mod sync;
pub mod wiki;

use anyhow::{Context, Result};
use wikiscope_core::{FileStore, ProjectBrowser, SyncOutcome};
use wikiscope_gitlab::GitLabClient;

use crate::config;
use crate::output::{OutputMode, render_note};

/// Authenticated client from saved credentials.
pub(crate) fn client() -> Result<GitLabClient> {
    let auth = config::require_auth()?;
    GitLabClient::new(&auth.gitlab_url, &auth.token)
        .context("could not construct GitLab client from saved credentials")
}

/// Open the browser over the durable store.
pub(crate) fn open_browser() -> Result<ProjectBrowser<FileStore>> {
    let store = config::durable_store()?;
    Ok(ProjectBrowser::open(store)?)
}

/// Make sure the browser has a usable snapshot.
///
/// A never-synced cache blocks on a first sync; otherwise cached data is
/// served as-is unless `refresh` forces a round trip. A failed refresh
/// keeps stale data and prints the error as a note.
pub(crate) async fn ensure_synced(
    browser: &mut ProjectBrowser<FileStore>,
    refresh: bool,
    output: OutputMode,
) -> Result<()> {
    if browser.needs_sync() {
        render_note(output, "no cached projects yet — syncing…")?;
        let outcome = browser.sync(&client()?).await?;
        if outcome == SyncOutcome::Failed {
            anyhow::bail!(
                "initial sync failed: {}",
                browser.last_error().unwrap_or("unknown error")
            );
        }
        return Ok(());
    }
    if refresh {
        let outcome = browser.sync(&client()?).await?;
        if outcome == SyncOutcome::Failed {
            render_note(
                output,
                &format!(
                    "refresh failed ({}); showing cached data",
                    browser.last_error().unwrap_or("unknown error")
                ),
            )?;
        }
    }
    Ok(())
}
