//! `wks logout` — remove credentials and session state.

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::config;
use crate::output::{OutputMode, render_success};

#[derive(Args, Debug)]
pub struct LogoutArgs {
    /// Also drop the cached project list and group selection.
    #[arg(long)]
    pub purge_cache: bool,
}

pub fn run_logout(args: &LogoutArgs, output: OutputMode) -> Result<()> {
    let had_credentials = config::delete_auth()?;
    // Session state (the open project) never outlives the login.
    config::clear_session_dir()?;

    if args.purge_cache {
        let store = config::durable_store()?;
        use wikiscope_core::KvStore;
        store.remove(wikiscope_core::cache::PROJECTS_KEY)?;
        store.remove(wikiscope_core::cache::SYNCED_AT_KEY)?;
        store.remove(wikiscope_core::selection::ACTIVE_GROUPS_KEY)?;
    }

    info!(had_credentials, purged = args.purge_cache, "logged out");
    if had_credentials {
        render_success(output, "logged out")
    } else {
        render_success(output, "no saved credentials — nothing to do")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LogoutArgs,
    }

    #[test]
    fn purge_cache_defaults_off() {
        let w = Wrapper::parse_from(["test"]);
        assert!(!w.args.purge_cache);
    }
}
