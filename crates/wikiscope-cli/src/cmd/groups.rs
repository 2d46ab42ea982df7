//! `wks groups` — list remote groups and manage the active selection.

use anyhow::Result;
use clap::{Args, Subcommand};

use wikiscope_core::ProjectSource;

use crate::output::{OutputMode, render, render_success};

#[derive(Args, Debug)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: Option<GroupsCommand>,
}

#[derive(Subcommand, Debug)]
pub enum GroupsCommand {
    /// List accessible groups, marking the active ones (default).
    List,
    /// Add groups to the active selection.
    Select {
        /// Group ids to activate.
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Remove groups from the active selection.
    Deselect {
        /// Group ids to deactivate.
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Activate every accessible group.
    All,
    /// Clear the selection — all projects become visible again.
    None,
}

pub async fn run_groups(args: &GroupsArgs, output: OutputMode) -> Result<()> {
    match args.command.as_ref().unwrap_or(&GroupsCommand::List) {
        GroupsCommand::List => list_groups(output).await,
        GroupsCommand::Select { ids } => {
            let mut browser = super::open_browser()?;
            for id in ids {
                browser.active_groups_mut().select(*id)?;
            }
            render_success(output, &format!("{} group(s) selected", ids.len()))
        }
        GroupsCommand::Deselect { ids } => {
            let mut browser = super::open_browser()?;
            for id in ids {
                browser.active_groups_mut().deselect(*id)?;
            }
            render_success(output, &format!("{} group(s) deselected", ids.len()))
        }
        GroupsCommand::All => {
            let remote = super::client()?.list_groups().await?;
            let count = remote.len();
            let mut browser = super::open_browser()?;
            browser.select_all_groups(remote.into_iter().map(|g| g.id))?;
            render_success(output, &format!("all {count} groups selected"))
        }
        GroupsCommand::None => {
            let mut browser = super::open_browser()?;
            browser.deselect_all_groups()?;
            render_success(output, "selection cleared — showing all projects")
        }
    }
}

async fn list_groups(output: OutputMode) -> Result<()> {
    let groups = super::client()?.list_groups().await?;
    let browser = super::open_browser()?;
    let active = browser.active_groups();

    let listing: Vec<serde_json::Value> = groups
        .iter()
        .map(|g| {
            serde_json::json!({
                "id": g.id,
                "name": g.name,
                "full_path": g.full_path,
                "parent_id": g.parent_id,
                "active": active.contains(g.id),
            })
        })
        .collect();

    render(output, &listing, |_, w| {
        if groups.is_empty() {
            writeln!(w, "no groups found")?;
            return Ok(());
        }
        for group in &groups {
            let marker = if active.contains(group.id) { "✓" } else { " " };
            writeln!(w, "[{marker}] {:>8}  {}", group.id, group.full_path)?;
        }
        writeln!(
            w,
            "\n{} of {} selected (empty selection shows everything)",
            active.len(),
            groups.len()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: GroupsArgs,
    }

    #[test]
    fn bare_groups_defaults_to_list() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.command.is_none());
    }

    #[test]
    fn select_requires_at_least_one_id() {
        assert!(Wrapper::try_parse_from(["test", "select"]).is_err());
        let w = Wrapper::parse_from(["test", "select", "42", "50"]);
        assert!(matches!(
            w.args.command,
            Some(GroupsCommand::Select { ref ids }) if ids == &vec![42, 50]
        ));
    }

    #[test]
    fn none_subcommand_parses() {
        let w = Wrapper::parse_from(["test", "none"]);
        assert!(matches!(w.args.command, Some(GroupsCommand::None)));
    }
}
