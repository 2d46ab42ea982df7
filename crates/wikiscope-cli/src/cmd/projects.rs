//! `wks projects` — the cached, filtered project listing.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use std::io::Write;

use wikiscope_core::tree::GroupTreeNode;
use wikiscope_core::{FileStore, ProjectBrowser, staleness_label};

use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct ProjectsArgs {
    /// Narrow the list with a case-insensitive substring query.
    #[arg(long, default_value = "")]
    pub query: String,

    /// Print a flat list instead of the group tree.
    #[arg(long)]
    pub flat: bool,

    /// Fetch a fresh project list before rendering.
    #[arg(short, long)]
    pub refresh: bool,
}

pub async fn run_projects(args: &ProjectsArgs, output: OutputMode) -> Result<()> {
    let mut browser = super::open_browser()?;
    super::ensure_synced(&mut browser, args.refresh, output).await?;
    browser.set_query(&args.query);

    if args.flat {
        render_flat(&browser, output)
    } else {
        render_tree_view(&browser, output)
    }
}

fn staleness_line(browser: &ProjectBrowser<FileStore>) -> String {
    browser.entry().last_synced_at.map_or_else(
        || "never synced".to_string(),
        |t| format!("synced {} ago", staleness_label(t, Utc::now())),
    )
}

fn render_flat(browser: &ProjectBrowser<FileStore>, output: OutputMode) -> Result<()> {
    let visible = browser.visible_projects();
    render(output, &visible, |projects, w| {
        if projects.is_empty() {
            writeln!(w, "no projects match")?;
            return Ok(());
        }
        for project in projects {
            writeln!(w, "{:>8}  {}", project.id, project.path_with_namespace)?;
        }
        writeln!(w, "\n{} projects, {}", projects.len(), staleness_line(browser))
    })
}

fn render_tree_view(browser: &ProjectBrowser<FileStore>, output: OutputMode) -> Result<()> {
    let tree = browser.tree();
    render(output, &tree, |tree, w| {
        if tree.is_empty() {
            writeln!(w, "no projects match")?;
            return Ok(());
        }
        write_node(tree, w)?;
        writeln!(w, "\n{} projects, {}", tree.total_projects(), staleness_line(browser))
    })
}

/// Indented tree rendering; empty nodes are pruned here, at render time.
fn write_node(node: &GroupTreeNode, w: &mut dyn Write) -> std::io::Result<()> {
    if node.level > 0 && !node.is_empty() {
        let indent = "  ".repeat(node.level as usize - 1);
        writeln!(w, "{indent}{}/", node.name)?;
    }
    let project_indent = "  ".repeat(node.level as usize);
    for project in &node.projects {
        writeln!(w, "{project_indent}{} ({})", project.name, project.id)?;
    }
    for child in &node.children {
        if !child.is_empty() {
            write_node(child, w)?;
        }
    }
    Ok(())
}
