//! `wks wiki` — list and read a project's wiki pages.

use anyhow::{Context, Result, bail};
use clap::Args;

use wikiscope_core::model::Project;
use wikiscope_core::{FileStore, ProjectBrowser, SessionState};

use crate::config;
use crate::markdown;
use crate::output::{OutputMode, render, render_note};

#[derive(Args, Debug)]
pub struct WikiArgs {
    /// Project id or full path (e.g. `acme/core/docs`).
    pub project: String,

    /// Page slug; defaults to the first page, as the web viewer does.
    pub slug: Option<String>,

    /// Only list the pages instead of rendering one.
    #[arg(long)]
    pub pages: bool,
}

pub async fn run_wiki(args: &WikiArgs, output: OutputMode) -> Result<()> {
    let mut browser = super::open_browser()?;
    super::ensure_synced(&mut browser, false, output).await?;

    let project = resolve_project(&browser, &args.project)?;
    let session = SessionState::new(config::session_store()?);
    // Remember what is open; reads validate the id and drop mismatches.
    session.set_selected(&project)?;
    let recalled = session.selected(project.id)?;
    debug_assert!(recalled.is_some());

    let client = super::client()?;
    let pages = client.wiki_pages(project.id).await?;

    if args.pages {
        return render(output, &pages, |pages, w| {
            if pages.is_empty() {
                writeln!(w, "this project has no wiki pages")?;
                return Ok(());
            }
            for page in pages {
                writeln!(w, "{:<32} {}", page.slug, page.title)?;
            }
            Ok(())
        });
    }

    let slug = match &args.slug {
        Some(slug) => slug.clone(),
        None => match pages.first() {
            Some(first) => first.slug.clone(),
            None => {
                render_note(output, "this project has no wiki pages")?;
                return Ok(());
            }
        },
    };

    let page = client
        .wiki_page(project.id, &slug)
        .await
        .with_context(|| format!("could not fetch wiki page {slug:?}"))?;

    render(output, &page, |page, w| {
        writeln!(w, "# {} — {}\n", project.path_with_namespace, page.title)?;
        if page.format == "markdown" {
            write!(w, "{}", markdown::render(&page.content))
        } else {
            // Other wiki formats (rdoc, asciidoc…) pass through untouched.
            writeln!(w, "{}", page.content)
        }
    })
}

/// Resolve a project reference against the cached list.
fn resolve_project(browser: &ProjectBrowser<FileStore>, reference: &str) -> Result<Project> {
    let projects = &browser.entry().projects;
    let found = reference.parse::<i64>().map_or_else(
        |_| {
            projects
                .iter()
                .find(|p| p.path_with_namespace.eq_ignore_ascii_case(reference))
        },
        |id| projects.iter().find(|p| p.id == id),
    );
    match found {
        Some(project) => Ok(project.clone()),
        None => bail!(
            "project {reference:?} is not in the cached list — try `wks sync` \
             or `wks projects` to see what is available"
        ),
    }
}
