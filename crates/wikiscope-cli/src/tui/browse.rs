//! TUI browse view for wikiscope.
//!
//! Provides a full-screen terminal UI with:
//! - The group tree over the visible projects, expand/collapse per node
//! - Slash search over project name and full path
//! - Background refresh (`r`) that keeps serving the stale snapshot
//! - An inline wiki reader opened with Enter on a project

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use wikiscope_core::model::Project;
use wikiscope_core::{
    FileStore, GroupTreeNode, KvStore, ProjectBrowser, ProjectSource, SessionState, SyncOutcome,
};
use wikiscope_gitlab::GitLabClient;

use crate::config;
use crate::markdown;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Input mode determines how key events are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Normal,
    /// Editing the search query; every keystroke refilters live.
    Search,
    /// Full-screen wiki reader over the tree.
    Reader,
}

/// One visible line of the flattened tree.
#[derive(Debug, Clone, PartialEq)]
enum TreeRow {
    Group {
        path: String,
        name: String,
        level: u32,
        expanded: bool,
        project_count: usize,
    },
    Project { project: Project, level: u32 },
}

/// State of the inline wiki reader.
#[derive(Debug)]
struct ReaderState {
    title: String,
    text: String,
    scroll: u16,
    line_count: u16,
}

/// Actions the view cannot perform itself because they need the network;
/// the event loop executes them and feeds results back in.
#[derive(Debug, PartialEq)]
pub enum BrowseAction {
    /// Start a background snapshot refresh.
    Refresh,
    /// Fetch and open the wiki of a project.
    OpenWiki(Project),
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// The browse view: flattened tree rows over a [`ProjectBrowser`].
pub struct BrowseView<S> {
    browser: ProjectBrowser<S>,
    rows: Vec<TreeRow>,
    list_state: ListState,
    input_mode: InputMode,
    search_buf: String,
    search_prev_query: String,
    reader: Option<ReaderState>,
    status_msg: Option<(String, Instant)>,
    should_quit: bool,
}

impl<S: KvStore> BrowseView<S> {
    /// Build the view over an already-loaded browser. Every group node
    /// starts expanded so the first screen shows the whole hierarchy.
    pub fn new(browser: ProjectBrowser<S>) -> Self {
        let mut view = Self {
            browser,
            rows: Vec::new(),
            list_state: ListState::default(),
            input_mode: InputMode::Normal,
            search_buf: String::new(),
            search_prev_query: String::new(),
            reader: None,
            status_msg: None,
            should_quit: false,
        };
        view.expand_all();
        view.rebuild_rows();
        view
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub const fn browser(&self) -> &ProjectBrowser<S> {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut ProjectBrowser<S> {
        &mut self.browser
    }

    /// Show a transient message in the status bar.
    pub fn set_status(&mut self, msg: String) {
        self.status_msg = Some((msg, Instant::now()));
    }

    /// Settle a finished background refresh.
    pub fn finish_sync(&mut self, fetched: Result<Vec<Project>, String>) -> Result<()> {
        match fetched {
            Ok(projects) => {
                let count = projects.len();
                self.browser
                    .apply_fetched(projects)
                    .context("could not persist the refreshed snapshot")?;
                self.expand_all();
                self.set_status(format!("synced {count} projects"));
            }
            Err(message) => {
                self.browser.record_fetch_error(message);
                self.set_status("sync failed, showing cached data".to_string());
            }
        }
        self.rebuild_rows();
        Ok(())
    }

    /// Open the reader with already-fetched, already-rendered page text.
    pub fn open_reader(&mut self, title: String, text: String) {
        let line_count = u16::try_from(text.lines().count()).unwrap_or(u16::MAX);
        self.reader = Some(ReaderState {
            title,
            text,
            scroll: 0,
            line_count,
        });
        self.input_mode = InputMode::Reader;
    }

    fn close_reader(&mut self) {
        self.reader = None;
        self.input_mode = InputMode::Normal;
    }

    /// Expand every non-empty group so nothing is hidden by default.
    fn expand_all(&mut self) {
        fn walk<S: KvStore>(browser: &mut ProjectBrowser<S>, node: &GroupTreeNode) {
            for child in &node.children {
                if child.is_empty() {
                    continue;
                }
                if !browser.is_expanded(&child.path) {
                    browser.toggle_expanded(&child.path);
                }
                walk(browser, child);
            }
        }
        let tree = self.browser.tree();
        walk(&mut self.browser, &tree);
    }

    /// Recompute the flattened rows from the current tree, pruning empty
    /// nodes and hiding the subtrees of collapsed groups.
    fn rebuild_rows(&mut self) {
        fn push_node<S: KvStore>(
            browser: &ProjectBrowser<S>,
            node: &GroupTreeNode,
            rows: &mut Vec<TreeRow>,
        ) {
            for project in &node.projects {
                rows.push(TreeRow::Project {
                    project: project.clone(),
                    level: node.level + 1,
                });
            }
            for child in &node.children {
                if child.is_empty() {
                    continue;
                }
                let expanded = browser.is_expanded(&child.path);
                rows.push(TreeRow::Group {
                    path: child.path.clone(),
                    name: child.name.clone(),
                    level: child.level,
                    expanded,
                    project_count: child.total_projects(),
                });
                if expanded {
                    push_node(browser, child, rows);
                }
            }
        }

        let tree = self.browser.tree();
        let mut rows = Vec::new();
        // Root-level (personal namespace) projects come first, then groups.
        for project in &tree.projects {
            rows.push(TreeRow::Project {
                project: project.clone(),
                level: 0,
            });
        }
        for child in &tree.children {
            if child.is_empty() {
                continue;
            }
            let expanded = self.browser.is_expanded(&child.path);
            rows.push(TreeRow::Group {
                path: child.path.clone(),
                name: child.name.clone(),
                level: child.level,
                expanded,
                project_count: child.total_projects(),
            });
            if expanded {
                push_node(&self.browser, child, &mut rows);
            }
        }
        self.rows = rows;

        // Keep the cursor on a valid row.
        if self.rows.is_empty() {
            self.list_state.select(None);
        } else {
            let idx = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(idx.min(self.rows.len() - 1)));
        }
    }

    fn selected_row(&self) -> Option<&TreeRow> {
        self.list_state.selected().and_then(|idx| self.rows.get(idx))
    }

    /// The project under the cursor, if the cursor is on a project row.
    pub fn selected_project(&self) -> Option<&Project> {
        match self.selected_row() {
            Some(TreeRow::Project { project, .. }) => Some(project),
            _ => None,
        }
    }

    // --- navigation ---

    fn select_next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let idx = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((idx + 1).min(self.rows.len() - 1)));
    }

    fn select_prev(&mut self) {
        let idx = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(idx.saturating_sub(1)));
    }

    fn select_first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    // --- key handling ---

    /// Dispatch a key event; returns an action for the event loop when the
    /// view needs the network.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<BrowseAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match self.input_mode {
            InputMode::Search => {
                self.handle_search_key(key);
                None
            }
            InputMode::Reader => {
                self.handle_reader_key(key, ctrl);
                None
            }
            InputMode::Normal => self.handle_normal_key(key, ctrl),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, ctrl: bool) -> Option<BrowseAction> {
        match key.code {
            // Quit
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('g') | KeyCode::Home => self.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.select_last(),
            KeyCode::PageDown => {
                for _ in 0..10 {
                    self.select_next();
                }
            }
            KeyCode::PageUp => {
                for _ in 0..10 {
                    self.select_prev();
                }
            }

            // Expand/collapse the group under the cursor, or open the wiki
            // of the project under the cursor.
            KeyCode::Enter | KeyCode::Char(' ') => match self.selected_row().cloned() {
                Some(TreeRow::Group { path, .. }) => {
                    self.browser.toggle_expanded(&path);
                    self.rebuild_rows();
                }
                Some(TreeRow::Project { project, .. }) if key.code == KeyCode::Enter => {
                    return Some(BrowseAction::OpenWiki(project));
                }
                _ => {}
            },

            // Search
            KeyCode::Char('/') => {
                self.search_prev_query = self.browser.query().to_string();
                self.search_buf = self.browser.query().to_string();
                self.input_mode = InputMode::Search;
            }
            KeyCode::Esc if !self.browser.query().is_empty() => {
                self.browser.set_query("");
                self.expand_all();
                self.rebuild_rows();
            }

            // Background refresh.
            KeyCode::Char('r') => return Some(BrowseAction::Refresh),

            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                // Cancel restores the query from before `/` was pressed.
                self.browser.set_query(self.search_prev_query.clone());
                self.input_mode = InputMode::Normal;
                self.rebuild_rows();
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.search_buf.pop();
                self.apply_search();
            }
            KeyCode::Char(c) => {
                self.search_buf.push(c);
                self.apply_search();
            }
            _ => {}
        }
    }

    fn apply_search(&mut self) {
        self.browser.set_query(self.search_buf.clone());
        // A narrowed tree is only useful fully expanded.
        self.expand_all();
        self.rebuild_rows();
        self.select_first();
    }

    fn handle_reader_key(&mut self, key: KeyEvent, ctrl: bool) {
        let Some(reader) = self.reader.as_mut() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.close_reader(),
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                reader.scroll = reader.scroll.saturating_add(1).min(reader.line_count);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                reader.scroll = reader.scroll.saturating_sub(1);
            }
            KeyCode::PageDown => {
                reader.scroll = reader.scroll.saturating_add(10).min(reader.line_count);
            }
            KeyCode::PageUp => {
                reader.scroll = reader.scroll.saturating_sub(10);
            }
            KeyCode::Char('g') | KeyCode::Home => reader.scroll = 0,
            KeyCode::Char('G') | KeyCode::End => reader.scroll = reader.line_count,
            _ => {}
        }
    }

    // --- rendering ---

    pub fn render(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);
        let content_area = chunks[0];
        let status_area = chunks[1];

        if self.input_mode == InputMode::Reader {
            self.render_reader(frame, content_area);
        } else {
            self.render_tree(frame, content_area);
        }

        let status = build_status_bar(self);
        frame.render_widget(Paragraph::new(status).alignment(Alignment::Left), status_area);
    }

    fn render_tree(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.input_mode {
            InputMode::Search => format!(" wikiscope — search: {} ", self.search_buf),
            _ => {
                let visible = self.browser.visible_projects().len();
                let total = self.browser.entry().projects.len();
                let groups = self.browser.active_groups().len();
                if groups == 0 {
                    format!(" wikiscope — {visible} of {total} projects ")
                } else {
                    format!(" wikiscope — {visible} of {total} projects  [{groups} groups] ")
                }
            }
        };

        let items: Vec<ListItem<'_>> = self.rows.iter().map(build_row).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_set(border::ROUNDED)
                    .border_style(Style::default().fg(Color::Green))
                    .title(title)
                    .title_style(
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn render_reader(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some(reader) = &self.reader else { return };
        let paragraph = Paragraph::new(reader.text.as_str())
            .wrap(Wrap { trim: false })
            .scroll((reader.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_set(border::ROUNDED)
                    .border_style(Style::default().fg(Color::Green))
                    .title(format!(" {} ", reader.title))
                    .title_style(
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
            );
        frame.render_widget(paragraph, area);
    }
}

fn build_row(row: &TreeRow) -> ListItem<'static> {
    match row {
        TreeRow::Group {
            name,
            level,
            expanded,
            project_count,
            ..
        } => {
            let indent = "  ".repeat(level.saturating_sub(1) as usize);
            let marker = if *expanded { "▾" } else { "▸" };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{indent}{marker} ")),
                Span::styled(
                    name.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({project_count})"),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        }
        TreeRow::Project { project, level } => {
            let indent = "  ".repeat(*level as usize);
            let mut spans = vec![
                Span::raw(format!("{indent}  ")),
                Span::raw(project.name.clone()),
            ];
            if !project.description.is_empty() {
                spans.push(Span::styled(
                    format!("  — {}", project.description),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        }
    }
}

/// Build the status bar line: transient message, sync state, then hints.
fn build_status_bar<S: KvStore>(view: &BrowseView<S>) -> Line<'static> {
    if let Some((ref msg, at)) = view.status_msg {
        if at.elapsed() < Duration::from_secs(3) {
            return Line::from(vec![Span::styled(
                msg.clone(),
                Style::default().fg(Color::Cyan),
            )]);
        }
    }

    let key_style = Style::default().fg(Color::Cyan);
    let dim_style = Style::default().fg(Color::DarkGray);
    let mut spans: Vec<Span<'static>> = Vec::new();

    match view.input_mode {
        InputMode::Search => {
            spans.push(Span::styled("ESC", key_style));
            spans.push(Span::styled(" cancel  ", dim_style));
            spans.push(Span::styled("ENTER", key_style));
            spans.push(Span::styled(" confirm", dim_style));
        }
        InputMode::Reader => {
            spans.push(Span::styled("j/k", key_style));
            spans.push(Span::styled(" scroll  ", dim_style));
            spans.push(Span::styled("q", key_style));
            spans.push(Span::styled(" back", dim_style));
        }
        InputMode::Normal => {
            spans.push(Span::styled("j/k", key_style));
            spans.push(Span::styled(" move  ", dim_style));
            spans.push(Span::styled("ENTER", key_style));
            spans.push(Span::styled(" open  ", dim_style));
            spans.push(Span::styled("/", key_style));
            spans.push(Span::styled(" search  ", dim_style));
            spans.push(Span::styled("r", key_style));
            spans.push(Span::styled(" refresh  ", dim_style));
            spans.push(Span::styled("q", key_style));
            spans.push(Span::styled(" quit  ", dim_style));

            if view.browser.sync_in_flight() {
                spans.push(Span::styled("syncing…", Style::default().fg(Color::Yellow)));
            } else if let Some(err) = view.browser.last_error() {
                spans.push(Span::styled(
                    format!("sync failed: {err}"),
                    Style::default().fg(Color::Red),
                ));
            } else if let Some(age) = view.browser.staleness() {
                spans.push(Span::styled(format!("synced {age} ago"), dim_style));
            }
        }
    }
    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the browse TUI until the user quits.
///
/// A cold cache is synced before the terminal takes over, so the first
/// frame always has something to show; later refreshes run on a background
/// task while the stale snapshot keeps rendering.
pub async fn run_browse(mut browser: ProjectBrowser<FileStore>, client: GitLabClient) -> Result<()> {
    if browser.needs_sync() {
        let outcome = browser
            .sync(&client)
            .await
            .context("could not write the project cache")?;
        if outcome == SyncOutcome::Failed {
            anyhow::bail!(
                "first sync failed: {}",
                browser.last_error().unwrap_or("unknown error")
            );
        }
    }

    let session = SessionState::new(config::session_store()?);
    let mut view = BrowseView::new(browser);
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut view, &client, &session).await;
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    view: &mut BrowseView<FileStore>,
    client: &GitLabClient,
    session: &SessionState<FileStore>,
) -> Result<()> {
    let mut pending: Option<JoinHandle<wikiscope_core::Result<Vec<Project>>>> = None;

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            view.render(frame, area);
        })?;

        // Settle a finished background refresh before handling input.
        if pending.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = pending.take() {
                match handle.await {
                    Ok(Ok(projects)) => view.finish_sync(Ok(projects))?,
                    Ok(Err(err)) => view.finish_sync(Err(err.to_string()))?,
                    Err(join_err) => view.finish_sync(Err(join_err.to_string()))?,
                }
            }
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match view.handle_key(key) {
                    Some(BrowseAction::Refresh) => {
                        if view.browser_mut().begin_sync() {
                            let task_client = client.clone();
                            pending =
                                Some(tokio::spawn(
                                    async move { task_client.list_projects().await },
                                ));
                        } else {
                            view.set_status("refresh already running".to_string());
                        }
                    }
                    Some(BrowseAction::OpenWiki(project)) => {
                        open_wiki(view, client, session, &project).await;
                    }
                    None => {}
                }
            }
        }

        if view.should_quit() {
            return Ok(());
        }
    }
}

/// Fetch the first wiki page of `project` and open the reader on it.
///
/// Failures become a status-bar message; the tree stays usable.
async fn open_wiki(
    view: &mut BrowseView<FileStore>,
    client: &GitLabClient,
    session: &SessionState<FileStore>,
    project: &Project,
) {
    if let Err(err) = session.set_selected(project) {
        view.set_status(format!("could not record selection: {err}"));
    }

    let pages = match client.wiki_pages(project.id).await {
        Ok(pages) => pages,
        Err(err) => {
            view.set_status(format!("wiki fetch failed: {err}"));
            return;
        }
    };
    let Some(first) = pages.first() else {
        view.set_status(format!("{} has no wiki pages", project.name));
        return;
    };
    match client.wiki_page(project.id, &first.slug).await {
        Ok(page) => {
            let text = if page.format == "markdown" {
                markdown::render(&page.content)
            } else {
                page.content
            };
            let title = format!("{} — {}", project.path_with_namespace, page.title);
            view.open_reader(title, text);
        }
        Err(err) => view.set_status(format!("wiki fetch failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wikiscope_core::MemoryStore;
    use wikiscope_core::model::{Namespace, NamespaceKind};

    fn project(id: i64, ns_id: i64, path: &str, kind: NamespaceKind) -> Project {
        Project {
            id,
            name: format!("proj-{id}"),
            description: String::new(),
            path_with_namespace: format!("{path}/proj-{id}"),
            web_url: String::new(),
            avatar_url: None,
            namespace: Namespace {
                id: ns_id,
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                kind,
                full_path: path.to_string(),
            },
        }
    }

    fn view_with(projects: Vec<Project>) -> BrowseView<Arc<MemoryStore>> {
        let store = Arc::new(MemoryStore::new());
        let mut browser = ProjectBrowser::open(store).expect("open");
        browser.apply_fetched(projects).expect("seed");
        BrowseView::new(browser)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn rows_start_fully_expanded() {
        let view = view_with(vec![
            project(1, 10, "alice", NamespaceKind::User),
            project(2, 20, "org", NamespaceKind::Group),
            project(3, 30, "org/team", NamespaceKind::Group),
        ]);
        // alice's project at root, org group, its project, team group, its
        // project: five rows.
        assert_eq!(view.rows.len(), 5);
        assert!(matches!(view.rows[0], TreeRow::Project { level: 0, .. }));
        assert!(matches!(
            view.rows[1],
            TreeRow::Group { expanded: true, .. }
        ));
    }

    #[test]
    fn collapse_hides_the_subtree() {
        let mut view = view_with(vec![
            project(1, 20, "org", NamespaceKind::Group),
            project(2, 30, "org/team", NamespaceKind::Group),
        ]);
        assert_eq!(view.rows.len(), 4);

        view.select_first();
        let action = view.handle_key(key(KeyCode::Enter));
        assert!(action.is_none());
        // Only the collapsed org row remains; its count still covers the
        // whole subtree.
        assert_eq!(view.rows.len(), 1);
        assert!(matches!(
            view.rows[0],
            TreeRow::Group {
                expanded: false,
                project_count: 2,
                ..
            }
        ));

        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.rows.len(), 4);
    }

    #[test]
    fn slash_search_filters_live_and_esc_restores() {
        let mut view = view_with(vec![
            project(1, 20, "org", NamespaceKind::Group),
            project(2, 30, "other", NamespaceKind::Group),
        ]);
        view.handle_key(key(KeyCode::Char('/')));
        view.handle_key(key(KeyCode::Char('p')));
        view.handle_key(key(KeyCode::Char('r')));
        view.handle_key(key(KeyCode::Char('o')));
        view.handle_key(key(KeyCode::Char('j')));
        view.handle_key(key(KeyCode::Char('-')));
        view.handle_key(key(KeyCode::Char('2')));
        // Only "other/proj-2" survives: one group row, one project row.
        assert_eq!(view.rows.len(), 2);

        view.handle_key(key(KeyCode::Esc));
        assert_eq!(view.browser().query(), "");
        assert_eq!(view.rows.len(), 4);
    }

    #[test]
    fn enter_commits_the_search_query() {
        let mut view = view_with(vec![project(1, 20, "org", NamespaceKind::Group)]);
        view.handle_key(key(KeyCode::Char('/')));
        view.handle_key(key(KeyCode::Char('x')));
        view.handle_key(key(KeyCode::Enter));
        assert_eq!(view.browser().query(), "x");
        assert!(view.rows.is_empty());

        // ESC in normal mode clears a committed query.
        view.handle_key(key(KeyCode::Esc));
        assert_eq!(view.browser().query(), "");
        assert_eq!(view.rows.len(), 2);
    }

    #[test]
    fn enter_on_a_project_requests_its_wiki() {
        let mut view = view_with(vec![project(1, 10, "alice", NamespaceKind::User)]);
        view.select_first();
        let action = view.handle_key(key(KeyCode::Enter));
        assert_eq!(
            action,
            Some(BrowseAction::OpenWiki(
                view.selected_project().expect("selection").clone()
            ))
        );
    }

    #[test]
    fn refresh_key_requests_a_sync() {
        let mut view = view_with(Vec::new());
        assert_eq!(
            view.handle_key(key(KeyCode::Char('r'))),
            Some(BrowseAction::Refresh)
        );
    }

    #[test]
    fn failed_sync_keeps_rows_and_sets_error() {
        let mut view = view_with(vec![project(1, 20, "org", NamespaceKind::Group)]);
        assert_eq!(view.rows.len(), 2);

        view.browser_mut().begin_sync();
        view.finish_sync(Err("connection refused".to_string()))
            .expect("settle");
        assert_eq!(view.rows.len(), 2);
        assert!(view.browser().last_error().is_some());
    }

    #[test]
    fn successful_sync_rebuilds_rows() {
        let mut view = view_with(vec![project(1, 20, "org", NamespaceKind::Group)]);
        view.browser_mut().begin_sync();
        view.finish_sync(Ok(vec![
            project(1, 20, "org", NamespaceKind::Group),
            project(2, 30, "org/team", NamespaceKind::Group),
        ]))
        .expect("settle");
        assert_eq!(view.rows.len(), 4);
        assert!(view.browser().last_error().is_none());
    }

    #[test]
    fn reader_scrolls_and_closes() {
        let mut view = view_with(Vec::new());
        view.open_reader("title".to_string(), "a\nb\nc".to_string());
        view.handle_key(key(KeyCode::Char('j')));
        view.handle_key(key(KeyCode::Char('j')));
        assert_eq!(view.reader.as_ref().expect("reader").scroll, 2);
        view.handle_key(key(KeyCode::Char('k')));
        assert_eq!(view.reader.as_ref().expect("reader").scroll, 1);

        view.handle_key(key(KeyCode::Esc));
        assert!(view.reader.is_none());
        assert_eq!(view.input_mode, InputMode::Normal);
        assert!(!view.should_quit());
    }

    #[test]
    fn navigation_clamps_to_bounds() {
        let mut view = view_with(vec![project(1, 10, "alice", NamespaceKind::User)]);
        view.handle_key(key(KeyCode::Char('k')));
        assert_eq!(view.list_state.selected(), Some(0));
        for _ in 0..5 {
            view.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(view.list_state.selected(), Some(0));
    }

    #[test]
    fn q_quits_from_normal_but_not_from_search() {
        let mut view = view_with(Vec::new());
        view.handle_key(key(KeyCode::Char('/')));
        view.handle_key(key(KeyCode::Char('q')));
        assert!(!view.should_quit());
        assert_eq!(view.search_buf, "q");
        view.handle_key(key(KeyCode::Esc));
        view.handle_key(key(KeyCode::Char('q')));
        assert!(view.should_quit());
    }
}
