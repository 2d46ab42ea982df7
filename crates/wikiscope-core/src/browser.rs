//! Composition layer: cache + selection + query → visible set and tree.
//!
//! [`ProjectBrowser`] is the one place the pieces meet. It owns the cache
//! manager and the persisted group selection, holds the transient query
//! and expand/collapse state, and recomputes the derived views on demand:
//!
//! ```text
//! visible = search(group_filter(cache.projects))
//! tree    = build_group_tree(visible)
//! ```
//!
//! Derived views are never persisted. Sync is coalesced: while one refresh
//! is in flight, further requests are ignored (not queued), and a failure
//! keeps the stale snapshot on screen with the error recorded for display.

use chrono::Utc;
use tracing::debug;

use crate::cache::{self, CacheManager};
use crate::error::Result;
use crate::filter;
use crate::model::{CacheEntry, Project};
use crate::remote::ProjectSource;
use crate::selection::ActiveGroups;
use crate::store::KvStore;
use crate::tree::{self, GroupTreeNode};

/// Outcome of a [`ProjectBrowser::sync`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The snapshot was refreshed.
    Refreshed,
    /// Another sync was already in flight; this request was dropped.
    Coalesced,
    /// The fetch failed; the previous snapshot is still being served and
    /// [`ProjectBrowser::last_error`] carries the message.
    Failed,
}

/// Reactive project view over cache, selection, and query.
pub struct ProjectBrowser<S> {
    cache: CacheManager<S>,
    groups: ActiveGroups<S>,
    entry: CacheEntry,
    query: String,
    expanded: std::collections::HashSet<String>,
    sync_in_flight: bool,
    last_error: Option<String>,
}

impl<S: KvStore + Clone> ProjectBrowser<S> {
    /// Load cached state from `store`.
    ///
    /// # Errors
    ///
    /// Only store I/O failures; absent or corrupt entries load as empty.
    pub fn open(store: S) -> Result<Self> {
        let cache = CacheManager::new(store.clone());
        let groups = ActiveGroups::load(store)?;
        let entry = cache.load()?;
        Ok(Self {
            cache,
            groups,
            entry,
            query: String::new(),
            expanded: std::collections::HashSet::new(),
            sync_in_flight: false,
            last_error: None,
        })
    }
}

impl<S: KvStore> ProjectBrowser<S> {
    /// True if the cache has never been synced; the first load should
    /// block on [`ProjectBrowser::sync`] before rendering anything.
    #[must_use]
    pub const fn needs_sync(&self) -> bool {
        self.entry.last_synced_at.is_none()
    }

    /// The snapshot currently being served (possibly stale).
    pub const fn entry(&self) -> &CacheEntry {
        &self.entry
    }

    /// Human staleness label for the current snapshot, `None` if never
    /// synced.
    #[must_use]
    pub fn staleness(&self) -> Option<String> {
        self.entry
            .last_synced_at
            .map(|last| cache::staleness_label(last, Utc::now()))
    }

    /// Message from the most recent failed sync, cleared by a success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Refresh the snapshot from `source`.
    ///
    /// Coalesces with an in-flight background fetch and converts fetch
    /// failures into [`SyncOutcome::Failed`] so stale data keeps
    /// rendering; only store I/O failures propagate as errors.
    pub async fn sync(&mut self, source: &dyn ProjectSource) -> Result<SyncOutcome> {
        if !self.begin_sync() {
            return Ok(SyncOutcome::Coalesced);
        }
        match source.list_projects().await {
            Ok(projects) => {
                self.apply_fetched(projects)?;
                Ok(SyncOutcome::Refreshed)
            }
            Err(err) => {
                self.record_fetch_error(err.to_string());
                Ok(SyncOutcome::Failed)
            }
        }
    }

    /// Mark a refresh as started; `false` means one is already running and
    /// this request should be dropped, not queued.
    ///
    /// Callers that fetch on a background task use this to guard the spawn
    /// and settle via [`ProjectBrowser::apply_fetched`] or
    /// [`ProjectBrowser::record_fetch_error`].
    pub fn begin_sync(&mut self) -> bool {
        if self.sync_in_flight {
            debug!("sync already in flight, coalescing");
            return false;
        }
        self.sync_in_flight = true;
        true
    }

    /// True while a refresh started via [`ProjectBrowser::begin_sync`] has
    /// not settled yet.
    #[must_use]
    pub const fn sync_in_flight(&self) -> bool {
        self.sync_in_flight
    }

    /// Settle an in-flight refresh with its fetched project list.
    pub fn apply_fetched(&mut self, projects: Vec<Project>) -> Result<()> {
        self.sync_in_flight = false;
        self.entry = self.cache.commit(projects, Utc::now())?;
        self.last_error = None;
        Ok(())
    }

    /// Settle an in-flight refresh that failed, keeping the snapshot.
    pub fn record_fetch_error(&mut self, message: impl Into<String>) {
        self.sync_in_flight = false;
        self.last_error = Some(message.into());
    }

    // --- query ---

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    // --- group selection (persisted on every change) ---

    pub const fn active_groups(&self) -> &ActiveGroups<S> {
        &self.groups
    }

    /// Mutable selection access for bulk edits; every mutation through
    /// [`ActiveGroups`] persists on its own.
    pub fn active_groups_mut(&mut self) -> &mut ActiveGroups<S> {
        &mut self.groups
    }

    /// Flip one group; returns whether it is active afterwards.
    pub fn toggle_group(&mut self, id: i64) -> Result<bool> {
        self.groups.toggle(id)
    }

    pub fn select_all_groups(&mut self, ids: impl IntoIterator<Item = i64>) -> Result<()> {
        self.groups.select_all(ids)
    }

    pub fn deselect_all_groups(&mut self) -> Result<()> {
        self.groups.deselect_all()
    }

    // --- expand/collapse (presentation-only, never persisted) ---

    /// Flip the expanded state for a tree node path; returns the new state.
    pub fn toggle_expanded(&mut self, path: &str) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_string());
            true
        }
    }

    #[must_use]
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    // --- derived views, recomputed on demand ---

    /// Projects passing the active-group filter and then the query.
    #[must_use]
    pub fn visible_projects(&self) -> Vec<Project> {
        filter::visible_projects(&self.entry.projects, self.groups.ids(), &self.query)
    }

    /// Group tree over the visible projects.
    #[must_use]
    pub fn tree(&self) -> GroupTreeNode {
        tree::build_group_tree(&self.visible_projects())
    }
}
