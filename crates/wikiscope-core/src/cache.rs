//! Cache lifecycle: load, sync, staleness.
//!
//! [`CacheManager`] exclusively owns the persisted project snapshot. It
//! decides when cached data is served and when a refresh happens:
//!
//! 1. **Never synced** — [`CacheManager::load`] returns an empty entry
//!    whose `last_synced_at` is `None`; the caller is expected to trigger
//!    an immediate sync and block on it.
//! 2. **Synced before** — cached projects are returned instantly and a
//!    refresh only happens on explicit request (stale-while-revalidate,
//!    never a silent race against a render).
//!
//! A corrupt stored value is a cache miss, not a failure: the old data is
//! unreadable either way, and a fresh sync repairs it.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{CacheEntry, Project};
use crate::remote::ProjectSource;
use crate::store::{self, KvStore};

/// Storage key for the cached project list.
pub const PROJECTS_KEY: &str = "gitlab_cached_projects";
/// Storage key for the last successful sync timestamp (ISO-8601).
pub const SYNCED_AT_KEY: &str = "gitlab_projects_synced_at";

/// Owns the persisted [`CacheEntry`] and its sync metadata.
pub struct CacheManager<S> {
    store: S,
}

impl<S: KvStore> CacheManager<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the underlying store (shared with selection/session state).
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Read the persisted entry.
    ///
    /// Absent or corrupt keys yield an empty entry with no timestamp, which
    /// signals "needs sync" via [`CacheEntry::needs_sync`].
    ///
    /// # Errors
    ///
    /// Only store I/O failures propagate; corruption does not.
    pub fn load(&self) -> Result<CacheEntry> {
        let projects = match store::get_json::<Vec<Project>>(&self.store, PROJECTS_KEY) {
            Ok(projects) => projects.unwrap_or_default(),
            Err(crate::Error::CacheCorrupt { key }) => {
                warn!(key, "discarding corrupt project cache");
                return Ok(CacheEntry::default());
            }
            Err(err) => return Err(err),
        };
        let last_synced_at = match store::get_json::<DateTime<Utc>>(&self.store, SYNCED_AT_KEY) {
            Ok(ts) => ts,
            Err(crate::Error::CacheCorrupt { key }) => {
                warn!(key, "discarding corrupt sync timestamp");
                None
            }
            Err(err) => return Err(err),
        };
        Ok(CacheEntry {
            projects,
            last_synced_at,
        })
    }

    /// Fetch the full project list from `source` and persist it together
    /// with the current time.
    ///
    /// # Errors
    ///
    /// On fetch failure nothing is written: the previous cached entry (if
    /// any) remains valid and visible, and the caller surfaces the error
    /// without discarding stale data.
    pub async fn sync(&self, source: &dyn ProjectSource) -> Result<CacheEntry> {
        let projects = source.list_projects().await?;
        self.commit(projects, Utc::now())
    }

    /// Persist an already-fetched project list as the new snapshot.
    ///
    /// Split out of [`CacheManager::sync`] so a UI can run the fetch on a
    /// background task and apply the result from its own context. Projects
    /// are written before the timestamp: a torn write can only make the
    /// cache look staler than it is, never fresher.
    pub fn commit(&self, projects: Vec<Project>, now: DateTime<Utc>) -> Result<CacheEntry> {
        debug!(count = projects.len(), "committing synced project list");
        store::set_json(&self.store, PROJECTS_KEY, &projects)?;
        store::set_json(&self.store, SYNCED_AT_KEY, &now)?;
        Ok(CacheEntry {
            projects,
            last_synced_at: Some(now),
        })
    }
}

/// Bucket elapsed time since `last` into a human label.
///
/// Deterministic given a fixed `now` and monotonic in the elapsed time:
/// `< 1 min`, then `N min`, `N h`, `N d`. A clock that runs backwards
/// clamps to the freshest bucket.
#[must_use]
pub fn staleness_label(last: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - last).num_seconds().max(0);
    let minutes = elapsed / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days >= 1 {
        format!("{days} d")
    } else if hours >= 1 {
        format!("{hours} h")
    } else if minutes >= 1 {
        format!("{minutes} min")
    } else {
        "< 1 min".to_string()
    }
}
