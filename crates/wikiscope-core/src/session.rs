//! Session-scoped state: the project currently open in the wiki viewer.
//!
//! Kept outside the durable cache on purpose. The stored project is
//! validated against the id the caller is routing to; a mismatch clears
//! the entry and returns nothing, forcing navigation back to the project
//! list. Cleared wholesale at logout.

use tracing::debug;

use crate::error::Result;
use crate::model::Project;
use crate::store::{self, KvStore};

/// Storage key for the currently-opened project.
pub const SELECTED_PROJECT_KEY: &str = "selected_project";

/// Session store wrapper around a [`KvStore`].
pub struct SessionState<S> {
    store: S,
}

impl<S: KvStore> SessionState<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Remember the project the user is opening.
    pub fn set_selected(&self, project: &Project) -> Result<()> {
        store::set_json(&self.store, SELECTED_PROJECT_KEY, project)
    }

    /// Recall the selected project, validated against `expected_id`.
    ///
    /// Returns `None` when nothing is stored, when the stored JSON is
    /// corrupt, or when the id does not match the one being routed to; the
    /// last two also clear the stale entry.
    pub fn selected(&self, expected_id: i64) -> Result<Option<Project>> {
        let stored = match store::get_json::<Project>(&self.store, SELECTED_PROJECT_KEY) {
            Ok(stored) => stored,
            Err(crate::Error::CacheCorrupt { key }) => {
                debug!(key, "clearing corrupt session entry");
                self.store.remove(SELECTED_PROJECT_KEY)?;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        match stored {
            Some(project) if project.id == expected_id => Ok(Some(project)),
            Some(project) => {
                debug!(
                    stored = project.id,
                    expected = expected_id,
                    "session project id mismatch, clearing"
                );
                self.store.remove(SELECTED_PROJECT_KEY)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Drop the session entry (logout path).
    pub fn clear(&self) -> Result<()> {
        self.store.remove(SELECTED_PROJECT_KEY)
    }
}
