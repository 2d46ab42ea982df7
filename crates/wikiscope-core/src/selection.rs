//! Persisted active-group selection.
//!
//! The set of group ids the user has opted into. Empty is a sentinel for
//! "no filter — show everything". Every mutation persists immediately so
//! the selection survives a restart; reads deduplicate whatever order the
//! stored list is in.

use std::collections::HashSet;

use tracing::warn;

use crate::error::Result;
use crate::store::{self, KvStore};

/// Storage key for the selected group ids.
pub const ACTIVE_GROUPS_KEY: &str = "gitlab_active_groups";

/// The user's active-group set, mirrored to a [`KvStore`].
pub struct ActiveGroups<S> {
    store: S,
    ids: HashSet<i64>,
}

impl<S: KvStore> ActiveGroups<S> {
    /// Load the persisted selection.
    ///
    /// A corrupt stored list is logged and treated as empty ("show all"),
    /// never an error.
    pub fn load(store: S) -> Result<Self> {
        let ids = match store::get_json::<Vec<i64>>(&store, ACTIVE_GROUPS_KEY) {
            Ok(ids) => ids.unwrap_or_default().into_iter().collect(),
            Err(crate::Error::CacheCorrupt { key }) => {
                warn!(key, "discarding corrupt group selection");
                HashSet::new()
            }
            Err(err) => return Err(err),
        };
        Ok(Self { store, ids })
    }

    /// The current selection. Empty means no filter is applied.
    pub const fn ids(&self) -> &HashSet<i64> {
        &self.ids
    }

    #[must_use]
    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Flip one group in or out of the selection; returns `true` if the
    /// group is active afterwards.
    pub fn toggle(&mut self, id: i64) -> Result<bool> {
        let now_active = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        self.persist()?;
        Ok(now_active)
    }

    /// Add a group to the selection.
    pub fn select(&mut self, id: i64) -> Result<()> {
        if self.ids.insert(id) {
            self.persist()?;
        }
        Ok(())
    }

    /// Remove a group from the selection.
    pub fn deselect(&mut self, id: i64) -> Result<()> {
        if self.ids.remove(&id) {
            self.persist()?;
        }
        Ok(())
    }

    /// Replace the selection with every id in `ids`.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = i64>) -> Result<()> {
        self.ids = ids.into_iter().collect();
        self.persist()
    }

    /// Clear the selection, reverting to "show all".
    pub fn deselect_all(&mut self) -> Result<()> {
        self.ids.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        let mut sorted: Vec<i64> = self.ids.iter().copied().collect();
        sorted.sort_unstable();
        store::set_json(&self.store, ACTIVE_GROUPS_KEY, &sorted)
    }
}
