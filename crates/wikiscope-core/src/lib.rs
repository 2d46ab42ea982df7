//! wikiscope-core: project cache, group tree, and filter engine.
//!
//! The engine that backs the wikiscope UI surfaces: it persists a local
//! snapshot of the user's GitLab projects, rebuilds the group/subgroup
//! hierarchy from the flat list, scopes the visible set to the selected
//! groups (inherited down to subgroups), and narrows it live against a
//! text query. HTTP lives behind the [`remote::ProjectSource`] trait;
//! persistence behind [`store::KvStore`] — the whole crate runs against
//! in-memory fakes in tests.
//!
//! # Conventions
//!
//! - **Errors**: domain failures are [`Error`]; normal-domain conditions
//!   (empty results, absent timestamps, corrupt cache entries) never fail.
//! - **Logging**: `tracing` macros (`debug!`, `warn!`).

#![forbid(unsafe_code)]

pub mod browser;
pub mod cache;
pub mod error;
pub mod filter;
pub mod model;
pub mod remote;
pub mod selection;
pub mod session;
pub mod store;
pub mod tree;

pub use browser::{ProjectBrowser, SyncOutcome};
pub use cache::{CacheManager, staleness_label};
pub use error::{Error, Result};
pub use model::{CacheEntry, Group, Namespace, NamespaceKind, Project, WikiPage, WikiPageContent};
pub use remote::ProjectSource;
pub use selection::ActiveGroups;
pub use session::SessionState;
pub use store::{FileStore, KvStore, MemoryStore};
pub use tree::{GroupTreeNode, build_group_tree};
