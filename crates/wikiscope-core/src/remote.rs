//! Contract for the remote project/group source.
//!
//! The core treats the GitLab API as a potentially slow, potentially
//! failing, paged collaborator hidden behind this trait, so the whole
//! engine is testable against an in-memory fake.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Group, Project};

/// Membership-scoped view of the remote instance.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// All projects the credential can access, ordered by last activity.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// All accessible groups, including subgroups.
    async fn list_groups(&self) -> Result<Vec<Group>>;
}
