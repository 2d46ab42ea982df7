//! GitLab wire types and the locally persisted cache entry.
//!
//! Field names mirror the GitLab v4 REST API so serde maps responses 1:1
//! with no rename gymnastics. Everything here is immutable once fetched;
//! projects are identified by `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who owns a project: an individual user or a group/subgroup.
///
/// Personal (`User`) namespaces are never subject to group filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    User,
    Group,
}

/// The owning namespace of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub id: i64,
    pub name: String,
    pub kind: NamespaceKind,
    /// `/`-separated ancestry path, e.g. `"org/team/subteam"`.
    pub full_path: String,
}

/// A GitLab project as returned by `GET /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub path_with_namespace: String,
    pub web_url: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub namespace: Namespace,
}

/// A GitLab group or subgroup, fetched independently of projects.
///
/// Used only to populate the group-selection surface; the group tree is
/// reconstructed from project namespace paths, not from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub full_path: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Wiki page metadata from `GET /projects/:id/wikis`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    pub slug: String,
    pub title: String,
    pub format: String,
}

/// A wiki page with its full content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPageContent {
    pub slug: String,
    pub title: String,
    pub format: String,
    pub content: String,
}

/// The persisted project snapshot plus its sync metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheEntry {
    /// Cached projects in remote order (last activity first).
    pub projects: Vec<Project>,
    /// When the list was last fetched; `None` means never synced.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// True if this entry has never been populated from the remote.
    #[must_use]
    pub const fn needs_sync(&self) -> bool {
        self.last_synced_at.is_none()
    }
}

/// GitLab sends `"description": null` for projects without one.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project_json() -> &'static str {
        r#"{
            "id": 278964,
            "name": "GitLab",
            "description": null,
            "path_with_namespace": "gitlab-org/gitlab",
            "web_url": "https://gitlab.com/gitlab-org/gitlab",
            "avatar_url": null,
            "namespace": {
                "id": 9970,
                "name": "GitLab.org",
                "kind": "group",
                "full_path": "gitlab-org"
            }
        }"#
    }

    #[test]
    fn project_decodes_from_api_shape() {
        let project: Project =
            serde_json::from_str(sample_project_json()).expect("decode project");
        assert_eq!(project.id, 278_964);
        assert_eq!(project.description, "");
        assert_eq!(project.avatar_url, None);
        assert_eq!(project.namespace.kind, NamespaceKind::Group);
        assert_eq!(project.namespace.full_path, "gitlab-org");
    }

    #[test]
    fn project_roundtrips_through_cache_serialization() {
        let project: Project =
            serde_json::from_str(sample_project_json()).expect("decode project");
        let encoded = serde_json::to_string(&project).expect("encode");
        let decoded: Project = serde_json::from_str(&encoded).expect("redecode");
        assert_eq!(project, decoded);
    }

    #[test]
    fn namespace_kind_uses_lowercase_wire_names() {
        let kind: NamespaceKind = serde_json::from_str("\"user\"").expect("decode kind");
        assert_eq!(kind, NamespaceKind::User);
    }

    #[test]
    fn fresh_entry_needs_sync() {
        assert!(CacheEntry::default().needs_sync());
        let entry = CacheEntry {
            projects: Vec::new(),
            last_synced_at: Some(Utc::now()),
        };
        assert!(!entry.needs_sync());
    }
}
