//! Group tree reconstruction from a flat project list.
//!
//! GitLab's project listing is flat, but every project carries its
//! namespace ancestry as a `/`-separated path. Walking those paths is
//! enough to rebuild the group/subgroup hierarchy without ever fetching
//! the group list: one node per distinct path prefix, projects attached to
//! the node their namespace terminates at, personal projects attached to
//! the root.
//!
//! Ownership is strictly parent-owns-children; lookups are by path string,
//! so no back-references are needed.

use serde::Serialize;

use crate::model::{NamespaceKind, Project};

/// One group (or the root) in the reconstructed hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTreeNode {
    /// Full ancestry path, `""` for the root.
    pub path: String,
    /// Last path segment, `""` for the root.
    pub name: String,
    /// Depth; root is 0, its children 1.
    pub level: u32,
    /// Direct member projects, in input order.
    pub projects: Vec<Project>,
    /// Child groups, in first-insertion order.
    pub children: Vec<GroupTreeNode>,
}

impl GroupTreeNode {
    fn root() -> Self {
        Self {
            path: String::new(),
            name: String::new(),
            level: 0,
            projects: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Find or create the child for `segment`, keeping insertion order.
    ///
    /// Idempotent: revisiting an existing segment reuses the node, keyed by
    /// path-string equality.
    fn ensure_child(&mut self, segment: &str) -> &mut Self {
        if let Some(idx) = self.children.iter().position(|c| c.name == segment) {
            return &mut self.children[idx];
        }
        let path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}/{segment}", self.path)
        };
        self.children.push(Self {
            path,
            name: segment.to_string(),
            level: self.level + 1,
            projects: Vec::new(),
            children: Vec::new(),
        });
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Projects attached to this node or any descendant.
    #[must_use]
    pub fn total_projects(&self) -> usize {
        self.projects.len()
            + self
                .children
                .iter()
                .map(Self::total_projects)
                .sum::<usize>()
    }

    /// True if neither this node nor any descendant holds a project.
    ///
    /// Build keeps the full path skeleton; rendering prunes empty nodes
    /// with this check instead.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.children.iter().all(Self::is_empty)
    }

    /// Look up a descendant by its full path.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        if path == self.path {
            return Some(self);
        }
        let rest = path.strip_prefix(&self.path)?;
        let rest = if self.path.is_empty() {
            rest
        } else {
            rest.strip_prefix('/')?
        };
        let next = rest.split('/').next()?;
        self.children
            .iter()
            .find(|c| c.name == next)
            .and_then(|c| c.find(path))
    }
}

/// Build the group hierarchy for `projects`.
///
/// Projects in a personal (`user`) namespace attach directly to the root;
/// everything else hangs off the node its namespace `full_path` walks to.
#[must_use]
pub fn build_group_tree(projects: &[Project]) -> GroupTreeNode {
    let mut root = GroupTreeNode::root();
    for project in projects {
        if project.namespace.kind == NamespaceKind::User {
            root.projects.push(project.clone());
            continue;
        }
        let mut node = &mut root;
        for segment in project
            .namespace
            .full_path
            .split('/')
            .filter(|s| !s.is_empty())
        {
            node = node.ensure_child(segment);
        }
        node.projects.push(project.clone());
    }
    root
}
