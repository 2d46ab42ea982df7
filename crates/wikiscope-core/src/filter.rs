//! Active-group and search filters.
//!
//! Both are pure, re-entrant functions of their inputs; the composition
//! layer recomputes them on every change. Group filtering runs first and
//! search narrows the already-scoped set.

use std::collections::{HashMap, HashSet};

use crate::model::{NamespaceKind, Project};

/// Lookup from every distinct group `full_path` observed across the loaded
/// projects to its namespace id.
///
/// Selecting an ancestor group must implicitly select its descendants'
/// projects without the full group hierarchy being fetched; resolving path
/// prefixes against this index reconstructs that relationship from data
/// already on hand. Known limitation, kept on purpose: a group with zero
/// projects anywhere in the loaded set never appears here, so it cannot be
/// resolved by path even when explicitly selected.
#[must_use]
pub fn group_path_index(projects: &[Project]) -> HashMap<&str, i64> {
    let mut index = HashMap::new();
    for project in projects {
        if project.namespace.kind == NamespaceKind::Group {
            index
                .entry(project.namespace.full_path.as_str())
                .or_insert(project.namespace.id);
        }
    }
    index
}

/// Decide whether `project` is visible under the active group selection.
///
/// Rules, in order: empty selection shows everything; personal namespaces
/// are never hidden; otherwise every non-empty prefix of the project's
/// namespace path, most-specific first, is resolved through `index` and
/// tested against the selection (ancestor selection propagates downward);
/// finally the project's own namespace id is tested directly.
#[must_use]
pub fn is_visible(
    project: &Project,
    active_group_ids: &HashSet<i64>,
    index: &HashMap<&str, i64>,
) -> bool {
    if active_group_ids.is_empty() {
        return true;
    }
    if project.namespace.kind == NamespaceKind::User {
        return true;
    }

    let full_path = project.namespace.full_path.as_str();
    let mut prefix_end = full_path.len();
    loop {
        let prefix = &full_path[..prefix_end];
        if let Some(id) = index.get(prefix) {
            if active_group_ids.contains(id) {
                return true;
            }
        }
        match full_path[..prefix_end].rfind('/') {
            Some(pos) if pos > 0 => prefix_end = pos,
            _ => break,
        }
    }

    active_group_ids.contains(&project.namespace.id)
}

/// Case-insensitive substring match against name or full project path.
///
/// An empty or whitespace-only query matches everything.
#[must_use]
pub fn matches_query(project: &Project, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    project.name.to_lowercase().contains(&q)
        || project.path_with_namespace.to_lowercase().contains(&q)
}

/// Apply both filters in order: group scope first, then search.
#[must_use]
pub fn visible_projects(
    projects: &[Project],
    active_group_ids: &HashSet<i64>,
    query: &str,
) -> Vec<Project> {
    let index = group_path_index(projects);
    projects
        .iter()
        .filter(|p| is_visible(p, active_group_ids, &index))
        .filter(|p| matches_query(p, query))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Namespace;

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

    fn ids(projects: &[Project]) -> Vec<i64> {
        projects.iter().map(|p| p.id).collect()
    }

    #[test]
    fn empty_selection_shows_everything() {
        let all = vec![
            project(1, 10, "acme", NamespaceKind::Group),
            project(2, 11, "alice", NamespaceKind::User),
        ];
        let index = group_path_index(&all);
        for p in &all {
            assert!(is_visible(p, &HashSet::new(), &index));
        }
    }

    #[test]
    fn personal_projects_are_never_hidden() {
        let all = vec![
            project(1, 10, "acme", NamespaceKind::Group),
            project(2, 11, "alice", NamespaceKind::User),
        ];
        let index = group_path_index(&all);
        let active = HashSet::from([999]);
        assert!(is_visible(&all[1], &active, &index));
        assert!(!is_visible(&all[0], &active, &index));
    }

    #[test]
    fn ancestor_selection_propagates_to_subgroups() {
        // Group "org" (id 42) is active; a project under "org/team" must
        // be visible through the prefix walk.
        let all = vec![
            project(1, 42, "org", NamespaceKind::Group),
            project(2, 43, "org/team", NamespaceKind::Group),
            project(3, 44, "other", NamespaceKind::Group),
        ];
        let index = group_path_index(&all);
        let active = HashSet::from([42]);
        assert!(is_visible(&all[0], &active, &index));
        assert!(is_visible(&all[1], &active, &index));
        assert!(!is_visible(&all[2], &active, &index));
    }

    #[test]
    fn most_specific_prefix_wins_first_but_any_match_suffices() {
        let all = vec![
            project(1, 42, "org", NamespaceKind::Group),
            project(2, 43, "org/team", NamespaceKind::Group),
            project(3, 45, "org/team/sub", NamespaceKind::Group),
        ];
        let index = group_path_index(&all);
        // Selecting only the middle subgroup shows it and its descendant,
        // not the ancestor.
        let active = HashSet::from([43]);
        assert!(!is_visible(&all[0], &active, &index));
        assert!(is_visible(&all[1], &active, &index));
        assert!(is_visible(&all[2], &active, &index));
    }

    #[test]
    fn direct_namespace_id_is_a_fallback() {
        // The namespace id is active but its path never appears in the
        // index (no other project shares it) — rule 4 still shows it.
        let lone = project(1, 77, "ghost/town", NamespaceKind::Group);
        let index = HashMap::new();
        assert!(is_visible(&lone, &HashSet::from([77]), &index));
        assert!(!is_visible(&lone, &HashSet::from([78]), &index));
    }

    #[test]
    fn spec_scenario_acme_selection() {
        let all = vec![
            project(1, 42, "acme", NamespaceKind::Group),
            project(2, 50, "acme/core", NamespaceKind::Group),
            project(3, 60, "other", NamespaceKind::Group),
        ];
        let visible = visible_projects(&all, &HashSet::from([42]), "");
        assert_eq!(ids(&visible), vec![1, 2]);
    }

    #[test]
    fn query_matches_name_or_path_case_insensitively() {
        let p = project(1, 10, "Acme/Core", NamespaceKind::Group);
        assert!(matches_query(&p, ""));
        assert!(matches_query(&p, "   "));
        assert!(matches_query(&p, "PROJ-1"));
        assert!(matches_query(&p, "acme/core"));
        assert!(!matches_query(&p, "zebra"));
    }

    #[test]
    fn search_narrows_after_group_scope() {
        let all = vec![
            project(1, 42, "acme", NamespaceKind::Group),
            project(2, 50, "acme/core", NamespaceKind::Group),
            project(3, 60, "other", NamespaceKind::Group),
        ];
        // "proj" matches everything, but the group scope already dropped
        // project 3.
        let visible = visible_projects(&all, &HashSet::from([42]), "proj");
        assert_eq!(ids(&visible), vec![1, 2]);
        let visible = visible_projects(&all, &HashSet::from([42]), "proj-2");
        assert_eq!(ids(&visible), vec![2]);
    }

    #[test]
    fn first_namespace_id_wins_for_duplicate_paths() {
        let all = vec![
            project(1, 42, "acme", NamespaceKind::Group),
            project(2, 42, "acme", NamespaceKind::Group),
        ];
        let index = group_path_index(&all);
        assert_eq!(index.get("acme"), Some(&42));
        assert_eq!(index.len(), 1);
    }
}
