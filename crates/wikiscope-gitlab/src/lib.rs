//! wikiscope-gitlab: GitLab v4 REST client.
//!
//! Implements the core's [`wikiscope_core::ProjectSource`] contract plus
//! the wiki fetch path and the token check used at login. All requests are
//! authenticated with a personal access token in the `PRIVATE-TOKEN`
//! header, and non-2xx responses map onto the core error taxonomy.

#![forbid(unsafe_code)]

pub mod client;

pub use client::{GitLabClient, GROUPS_PAGE_CAP, PER_PAGE};
