//! The authenticated GitLab API client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use wikiscope_core::model::{Group, Project, WikiPage, WikiPageContent};
use wikiscope_core::remote::ProjectSource;
use wikiscope_core::{Error, Result};

/// Page size for every listing endpoint.
pub const PER_PAGE: usize = 100;

/// Upper bound on group pages, to prevent unbounded looping on very large
/// instances. 10 pages of 100 covers everything we ever want to render.
pub const GROUPS_PAGE_CAP: usize = 10;

/// Authenticated client for one GitLab instance.
///
/// Cheap to clone: the underlying connection pool is shared, so the TUI
/// can hand a clone to a background refresh task.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    api_base: Url,
}

impl GitLabClient {
    /// Build a client for `base_url` (instance root, e.g.
    /// `https://gitlab.com`) authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Fails if the URL cannot be parsed or the token is not a valid
    /// header value.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let api_base = Url::parse(base_url)
            .and_then(|u| u.join("api/v4/"))
            .map_err(|err| Error::fetch(None, format!("invalid GitLab URL: {err}")))?;

        let mut headers = HeaderMap::new();
        let mut token_value = HeaderValue::from_str(token)
            .map_err(|_| Error::fetch(None, "token contains invalid header characters"))?;
        token_value.set_sensitive(true);
        headers.insert("PRIVATE-TOKEN", token_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| Error::fetch(None, err.to_string()))?;
        Ok(Self { http, api_base })
    }

    /// Check the token by fetching the current user.
    ///
    /// 401/403 mean "token rejected"; other failures (bad host, offline)
    /// propagate so the caller can tell them apart.
    pub async fn validate_token(&self) -> Result<bool> {
        let url = self.endpoint(&["user"])?;
        let response = self.http.get(url).send().await.map_err(transport)?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            status => Err(status_error(status)),
        }
    }

    /// Wiki pages of a project. A 404 (wiki disabled or absent) is zero
    /// pages, not an error.
    pub async fn wiki_pages(&self, project_id: i64) -> Result<Vec<WikiPage>> {
        let url = self.endpoint(&["projects", &project_id.to_string(), "wikis"])?;
        match self.get_json(url).await {
            Ok(pages) => Ok(pages),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// One wiki page with content. The slug is sent as a single encoded
    /// path segment, so slugs containing `/` work.
    pub async fn wiki_page(&self, project_id: i64, slug: &str) -> Result<WikiPageContent> {
        let url = self.endpoint(&["projects", &project_id.to_string(), "wikis", slug])?;
        self.get_json(url).await
    }

    /// Join path segments onto the API base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::fetch(None, "GitLab URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }
        response
            .json()
            .await
            .map_err(|err| Error::fetch(None, format!("malformed response body: {err}")))
    }
}

#[async_trait]
impl ProjectSource for GitLabClient {
    /// Membership-scoped project list, most recently active first.
    ///
    /// First page only (capped at [`PER_PAGE`]); the browse surface relies
    /// on recent activity ordering rather than exhaustive listing.
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let mut url = self.endpoint(&["projects"])?;
        url.query_pairs_mut()
            .append_pair("membership", "true")
            .append_pair("per_page", &PER_PAGE.to_string())
            .append_pair("order_by", "last_activity_at");
        self.get_json(url).await
    }

    /// All accessible groups including subgroups, paginated up to
    /// [`GROUPS_PAGE_CAP`] pages, stopping early on a short page.
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups = Vec::new();
        for page in 1..=GROUPS_PAGE_CAP {
            let mut url = self.endpoint(&["groups"])?;
            url.query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());
            let batch: Vec<Group> = self.get_json(url).await?;
            let short_page = batch.len() < PER_PAGE;
            groups.extend(batch);
            if short_page {
                break;
            }
        }
        Ok(groups)
    }
}

fn transport(err: reqwest::Error) -> Error {
    Error::fetch(err.status().map(|s| s.as_u16()), err.to_string())
}

fn status_error(status: StatusCode) -> Error {
    if status == StatusCode::NOT_FOUND {
        Error::NotFound
    } else {
        Error::fetch(
            Some(status.as_u16()),
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitLabClient {
        GitLabClient::new("https://gitlab.example.com", "glpat-test").expect("client")
    }

    #[test]
    fn api_base_lands_on_v4() {
        let url = client().endpoint(&["projects"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://gitlab.example.com/api/v4/projects");
    }

    #[test]
    fn base_url_with_subpath_is_preserved() {
        let client =
            GitLabClient::new("https://example.com/gitlab/", "t").expect("client");
        let url = client.endpoint(&["user"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://example.com/gitlab/api/v4/user");
    }

    #[test]
    fn wiki_slug_is_encoded_as_one_segment() {
        let url = client()
            .endpoint(&["projects", "7", "wikis", "guides/setup"])
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/7/wikis/guides%2Fsetup"
        );
    }

    #[test]
    fn invalid_base_url_is_a_fetch_error() {
        let err = GitLabClient::new("not a url", "t").expect_err("must fail");
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let err = GitLabClient::new("https://gitlab.example.com", "bad\ntoken")
            .expect_err("must fail");
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[test]
    fn status_mapping_distinguishes_not_found() {
        assert!(status_error(StatusCode::NOT_FOUND).is_not_found());
        let err = status_error(StatusCode::BAD_GATEWAY);
        assert!(matches!(
            err,
            Error::Fetch {
                status: Some(502),
                ..
            }
        ));
    }

    #[test]
    fn group_page_decodes_from_api_shape() {
        let body = r#"[
            {"id": 1, "name": "Acme", "full_path": "acme", "parent_id": null},
            {"id": 2, "name": "Core", "full_path": "acme/core", "parent_id": 1}
        ]"#;
        let groups: Vec<Group> = serde_json::from_str(body).expect("decode");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].parent_id, Some(1));
    }
}
