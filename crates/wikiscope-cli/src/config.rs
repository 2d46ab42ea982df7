//! CLI configuration: credentials and on-disk locations.
//!
//! Credentials live in `wikiscope/config.toml` under the user config
//! directory; cached projects, selection, and session state live under the
//! user data directory. Both roots are overridable through environment
//! variables (`WIKISCOPE_CONFIG_DIR`, `WIKISCOPE_DATA_DIR`) so tests run
//! fully isolated.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use wikiscope_core::FileStore;

/// Saved credentials for one GitLab instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Instance root, e.g. `https://gitlab.com`.
    pub gitlab_url: String,
    /// Personal access token with at least `read_api` scope.
    pub token: String,
}

/// Resolve the directory holding `config.toml`.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("WIKISCOPE_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|d| d.join("wikiscope"))
        .context("no user config directory on this platform")
}

/// Resolve the directory holding cache and session files.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("WIKISCOPE_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|d| d.join("wikiscope"))
        .context("no user data directory on this platform")
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load saved credentials, `None` when never logged in.
pub fn load_auth() -> Result<Option<AuthConfig>> {
    load_auth_at(&config_path()?)
}

fn load_auth_at(path: &Path) -> Result<Option<AuthConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let auth = toml::from_str::<AuthConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(auth))
}

/// Load saved credentials or fail with a login hint.
pub fn require_auth() -> Result<AuthConfig> {
    match load_auth()? {
        Some(auth) => Ok(auth),
        None => bail!("not logged in — run `wks login --url <gitlab-url>` first"),
    }
}

/// Persist credentials, replacing any previous ones.
pub fn save_auth(auth: &AuthConfig) -> Result<()> {
    save_auth_at(&config_path()?, auth)
}

fn save_auth_at(path: &Path, auth: &AuthConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(auth).context("Failed to encode config")?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Remove saved credentials. Absent config is a no-op.
pub fn delete_auth() -> Result<bool> {
    delete_auth_at(&config_path()?)
}

fn delete_auth_at(path: &Path) -> Result<bool> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Durable store for cache + selection keys.
pub fn durable_store() -> Result<FileStore> {
    Ok(FileStore::new(data_dir()?.join("cache")))
}

/// Store for session-scoped state (selected project); wiped at logout.
pub fn session_store() -> Result<FileStore> {
    Ok(FileStore::new(data_dir()?.join("session")))
}

/// Remove all session files (logout path).
pub fn clear_session_dir() -> Result<()> {
    let dir = data_dir()?.join("session");
    if dir.exists() {
        fs::remove_dir_all(&dir)
            .with_context(|| format!("Failed to clear {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Path-level round-trip; the env overrides are exercised by the e2e
    // suite, which sets them on the spawned process instead of this one.
    #[test]
    fn auth_roundtrip_at_explicit_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wikiscope").join("config.toml");

        assert!(load_auth_at(&path).expect("load empty").is_none());
        assert!(!delete_auth_at(&path).expect("delete absent"));

        let auth = AuthConfig {
            gitlab_url: "https://gitlab.example.com".to_string(),
            token: "glpat-123".to_string(),
        };
        save_auth_at(&path, &auth).expect("save");
        let loaded = load_auth_at(&path).expect("load").expect("present");
        assert_eq!(loaded.gitlab_url, auth.gitlab_url);
        assert_eq!(loaded.token, auth.token);

        assert!(delete_auth_at(&path).expect("delete"));
        assert!(load_auth_at(&path).expect("load after delete").is_none());
    }

    #[test]
    fn parse_failure_carries_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "gitlab_url = 1").expect("write");

        let err = load_auth_at(&path).expect_err("corrupt config");
        assert!(err.to_string().contains("config.toml"));
    }
}
