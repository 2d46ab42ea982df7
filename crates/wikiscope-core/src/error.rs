use std::io;

/// Error taxonomy for the cache-and-filter core.
///
/// Filters and the tree builder are total functions and never produce one
/// of these; only storage and remote transport can fail. Corrupt cached
/// JSON is downgraded to a cache miss by the cache manager, so callers see
/// [`Error::CacheCorrupt`] only when they read raw keys themselves.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or auth failure talking to the remote GitLab API.
    ///
    /// Always non-fatal: cached data stays valid and the caller may retry
    /// by re-triggering a sync.
    #[error("fetch failed{}: {message}", .status.map_or_else(String::new, |s| format!(" (HTTP {s})")))]
    Fetch {
        status: Option<u16>,
        message: String,
    },

    /// A stored value failed to parse as JSON.
    #[error("cache entry {key:?} is corrupt")]
    CacheCorrupt { key: String },

    /// Remote resource does not exist (wiki listing downgrades this to
    /// an empty result instead of surfacing it).
    #[error("not found")]
    NotFound,

    /// Underlying key-value store I/O failure.
    #[error("store I/O failed")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build a fetch error from an optional HTTP status and a message.
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            message: message.into(),
        }
    }

    /// Stable code identifier (`E###`) for machine parsing.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "E100",
            Self::CacheCorrupt { .. } => "E200",
            Self::NotFound => "E300",
            Self::Io(_) => "E400",
        }
    }

    /// True if this error is a remote 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::Fetch {
                    status: Some(404),
                    ..
                }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let all = [
            Error::fetch(Some(500), "x"),
            Error::CacheCorrupt {
                key: "k".to_string(),
            },
            Error::NotFound,
            Error::Io(std::io::Error::other("x")),
        ];
        let mut seen = HashSet::new();
        for err in &all {
            assert!(seen.insert(err.code()), "duplicate code {}", err.code());
        }
    }

    #[test]
    fn fetch_display_includes_status() {
        let err = Error::fetch(Some(503), "service unavailable");
        let text = err.to_string();
        assert!(text.contains("503"), "missing status in {text:?}");
        assert!(text.contains("service unavailable"));

        let err = Error::fetch(None, "connection refused");
        assert!(!err.to_string().contains("HTTP"));
    }

    #[test]
    fn not_found_detection_covers_http_404() {
        assert!(Error::NotFound.is_not_found());
        assert!(Error::fetch(Some(404), "gone").is_not_found());
        assert!(!Error::fetch(Some(500), "boom").is_not_found());
    }
}
