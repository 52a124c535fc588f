// Session configuration. Built once from the interactive answers and
// passed by reference to every component; nothing here changes after
// startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_HOST: &str = "127.0.0.1:2283";
pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    /// Server origin without a trailing slash, e.g. `http://127.0.0.1:2283`.
    pub base_url: String,
    pub api_key: String,
    pub library_root: PathBuf,
    /// Maximum number of IDs sent in one add-assets request.
    pub batch_size: usize,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl Config {
    /// Validate the user's answers. The library root must be an existing
    /// absolute directory; the server may be given as `host:port` or as a
    /// full URL.
    pub fn new(server: &str, api_key: &str, library_root: impl Into<PathBuf>) -> Result<Self> {
        let base_url = normalize_server(server)?;
        if !is_valid_api_key(api_key) {
            return Err(Error::InvalidConfig(
                "API key must not be empty or contain control characters".into(),
            ));
        }
        let api_key = api_key.trim();
        let library_root = library_root.into();
        check_library_root(&library_root)?;

        Ok(Config {
            base_url,
            api_key: api_key.to_string(),
            library_root,
            batch_size: DEFAULT_BATCH_SIZE,
            timeout: DEFAULT_TIMEOUT,
            dry_run: false,
        })
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API key with everything but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        let keep = chars.len().min(4);
        let hidden = chars.len() - keep;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{}", "*".repeat(hidden), tail)
    }
}

/// Prompt default for the server address: `IMMICH_HOST` if set.
pub fn default_host() -> String {
    std::env::var("IMMICH_HOST").unwrap_or_else(|_| DEFAULT_HOST.into())
}

/// Turn `host:port` or a URL into a base URL with a scheme and no
/// trailing slash.
pub fn normalize_server(server: &str) -> Result<String> {
    let server = server.trim().trim_end_matches('/');
    if server.is_empty() {
        return Err(Error::InvalidConfig("server address must not be empty".into()));
    }
    if server.starts_with("http://") || server.starts_with("https://") {
        Ok(server.to_string())
    } else if server.contains("://") {
        Err(Error::InvalidConfig(format!(
            "unsupported scheme in server address '{server}'"
        )))
    } else {
        Ok(format!("http://{server}"))
    }
}

/// A key that can be sent as a header: non-blank, no control characters.
pub fn is_valid_api_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.chars().any(char::is_control)
}

/// Whether a bare address names a port. Used by the UI to warn the user.
pub fn has_port(server: &str) -> bool {
    let server = server.trim();
    let authority = server
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(server);
    let authority = authority.split('/').next().unwrap_or_default();
    authority
        .rsplit_once(':')
        .map(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn check_library_root(root: &Path) -> Result<()> {
    if !root.is_absolute() {
        return Err(Error::InvalidConfig(format!(
            "library root {root:?} must be an absolute path"
        )));
    }
    if !root.exists() {
        return Err(Error::InvalidConfig(format!("library root {root:?} does not exist")));
    }
    if !root.is_dir() {
        return Err(Error::InvalidConfig(format!("library root {root:?} is not a directory")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_http_scheme() {
        assert_eq!(normalize_server("127.0.0.1:2283").unwrap(), "http://127.0.0.1:2283");
        assert_eq!(
            normalize_server(" https://photos.example.org/ ").unwrap(),
            "https://photos.example.org"
        );
        assert!(normalize_server("   ").is_err());
        assert!(normalize_server("ftp://host").is_err());
    }

    #[test]
    fn detects_port() {
        assert!(has_port("127.0.0.1:2283"));
        assert!(has_port("http://nas.local:2283/"));
        assert!(!has_port("nas.local"));
        assert!(!has_port("https://photos.example.org"));
    }

    #[test]
    fn new_validates_library_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("nas:2283", " key ", dir.path()).unwrap();
        assert_eq!(config.base_url, "http://nas:2283");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!config.dry_run);

        let missing = dir.path().join("missing");
        assert!(matches!(
            Config::new("nas:2283", "key", &missing),
            Err(Error::InvalidConfig(_))
        ));

        let file = dir.path().join("photo.jpg");
        std::fs::write(&file, b"jpg").unwrap();
        assert!(Config::new("nas:2283", "key", &file).is_err());

        assert!(Config::new("nas:2283", "key", "relative/dir").is_err());
    }

    #[test]
    fn rejects_empty_api_key() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::new("nas:2283", "  ", dir.path()).is_err());
    }

    #[test]
    fn api_key_check_matches_config_validation() {
        assert!(is_valid_api_key(" abc123 "));
        assert!(!is_valid_api_key(""));
        assert!(!is_valid_api_key(" \t "));
        assert!(!is_valid_api_key("abc\ndef"));

        let dir = tempfile::tempdir().unwrap();
        assert!(Config::new("nas:2283", "abc\ndef", dir.path()).is_err());
    }

    #[test]
    fn masks_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("nas:2283", "abcdefgh", dir.path()).unwrap();
        assert_eq!(config.masked_api_key(), "****efgh");
        let short = Config::new("nas:2283", "abc", dir.path()).unwrap();
        assert_eq!(short.masked_api_key(), "abc");
    }

    #[test]
    fn batch_size_is_at_least_one() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new("nas:2283", "key", dir.path())
            .unwrap()
            .with_batch_size(0);
        assert_eq!(config.batch_size, 1);
    }
}
