// List sources: where a pool's raw text comes from.
//
// A `Source` names either a configured list or the empty "custom" pool.
// Named lists are fetched through a `SourceLoader`, which hides whether the
// text lives on disk, behind HTTP, or in memory.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, ListConfig};

/// Reserved name for the user-built pool that starts empty.
pub const CUSTOM_SOURCE: &str = "custom";

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Which pool the engine is showing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A configured list, fetched through the loader.
    Named(String),
    /// Empty pool filled by hand. Never touches the loader.
    Custom,
}

impl Source {
    /// Parse a source name; `"custom"` maps to [`Source::Custom`].
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name == CUSTOM_SOURCE {
            Source::Custom
        } else {
            Source::Named(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Source::Named(name) => name,
            Source::Custom => CUSTOM_SOURCE,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown list source: {name}")]
    Unknown { name: String },

    #[error("failed to read list file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to fetch list from {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("list request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

// ---------------------------------------------------------------------------
// Loader trait
// ---------------------------------------------------------------------------

/// Fetches the raw text of a named list.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Names this loader can serve, in display order. Excludes "custom".
    fn names(&self) -> Vec<String>;

    /// Raw newline-separated list text for `name`.
    async fn fetch(&self, name: &str) -> Result<String, SourceError>;
}

/// Ordered name -> file mapping shared by the file and HTTP loaders.
#[derive(Debug, Clone, Default)]
struct ListIndex {
    lists: Vec<ListConfig>,
}

impl ListIndex {
    fn file_for(&self, name: &str) -> Result<&str, SourceError> {
        self.lists
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.file.as_str())
            .ok_or_else(|| SourceError::Unknown {
                name: name.to_string(),
            })
    }

    fn names(&self) -> Vec<String> {
        self.lists.iter().map(|l| l.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// DirectorySource
// ---------------------------------------------------------------------------

/// Lists stored as text files in one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    index: ListIndex,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, lists: Vec<ListConfig>) -> Self {
        DirectorySource {
            dir: dir.into(),
            index: ListIndex { lists },
        }
    }
}

#[async_trait]
impl SourceLoader for DirectorySource {
    fn names(&self) -> Vec<String> {
        self.index.names()
    }

    async fn fetch(&self, name: &str) -> Result<String, SourceError> {
        let path = self.dir.join(self.index.file_for(name)?);
        debug!("Reading list {} from {}", name, path.display());
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io { path, source })
    }
}

// ---------------------------------------------------------------------------
// HttpSource
// ---------------------------------------------------------------------------

/// Default bound on a whole list request, connect through body.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Lists served as static text files under an HTTP base URL.
///
/// Every request is bounded by `timeout`; a server that stalls surfaces as
/// `SourceError::Http` instead of holding up the caller.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    index: ListIndex,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>, lists: Vec<ListConfig>) -> Self {
        HttpSource {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            index: ListIndex { lists },
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured client (proxy or TLS settings, for example).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url_for(&self, file: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            file.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl SourceLoader for HttpSource {
    fn names(&self) -> Vec<String> {
        self.index.names()
    }

    async fn fetch(&self, name: &str) -> Result<String, SourceError> {
        let url = self.url_for(self.index.file_for(name)?);
        debug!("Fetching list {} from {}", name, url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|source| SourceError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| SourceError::Http { url, source })
    }
}

// ---------------------------------------------------------------------------
// StaticSource
// ---------------------------------------------------------------------------

/// In-memory lists, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    order: Vec<String>,
    lists: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a list. Returns `self` for chaining.
    pub fn with_list(mut self, name: &str, text: &str) -> Self {
        if !self.lists.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.lists.insert(name.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl SourceLoader for StaticSource {
    fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    async fn fetch(&self, name: &str) -> Result<String, SourceError> {
        self.lists
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::Unknown {
                name: name.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Construction from config
// ---------------------------------------------------------------------------

/// Build the loader described by `[sources]`: an HTTP loader when
/// `location` is an http(s) URL, otherwise a directory relative to the
/// config base dir.
pub fn loader_from_config(config: &Config) -> Box<dyn SourceLoader> {
    let location = config.sources.location.trim();
    let lists = config.sources.lists.clone();
    if is_http_url(location) {
        let timeout = Duration::from_secs(config.sources.timeout_secs);
        Box::new(HttpSource::new(location, lists).with_timeout(timeout))
    } else {
        Box::new(DirectorySource::new(config.base_dir.join(location), lists))
    }
}

fn is_http_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn lists(pairs: &[(&str, &str)]) -> Vec<ListConfig> {
        pairs
            .iter()
            .map(|(name, file)| ListConfig {
                name: name.to_string(),
                file: file.to_string(),
            })
            .collect()
    }

    #[test]
    fn parse_recognizes_custom() {
        assert_eq!(Source::parse("custom"), Source::Custom);
        assert_eq!(Source::parse(" home "), Source::Named("home".into()));
        assert_eq!(Source::Custom.name(), "custom");
        assert_eq!(Source::Named("15".into()).to_string(), "15");
    }

    #[tokio::test]
    async fn static_source_serves_lists_in_insertion_order() {
        let loader = StaticSource::new()
            .with_list("work", "A\nB")
            .with_list("home", "C");
        assert_eq!(loader.names(), vec!["work", "home"]);
        assert_eq!(loader.fetch("work").await.unwrap(), "A\nB");
        assert!(matches!(
            loader.fetch("nope").await,
            Err(SourceError::Unknown { .. })
        ));
    }

    #[tokio::test]
    async fn directory_source_reads_mapped_file() {
        let tmp = std::env::temp_dir().join("nextup_source_test_dir");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        fs::write(tmp.join("home.txt"), "Ada\nGrace\n").unwrap();

        let loader = DirectorySource::new(&tmp, lists(&[("home", "home.txt"), ("gone", "gone.txt")]));
        assert_eq!(loader.names(), vec!["home", "gone"]);
        assert_eq!(loader.fetch("home").await.unwrap(), "Ada\nGrace\n");
        assert!(matches!(
            loader.fetch("gone").await,
            Err(SourceError::Io { .. })
        ));
        assert!(matches!(
            loader.fetch("work").await,
            Err(SourceError::Unknown { .. })
        ));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn http_urls_join_without_double_slashes() {
        let source = HttpSource::new("https://example.test/lists/", lists(&[]));
        assert_eq!(
            source.url_for("/home.txt"),
            "https://example.test/lists/home.txt"
        );
    }

    // --- HttpSource against a local listener ---

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one request with the given status line and body.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}")
    }

    /// Accept connections and never answer.
    async fn serve_nothing() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });
        format!("http://{addr}")
    }

    fn http_source(base_url: String) -> HttpSource {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpSource::new(base_url, lists(&[("home", "home.txt")])).with_client(client)
    }

    #[tokio::test]
    async fn http_source_returns_body_on_success() {
        let source = http_source(serve_once("200 OK", "Ada\nGrace\n").await);
        assert_eq!(source.fetch("home").await.unwrap(), "Ada\nGrace\n");
    }

    #[tokio::test]
    async fn http_source_maps_non_success_to_status() {
        let source = http_source(serve_once("404 Not Found", "missing").await);
        match source.fetch("home").await {
            Err(SourceError::Status { url, status }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/home.txt"), "{url}");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_source_gives_up_on_a_silent_server() {
        let source = http_source(serve_nothing().await).with_timeout(Duration::from_millis(200));

        let result = tokio::time::timeout(Duration::from_secs(5), source.fetch("home"))
            .await
            .expect("request was not bounded by its timeout");
        match result {
            Err(SourceError::Http { source, .. }) => assert!(source.is_timeout(), "{source}"),
            other => panic!("expected timeout error, got {other:?}"),
        }
    }

    #[test]
    fn with_timeout_overrides_default() {
        let source = HttpSource::new("http://localhost", lists(&[]))
            .with_timeout(Duration::from_secs(3));
        assert_eq!(source.timeout, Duration::from_secs(3));
        assert_eq!(
            HttpSource::new("http://localhost", lists(&[])).timeout,
            DEFAULT_HTTP_TIMEOUT
        );
    }

    #[test]
    fn location_kind_detection() {
        assert!(is_http_url("http://localhost:8000"));
        assert!(is_http_url("https://example.test"));
        assert!(!is_http_url("lists"));
        assert!(!is_http_url("/srv/lists"));
    }
}
