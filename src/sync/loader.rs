use std::{fmt, path::PathBuf, time::Duration};

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::error::{LoadError, SourceError};
use crate::io::http;
use crate::map::MapDocument;
use crate::types::Generation;
use super::CancelScope;

/// Where a map document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSource {
    Url(String),
    File(PathBuf),
    /// SVG text already in memory.
    Inline(String),
}

impl MapSource {
    /// Interpret a CLI argument: `http(s)://` is a URL, anything else a path.
    pub fn parse(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            MapSource::Url(arg.to_string())
        } else {
            MapSource::File(PathBuf::from(arg))
        }
    }
}

impl fmt::Display for MapSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapSource::Url(url) => f.write_str(url),
            MapSource::File(path) => write!(f, "{}", path.display()),
            MapSource::Inline(text) => write!(f, "<inline, {} bytes>", text.len()),
        }
    }
}

/// A finished load, tagged with the generation that requested it.
#[derive(Debug)]
pub struct Loaded {
    pub generation: Generation,
    pub result: Result<MapDocument, LoadError>,
}

/// Fetches and parses map documents, one generation at a time.
///
/// Starting a load cancels the previous one; its result is never delivered.
#[derive(Debug)]
pub struct DocumentLoader {
    client: Client,
    timeout: Duration,
    shapes_root: Option<String>,
    inflight: Option<CancelScope>,
    done: mpsc::UnboundedSender<Loaded>,
}

impl DocumentLoader {
    /// Build a loader and the channel its results arrive on.
    pub fn new(config: &MapConfig) -> Result<(Self, mpsc::UnboundedReceiver<Loaded>), SourceError> {
        let client = http::client(config.request_timeout())
            .map_err(|source| SourceError::Http { url: String::new(), source })?;
        let (done, rx) = mpsc::unbounded_channel();
        let loader = Self {
            client,
            timeout: config.request_timeout(),
            shapes_root: config.shapes_root.clone(),
            inflight: None,
            done,
        };
        Ok((loader, rx))
    }

    /// Load `source` in the background as `generation`.
    pub fn start(&mut self, generation: Generation, source: MapSource) {
        self.cancel();
        let scope = CancelScope::new(generation);
        let mut token = scope.token();
        self.inflight = Some(scope);

        let client = self.client.clone();
        let timeout = self.timeout;
        let shapes_root = self.shapes_root.clone();
        let done = self.done.clone();
        tokio::spawn(async move {
            let fetched = token.run(fetch_text(&client, &source, timeout)).await;
            if token.is_cancelled() {
                debug!("[sync::loader] {generation}: load of {source} cancelled");
                return;
            }
            let result = fetched
                .map_err(LoadError::from)
                .and_then(|text| MapDocument::parse(&text, generation, shapes_root.as_deref()).map_err(LoadError::from));
            match &result {
                Ok(doc) => info!("[sync::loader] {generation}: loaded {source} ({} shapes)", doc.shapes().len()),
                Err(e) => warn!("[sync::loader] {generation}: {e}"),
            }
            let _ = done.send(Loaded { generation, result });
        });
    }

    /// Cancel the load in flight, if any.
    pub fn cancel(&mut self) {
        if let Some(scope) = self.inflight.take() {
            debug!("[sync::loader] cancelling {}", scope.generation());
            scope.cancel();
        }
    }

    /// Fetch the text of `source` in the foreground.
    pub async fn fetch(&self, source: &MapSource) -> Result<String, SourceError> {
        fetch_text(&self.client, source, self.timeout).await
    }

    /// Fetch and parse `source` in the foreground.
    pub async fn load(&self, generation: Generation, source: &MapSource) -> Result<MapDocument, LoadError> {
        let text = self.fetch(source).await?;
        Ok(MapDocument::parse(&text, generation, self.shapes_root.as_deref())?)
    }
}

impl Drop for DocumentLoader {
    fn drop(&mut self) { self.cancel() }
}

async fn fetch_text(client: &Client, source: &MapSource, timeout: Duration) -> Result<String, SourceError> {
    let bytes = match source {
        MapSource::Inline(text) => return Ok(text.clone()),
        MapSource::Url(url) => http::get_bytes(client, url, timeout).await?,
        MapSource::File(path) => http::read_file(path).await?,
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg><rect x="0" y="0" width="4" height="4"/><text x="2" y="2">3</text></svg>"#;

    #[tokio::test]
    async fn loads_inline_and_file_sources() {
        let (loader, _rx) = DocumentLoader::new(&MapConfig::default()).unwrap();
        let doc = loader.load(Generation(1), &MapSource::Inline(SVG.into())).await.unwrap();
        assert_eq!(doc.shapes().len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        std::fs::write(&path, SVG).unwrap();
        let doc = loader.load(Generation(2), &MapSource::File(path)).await.unwrap();
        assert_eq!(doc.generation(), Generation(2));
        assert_eq!(doc.labels().len(), 1);
    }

    #[tokio::test]
    async fn background_loads_report_their_generation() {
        let (mut loader, mut rx) = DocumentLoader::new(&MapConfig::default()).unwrap();
        loader.start(Generation(5), MapSource::Inline(SVG.into()));
        let loaded = rx.recv().await.unwrap();
        assert_eq!(loaded.generation, Generation(5));
        assert!(loaded.result.is_ok());
    }

    #[tokio::test]
    async fn parse_failures_are_reported_not_fatal() {
        let (mut loader, mut rx) = DocumentLoader::new(&MapConfig::default()).unwrap();
        loader.start(Generation(1), MapSource::Inline("<svg><g></svg>".into()));
        let loaded = rx.recv().await.unwrap();
        assert!(matches!(loaded.result, Err(LoadError::Document(_))));
    }

    #[tokio::test]
    async fn superseded_loads_are_not_delivered() {
        let dir = tempfile::tempdir().unwrap();
        let (mut loader, mut rx) = DocumentLoader::new(&MapConfig::default()).unwrap();
        // the first load is cancelled before its task gets to run
        loader.start(Generation(1), MapSource::File(dir.path().join("missing.svg")));
        loader.start(Generation(2), MapSource::Inline(SVG.into()));
        let loaded = rx.recv().await.unwrap();
        assert_eq!(loaded.generation, Generation(2));
        drop(loader);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn sources_parse_from_arguments() {
        assert_eq!(MapSource::parse("https://x/map.svg"), MapSource::Url("https://x/map.svg".into()));
        assert_eq!(MapSource::parse("maps/bd.svg"), MapSource::File("maps/bd.svg".into()));
    }
}
