//! Feed loading: one GET of the earthquake GeoJSON, handed to the renderer
//! through a [`FeedState`] the UI polls each frame.

use crate::{
    core::{config::QuakeMapConfig, constants::USER_AGENT},
    data::geojson::{parse_feed, EarthquakeFeature},
};
use async_trait::async_trait;
use std::time::Duration;

#[cfg(feature = "tokio-runtime")]
use crossbeam_channel::{bounded, Receiver, TryRecvError};
#[cfg(feature = "tokio-runtime")]
use std::sync::Arc;

/// Why the feed could not be turned into features
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server answered with HTTP {0}")]
    Status(u16),

    #[error("invalid GeoJSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("expected a FeatureCollection, got {0:?}")]
    NotAFeatureCollection(String),

    #[error("feature #{index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },

    #[error("feed task failed: {0}")]
    Task(String),
}

/// Anything that can produce the feature list
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<EarthquakeFeature>, FeedError>;

    /// Short human-readable name for logs
    fn describe(&self) -> String;
}

/// Fetches the feed over HTTP(S)
pub struct HttpFeedSource {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedSource {
    /// `timeout` of `None` lets a hung request wait forever
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> crate::Result<Self> {
        Self::with_user_agent(url, timeout, USER_AGENT)
    }

    pub fn with_user_agent(
        url: impl Into<String>,
        timeout: Option<Duration>,
        user_agent: &str,
    ) -> crate::Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            url: url.into(),
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &QuakeMapConfig) -> crate::Result<Self> {
        Self::with_user_agent(
            config.feed_url.clone(),
            config.request_timeout(),
            &config.user_agent,
        )
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<EarthquakeFeature>, FeedError> {
        log::info!("fetching earthquake feed {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        log::debug!("feed body: {} bytes", body.len());
        parse_feed(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Serves a feed body held in memory, e.g. a saved GeoJSON file
pub struct StaticFeedSource {
    name: String,
    body: String,
}

impl StaticFeedSource {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self) -> Result<Vec<EarthquakeFeature>, FeedError> {
        parse_feed(&self.body)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// What the host should show right now
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Ready(Vec<EarthquakeFeature>),
    /// Network and payload failures collapse into this one user-visible state
    Unavailable(String),
}

impl FeedState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading)
    }

    pub fn from_result(result: Result<Vec<EarthquakeFeature>, FeedError>) -> Self {
        match result {
            Ok(features) => FeedState::Ready(features),
            Err(e) => FeedState::Unavailable(e.to_string()),
        }
    }
}

/// Awaits one fetch and converts the outcome into a [`FeedState`]
pub async fn load(source: &dyn FeedSource) -> FeedState {
    let result = source.fetch().await;
    match &result {
        Ok(features) => log::info!(
            "loaded {} earthquakes from {}",
            features.len(),
            source.describe()
        ),
        Err(e) => log::warn!("feed {} unavailable: {}", source.describe(), e),
    }
    FeedState::from_result(result)
}

/// A single in-flight fetch running on tokio, polled from the UI thread
#[cfg(feature = "tokio-runtime")]
pub struct FeedLoader {
    rx: Receiver<FeedState>,
    state: FeedState,
}

#[cfg(feature = "tokio-runtime")]
impl FeedLoader {
    /// Starts the fetch on the ambient tokio runtime
    pub fn spawn(source: Arc<dyn FeedSource>) -> crate::Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| crate::MapError::Config(format!("no tokio runtime: {e}")))?;
        Ok(Self::spawn_on(&handle, source))
    }

    pub fn spawn_on(handle: &tokio::runtime::Handle, source: Arc<dyn FeedSource>) -> Self {
        let (tx, rx) = bounded(1);
        handle.spawn(async move {
            let state = load(source.as_ref()).await;
            // The receiver is gone if the window closed first
            let _ = tx.send(state);
        });
        Self {
            rx,
            state: FeedState::Loading,
        }
    }

    /// Picks up the result if it has arrived; never blocks
    pub fn poll(&mut self) -> &FeedState {
        if self.state.is_loading() {
            match self.rx.try_recv() {
                Ok(state) => self.state = state,
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    log::warn!("feed task ended without a result");
                    self.state = FeedState::Unavailable(
                        FeedError::Task("ended without a result".to_string()).to_string(),
                    );
                }
            }
        }
        &self.state
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }
}
