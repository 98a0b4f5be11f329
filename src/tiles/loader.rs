use crate::{
    prelude::HashSet,
    tiles::cache::TileKey,
    MapError, Result,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::Duration;

/// Outcome of one tile request
#[derive(Debug)]
pub struct TileResult {
    pub key: TileKey,
    pub data: std::result::Result<Vec<u8>, String>,
}

#[derive(Debug, Clone)]
pub struct TileLoaderConfig {
    /// Maximum tile downloads in flight
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 16,
            timeout: Duration::from_secs(30),
            user_agent: crate::core::constants::USER_AGENT.to_string(),
        }
    }
}

/// Fetches tiles on tokio and hands the bytes back over a channel so the UI
/// thread can decode them between frames. Failed tiles are not retried.
pub struct TileLoader {
    client: reqwest::Client,
    handle: tokio::runtime::Handle,
    config: TileLoaderConfig,
    tx: Sender<TileResult>,
    rx: Receiver<TileResult>,
    in_flight: HashSet<TileKey>,
    failed: HashSet<TileKey>,
}

impl TileLoader {
    /// Uses the ambient tokio runtime
    pub fn new(config: TileLoaderConfig) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| MapError::Config(format!("no tokio runtime: {e}")))?;
        Self::with_handle(handle, config)
    }

    pub fn with_handle(handle: tokio::runtime::Handle, config: TileLoaderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.max_concurrent)
            .build()?;
        let (tx, rx) = unbounded();

        Ok(Self {
            client,
            handle,
            config,
            tx,
            rx,
            in_flight: HashSet::default(),
            failed: HashSet::default(),
        })
    }

    /// Starts a download unless the tile is already pending, has failed
    /// before, or the concurrency budget is spent. Returns whether a request
    /// was started.
    pub fn request(&mut self, key: TileKey, url: String) -> bool {
        if self.in_flight.contains(&key)
            || self.failed.contains(&key)
            || self.in_flight.len() >= self.config.max_concurrent
        {
            return false;
        }

        self.in_flight.insert(key.clone());
        let client = self.client.clone();
        let tx = self.tx.clone();

        self.handle.spawn(async move {
            log::debug!("fetch tile {:?} from {}", key.coord, url);
            let data = fetch_bytes(&client, &url).await;
            // The loader may already be gone
            let _ = tx.send(TileResult { key, data });
        });
        true
    }

    /// Collects finished downloads. Failures are logged and remembered;
    /// only successful payloads are returned.
    pub fn drain(&mut self) -> Vec<(TileKey, Vec<u8>)> {
        let mut ready = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            self.in_flight.remove(&result.key);
            match result.data {
                Ok(bytes) => {
                    log::debug!("tile {:?} ready ({} bytes)", result.key.coord, bytes.len());
                    ready.push((result.key, bytes));
                }
                Err(e) => {
                    log::warn!("tile {:?} of {} failed: {}", result.key.coord, result.key.layer_id, e);
                    self.failed.insert(result.key);
                }
            }
        }
        ready
    }

    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_failed(&self, key: &TileKey) -> bool {
        self.failed.contains(key)
    }

    /// Records a tile whose payload arrived but was unusable, so it is not
    /// fetched again
    pub fn mark_failed(&mut self, key: TileKey) {
        self.in_flight.remove(&key);
        self.failed.insert(key);
    }

    /// Forget failures so the next frame asks for those tiles again
    pub fn clear_failures(&mut self) {
        self.failed.clear();
    }
}

async fn fetch_bytes(client: &reqwest::Client, url: &str) -> std::result::Result<Vec<u8>, String> {
    let response = client.get(url).send().await.map_err(|e| e.to_string())?;
    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}
