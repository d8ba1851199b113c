#![cfg(feature = "server")]
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::error::Error as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::backend::error::{excerpt, FetchError};
use crate::shared::types::ResourceState;

/// One pollable endpoint and the state of its latest fetch.
///
/// State writes go through the `live` flag shared with the owning
/// coordinator; once that flag is cleared, late results are dropped.
#[derive(Debug)]
pub struct ResourceFetcher {
    name: String,
    url: String,
    client: Client,
    state: RwLock<ResourceState>,
    live: Arc<AtomicBool>,
}

impl ResourceFetcher {
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: Client) -> Self {
        Self::with_live_flag(name, url, client, Arc::new(AtomicBool::new(true)))
    }

    pub(crate) fn with_live_flag(
        name: impl Into<String>,
        url: impl Into<String>,
        client: Client,
        live: Arc<AtomicBool>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
            state: RwLock::new(ResourceState::default()),
            live,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn state(&self) -> ResourceState {
        self.state.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    /// Fetches the resource and records the outcome in this resource's state.
    ///
    /// The error is returned as well as recorded so a join over many
    /// fetchers can tell which ones failed.
    pub async fn refresh(&self) -> Result<Value, FetchError> {
        self.commit(|s| s.begin_loading()).await;
        let result = self.fetch().await;
        match &result {
            Ok(data) => {
                debug!(resource = %self.name, "refresh ok");
                let data = data.clone();
                self.commit(move |s| s.succeed(data)).await;
            }
            Err(e) => {
                warn!(
                    resource = %self.name,
                    status = ?e.status(),
                    body = e.body_excerpt().unwrap_or_default(),
                    "refresh failed: {e}"
                );
                let message = e.to_string();
                self.commit(move |s| s.fail(message)).await;
            }
        }
        result
    }

    async fn commit(&self, update: impl FnOnce(&mut ResourceState)) {
        // checked under the guard so a write cannot slip past `settle`
        let mut w = self.state.write().await;
        if !self.live.load(Ordering::SeqCst) {
            debug!(resource = %self.name, "coordinator stopped; dropping state update");
            return;
        }
        update(&mut *w);
    }

    /// Waits out any write that began before the live flag was cleared.
    pub(crate) async fn settle(&self) {
        drop(self.state.write().await);
    }

    async fn fetch(&self) -> Result<Value, FetchError> {
        debug!("[fetcher] GET {}", self.url);
        let res = match self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    debug!("[fetcher] hint: request to {} timed out", self.url);
                }
                if e.is_connect() {
                    debug!(
                        "[fetcher] hint: connection to {} failed (DNS/route/refused/TLS)",
                        self.url
                    );
                }
                let mut chain = Vec::new();
                let mut src: Option<&dyn std::error::Error> = e.source();
                while let Some(s) = src {
                    chain.push(s.to_string());
                    src = s.source();
                }
                if !chain.is_empty() {
                    debug!("[fetcher] error chain: {}", chain.join(" -> "));
                }
                return Err(FetchError::Network {
                    url: self.url.clone(),
                    source: e,
                });
            }
        };

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body: excerpt(&text),
            });
        }

        let bytes = res.bytes().await.map_err(|e| FetchError::Network {
            url: self.url.clone(),
            source: e,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Parse {
            url: self.url.clone(),
            source: e,
            snippet: excerpt(&String::from_utf8_lossy(&bytes)),
        })
    }
}
