use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::core::model::{AddedTorrent, RemoteTorrentRecord, TorrentInfo};
use crate::debrid::api::{ApiError, DebridApi};

pub const DEFAULT_BASE_URL: &str = "https://api.real-debrid.com/rest/1.0";
/// Largest page `GET /torrents` hands out in one response.
pub const DEFAULT_CATALOG_LIMIT: u32 = 5000;

#[derive(Clone)]
pub struct DebridContext {
    pub base_url: String,
    pub api_token: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub catalog_limit: Option<u32>,
}

impl std::fmt::Debug for DebridContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebridContext")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .field("catalog_limit", &self.catalog_limit)
            .finish()
    }
}

pub struct RealDebridClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    catalog_limit: Option<u32>,
}

impl RealDebridClient {
    pub fn new(ctx: &DebridContext) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .default_headers(Self::build_headers(ctx)?)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            base_url: ctx.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(ctx.timeout_secs.max(1)),
            catalog_limit: ctx.catalog_limit,
        })
    }

    fn build_headers(ctx: &DebridContext) -> Result<HeaderMap, ApiError> {
        let mut h = HeaderMap::new();
        h.insert(USER_AGENT, HeaderValue::from_str(&ctx.user_agent)?);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", ctx.api_token))?;
        bearer.set_sensitive(true);
        h.insert(AUTHORIZATION, bearer);
        Ok(h)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = req.timeout(self.timeout).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl DebridApi for RealDebridClient {
    fn name(&self) -> &'static str {
        "real-debrid"
    }

    async fn list_torrents(&self) -> Result<Vec<RemoteTorrentRecord>, ApiError> {
        let mut req = self.client.get(self.url("torrents"));
        if let Some(limit) = self.catalog_limit {
            req = req.query(&[("limit", limit)]);
        }
        let resp = self.send(req).await?;
        // 204 means the account has no torrents at all.
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(vec![]);
        }
        let records: Vec<RemoteTorrentRecord> = Self::json(resp).await?;
        if self.catalog_limit.is_some_and(|limit| records.len() >= limit as usize) {
            tracing::warn!(
                records = records.len(),
                "torrent list filled the whole page, older torrents may be missed by the duplicate check"
            );
        }
        Ok(records)
    }

    async fn add_magnet(&self, magnet: &str) -> Result<AddedTorrent, ApiError> {
        let req = self
            .client
            .post(self.url("torrents/addMagnet"))
            .form(&[("magnet", magnet)]);
        Self::json(self.send(req).await?).await
    }

    async fn torrent_info(&self, torrent_id: &str) -> Result<TorrentInfo, ApiError> {
        let req = self.client.get(self.url(&format!("torrents/info/{torrent_id}")));
        Self::json(self.send(req).await?).await
    }

    async fn select_files(&self, torrent_id: &str, file_ids: &[String]) -> Result<(), ApiError> {
        let req = self
            .client
            .post(self.url(&format!("torrents/selectFiles/{torrent_id}")))
            .form(&[("files", file_ids.join(","))]);
        self.send(req).await?;
        Ok(())
    }
}
