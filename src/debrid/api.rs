use async_trait::async_trait;
use reqwest::StatusCode;

use crate::core::model::{AddedTorrent, RemoteTorrentRecord, TorrentInfo};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http status error: {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// The four torrent endpoints of a debrid service that the submission
/// workflow relies on. Implementations authenticate on their own.
#[async_trait]
pub trait DebridApi: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_torrents(&self) -> Result<Vec<RemoteTorrentRecord>, ApiError>;

    async fn add_magnet(&self, magnet: &str) -> Result<AddedTorrent, ApiError>;

    async fn torrent_info(&self, torrent_id: &str) -> Result<TorrentInfo, ApiError>;

    /// `file_ids` are sent comma-joined, in the given order.
    async fn select_files(&self, torrent_id: &str, file_ids: &[String]) -> Result<(), ApiError>;
}
