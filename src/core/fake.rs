//! In-memory `DebridApi` used by tests; records every call it receives.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::core::model::{AddedTorrent, RemoteFileEntry, RemoteTorrentRecord, TorrentInfo};
use crate::debrid::api::{ApiError, DebridApi};

pub struct FakeApi {
    catalog: Option<Vec<RemoteTorrentRecord>>,
    added_id: Option<String>,
    files: Option<Vec<RemoteFileEntry>>,
    select_ok: bool,
    hold_add: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
}

fn unavailable() -> ApiError {
    ApiError::Status { status: StatusCode::SERVICE_UNAVAILABLE, body: "down".into() }
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            catalog: Some(vec![]),
            added_id: Some("42".into()),
            files: Some(vec![]),
            select_ok: true,
            hold_add: None,
            calls: Mutex::new(vec![]),
        }
    }

    pub fn with_catalog(mut self, records: Vec<RemoteTorrentRecord>) -> Self {
        self.catalog = Some(records);
        self
    }

    pub fn failing_catalog(mut self) -> Self {
        self.catalog = None;
        self
    }

    pub fn with_added_id(mut self, id: &str) -> Self {
        self.added_id = Some(id.into());
        self
    }

    pub fn failing_add(mut self) -> Self {
        self.added_id = None;
        self
    }

    pub fn with_files(mut self, files: &[(&str, &str)]) -> Self {
        self.files = Some(
            files
                .iter()
                .map(|(id, path)| RemoteFileEntry { id: id.to_string(), path: path.to_string() })
                .collect(),
        );
        self
    }

    pub fn failing_info(mut self) -> Self {
        self.files = None;
        self
    }

    pub fn failing_select(mut self) -> Self {
        self.select_ok = false;
        self
    }

    /// `add_magnet` waits on the returned handle before answering.
    pub fn holding_add(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.hold_add = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DebridApi for FakeApi {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_torrents(&self) -> Result<Vec<RemoteTorrentRecord>, ApiError> {
        self.record("list_torrents".into());
        self.catalog.clone().ok_or_else(unavailable)
    }

    async fn add_magnet(&self, magnet: &str) -> Result<AddedTorrent, ApiError> {
        self.record(format!("add_magnet:{magnet}"));
        if let Some(gate) = &self.hold_add {
            gate.notified().await;
        }
        let id = self.added_id.clone().ok_or_else(unavailable)?;
        Ok(AddedTorrent { id })
    }

    async fn torrent_info(&self, torrent_id: &str) -> Result<TorrentInfo, ApiError> {
        self.record(format!("torrent_info:{torrent_id}"));
        let files = self.files.clone().ok_or_else(unavailable)?;
        Ok(TorrentInfo { filename: None, files })
    }

    async fn select_files(&self, torrent_id: &str, file_ids: &[String]) -> Result<(), ApiError> {
        self.record(format!("select_files:{torrent_id}:{}", file_ids.join(",")));
        if self.select_ok {
            Ok(())
        } else {
            Err(unavailable())
        }
    }
}
