use crate::core::model::RemoteTorrentRecord;
use crate::debrid::api::{ApiError, DebridApi};

#[derive(thiserror::Error, Debug)]
#[error("fetch torrent list from {service}: {source}")]
pub struct CatalogFetchError {
    pub service: &'static str,
    #[source]
    pub source: ApiError,
}

/// Snapshot of the account's torrents taken once at startup. Never updated
/// afterwards; share it as `Arc<Catalog>`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<RemoteTorrentRecord>,
}

impl Catalog {
    pub fn new(records: Vec<RemoteTorrentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_known(&self, hash: &str) -> bool {
        is_known(self, hash)
    }

    pub fn find(&self, hash: &str) -> Option<&RemoteTorrentRecord> {
        self.records.iter().find(|r| r.hash.eq_ignore_ascii_case(hash))
    }
}

/// Case-insensitive exact match of `hash` against every record.
pub fn is_known(catalog: &Catalog, hash: &str) -> bool {
    catalog.find(hash).is_some()
}

pub async fn fetch_catalog(api: &dyn DebridApi) -> Result<Catalog, CatalogFetchError> {
    let records = api.list_torrents().await.map_err(|source| CatalogFetchError {
        service: api.name(),
        source,
    })?;
    tracing::debug!(service = api.name(), count = records.len(), "fetched existing torrents");
    Ok(Catalog::new(records))
}
