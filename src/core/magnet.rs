use crate::core::model::MagnetLink;
use url::Url;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MagnetError {
    #[error("not a valid magnet uri")]
    Malformed,

    #[error("magnet missing xt=urn:btih:...")]
    MissingInfoHash,
}

/// Info-hash of a magnet URI, upper-cased. `None` if the URI does not parse
/// or carries no usable `xt` parameter.
pub fn extract_hash(uri: &str) -> Option<String> {
    let u = Url::parse(uri).ok()?;
    info_hash(&u)
}

fn info_hash(magnet: &Url) -> Option<String> {
    // xt=urn:btih:<hash>
    let (_, xt) = magnet.query_pairs().find(|(k, _)| k == "xt")?;
    let hash = xt.rsplit(':').next()?;
    if hash.is_empty() {
        return None;
    }
    Some(hash.to_uppercase())
}

fn trackers(magnet: &Url) -> Vec<String> {
    magnet
        .query_pairs()
        .filter(|(k, _)| k == "tr")
        .map(|(_, v)| v.to_string())
        .collect()
}

impl MagnetLink {
    pub fn parse(uri: &str) -> Result<Self, MagnetError> {
        let u = Url::parse(uri).map_err(|_| MagnetError::Malformed)?;
        let hash = info_hash(&u).ok_or(MagnetError::MissingInfoHash)?;
        let display_name = u
            .query_pairs()
            .find(|(k, _)| k == "dn")
            .map(|(_, v)| v.to_string());

        Ok(Self {
            uri: uri.to_string(),
            hash,
            display_name,
            trackers: trackers(&u),
        })
    }

    /// `dn` when present, otherwise a short form of the hash.
    pub fn label(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| format!("torrent-{}", self.hash.chars().take(12).collect::<String>()))
    }
}
