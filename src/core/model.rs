use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub type SubmissionId = Uuid;

/// A parsed magnet URI. `hash` is always upper-case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink {
    pub uri: String,
    pub hash: String,
    pub display_name: Option<String>,
    pub trackers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteTorrentRecord {
    pub id: String,
    pub hash: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFileEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub path: String,
}

impl RemoteFileEntry {
    /// Lower-cased text after the last `.` of the file name; `None` without a dot.
    pub fn extension(&self) -> Option<String> {
        let tail = self.path.rsplit('/').next().unwrap_or(&self.path);
        tail.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddedTorrent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TorrentInfo {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub files: Vec<RemoteFileEntry>,
}

/// Per-activation scratch state, dropped when the submission ends.
#[derive(Debug, Clone)]
pub struct SubmissionState {
    pub submission_id: SubmissionId,
    pub torrent_id: Option<String>,
    pub selected: Vec<String>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            torrent_id: None,
            selected: vec![],
        }
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    #[default]
    Idle,
    /// Already present remotely.
    Neutral,
    /// Added and files selected.
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Positive,
    Negative,
}

/// The API hands out ids as strings for torrents and as integers for files.
fn id_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    Ok(match Raw::deserialize(de)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}
