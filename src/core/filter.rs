use crate::core::model::RemoteFileEntry;
use std::collections::HashSet;

pub const DEFAULT_EXTENSIONS: [&str; 7] = ["mp3", "m4b", "mp4", "mkv", "cbz", "cbr", "pdf"];

/// Extension allow-list applied to a torrent's file listing.
#[derive(Debug, Clone)]
pub struct FileFilter {
    allowed: HashSet<String>,
}

impl FileFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { allowed }
    }

    pub fn allows(&self, file: &RemoteFileEntry) -> bool {
        file.extension().is_some_and(|ext| self.allowed.contains(&ext))
    }

    /// Ids of the allowed files, in listing order.
    pub fn select(&self, files: &[RemoteFileEntry]) -> Vec<String> {
        files
            .iter()
            .filter(|f| self.allows(f))
            .map(|f| f.id.clone())
            .collect()
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}
