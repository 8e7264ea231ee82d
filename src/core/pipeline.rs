use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::Instrument;

use crate::core::catalog::Catalog;
use crate::core::filter::FileFilter;
use crate::core::magnet::extract_hash;
use crate::core::model::{IndicatorState, Severity, SubmissionState};
use crate::debrid::api::{ApiError, DebridApi};
use crate::i18n::Messages;
use crate::notify::Notifier;

/// Visual handle of the element that triggered a submission.
pub trait Indicator: Send + Sync {
    fn set_state(&self, state: IndicatorState);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Add,
    Inspect,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Add => f.write_str("add magnet"),
            Step::Inspect => f.write_str("torrent info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub torrent_id: String,
    pub selected: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("invalid magnet link")]
    InvalidMagnet,

    #[error("torrent {0} already exists remotely")]
    Duplicate(String),

    #[error("torrent {0} is already being submitted")]
    InFlight(String),

    #[error("{step} failed: {source}")]
    Submission {
        step: Step,
        #[source]
        source: ApiError,
    },

    #[error("no file of torrent {torrent_id} matched the allowed extensions")]
    NoMatchingFiles { torrent_id: String },

    #[error("select files of torrent {torrent_id} failed: {source}")]
    Selection {
        torrent_id: String,
        #[source]
        source: ApiError,
    },
}

impl SubmitError {
    pub fn message(&self, m: &Messages) -> &'static str {
        match self {
            SubmitError::InvalidMagnet => m.invalid_magnet,
            SubmitError::Duplicate(_) => m.already_exists,
            SubmitError::InFlight(_) => m.in_flight,
            SubmitError::Submission { .. } => m.submit_failed,
            SubmitError::NoMatchingFiles { .. } => m.no_matching_files,
            SubmitError::Selection { .. } => m.select_failed,
        }
    }
}

/// Hashes with a submission currently running. Cleared by the guard on drop.
#[derive(Clone, Default)]
struct InFlight(Arc<Mutex<HashSet<String>>>);

struct InFlightGuard {
    set: InFlight,
    hash: String,
}

impl InFlight {
    fn claim(&self, hash: &str) -> Option<InFlightGuard> {
        let mut set = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(hash.to_string()) {
            return None;
        }
        Some(InFlightGuard { set: self.clone(), hash: hash.to_string() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.set.0.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.hash);
    }
}

/// Sends one magnet at a time through add, inspect, filter and select.
/// Cloning is cheap; clones share the catalog snapshot and the in-flight set.
#[derive(Clone)]
pub struct Pipeline {
    api: Arc<dyn DebridApi>,
    catalog: Arc<Catalog>,
    filter: FileFilter,
    notifier: Arc<dyn Notifier>,
    messages: &'static Messages,
    in_flight: InFlight,
}

impl Pipeline {
    pub fn new(
        api: Arc<dyn DebridApi>,
        catalog: Arc<Catalog>,
        filter: FileFilter,
        notifier: Arc<dyn Notifier>,
        messages: &'static Messages,
    ) -> Self {
        Self {
            api,
            catalog,
            filter,
            notifier,
            messages,
            in_flight: InFlight::default(),
        }
    }

    /// Runs the whole workflow for `magnet_uri` and reports the outcome
    /// through the notifier. Every step waits for the previous response.
    pub async fn submit(
        &self,
        magnet_uri: &str,
        indicator: &dyn Indicator,
    ) -> Result<Submitted, SubmitError> {
        let mut state = SubmissionState::new();
        let span = tracing::info_span!("submit", id = %state.submission_id);

        async {
            let result = self.run(&mut state, magnet_uri, indicator).await;
            self.report(&result);
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        state: &mut SubmissionState,
        magnet_uri: &str,
        indicator: &dyn Indicator,
    ) -> Result<Submitted, SubmitError> {
        let hash = extract_hash(magnet_uri).ok_or(SubmitError::InvalidMagnet)?;
        tracing::debug!(%hash, "parsed magnet");

        if self.catalog.is_known(&hash) {
            indicator.set_state(IndicatorState::Neutral);
            return Err(SubmitError::Duplicate(hash));
        }

        let _guard = self
            .in_flight
            .claim(&hash)
            .ok_or_else(|| SubmitError::InFlight(hash.clone()))?;

        let added = self
            .api
            .add_magnet(magnet_uri)
            .await
            .map_err(|source| SubmitError::Submission { step: Step::Add, source })?;
        tracing::info!(%hash, torrent_id = %added.id, "magnet added");
        let torrent_id = state.torrent_id.insert(added.id).clone();

        let info = self
            .api
            .torrent_info(&torrent_id)
            .await
            .map_err(|source| SubmitError::Submission { step: Step::Inspect, source })?;

        state.selected = self.filter.select(&info.files);
        tracing::debug!(
            torrent_id = %torrent_id,
            name = info.filename.as_deref().unwrap_or(""),
            listed = info.files.len(),
            matched = state.selected.len(),
            "filtered files"
        );
        if state.selected.is_empty() {
            return Err(SubmitError::NoMatchingFiles { torrent_id });
        }

        self.api
            .select_files(&torrent_id, &state.selected)
            .await
            .map_err(|source| SubmitError::Selection { torrent_id: torrent_id.clone(), source })?;

        indicator.set_state(IndicatorState::Active);
        Ok(Submitted {
            torrent_id,
            selected: std::mem::take(&mut state.selected),
        })
    }

    fn report(&self, result: &Result<Submitted, SubmitError>) {
        match result {
            Ok(s) => {
                tracing::info!(torrent_id = %s.torrent_id, files = s.selected.len(), "files selected");
                self.notifier.notify(self.messages.added_and_selected, Severity::Positive);
            }
            Err(e @ (SubmitError::Duplicate(_) | SubmitError::InFlight(_))) => {
                tracing::info!("{}", e);
                self.notifier.notify(e.message(self.messages), Severity::Negative);
            }
            Err(e) => {
                tracing::warn!(error = %e, "submission failed");
                self.notifier.notify(e.message(self.messages), Severity::Negative);
            }
        }
    }
}
