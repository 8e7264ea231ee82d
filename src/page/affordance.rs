use std::sync::Mutex;

use crate::core::model::IndicatorState;
use crate::core::pipeline::{Indicator, Pipeline, SubmitError, Submitted};
use crate::page::scan::MagnetAnchor;

/// The "send" control placed right after one magnet anchor.
#[derive(Debug)]
pub struct Affordance {
    anchor: MagnetAnchor,
    state: Mutex<IndicatorState>,
}

impl Affordance {
    pub fn new(anchor: MagnetAnchor) -> Self {
        Self { anchor, state: Mutex::new(IndicatorState::Idle) }
    }

    pub fn anchor(&self) -> &MagnetAnchor {
        &self.anchor
    }

    /// Index of the anchor this control follows.
    pub fn position(&self) -> usize {
        self.anchor.index
    }

    pub fn state(&self) -> IndicatorState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// One activation: submit this anchor's target, independently of every other control.
    pub async fn click(&self, pipeline: &Pipeline) -> Result<Submitted, SubmitError> {
        tracing::debug!(position = self.position(), "affordance clicked");
        pipeline.submit(&self.anchor.href, self).await
    }
}

impl Indicator for Affordance {
    fn set_state(&self, state: IndicatorState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}
