use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::model::Severity;

/// Transient, non-blocking status feedback.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Shows each notification as its own line on stderr and removes it after the
/// display window. Lines are independent: nothing is queued, a newer line does
/// not replace an older one.
pub struct TerminalNotifier {
    mp: MultiProgress,
    window: Duration,
    positive: ProgressStyle,
    negative: ProgressStyle,
    interactive: bool,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TerminalNotifier {
    pub fn new(window: Duration) -> anyhow::Result<Self> {
        let interactive = std::io::stderr().is_terminal();
        let mp = if interactive {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        Ok(Self {
            mp,
            window,
            positive: ProgressStyle::with_template(" {msg:.white.on_green} ")?,
            negative: ProgressStyle::with_template(" {msg:.white.on_red} ")?,
            interactive,
            pending: Mutex::new(vec![]),
        })
    }

    /// Prints a line that stays, above any live notifications.
    pub fn println(&self, line: impl AsRef<str>) {
        if self.interactive {
            let _ = self.mp.println(line.as_ref());
        } else {
            println!("{}", line.as_ref());
        }
    }

    /// Waits until every notification shown so far has been removed.
    pub async fn settle(&self) {
        let handles: Vec<_> = match self.pending.lock() {
            Ok(mut p) => p.drain(..).collect(),
            Err(_) => return,
        };
        for h in handles {
            let _ = h.await;
        }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        tracing::debug!(?severity, message, "notification");

        if !self.interactive {
            let tag = match severity {
                Severity::Positive => "+",
                Severity::Negative => "-",
            };
            eprintln!("[{tag}] {message}");
            return;
        }

        let pb = self.mp.add(ProgressBar::new_spinner());
        pb.set_style(match severity {
            Severity::Positive => self.positive.clone(),
            Severity::Negative => self.negative.clone(),
        });
        pb.set_message(message.to_string());
        pb.tick();

        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            pb.finish_and_clear();
        });
        if let Ok(mut p) = self.pending.lock() {
            p.push(handle);
        }
    }
}

/// Keeps every notification in memory; used by tests.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<(String, Severity)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn seen(&self) -> Vec<(String, Severity)> {
        self.seen.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.seen.lock().unwrap().push((message.to_string(), severity));
    }
}
