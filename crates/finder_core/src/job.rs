use std::pin::pin;

use engine_logging::{engine_debug, engine_info};
use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::CoreError;

/// A search for one phrase across a fixed set of URLs.
///
/// `phrase` and `urls` never change after construction. The mutable part
/// (matched URLs, outstanding count, completion flag) sits behind a single
/// reader/writer lock so that readers always see a consistent snapshot and
/// the final decrement flips `complete` exactly once.
#[derive(Debug)]
pub struct Job {
    phrase: String,
    urls: Vec<String>,
    state: RwLock<JobState>,
    done: Notify,
}

#[derive(Debug)]
struct JobState {
    matched: Vec<String>,
    outstanding: usize,
    complete: bool,
}

/// Counter state right after a recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub outstanding: usize,
    /// True only for the call that drove `outstanding` to zero.
    pub completed_now: bool,
}

impl Job {
    pub fn new(phrase: impl Into<String>, urls: Vec<String>) -> Result<Self, CoreError> {
        let phrase = phrase.into();
        if phrase.is_empty() {
            return Err(CoreError::InvalidInput("search phrase is empty".into()));
        }
        if urls.is_empty() {
            return Err(CoreError::InvalidInput("no urls to search".into()));
        }
        let outstanding = urls.len();
        Ok(Self {
            phrase,
            urls,
            state: RwLock::new(JobState {
                matched: Vec::new(),
                outstanding,
                complete: false,
            }),
            done: Notify::new(),
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    /// Records the outcome for one URL and counts it as finished.
    ///
    /// Adding to `matched` and decrementing happen in one critical section,
    /// so a reader never sees the job complete without its last match.
    pub fn record_outcome(&self, url: &str, matched: bool) -> Result<Progress, CoreError> {
        if !self.urls.iter().any(|candidate| candidate == url) {
            return Err(CoreError::UnknownUrl(url.to_string()));
        }
        let progress = {
            let mut state = self.state.write();
            if state.complete {
                return Err(CoreError::AlreadyComplete);
            }
            if matched && !state.matched.iter().any(|existing| existing == url) {
                state.matched.push(url.to_string());
            }
            state.decrement()
        };
        engine_debug!(
            "Recorded url={} matched={} outstanding={}",
            url,
            matched,
            progress.outstanding
        );
        self.after_decrement(progress);
        Ok(progress)
    }

    /// Counts one URL as finished without touching `matched`.
    pub fn decrement_outstanding(&self) -> Result<Progress, CoreError> {
        let progress = {
            let mut state = self.state.write();
            if state.complete {
                return Err(CoreError::AlreadyComplete);
            }
            state.decrement()
        };
        self.after_decrement(progress);
        Ok(progress)
    }

    fn after_decrement(&self, progress: Progress) {
        if progress.completed_now {
            engine_info!(
                "Job finished phrase={:?} urls={} matched={}",
                self.phrase,
                self.urls.len(),
                self.state.read().matched.len()
            );
            self.done.notify_waiters();
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.read().complete
    }

    pub fn outstanding(&self) -> usize {
        self.state.read().outstanding
    }

    pub fn snapshot_matched(&self) -> Vec<String> {
        self.state.read().matched.clone()
    }

    pub fn snapshot_phrase(&self) -> String {
        self.phrase.clone()
    }

    /// Waits until every URL has reported.
    pub async fn wait_complete(&self) {
        loop {
            let mut notified = pin!(self.done.notified());
            // Register before checking so a flip in between still wakes us.
            notified.as_mut().enable();
            if self.is_complete() {
                return;
            }
            notified.await;
        }
    }
}

impl JobState {
    fn decrement(&mut self) -> Progress {
        self.outstanding -= 1;
        let completed_now = self.outstanding == 0;
        if completed_now {
            self.complete = true;
        }
        Progress {
            outstanding: self.outstanding,
            completed_now,
        }
    }
}
