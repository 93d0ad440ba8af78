use serde::Serialize;

use crate::{Job, JobId, JobRegistry};

/// What a reader of a single job gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultView {
    Pending {
        id: JobId,
        phrase: String,
        outstanding: usize,
        total: usize,
    },
    Complete {
        id: JobId,
        phrase: String,
        matched: Vec<String>,
    },
}

impl ResultView {
    pub fn of(id: JobId, job: &Job) -> Self {
        // A complete job no longer changes, so the snapshot taken after the
        // check is final.
        if job.is_complete() {
            ResultView::Complete {
                id,
                phrase: job.snapshot_phrase(),
                matched: job.snapshot_matched(),
            }
        } else {
            ResultView::Pending {
                id,
                phrase: job.snapshot_phrase(),
                outstanding: job.outstanding(),
                total: job.url_count(),
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ResultView::Complete { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub id: JobId,
    pub phrase: String,
    pub url_count: usize,
    pub complete: bool,
}

/// Every job ever submitted, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ListingView {
    pub rows: Vec<ListingRow>,
}

impl ListingView {
    pub fn of(registry: &JobRegistry) -> Self {
        let rows = registry
            .list()
            .into_iter()
            .map(|summary| ListingRow {
                id: summary.id,
                phrase: summary.phrase,
                url_count: summary.url_count,
                complete: summary.complete,
            })
            .collect();
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
