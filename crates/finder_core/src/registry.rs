use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::{CoreError, Job};

/// Position of a job in the registry. Dense, zero-based, never reused.
pub type JobId = usize;

/// Row of the registry listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub phrase: String,
    pub url_count: usize,
    pub complete: bool,
}

/// Append-only collection of every job submitted during the process lifetime.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<Vec<Arc<Job>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, job: Arc<Job>) -> JobId {
        let mut jobs = self.jobs.write();
        jobs.push(job);
        jobs.len() - 1
    }

    pub fn get(&self, id: JobId) -> Result<Arc<Job>, CoreError> {
        self.jobs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Looks up a job from its textual id, as it arrives in a request path.
    ///
    /// Negative, non-numeric and out-of-range ids are all `NotFound`.
    pub fn resolve(&self, raw: &str) -> Result<(JobId, Arc<Job>), CoreError> {
        let not_found = || CoreError::NotFound(raw.to_string());
        let signed: i64 = raw.trim().parse().map_err(|_| not_found())?;
        let id = JobId::try_from(signed).map_err(|_| not_found())?;
        let job = self.get(id).map_err(|_| not_found())?;
        Ok((id, job))
    }

    pub fn list(&self) -> Vec<JobSummary> {
        let jobs: Vec<Arc<Job>> = self.jobs.read().clone();
        jobs.iter()
            .enumerate()
            .map(|(id, job)| JobSummary {
                id,
                phrase: job.snapshot_phrase(),
                url_count: job.url_count(),
                complete: job.is_complete(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}
