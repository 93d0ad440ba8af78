use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};

use crate::{CoreError, Job, JobId, JobRegistry, Submission};

/// Starts the fetch workers for a job.
///
/// Implementations must start one worker for every URL of the job and must
/// not block on their completion.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Arc<Job>);
}

/// Entry point for submissions: validates, registers, then dispatches.
#[derive(Clone)]
pub struct SearchService {
    registry: Arc<JobRegistry>,
    dispatcher: Arc<dyn Dispatcher>,
    max_urls: usize,
}

impl SearchService {
    pub fn new(registry: Arc<JobRegistry>, dispatcher: Arc<dyn Dispatcher>, max_urls: usize) -> Self {
        Self {
            registry,
            dispatcher,
            max_urls,
        }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Registers the job before any worker starts, so it is visible as
    /// pending immediately.
    pub fn submit(&self, submission: Submission) -> Result<JobId, CoreError> {
        let valid = submission.validate(self.max_urls).inspect_err(|err| {
            engine_warn!("Rejected submission: {}", err);
        })?;
        let job = Arc::new(Job::new(valid.phrase, valid.urls)?);
        let id = self.registry.add(job.clone());
        engine_info!(
            "Submitted job_id={} phrase={:?} urls={}",
            id,
            job.phrase(),
            job.url_count()
        );
        self.dispatcher.dispatch(job);
        Ok(id)
    }
}
