use std::sync::Arc;
use std::time::Duration;

use engine_logging::engine_info;
use finder_core::{Dispatcher, Job};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::worker::scan_url;
use crate::FetchError;

/// Runs fetch workers on a tokio runtime.
///
/// With `max_in_flight` unset every URL gets its own task right away. When
/// set, tasks are still spawned immediately but wait on a shared semaphore
/// before fetching.
#[derive(Clone)]
pub struct EngineHandle {
    fetcher: Arc<dyn Fetcher>,
    runtime: Handle,
    limiter: Option<Arc<Semaphore>>,
    worker_deadline: Duration,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings, runtime: Handle) -> Result<Self, FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.clone())?);
        Ok(Self::with_fetcher(fetcher, &settings, runtime))
    }

    pub fn with_fetcher(fetcher: Arc<dyn Fetcher>, settings: &FetchSettings, runtime: Handle) -> Self {
        Self {
            fetcher,
            runtime,
            limiter: settings
                .max_in_flight
                .map(|permits| Arc::new(Semaphore::new(permits.max(1)))),
            worker_deadline: settings.worker_deadline,
        }
    }
}

impl Dispatcher for EngineHandle {
    fn dispatch(&self, job: Arc<Job>) {
        engine_info!(
            "Dispatching {} workers phrase={:?}",
            job.url_count(),
            job.phrase()
        );
        for url in job.urls() {
            let fetcher = self.fetcher.clone();
            let job = job.clone();
            let url = url.clone();
            let limiter = self.limiter.clone();
            let deadline = self.worker_deadline;
            self.runtime.spawn(async move {
                // The semaphore is never closed, so a failed acquire just
                // runs unthrottled.
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                scan_url(fetcher, job, url, deadline).await;
            });
        }
    }
}
