use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_warn};
use finder_core::Job;

use crate::{FailureKind, FetchError, Fetcher, ScanOutcome};

/// Fetches one URL of `job`, tests the body for the phrase and records the
/// outcome on the job.
///
/// Every path records exactly one outcome: fetch errors, a panicking fetcher
/// and an elapsed `deadline` all count as "not matched".
pub async fn scan_url(
    fetcher: Arc<dyn Fetcher>,
    job: Arc<Job>,
    url: String,
    deadline: Duration,
) -> ScanOutcome {
    engine_debug!("Scanning url={} phrase={:?}", url, job.phrase());

    let mut task = {
        let fetcher = fetcher.clone();
        let url = url.clone();
        tokio::spawn(async move { fetcher.fetch(&url).await })
    };

    let settled = tokio::time::timeout(deadline, &mut task).await;
    let outcome = match settled {
        Ok(Ok(Ok(output))) => {
            engine_debug!(
                "Fetched url={} final_url={} content_type={:?} bytes={}",
                url,
                output.metadata.final_url,
                output.metadata.content_type,
                output.bytes.len()
            );
            if contains_phrase(&output.bytes, job.phrase().as_bytes()) {
                ScanOutcome::Matched
            } else {
                ScanOutcome::NotMatched
            }
        }
        Ok(Ok(Err(err))) => ScanOutcome::FetchFailed(err),
        Ok(Err(join_err)) => ScanOutcome::FetchFailed(FetchError::new(
            FailureKind::WorkerPanicked,
            join_err.to_string(),
        )),
        Err(_) => {
            task.abort();
            ScanOutcome::FetchFailed(FetchError::new(
                FailureKind::Timeout,
                format!("no response within {deadline:?}"),
            ))
        }
    };

    match &outcome {
        ScanOutcome::Matched => engine_debug!("Phrase found at url={}", url),
        ScanOutcome::NotMatched => engine_debug!("Phrase not found at url={}", url),
        ScanOutcome::FetchFailed(err) => engine_warn!("Fetch failed url={}: {}", url, err),
    }

    if let Err(err) = job.record_outcome(&url, outcome.is_match()) {
        engine_error!("Could not record outcome for url={}: {}", url, err);
    }
    outcome
}

/// Case-sensitive, byte-wise substring test.
pub fn contains_phrase(body: &[u8], phrase: &[u8]) -> bool {
    memchr::memmem::find(body, phrase).is_some()
}
