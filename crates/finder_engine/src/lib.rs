//! Finder engine: network fetches and the workers that feed search jobs.
mod engine;
mod fetch;
mod types;
mod worker;

pub use engine::EngineHandle;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, ScanOutcome};
pub use worker::{contains_phrase, scan_url};
