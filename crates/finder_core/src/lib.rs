//! Finder core: search jobs, the job registry and read-side views.
mod error;
mod job;
mod registry;
mod service;
mod submission;
mod view_model;

pub use error::CoreError;
pub use job::{Job, Progress};
pub use registry::{JobId, JobRegistry, JobSummary};
pub use service::{Dispatcher, SearchService};
pub use submission::{Submission, ValidSubmission, DEFAULT_MAX_URLS};
pub use view_model::{ListingRow, ListingView, ResultView};
