//! Player progress: profiles, attempts, achievements, and the leaderboard
//! projection, plus the submission processor that ties them together.

pub mod processor;
pub mod schema;
pub mod store;

pub use processor::{process_submission, SubmissionRequest};
pub use store::ProgressStore;
