//! Application state shared by the handlers.

use receipt_services::SubmissionPipeline;

pub struct AppState {
    pub pipeline: SubmissionPipeline,
}

impl AppState {
    pub fn new(pipeline: SubmissionPipeline) -> Self {
        Self { pipeline }
    }
}
