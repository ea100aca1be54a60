pub mod destinations;
pub mod health;
pub mod submission;

pub use destinations::DestinationsResponse;
pub use submission::SubmissionResponse;
