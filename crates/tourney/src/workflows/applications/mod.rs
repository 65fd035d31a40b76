//! Tournament applications: coaches submit, directors approve into a tier and pool or reject.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationStatus, ApplicationStatusView, ApplicationSubmission, ApprovedEntry,
    Assignment, AssignmentPatch,
};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError, SubmissionError};
