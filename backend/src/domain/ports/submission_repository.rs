//! Port for form submission persistence.

use async_trait::async_trait;

use crate::domain::{Review, Submission, SubmissionFilter, SubmissionId, SubmissionStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by submission repository adapters.
    pub enum SubmissionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "submission repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "submission repository query failed: {message}",
        /// The referenced form or user no longer exists.
        MissingReference { message: String } =>
            "submission references a missing row: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    async fn create(&self, submission: &Submission) -> Result<(), SubmissionRepositoryError>;

    async fn find_by_id(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError>;

    /// List matching submissions newest first.
    async fn list(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError>;

    /// Move a submission from `expected` to `next`, recording the review.
    ///
    /// The write only applies while the stored status still equals
    /// `expected`; returns `false` when another reviewer got there first.
    async fn transition(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        next: SubmissionStatus,
        review: &Review,
    ) -> Result<bool, SubmissionRepositoryError>;
}
