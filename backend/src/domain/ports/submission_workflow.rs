//! Driving port for form submissions and their review.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Actor, Error, FormId, Submission, SubmissionId, SubmissionStatus};

/// Reviewer decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub status: SubmissionStatus,
    pub notes: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionWorkflow: Send + Sync {
    /// Validate `payload` against the form and store it as pending.
    async fn submit(
        &self,
        actor: &Actor,
        form_id: FormId,
        payload: Value,
    ) -> Result<Submission, Error>;

    /// Staff see every submission of the form; others see their own.
    async fn list_for_form(&self, actor: &Actor, form_id: FormId)
    -> Result<Vec<Submission>, Error>;

    /// Visible to the submitter and staff.
    async fn get(&self, actor: &Actor, id: SubmissionId) -> Result<Submission, Error>;

    /// Staff only: advance the review state.
    async fn review(
        &self,
        actor: &Actor,
        id: SubmissionId,
        request: ReviewRequest,
    ) -> Result<Submission, Error>;
}
