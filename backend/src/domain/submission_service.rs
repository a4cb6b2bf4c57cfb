//! Form submissions and their review workflow.
//!
//! Payloads are validated against the form's fields in display order and
//! every violation is reported. Reviews are compare-and-set writes: two staff
//! members deciding the same submission cannot both win.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::ports::{
    FormRepository, ReviewRequest, SubmissionRepository, SubmissionRepositoryError,
    SubmissionWorkflow,
};
use crate::domain::service_support::{STAFF_ONLY, fetch_form, require_staff};
use crate::domain::{
    Actor, Error, FieldErrors, FormId, MAX_SUBMISSION_BYTES, REVIEW_NOTES_MAX, Review,
    Submission, SubmissionFilter, SubmissionId, payload_object, validate_payload,
};

const FORM_CLOSED: &str = "This form is not accepting submissions.";

fn map_submission_error(error: SubmissionRepositoryError) -> Error {
    match error {
        SubmissionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("submission repository unavailable: {message}"))
        }
        SubmissionRepositoryError::Query { message } => {
            Error::internal(format!("submission repository error: {message}"))
        }
        SubmissionRepositoryError::MissingReference { .. } => {
            Error::not_found("Form not found")
        }
    }
}

/// Submission service implementing [`SubmissionWorkflow`].
#[derive(Clone)]
pub struct SubmissionService<F, S> {
    forms: Arc<F>,
    submissions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<F, S> SubmissionService<F, S> {
    pub fn new(forms: Arc<F>, submissions: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            forms,
            submissions,
            clock,
        }
    }
}

impl<F, S> SubmissionService<F, S>
where
    F: FormRepository,
    S: SubmissionRepository,
{
    async fn fetch_submission(&self, id: &SubmissionId) -> Result<Submission, Error> {
        self.submissions
            .find_by_id(id)
            .await
            .map_err(map_submission_error)?
            .ok_or_else(|| Error::not_found("Submission not found"))
    }
}

fn check_payload_size(payload: &Value) -> Result<(), Error> {
    let size = serde_json::to_vec(payload)
        .map_err(|err| Error::internal(format!("payload serialisation failed: {err}")))?
        .len();
    if size > MAX_SUBMISSION_BYTES {
        return Err(Error::validation(FieldErrors::single(
            "payload",
            format!("Submission payload exceeds {MAX_SUBMISSION_BYTES} bytes."),
        )));
    }
    Ok(())
}

#[async_trait]
impl<F, S> SubmissionWorkflow for SubmissionService<F, S>
where
    F: FormRepository,
    S: SubmissionRepository,
{
    async fn submit(
        &self,
        actor: &Actor,
        form_id: FormId,
        payload: Value,
    ) -> Result<Submission, Error> {
        let form = fetch_form(self.forms.as_ref(), &form_id).await?;
        if !form.is_active {
            return Err(Error::invalid_request(FORM_CLOSED));
        }
        check_payload_size(&payload)?;
        let payload = payload_object(payload).map_err(Error::validation)?;
        validate_payload(&form.fields, &payload).map_err(Error::validation)?;

        let submission = Submission::new(form.id, actor.user_id, payload, self.clock.utc());
        self.submissions
            .create(&submission)
            .await
            .map_err(map_submission_error)?;
        info!(
            submission_id = %submission.id,
            form_id = %form.id,
            submitted_by = %actor.user_id,
            "submission stored"
        );
        Ok(submission)
    }

    async fn list_for_form(
        &self,
        actor: &Actor,
        form_id: FormId,
    ) -> Result<Vec<Submission>, Error> {
        fetch_form(self.forms.as_ref(), &form_id).await?;
        let filter = SubmissionFilter {
            form_id: Some(form_id),
            submitted_by: (!actor.is_staff).then_some(actor.user_id),
            status: None,
        };
        self.submissions
            .list(&filter)
            .await
            .map_err(map_submission_error)
    }

    async fn get(&self, actor: &Actor, id: SubmissionId) -> Result<Submission, Error> {
        let submission = self.fetch_submission(&id).await?;
        if !actor.may_access(&submission.submitted_by) {
            return Err(Error::forbidden(STAFF_ONLY));
        }
        Ok(submission)
    }

    async fn review(
        &self,
        actor: &Actor,
        id: SubmissionId,
        request: ReviewRequest,
    ) -> Result<Submission, Error> {
        require_staff(actor)?;
        let notes = request.notes.trim().to_owned();
        if notes.chars().count() > REVIEW_NOTES_MAX {
            return Err(Error::validation(FieldErrors::single(
                "notes",
                format!("Ensure this field has no more than {REVIEW_NOTES_MAX} characters."),
            )));
        }

        let mut submission = self.fetch_submission(&id).await?;
        let current = submission.status;
        let review = Review {
            reviewer: actor.user_id,
            reviewed_at: self.clock.utc(),
            notes,
        };
        submission
            .transition(request.status, review.clone())
            .map_err(|err| {
                Error::invalid_request(err.to_string()).with_field_error("status", err.to_string())
            })?;

        let applied = self
            .submissions
            .transition(&id, current, request.status, &review)
            .await
            .map_err(map_submission_error)?;
        if !applied {
            warn!(submission_id = %id, "concurrent review lost the race");
            return Err(Error::conflict(
                "The submission was updated by another reviewer. Reload and try again.",
            ));
        }
        info!(
            submission_id = %id,
            from = %current,
            to = %request.status,
            reviewer = %actor.user_id,
            "submission reviewed"
        );
        Ok(submission)
    }
}

#[cfg(test)]
#[path = "submission_service_tests.rs"]
mod tests;
