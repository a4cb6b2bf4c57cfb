//! PostgreSQL-backed form submissions.
//!
//! Reviews are compare-and-set updates guarded by the expected status, so
//! concurrent reviewers cannot both move one submission.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubmissionRepository, SubmissionRepositoryError};
use crate::domain::{
    FormId, Review, Submission, SubmissionFilter, SubmissionId, SubmissionStatus, UserId,
};

use super::diesel_basic_error_mapping::{
    ConstraintViolation, constraint_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::json_serializers::json_to_payload;
use super::models::{NewSubmissionRow, SubmissionReviewUpdate, SubmissionRow};
use super::pool::{DbPool, PoolError};
use super::schema::submissions;

/// Diesel-backed implementation of the [`SubmissionRepository`] port.
#[derive(Clone)]
pub struct DieselSubmissionRepository {
    pool: DbPool,
}

impl DieselSubmissionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SubmissionRepositoryError {
    map_basic_pool_error(error, SubmissionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SubmissionRepositoryError {
    if let Some(ConstraintViolation::ForeignKey(constraint)) = constraint_violation(&error) {
        return SubmissionRepositoryError::missing_reference(
            constraint.unwrap_or("foreign key").to_owned(),
        );
    }
    map_basic_diesel_error(
        error,
        SubmissionRepositoryError::query,
        SubmissionRepositoryError::connection,
    )
}

fn row_to_submission(row: SubmissionRow) -> Result<Submission, SubmissionRepositoryError> {
    let status = SubmissionStatus::from_str(&row.status).map_err(|err| {
        SubmissionRepositoryError::query(format!("invalid submission status in database: {err}"))
    })?;
    let payload = json_to_payload(row.payload).map_err(SubmissionRepositoryError::query)?;
    let review = match (row.reviewed_by, row.reviewed_at) {
        (Some(reviewer), Some(reviewed_at)) => Some(Review {
            reviewer: UserId::from_uuid(reviewer),
            reviewed_at,
            notes: row.review_notes,
        }),
        _ => None,
    };
    Ok(Submission {
        id: SubmissionId::from_uuid(row.id),
        form_id: FormId::from_uuid(row.form_id),
        submitted_by: UserId::from_uuid(row.submitted_by),
        payload,
        status,
        submitted_at: row.submitted_at,
        review,
    })
}

#[async_trait]
impl SubmissionRepository for DieselSubmissionRepository {
    async fn create(&self, submission: &Submission) -> Result<(), SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSubmissionRow {
            id: *submission.id.as_uuid(),
            form_id: *submission.form_id.as_uuid(),
            submitted_by: *submission.submitted_by.as_uuid(),
            payload: serde_json::Value::Object(submission.payload.clone()),
            status: submission.status.as_str(),
            submitted_at: submission.submitted_at,
        };
        diesel::insert_into(submissions::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(
        &self,
        id: &SubmissionId,
    ) -> Result<Option<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = submissions::table
            .filter(submissions::id.eq(id.as_uuid()))
            .select(SubmissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_submission).transpose()
    }

    async fn list(
        &self,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = submissions::table.into_boxed();
        if let Some(form_id) = filter.form_id {
            query = query.filter(submissions::form_id.eq(*form_id.as_uuid()));
        }
        if let Some(submitted_by) = filter.submitted_by {
            query = query.filter(submissions::submitted_by.eq(*submitted_by.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(submissions::status.eq(status.as_str()));
        }
        let rows: Vec<SubmissionRow> = query
            .order((submissions::submitted_at.desc(), submissions::id))
            .select(SubmissionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_submission).collect()
    }

    async fn transition(
        &self,
        id: &SubmissionId,
        expected: SubmissionStatus,
        next: SubmissionStatus,
        review: &Review,
    ) -> Result<bool, SubmissionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = SubmissionReviewUpdate {
            status: next.as_str(),
            reviewed_by: Some(*review.reviewer.as_uuid()),
            reviewed_at: Some(review.reviewed_at),
            review_notes: &review.notes,
        };
        let affected = diesel::update(
            submissions::table.filter(
                submissions::id
                    .eq(id.as_uuid())
                    .and(submissions::status.eq(expected.as_str())),
            ),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use uuid::Uuid;

    #[fixture]
    fn row() -> SubmissionRow {
        SubmissionRow {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            submitted_by: Uuid::new_v4(),
            payload: json!({ "email": "ops@example.com" }),
            status: "pending".into(),
            submitted_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            review_notes: String::new(),
        }
    }

    #[rstest]
    fn pending_rows_have_no_review(row: SubmissionRow) {
        let submission = row_to_submission(row).expect("valid row");
        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert!(submission.review.is_none());
        assert_eq!(submission.payload["email"], "ops@example.com");
    }

    #[rstest]
    fn reviewed_rows_carry_the_reviewer(mut row: SubmissionRow) {
        let reviewer = Uuid::new_v4();
        row.status = "approved".into();
        row.reviewed_by = Some(reviewer);
        row.reviewed_at = Some(Utc::now());
        row.review_notes = "fine".into();

        let review = row_to_submission(row)
            .expect("valid row")
            .review
            .expect("review present");
        assert_eq!(review.reviewer, UserId::from_uuid(reviewer));
        assert_eq!(review.notes, "fine");
    }

    #[rstest]
    fn unknown_statuses_are_query_errors(mut row: SubmissionRow) {
        row.status = "archived".into();
        let err = row_to_submission(row).expect_err("bad status");
        assert!(matches!(err, SubmissionRepositoryError::Query { .. }));
    }
}
