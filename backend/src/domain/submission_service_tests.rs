//! Tests for the submission workflow service.

use std::sync::Arc;

use chrono::Utc;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::MockSubmissionRepository;
use crate::domain::{
    ErrorCode, FieldDefinition, FieldType, Form, FormType, SubmissionStatus, UserId,
    ValidationRules,
};
use crate::test_support::fixtures::{account, actor_for, staff_account};
use crate::test_support::{InMemoryFormRepository, InMemorySubmissionRepository, MutableClock};

struct Harness {
    forms: Arc<InMemoryFormRepository>,
    submissions: Arc<InMemorySubmissionRepository>,
    service: SubmissionService<InMemoryFormRepository, InMemorySubmissionRepository>,
    form: Form,
    staff: Actor,
    worker: Actor,
}

fn field(name: &str, field_type: FieldType, order: i32) -> FieldDefinition {
    FieldDefinition {
        name: name.to_owned(),
        label: name.to_owned(),
        field_type,
        placeholder: String::new(),
        help_text: String::new(),
        required: true,
        order,
        options: Vec::new(),
        rules: ValidationRules::None,
    }
}

fn contact_form(created_by: UserId) -> Form {
    let now = Utc::now();
    Form {
        id: FormId::random(),
        title: "Contact".into(),
        description: String::new(),
        form_type: FormType::Contact,
        is_active: true,
        created_by,
        created_at: now,
        updated_at: now,
        fields: vec![field("email", FieldType::Email, 0), field("age", FieldType::Number, 1)],
    }
}

#[fixture]
fn harness() -> Harness {
    let forms = Arc::new(InMemoryFormRepository::new());
    let submissions = Arc::new(InMemorySubmissionRepository::new());
    let staff = actor_for(&staff_account("+1000000001"));
    let worker = actor_for(&account("+1000000002"));
    let form = contact_form(staff.user_id);
    forms.seed(form.clone());
    let service = SubmissionService::new(
        Arc::clone(&forms),
        Arc::clone(&submissions),
        Arc::new(MutableClock::fixed()),
    );
    Harness {
        forms,
        submissions,
        service,
        form,
        staff,
        worker,
    }
}

impl Harness {
    async fn submitted(&self) -> Submission {
        self.service
            .submit(
                &self.worker,
                self.form.id,
                json!({"email": "ops@example.com", "age": 34}),
            )
            .await
            .expect("valid submission")
    }

    async fn review(&self, id: SubmissionId, status: SubmissionStatus) -> Result<Submission, Error> {
        self.service
            .review(
                &self.staff,
                id,
                ReviewRequest {
                    status,
                    notes: "checked".into(),
                },
            )
            .await
    }
}

#[rstest]
#[tokio::test]
async fn valid_payloads_are_stored_as_pending(harness: Harness) {
    let submission = harness.submitted().await;

    assert_eq!(submission.status, SubmissionStatus::Pending);
    assert_eq!(submission.submitted_by, harness.worker.user_id);
    assert!(submission.review.is_none());
    assert_eq!(harness.submissions.count(), 1);
}

#[rstest]
#[tokio::test]
async fn every_missing_required_field_is_reported(harness: Harness) {
    let error = harness
        .service
        .submit(&harness.worker, harness.form.id, json!({}))
        .await
        .expect_err("missing fields");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let fields: Vec<&str> = error.errors().fields().collect();
    assert_eq!(fields, ["email", "age"]);
    assert_eq!(harness.submissions.count(), 0);
}

#[rstest]
#[tokio::test]
async fn non_object_payloads_are_rejected(harness: Harness) {
    let error = harness
        .service
        .submit(&harness.worker, harness.form.id, json!(["email"]))
        .await
        .expect_err("array payload");
    assert!(error.errors().contains("payload"));
}

#[rstest]
#[tokio::test]
async fn inactive_forms_reject_submissions(harness: Harness) {
    let mut closed = contact_form(harness.staff.user_id);
    closed.is_active = false;
    harness.forms.seed(closed.clone());

    let error = harness
        .service
        .submit(&harness.worker, closed.id, json!({"email": "a@b.co", "age": 1}))
        .await
        .expect_err("closed form");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn unknown_forms_are_not_found(harness: Harness) {
    let error = harness
        .service
        .submit(&harness.worker, FormId::random(), json!({}))
        .await
        .expect_err("missing form");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn workers_only_see_their_own_submissions(harness: Harness) {
    harness.submitted().await;
    let other = actor_for(&account("+1000000003"));

    let own = harness
        .service
        .list_for_form(&other, harness.form.id)
        .await
        .expect("listing");
    assert!(own.is_empty());
    let all = harness
        .service
        .list_for_form(&harness.staff, harness.form.id)
        .await
        .expect("staff listing");
    assert_eq!(all.len(), 1);
}

#[rstest]
#[tokio::test]
async fn reading_another_users_submission_is_forbidden(harness: Harness) {
    let submission = harness.submitted().await;
    let other = actor_for(&account("+1000000003"));

    let error = harness
        .service
        .get(&other, submission.id)
        .await
        .expect_err("not theirs");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn reviews_walk_the_state_machine_and_record_the_reviewer(harness: Harness) {
    let submission = harness.submitted().await;

    let reviewed = harness
        .review(submission.id, SubmissionStatus::Reviewed)
        .await
        .expect("pending -> reviewed");
    let review = reviewed.review.expect("review recorded");
    assert_eq!(review.reviewer, harness.staff.user_id);
    assert_eq!(review.notes, "checked");

    let approved = harness
        .review(submission.id, SubmissionStatus::Approved)
        .await
        .expect("reviewed -> approved");
    assert_eq!(approved.status, SubmissionStatus::Approved);

    let error = harness
        .review(submission.id, SubmissionStatus::Pending)
        .await
        .expect_err("approved -> pending");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.errors().contains("status"));
}

#[rstest]
#[tokio::test]
async fn pending_submissions_cannot_skip_review(harness: Harness) {
    let submission = harness.submitted().await;

    let error = harness
        .review(submission.id, SubmissionStatus::Approved)
        .await
        .expect_err("pending -> approved");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn workers_cannot_review(harness: Harness) {
    let submission = harness.submitted().await;

    let error = harness
        .service
        .review(
            &harness.worker,
            submission.id,
            ReviewRequest {
                status: SubmissionStatus::Reviewed,
                notes: String::new(),
            },
        )
        .await
        .expect_err("forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn losing_a_concurrent_review_is_a_conflict(harness: Harness) {
    let stored = Submission::new(
        harness.form.id,
        harness.worker.user_id,
        serde_json::Map::new(),
        Utc::now(),
    );
    let mut submissions = MockSubmissionRepository::new();
    let found = stored.clone();
    submissions
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    submissions
        .expect_transition()
        .times(1)
        .return_once(|_, _, _, _| Ok(false));
    let service = SubmissionService::new(
        Arc::clone(&harness.forms),
        Arc::new(submissions),
        Arc::new(MutableClock::fixed()),
    );

    let error = service
        .review(
            &harness.staff,
            stored.id,
            ReviewRequest {
                status: SubmissionStatus::Reviewed,
                notes: String::new(),
            },
        )
        .await
        .expect_err("lost race");
    assert_eq!(error.code(), ErrorCode::Conflict);
}
