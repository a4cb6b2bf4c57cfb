//! Form submissions and their review workflow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::forms::FormId;
use super::user::UserId;

/// Maximum length of reviewer notes.
pub const REVIEW_NOTES_MAX: usize = 2000;

/// Identifier of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Review state of a submission.
///
/// `pending → reviewed → {approved, rejected}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Reviewed,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Return `true` when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Return `true` when moving from `self` to `next` is allowed.
    ///
    /// # Examples
    /// ```
    /// use kpa_backend::domain::SubmissionStatus::*;
    ///
    /// assert!(Pending.can_transition_to(Reviewed));
    /// assert!(!Pending.can_transition_to(Approved));
    /// assert!(!Approved.can_transition_to(Pending));
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Reviewed)
                | (Self::Reviewed, Self::Approved)
                | (Self::Reviewed, Self::Rejected)
        )
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("\"{s}\" is not a valid choice.")),
        }
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot move a submission from {from} to {to}.")]
pub struct InvalidTransition {
    pub from: SubmissionStatus,
    pub to: SubmissionStatus,
}

/// Reviewer identity, timestamp, and notes recorded on a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub reviewer: UserId,
    pub reviewed_at: DateTime<Utc>,
    pub notes: String,
}

/// A user's response to a form.
///
/// ## Invariants
/// - `payload` validated against the form's fields when stored and never
///   changes afterwards.
/// - `review` is present exactly when `status` is past `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub id: SubmissionId,
    pub form_id: FormId,
    pub submitted_by: UserId,
    pub payload: Map<String, Value>,
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub review: Option<Review>,
}

impl Submission {
    /// Create a pending submission.
    #[must_use]
    pub fn new(
        form_id: FormId,
        submitted_by: UserId,
        payload: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubmissionId::random(),
            form_id,
            submitted_by,
            payload,
            status: SubmissionStatus::Pending,
            submitted_at: now,
            review: None,
        }
    }

    /// Apply a reviewer's status change.
    ///
    /// # Errors
    /// Returns [`InvalidTransition`] when the state machine forbids it.
    pub fn transition(
        &mut self,
        next: SubmissionStatus,
        review: Review,
    ) -> Result<(), InvalidTransition> {
        if !self.status.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.review = Some(review);
        Ok(())
    }
}

/// Scope of a submission listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub form_id: Option<FormId>,
    pub submitted_by: Option<UserId>,
    pub status: Option<SubmissionStatus>,
}

impl SubmissionFilter {
    /// Return `true` when `submission` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, submission: &Submission) -> bool {
        self.form_id.is_none_or(|id| submission.form_id == id)
            && self
                .submitted_by
                .is_none_or(|id| submission.submitted_by == id)
            && self.status.is_none_or(|status| submission.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use SubmissionStatus::*;

    #[fixture]
    fn submission() -> Submission {
        Submission::new(FormId::random(), UserId::random(), Map::new(), Utc::now())
    }

    fn review() -> Review {
        Review {
            reviewer: UserId::random(),
            reviewed_at: Utc::now(),
            notes: "checked".to_owned(),
        }
    }

    #[rstest]
    #[case(Pending, Reviewed, true)]
    #[case(Reviewed, Approved, true)]
    #[case(Reviewed, Rejected, true)]
    #[case(Pending, Approved, false)]
    #[case(Pending, Rejected, false)]
    #[case(Approved, Pending, false)]
    #[case(Rejected, Reviewed, false)]
    #[case(Reviewed, Pending, false)]
    #[case(Pending, Pending, false)]
    fn transitions(#[case] from: SubmissionStatus, #[case] to: SubmissionStatus, #[case] ok: bool) {
        assert_eq!(from.can_transition_to(to), ok);
    }

    #[rstest]
    fn new_submissions_are_pending(submission: Submission) {
        assert_eq!(submission.status, Pending);
        assert!(submission.review.is_none());
    }

    #[rstest]
    fn review_is_recorded_on_transition(mut submission: Submission) {
        submission.transition(Reviewed, review()).expect("pending to reviewed");
        assert_eq!(submission.status, Reviewed);
        assert_eq!(
            submission.review.as_ref().map(|r| r.notes.as_str()),
            Some("checked")
        );
    }

    #[rstest]
    fn terminal_states_reject_changes(mut submission: Submission) {
        submission.transition(Reviewed, review()).expect("review");
        submission.transition(Approved, review()).expect("approve");
        let err = submission.transition(Pending, review()).expect_err("terminal");
        assert_eq!(err.to_string(), "Cannot move a submission from approved to pending.");
        assert!(Approved.is_terminal());
    }

    #[rstest]
    fn filters_combine(submission: Submission) {
        let mut filter = SubmissionFilter {
            form_id: Some(submission.form_id),
            ..SubmissionFilter::default()
        };
        assert!(filter.matches(&submission));
        filter.status = Some(Approved);
        assert!(!filter.matches(&submission));
    }
}
