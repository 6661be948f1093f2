use chrono::{DateTime, Utc};
use thiserror::Error;

use super::SubmissionStatus;
use crate::config::ReviewMode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("This submission has already been accepted and can no longer be modified")]
    AlreadyAccepted,
    #[error("Only pending submissions can be reviewed (current status: {0})")]
    NotPending(SubmissionStatus),
    #[error("A review must accept or reject, not return to pending")]
    InvalidVerdict,
}

/// What a resubmission writes over the existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resubmission {
    pub status: SubmissionStatus,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: Option<String>,
}

/// Decides how a resubmission for an existing row is written, per review mode.
///
/// Accepted rows are final for learners in either mode.
pub fn plan_resubmission(
    current: SubmissionStatus,
    mode: ReviewMode,
    now: DateTime<Utc>,
) -> Result<Resubmission, LifecycleError> {
    if current == SubmissionStatus::Accepted {
        return Err(LifecycleError::AlreadyAccepted);
    }

    Ok(match mode {
        ReviewMode::Manual => Resubmission {
            status: SubmissionStatus::Pending,
            reviewed_at: None,
            reviewer_notes: None,
        },
        ReviewMode::AutoAccept => Resubmission {
            status: SubmissionStatus::Accepted,
            reviewed_at: Some(now),
            reviewer_notes: None,
        },
    })
}

/// A reviewer may only settle a pending row, and only to accepted or rejected.
pub fn plan_review(
    current: SubmissionStatus,
    verdict: SubmissionStatus,
) -> Result<SubmissionStatus, LifecycleError> {
    if verdict == SubmissionStatus::Pending {
        return Err(LifecycleError::InvalidVerdict);
    }
    if current != SubmissionStatus::Pending {
        return Err(LifecycleError::NotPending(current));
    }
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_resubmission_goes_back_to_pending() {
        let now = Utc::now();
        for current in [SubmissionStatus::Pending, SubmissionStatus::Rejected] {
            let plan = plan_resubmission(current, ReviewMode::Manual, now).unwrap();
            assert_eq!(plan.status, SubmissionStatus::Pending);
            assert_eq!(plan.reviewed_at, None);
            assert_eq!(plan.reviewer_notes, None);
        }
    }

    #[test]
    fn auto_accept_resubmission_is_accepted_immediately() {
        let now = Utc::now();
        let plan = plan_resubmission(SubmissionStatus::Rejected, ReviewMode::AutoAccept, now)
            .unwrap();
        assert_eq!(plan.status, SubmissionStatus::Accepted);
        assert_eq!(plan.reviewed_at, Some(now));
        assert_eq!(plan.reviewer_notes, None);
    }

    #[test]
    fn accepted_is_terminal_for_learners() {
        for mode in [ReviewMode::Manual, ReviewMode::AutoAccept] {
            assert_eq!(
                plan_resubmission(SubmissionStatus::Accepted, mode, Utc::now()).unwrap_err(),
                LifecycleError::AlreadyAccepted
            );
        }
    }

    #[test]
    fn reviews_settle_pending_rows_only() {
        assert_eq!(
            plan_review(SubmissionStatus::Pending, SubmissionStatus::Accepted),
            Ok(SubmissionStatus::Accepted)
        );
        assert_eq!(
            plan_review(SubmissionStatus::Pending, SubmissionStatus::Rejected),
            Ok(SubmissionStatus::Rejected)
        );
        assert_eq!(
            plan_review(SubmissionStatus::Rejected, SubmissionStatus::Accepted),
            Err(LifecycleError::NotPending(SubmissionStatus::Rejected))
        );
        assert_eq!(
            plan_review(SubmissionStatus::Pending, SubmissionStatus::Pending),
            Err(LifecycleError::InvalidVerdict)
        );
    }
}
