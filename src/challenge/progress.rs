use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::SubmissionStatus;
use crate::db::Submission;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterStatus {
    pub status: SubmissionStatus,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStatus {
    pub wallet_address: String,
    pub completed_chapters: Vec<i32>,
    pub pending_chapters: Vec<i32>,
    pub rejected_chapters: Vec<i32>,
    pub next_chapter: i32,
    pub total_completed: usize,
    pub total_pending: usize,
    pub submissions: BTreeMap<i32, ChapterStatus>,
    pub progress: Option<Value>,
}

/// Folds a wallet's submissions into per-status chapter lists.
///
/// The next chapter is one past the highest accepted chapter, capped at
/// `chapter_count`; a wallet with nothing accepted starts at chapter 1.
pub fn summarize(
    wallet_address: &str,
    submissions: &[Submission],
    chapter_count: i32,
    progress: Option<Value>,
) -> UserStatus {
    let mut completed = Vec::new();
    let mut pending = Vec::new();
    let mut rejected = Vec::new();
    let mut by_chapter = BTreeMap::new();

    for submission in submissions {
        let status = submission.status();
        match status {
            SubmissionStatus::Accepted => completed.push(submission.chapter_id),
            SubmissionStatus::Pending => pending.push(submission.chapter_id),
            SubmissionStatus::Rejected => rejected.push(submission.chapter_id),
        }
        by_chapter.insert(
            submission.chapter_id,
            ChapterStatus {
                status,
                submitted_at: submission.submitted_at,
                reviewed_at: submission.reviewed_at,
            },
        );
    }

    for list in [&mut completed, &mut pending, &mut rejected] {
        list.sort_unstable();
        list.dedup();
    }

    let next_chapter = completed
        .last()
        .map(|highest| (highest + 1).min(chapter_count))
        .unwrap_or(1);

    UserStatus {
        wallet_address: wallet_address.to_string(),
        total_completed: completed.len(),
        total_pending: pending.len(),
        completed_chapters: completed,
        pending_chapters: pending,
        rejected_chapters: rejected,
        next_chapter,
        submissions: by_chapter,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    const WALLET: &str = "0xabc";

    fn row(id: i32, chapter_id: i32, status: &str) -> Submission {
        let submitted_at = Utc::now() - Duration::minutes(i64::from(id));
        Submission {
            id,
            wallet_address: WALLET.to_string(),
            chapter_id,
            vercel_url: Some("https://garage.vercel.app".to_string()),
            suiscan_url: Some("https://suiscan.xyz/testnet/tx/0x1".to_string()),
            status: status.to_string(),
            submitted_at,
            reviewed_at: (status != "pending").then_some(submitted_at),
            reviewer_notes: None,
        }
    }

    #[test]
    fn accepted_and_pending_chapters() {
        let rows = vec![row(1, 1, "accepted"), row(2, 2, "pending")];
        let status = summarize(WALLET, &rows, 6, None);
        assert_eq!(status.completed_chapters, vec![1]);
        assert_eq!(status.pending_chapters, vec![2]);
        assert!(status.rejected_chapters.is_empty());
        assert_eq!(status.next_chapter, 2);
        assert_eq!(status.total_completed, 1);
        assert_eq!(status.total_pending, 1);
        assert_eq!(status.submissions[&2].status, SubmissionStatus::Pending);
    }

    #[test]
    fn nothing_submitted_starts_at_one() {
        let status = summarize(WALLET, &[], 6, None);
        assert_eq!(status.next_chapter, 1);
        assert!(status.submissions.is_empty());
    }

    #[test]
    fn next_chapter_is_capped_at_chapter_count() {
        let rows: Vec<_> = (1..=6).map(|c| row(c, c, "accepted")).collect();
        let status = summarize(WALLET, &rows, 6, None);
        assert_eq!(status.next_chapter, 6);
        assert_eq!(status.total_completed, 6);
    }

    #[test]
    fn gaps_follow_the_highest_accepted_chapter() {
        let rows = vec![row(1, 3, "accepted"), row(2, 1, "rejected")];
        let status = summarize(WALLET, &rows, 6, Some(json!({"xp": 40})));
        assert_eq!(status.next_chapter, 4);
        assert_eq!(status.rejected_chapters, vec![1]);
        assert_eq!(status.progress, Some(json!({"xp": 40})));
    }

    #[test]
    fn serializes_chapter_map_with_string_keys() {
        let rows = vec![row(1, 1, "accepted")];
        let value = serde_json::to_value(summarize(WALLET, &rows, 6, None)).unwrap();
        assert_eq!(value["submissions"]["1"]["status"], "accepted");
        assert_eq!(value["completed_chapters"], json!([1]));
        assert_eq!(value["progress"], Value::Null);
    }
}
