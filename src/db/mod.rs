mod models;

pub use models::*;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::challenge::{Resubmission, SubmissionStatus, ValidSubmission};

pub type DbPool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Creates the user row on first contact; a no-op afterwards.
pub async fn ensure_user(pool: &PgPool, wallet_address: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO users (wallet_address)
        VALUES ($1)
        ON CONFLICT (wallet_address) DO NOTHING
        "#,
    )
    .bind(wallet_address)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_submission(
    pool: &PgPool,
    wallet_address: &str,
    chapter_id: i32,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT * FROM submissions WHERE wallet_address = $1 AND chapter_id = $2",
    )
    .bind(wallet_address)
    .bind(chapter_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_submission(pool: &PgPool, id: i32) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts a first submission as `pending`. When another request created the
/// row in the meantime the later write wins and `on_conflict` is applied
/// instead, unless that row is already accepted (then `None`).
pub async fn upsert_submission(
    pool: &PgPool,
    submission: &ValidSubmission,
    on_conflict: &Resubmission,
) -> Result<Option<UpsertedSubmission>, sqlx::Error> {
    sqlx::query_as::<_, UpsertedSubmission>(
        r#"
        INSERT INTO submissions (wallet_address, chapter_id, vercel_url, suiscan_url, status, submitted_at)
        VALUES ($1, $2, $3, $4, 'pending', NOW())
        ON CONFLICT (wallet_address, chapter_id) DO UPDATE
        SET vercel_url = EXCLUDED.vercel_url, suiscan_url = EXCLUDED.suiscan_url,
            status = $5, submitted_at = NOW(), reviewed_at = $6, reviewer_notes = $7
        WHERE submissions.status <> 'accepted'
        RETURNING *, (xmax = 0) AS inserted
        "#,
    )
    .bind(&submission.wallet_address)
    .bind(submission.chapter_id)
    .bind(&submission.vercel_url)
    .bind(&submission.suiscan_url)
    .bind(on_conflict.status.as_str())
    .bind(on_conflict.reviewed_at)
    .bind(on_conflict.reviewer_notes.as_deref())
    .fetch_optional(pool)
    .await
}

/// Overwrites a learner's row unless it was accepted in the meantime, in which
/// case nothing is written and `None` comes back.
pub async fn resubmit(
    pool: &PgPool,
    id: i32,
    submission: &ValidSubmission,
    status: SubmissionStatus,
    reviewed_at: Option<DateTime<Utc>>,
    reviewer_notes: Option<&str>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        r#"
        UPDATE submissions
        SET vercel_url = $2, suiscan_url = $3, status = $4, submitted_at = NOW(),
            reviewed_at = $5, reviewer_notes = $6
        WHERE id = $1 AND status <> 'accepted'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&submission.vercel_url)
    .bind(&submission.suiscan_url)
    .bind(status.as_str())
    .bind(reviewed_at)
    .bind(reviewer_notes)
    .fetch_optional(pool)
    .await
}

/// Records a reviewer's decision on a row that is still pending.
pub async fn record_review(
    pool: &PgPool,
    id: i32,
    status: SubmissionStatus,
    reviewer_notes: Option<&str>,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        r#"
        UPDATE submissions
        SET status = $2, reviewed_at = NOW(), reviewer_notes = $3
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(reviewer_notes)
    .fetch_optional(pool)
    .await
}

/// Newest first.
pub async fn list_submissions(
    pool: &PgPool,
    wallet_address: &str,
    chapter_id: Option<i32>,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        r#"
        SELECT * FROM submissions
        WHERE wallet_address = $1 AND ($2::INTEGER IS NULL OR chapter_id = $2)
        ORDER BY submitted_at DESC
        "#,
    )
    .bind(wallet_address)
    .bind(chapter_id)
    .fetch_all(pool)
    .await
}

pub async fn get_progress(
    pool: &PgPool,
    wallet_address: &str,
) -> Result<Option<UserProgress>, sqlx::Error> {
    sqlx::query_as::<_, UserProgress>("SELECT * FROM user_progress WHERE wallet_address = $1")
        .bind(wallet_address)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::plan_resubmission;
    use crate::config::ReviewMode;

    const WALLET: &str = "0x1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d5e6f708192a3b4c5d6e7f809";

    fn valid(chapter_id: i32, vercel_url: &str) -> ValidSubmission {
        ValidSubmission {
            wallet_address: WALLET.to_string(),
            chapter_id,
            vercel_url: vercel_url.to_string(),
            suiscan_url: "https://suiscan.xyz/testnet/tx/0xdeadbeef".to_string(),
        }
    }

    fn on_conflict(mode: ReviewMode) -> Resubmission {
        plan_resubmission(SubmissionStatus::Pending, mode, Utc::now()).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn upsert_creates_a_pending_row(pool: PgPool) {
        ensure_user(&pool, WALLET).await.unwrap();
        ensure_user(&pool, WALLET).await.unwrap();

        let row = upsert_submission(&pool, &valid(1, "https://a.vercel.app"), &on_conflict(ReviewMode::Manual))
            .await
            .unwrap()
            .unwrap();
        assert!(row.inserted);
        assert_eq!(row.submission.status(), SubmissionStatus::Pending);
        assert!(row.submission.reviewed_at.is_none());

        let found = find_submission(&pool, WALLET, 1).await.unwrap().unwrap();
        assert_eq!(found.id, row.submission.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn racing_first_submissions_share_one_row(pool: PgPool) {
        ensure_user(&pool, WALLET).await.unwrap();
        let plan = on_conflict(ReviewMode::Manual);

        let first = upsert_submission(&pool, &valid(3, "https://a.vercel.app"), &plan)
            .await
            .unwrap()
            .unwrap();
        let second = upsert_submission(&pool, &valid(3, "https://b.vercel.app"), &plan)
            .await
            .unwrap()
            .unwrap();

        assert!(first.inserted);
        assert!(!second.inserted);
        assert_eq!(second.submission.id, first.submission.id);
        assert_eq!(second.submission.vercel_url.as_deref(), Some("https://b.vercel.app"));
        assert_eq!(list_submissions(&pool, WALLET, Some(3)).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn conflicting_auto_accept_write_is_accepted(pool: PgPool) {
        ensure_user(&pool, WALLET).await.unwrap();
        let plan = on_conflict(ReviewMode::AutoAccept);

        upsert_submission(&pool, &valid(1, "https://a.vercel.app"), &plan)
            .await
            .unwrap();
        let second = upsert_submission(&pool, &valid(1, "https://a.vercel.app"), &plan)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.submission.status(), SubmissionStatus::Accepted);
        assert!(second.submission.reviewed_at.is_some());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn resubmit_clears_the_previous_review(pool: PgPool) {
        ensure_user(&pool, WALLET).await.unwrap();
        let created = upsert_submission(&pool, &valid(2, "https://a.vercel.app"), &on_conflict(ReviewMode::Manual))
            .await
            .unwrap()
            .unwrap()
            .submission;

        let rejected = record_review(&pool, created.id, SubmissionStatus::Rejected, Some("broken link"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rejected.reviewer_notes.as_deref(), Some("broken link"));
        assert!(rejected.reviewed_at.is_some());

        let plan = plan_resubmission(rejected.status(), ReviewMode::Manual, Utc::now()).unwrap();
        let updated = resubmit(
            &pool,
            created.id,
            &valid(2, "https://b.vercel.app"),
            plan.status,
            plan.reviewed_at,
            plan.reviewer_notes.as_deref(),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status(), SubmissionStatus::Pending);
        assert!(updated.reviewed_at.is_none());
        assert!(updated.reviewer_notes.is_none());
        assert!(updated.submitted_at >= created.submitted_at);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn accepted_rows_are_never_overwritten(pool: PgPool) {
        ensure_user(&pool, WALLET).await.unwrap();
        let created = upsert_submission(&pool, &valid(4, "https://a.vercel.app"), &on_conflict(ReviewMode::Manual))
            .await
            .unwrap()
            .unwrap()
            .submission;
        record_review(&pool, created.id, SubmissionStatus::Accepted, None)
            .await
            .unwrap()
            .unwrap();

        let resubmitted = resubmit(
            &pool,
            created.id,
            &valid(4, "https://b.vercel.app"),
            SubmissionStatus::Pending,
            None,
            None,
        )
        .await
        .unwrap();
        assert!(resubmitted.is_none());

        let upserted = upsert_submission(&pool, &valid(4, "https://b.vercel.app"), &on_conflict(ReviewMode::Manual))
            .await
            .unwrap();
        assert!(upserted.is_none());

        // A second review of a decided row changes nothing either.
        let reviewed = record_review(&pool, created.id, SubmissionStatus::Rejected, Some("late"))
            .await
            .unwrap();
        assert!(reviewed.is_none());

        let row = get_submission(&pool, created.id).await.unwrap().unwrap();
        assert_eq!(row.status(), SubmissionStatus::Accepted);
        assert_eq!(row.vercel_url.as_deref(), Some("https://a.vercel.app"));
        assert!(row.reviewer_notes.is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn list_is_newest_first(pool: PgPool) {
        ensure_user(&pool, WALLET).await.unwrap();
        let plan = on_conflict(ReviewMode::Manual);
        for chapter in 1..=3 {
            upsert_submission(&pool, &valid(chapter, "https://a.vercel.app"), &plan)
                .await
                .unwrap();
        }
        sqlx::query(
            "UPDATE submissions SET submitted_at = NOW() - make_interval(hours => chapter_id)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let chapters: Vec<i32> = list_submissions(&pool, WALLET, None)
            .await
            .unwrap()
            .iter()
            .map(|s| s.chapter_id)
            .collect();
        assert_eq!(chapters, vec![1, 2, 3]);
        assert!(get_progress(&pool, WALLET).await.unwrap().is_none());
    }
}
