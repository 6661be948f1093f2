use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::challenge::SubmissionStatus;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: i32,
    pub wallet_address: String,
    pub chapter_id: i32,
    pub vercel_url: Option<String>,
    pub suiscan_url: Option<String>,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: Option<String>,
}

impl Submission {
    /// The table's CHECK constraint keeps `status` to the three known values.
    pub fn status(&self) -> SubmissionStatus {
        SubmissionStatus::parse(&self.status).unwrap_or(SubmissionStatus::Pending)
    }
}

/// A submission row plus whether the upsert created it.
#[derive(Debug, FromRow)]
pub struct UpsertedSubmission {
    #[sqlx(flatten)]
    pub submission: Submission,
    pub inserted: bool,
}

#[derive(Debug, FromRow, Serialize, Deserialize)]
pub struct UserProgress {
    pub wallet_address: String,
    pub progress: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
