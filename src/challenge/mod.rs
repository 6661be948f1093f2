//! Challenge submissions: input checks, status transitions and progress summaries.
//!
//! Everything here is pure; the route handlers feed it rows from `db` and write
//! back whatever it decides.

mod lifecycle;
mod progress;
mod validate;

pub use lifecycle::{plan_resubmission, plan_review, LifecycleError, Resubmission};
pub use progress::{summarize, UserStatus};
pub use validate::{check_wallet_address, SubmitChallengeRequest, ValidSubmission};

use serde::{Deserialize, Serialize};

use crate::config::{Config, ReviewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The knobs a deployment's ruleset turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionRules {
    pub mode: ReviewMode,
    pub max_chapter: i32,
    pub address_hex_len: usize,
}

impl SubmissionRules {
    pub fn for_mode(mode: ReviewMode) -> Self {
        Self {
            mode,
            max_chapter: mode.default_max_chapter(),
            address_hex_len: mode.address_hex_len(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_chapter: config.max_chapter,
            ..Self::for_mode(config.review_mode)
        }
    }
}
