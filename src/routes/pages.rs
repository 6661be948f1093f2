use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect},
};
use serde::Serialize;
use std::sync::Arc;
use tera::Context;

use crate::challenge::{check_wallet_address, summarize, UserStatus};
use crate::db::list_submissions;
use crate::lesson::{self, ChapterSummary};
use crate::state::AppState;
use crate::templates::render_template;

fn chapter_summaries() -> Vec<ChapterSummary> {
    lesson::chapters().iter().map(|c| c.summary()).collect()
}

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut ctx = Context::new();
    ctx.insert("chapters", &chapter_summaries());
    ctx.insert("review_mode", state.config.review_mode.as_str());
    render_template("index.html", &ctx)
}

#[derive(Debug, Serialize)]
pub struct Badge {
    pub id: u32,
    pub title: &'static str,
    pub state: &'static str,
}

/// One badge per lesson chapter; chapters without a submission show as locked.
pub fn badges(status: &UserStatus) -> Vec<Badge> {
    lesson::chapters()
        .iter()
        .map(|chapter| Badge {
            id: chapter.id,
            title: chapter.title,
            state: status
                .submissions
                .get(&(chapter.id as i32))
                .map(|s| s.status.as_str())
                .unwrap_or("locked"),
        })
        .collect()
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> impl IntoResponse {
    let rules = state.rules();
    let wallet = match check_wallet_address(Some(address.as_str()), "address", &rules) {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!("Dashboard requested for bad address: {}", e);
            return Redirect::to("/").into_response();
        }
    };

    let submissions = match list_submissions(state.pool.as_ref(), &wallet, None).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to load submissions for dashboard: {}", e);
            return Redirect::to("/").into_response();
        }
    };

    let status = summarize(&wallet, &submissions, rules.max_chapter, None);

    let mut ctx = Context::new();
    ctx.insert("status", &status);
    ctx.insert("badges", &badges(&status));
    render_template("dashboard.html", &ctx).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Submission;
    use chrono::Utc;

    #[test]
    fn badges_cover_every_chapter() {
        let row = Submission {
            id: 1,
            wallet_address: "0xabc".to_string(),
            chapter_id: 2,
            vercel_url: None,
            suiscan_url: None,
            status: "accepted".to_string(),
            submitted_at: Utc::now(),
            reviewed_at: Some(Utc::now()),
            reviewer_notes: None,
        };
        let status = summarize("0xabc", &[row], 6, None);
        let badges = badges(&status);
        assert_eq!(badges.len(), 6);
        assert_eq!(badges[0].state, "locked");
        assert_eq!(badges[1].state, "accepted");
    }

    #[test]
    fn dashboard_template_renders_badges() {
        let status = summarize("0xabc", &[], 6, None);
        let mut ctx = Context::new();
        ctx.insert("status", &status);
        ctx.insert("badges", &badges(&status));
        let Html(page) = render_template("dashboard.html", &ctx);
        assert!(page.contains("Garage of 0xabc"));
        assert!(page.contains("The Scrapyard: locked"));
    }
}
