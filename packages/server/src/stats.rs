use actix_web::{HttpResponse, web};
use revassign_server_models::{
    PrStatsResponse, ReviewerStatsBody, ReviewerStatsResponse, StatsResponse, pr_stats_body,
};

use crate::error::ApiError;
use crate::state::AppState;

async fn reviewer_stats(state: &AppState) -> Result<Vec<ReviewerStatsBody>, ApiError> {
    Ok(state
        .service
        .users
        .reviewer_stats()
        .await?
        .into_iter()
        .map(ReviewerStatsBody::from)
        .collect())
}

/// `GET /stats`
///
/// # Errors
///
/// Returns an error if the store cannot be read
pub async fn all(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let reviewer_stats = reviewer_stats(&state).await?;
    let pr_stats = state.service.users.pull_request_stats().await?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        reviewer_stats,
        pr_stats: pr_stats_body(pr_stats),
    }))
}

/// `GET /stats/reviewers`
///
/// # Errors
///
/// Returns an error if the store cannot be read
pub async fn reviewers(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let reviewer_stats = reviewer_stats(&state).await?;

    Ok(HttpResponse::Ok().json(ReviewerStatsResponse {
        total_reviewers: reviewer_stats.len(),
        reviewer_stats,
    }))
}

/// `GET /stats/prs`
///
/// # Errors
///
/// Returns an error if the store cannot be read
pub async fn pull_requests(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = state.service.users.pull_request_stats().await?;

    Ok(HttpResponse::Ok().json(PrStatsResponse::from(stats)))
}
