use actix_web::{HttpResponse, web};
use revassign_server_models::{
    CreatePrRequest, MergePrRequest, PrResponse, ReassignRequest, ReassignResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /pullRequest/create`
///
/// # Errors
///
/// * `PR_EXISTS` if the id is taken
/// * `NOT_FOUND` if the author is unknown
pub async fn create(
    body: web::Json<CreatePrRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let pr = state
        .service
        .pull_requests
        .create(&body.pull_request_id, &body.pull_request_name, &body.author_id)
        .await?;

    Ok(HttpResponse::Created().json(PrResponse { pr: pr.into() }))
}

/// `POST /pullRequest/merge`, idempotent.
///
/// # Errors
///
/// * `NOT_FOUND` if the pull request is unknown
pub async fn merge(
    body: web::Json<MergePrRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let pr = state
        .service
        .pull_requests
        .merge(&body.pull_request_id)
        .await?;

    Ok(HttpResponse::Ok().json(PrResponse { pr: pr.into() }))
}

/// `POST /pullRequest/reassign`
///
/// # Errors
///
/// * `NOT_FOUND`, `PR_MERGED`, `NOT_ASSIGNED` or `NO_CANDIDATE`, first
///   failing check wins
pub async fn reassign(
    body: web::Json<ReassignRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let reassignment = state
        .service
        .pull_requests
        .reassign(&body.pull_request_id, &body.old_user_id)
        .await?;

    Ok(HttpResponse::Ok().json(ReassignResponse {
        pr: reassignment.pull_request.into(),
        replaced_by: reassignment.replaced_by,
    }))
}
