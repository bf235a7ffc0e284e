use actix_web::{HttpResponse, web};
use revassign_server_models::{
    PrShortBody, ReviewsResponse, SetActiveRequest, UserQuery, UserResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /users/setIsActive`
///
/// # Errors
///
/// * `NOT_FOUND` if the user is unknown
pub async fn set_is_active(
    body: web::Json<SetActiveRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .service
        .users
        .set_active(&body.user_id, body.is_active)
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse { user: user.into() }))
}

/// `GET /users/getReview?user_id=`
///
/// # Errors
///
/// * `INVALID_INPUT` if the id is blank
pub async fn get_review(
    query: web::Query<UserQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let UserQuery { user_id } = query.into_inner();
    let pull_requests = state
        .service
        .pull_requests
        .reviews_for_user(&user_id)
        .await?
        .into_iter()
        .map(PrShortBody::from)
        .collect();

    Ok(HttpResponse::Ok().json(ReviewsResponse {
        user_id,
        pull_requests,
    }))
}
