use actix_web::{HttpResponse, web};
use revassign_server_models::{TeamBody, TeamQuery, TeamResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// `POST /team/add`
///
/// # Errors
///
/// * `TEAM_EXISTS` if the team name is taken
/// * `INVALID_INPUT` for blank or repeated ids
pub async fn add(
    body: web::Json<TeamBody>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let team_name = body.team_name.clone();

    let team = state
        .service
        .teams
        .create(&team_name, body.into_users())
        .await?;

    Ok(HttpResponse::Created().json(TeamResponse { team: team.into() }))
}

/// `GET /team/get?team_name=`
///
/// # Errors
///
/// * `NOT_FOUND` if the team is unknown
pub async fn get(
    query: web::Query<TeamQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let team = state.service.teams.get(&query.team_name).await?;

    Ok(HttpResponse::Ok().json(TeamBody::from(team)))
}
