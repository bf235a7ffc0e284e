use actix_web::{HttpResponse, web};
use revassign_server_models::{HealthResponse, ReadyResponse};

use crate::state::AppState;

#[allow(clippy::unused_async)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::default())
}

/// Ready once the store answers a ping within the store timeout.
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match state.service.ping().await {
        Ok(()) => HttpResponse::Ok().json(ReadyResponse { ready: true }),
        Err(e) => {
            log::warn!("Readiness check failed: {e}");
            HttpResponse::ServiceUnavailable().json(ReadyResponse { ready: false })
        }
    }
}
