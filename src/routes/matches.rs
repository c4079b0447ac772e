use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    ClearCacheResponse, CompatibilityRequest, ErrorResponse, HealthResponse, MatchRequest,
    RecommendationsQuery, RecommendationsResponse,
};
use crate::services::{CompatibilityService, PostgresClient, ServiceError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CompatibilityService,
    /// Present when the service runs against PostgreSQL
    pub postgres: Option<PostgresClient>,
    /// Upper bound on the recommendations limit
    pub max_limit: usize,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/match", web::post().to(match_pair))
        .route("/recommendations/{user_id}", web::get().to(recommendations))
        .route("/compatibility", web::post().to(compatibility))
        .route("/admin/match-cache", web::delete().to(clear_match_cache));
}

/// Map a service error to its JSON error response
fn error_response(err: &ServiceError) -> HttpResponse {
    match err {
        ServiceError::UserNotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "User not found".to_string(),
            message: err.to_string(),
            status_code: 404,
        }),
        ServiceError::InvalidRequest(_) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid request".to_string(),
            message: err.to_string(),
            status_code: 400,
        }),
        ServiceError::Scorer(_) => HttpResponse::BadGateway().json(ErrorResponse {
            error: "Interest scoring failed".to_string(),
            message: err.to_string(),
            status_code: 502,
        }),
        ServiceError::Cache(_) | ServiceError::Store(_) => {
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Storage failure".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match &state.postgres {
        Some(postgres) => postgres.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Match endpoint
///
/// POST /api/v1/match
///
/// Request body:
/// ```json
/// {
///   "viewerId": "string",
///   "targetUserId": "string"
/// }
/// ```
async fn match_pair(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return validation_error(errors);
    }

    match state.service.evaluate_pair(&req.viewer_id, &req.target_user_id).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            tracing::error!("Failed to match {} -> {}: {}", req.viewer_id, req.target_user_id, e);
            error_response(&e)
        }
    }
}

/// Recommendations endpoint
///
/// GET /api/v1/recommendations/{userId}?limit=20
async fn recommendations(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RecommendationsQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    let user_id = path.into_inner();
    let limit = query.limit.map(|limit| limit.min(state.max_limit));

    match state.service.recommend(&user_id, limit).await {
        Ok(recommendations) => HttpResponse::Ok().json(RecommendationsResponse {
            total_results: recommendations.len(),
            recommendations,
        }),
        Err(e) => {
            tracing::error!("Failed to build recommendations for {}: {}", user_id, e);
            error_response(&e)
        }
    }
}

/// Stateless compatibility endpoint
///
/// POST /api/v1/compatibility
///
/// Request body:
/// ```json
/// {
///   "preferencesA": { "sleepSchedule": "early-riser" },
///   "preferencesB": { "sleepSchedule": "flexible" },
///   "interestScore": 72.5
/// }
/// ```
async fn compatibility(
    state: web::Data<AppState>,
    req: web::Json<CompatibilityRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let response = state.service.score_preferences(
        req.preferences_a.as_ref(),
        req.preferences_b.as_ref(),
        req.interest_score,
    );

    HttpResponse::Ok().json(response)
}

/// Operator endpoint: drop every cached interest match
///
/// DELETE /api/v1/admin/match-cache
async fn clear_match_cache(state: web::Data<AppState>) -> impl Responder {
    match state.service.clear_caches().await {
        Ok(cleared) => {
            tracing::info!("Match cache cleared ({} entries)", cleared);
            HttpResponse::Ok().json(ClearCacheResponse { cleared })
        }
        Err(e) => {
            tracing::error!("Failed to clear match cache: {}", e);
            error_response(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Matcher;
    use crate::services::{HeuristicInterestScorer, InMemoryUserStore, MatchCache, ScorerError};
    use actix_web::{http::StatusCode, test as actix_test, App};
    use std::sync::Arc;

    fn state() -> AppState {
        AppState {
            service: CompatibilityService::new(
                Arc::new(InMemoryUserStore::default()),
                MatchCache::in_memory(),
                Arc::new(HeuristicInterestScorer),
                Matcher::default(),
            ),
            postgres: None,
            max_limit: 100,
        }
    }

    #[test]
    fn test_error_status_codes() {
        let not_found = error_response(&ServiceError::UserNotFound("x".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let down = ScorerError::ApiError("down".to_string());
        let scorer = error_response(&ServiceError::Scorer(down));
        assert_eq!(scorer.status(), StatusCode::BAD_GATEWAY);

        let invalid = error_response(&ServiceError::InvalidRequest("same user".to_string()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_health_without_database() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.status, "healthy");
    }

    #[actix_web::test]
    async fn test_match_rejects_empty_ids() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(configure),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/match")
            .set_json(serde_json::json!({ "viewerId": "", "targetUserId": "bob" }))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
