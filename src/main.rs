use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use shatter_ice::config::Settings;
use shatter_ice::core::Matcher;
use shatter_ice::routes::{self, AppState};
use shatter_ice::services::{
    open_match_cache, CompatibilityService, HeuristicInterestScorer, InterestScorer, MemoizedScorer,
    PostgresClient, RemoteInterestScorer,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST);
        HttpResponse::build(status).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Shatter the Ice compatibility service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| startup_error("Configuration error", e))?;

    info!("Configuration loaded successfully");

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let db_min_conn = settings.database.min_connections.unwrap_or(1);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        Some(db_min_conn),
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| startup_error("PostgreSQL connection error", e))?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    // Initialize the persistent match cache
    let cache = open_match_cache(&settings.cache, Some(&postgres))
        .await
        .map_err(|e| startup_error("Match cache error", e))?;

    info!("Match cache initialized ({:?} backend)", settings.cache.backend);

    // Initialize the interest scorer, memoized in process
    let scorer: Arc<dyn InterestScorer> = match &settings.scorer.endpoint {
        Some(endpoint) => {
            let remote = RemoteInterestScorer::new(
                endpoint.clone(),
                settings.scorer.api_key.clone(),
                Duration::from_secs(settings.scorer.timeout_secs),
            )
            .map_err(|e| startup_error("Interest scorer error", e))?;

            info!("Remote interest scorer at {}", endpoint);
            Arc::new(MemoizedScorer::new(remote))
        }
        None => {
            info!("No scorer endpoint configured, using the local interest heuristic");
            Arc::new(MemoizedScorer::new(HeuristicInterestScorer))
        }
    };

    let policy = settings.matching.policy();
    let matcher = Matcher::new(policy);

    info!("Matcher initialized with policy: {:?}", policy);

    // Build application state
    let app_state = AppState {
        service: CompatibilityService::new(
            Arc::new(postgres.user_store()),
            cache,
            scorer,
            matcher,
        ),
        postgres: Some(postgres),
        max_limit: settings.matching.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
