use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{get, http::header, web, App, HttpResponse, HttpServer, Responder};
use tracing::{error, info};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ledger_be::config::AppConfig;
use ledger_be::errors::AppError;
use ledger_be::store::Store;
use ledger_be::{analytics, entry, export, openapi};

/// Health check endpoint that verifies database connectivity
#[get("/health")]
async fn health_check(store: web::Data<Store>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(store.pool()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("{e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store = Store::connect(&config).await.map_err(|e| {
        error!("Failed to create pool: {e}");
        std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
    })?;
    store.migrate().await.map_err(|e| {
        error!("Migration failed: {e}");
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    // Export disables pagination, so it gets its own rate limit
    let export_governor_config = GovernorConfigBuilder::default()
        .seconds_per_request(config.export_rate_limit.seconds_per_request)
        .burst_size(config.export_rate_limit.burst_size)
        .finish()
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "invalid export rate limit configuration",
            )
        })?;

    let allowed_origins = config.cors_allowed_origins.clone();
    let bind_addr = (config.host.clone(), config.port);

    info!("Starting server at http://{}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        // Clone allowed_origins for this closure invocation
        let allowed_origins = allowed_origins.clone();

        // Configure CORS
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                let origin_str = origin.to_str().unwrap_or("");
                allowed_origins
                    .split(',')
                    .any(|allowed| allowed.trim() == origin_str)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            // Middleware (order matters: outer to inner)
            .wrap(TracingLogger::default())
            .wrap(cors)
            // Shared state
            .app_data(web::Data::new(store.clone()))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(err.to_string()).into()
            }))
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
            )
            // Health endpoint (no rate limiting)
            .service(health_check)
            // Entry endpoints
            .service(entry::list_entries)
            .service(entry::create_entry)
            .service(entry::get_entry)
            .service(entry::replace_entry)
            .service(entry::delete_entry)
            // Analytics endpoints
            .service(analytics::get_analytics)
            // Export endpoints with rate limiting
            .service(
                web::scope("")
                    .wrap(Governor::new(&export_governor_config))
                    .service(export::export_csv),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
