use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use headline_archive::{HeadlineArchive, PgHeadlineStore, SeedOutcome, Seeder};
use headline_classifier::{
    ClaudeStanceClassifier, Normalizer, StanceClassifier, SuspiciousWordScanner,
    UnavailableClassifier,
};
use headline_common::Config;

mod error;
mod extract;
mod routes;

pub struct AppState {
    pub archive: Arc<HeadlineArchive>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("headline_api=info,headline_archive=info,headline_classifier=info,tower_http=info")
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Built once and shared by every request.
fn build_classifier(config: &Config) -> Arc<dyn StanceClassifier> {
    match config.anthropic_api_key {
        Some(ref key) => {
            info!(
                model = %config.classifier_model,
                labels = ?config.classifier_labels,
                "Using Claude stance classifier"
            );
            Arc::new(
                ClaudeStanceClassifier::new(
                    key,
                    &config.classifier_model,
                    config.classifier_labels.clone(),
                )
                .with_max_input_chars(config.classifier_max_input_chars),
            )
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; every headline will be archived as a classification error");
            Arc::new(UnavailableClassifier::new("no stance classifier configured"))
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn app(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/classify", post(routes::classify_headline))
        .route("/headlines", get(routes::list_headlines))
        .route(
            "/headlines/{id}",
            patch(routes::update_headline).delete(routes::delete_headline),
        )
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Method + path only, no query params
                .layer(
                    tower_http::trace::TraceLayer::new_for_http().make_span_with(
                        |request: &axum::http::Request<_>| {
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                path = %request.uri().path(),
                            )
                        },
                    ),
                )
                .layer(cors_layer(allowed_origins)),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    let store = PgHeadlineStore::new(pool);
    store.migrate().await?;
    info!("Migrations complete");

    let normalizer = Normalizer::new(SuspiciousWordScanner::default(), build_classifier(&config))
        .with_timeout(config.classifier_timeout);
    let archive = Arc::new(HeadlineArchive::new(normalizer, Arc::new(store)));

    // Runs to completion before the listener accepts anything.
    match Seeder::new(archive.clone())
        .seed(&config.seed_dataset_path)
        .await
    {
        SeedOutcome::Seeded(report) => info!(inserted = report.inserted, "Seeding finished"),
        SeedOutcome::Skipped { existing } => info!(existing, "Seeding skipped"),
        SeedOutcome::Failed(reason) => warn!(%reason, "Seeding failed, continuing startup"),
    }

    let state = Arc::new(AppState { archive });
    let app = app(state, &config.allowed_origins);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Headline API starting on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
