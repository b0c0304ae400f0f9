// src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use docdot_backend::config::Config;
use docdot_backend::docstore::HttpProfileStore;
use docdot_backend::error::AppError;
use docdot_backend::models::question::CreateQuestionRequest;
use docdot_backend::routes;
use docdot_backend::services::openrouter::OpenRouter;
use docdot_backend::state::AppState;
use docdot_backend::storage::{PgStorage, Storage};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    let storage = PgStorage::new(pool);

    // Seed Question Bank
    if config.seed_sample_questions {
        if let Err(e) = seed_question_bank(&storage).await {
            tracing::error!("Failed to seed question bank: {:?}", e);
        }
    }

    let profiles = HttpProfileStore::new(config.docstore_url.clone())
        .expect("Failed to build profile store client");

    // Create AppState
    let state = AppState {
        storage: Arc::new(storage),
        profiles: Arc::new(profiles),
        tutor: OpenRouter::from_config(&config),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("docdot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

/// Inserts a handful of demo questions when the bank is empty, so a fresh
/// deployment has something to serve.
async fn seed_question_bank(storage: &dyn Storage) -> Result<(), AppError> {
    if !storage.distinct_categories().await?.is_empty() {
        return Ok(());
    }

    tracing::info!("Seeding sample questions...");

    let samples = [
        (
            "The left main bronchus is wider and more vertical than the right.",
            false,
            "It is the right main bronchus that is wider, shorter and more vertical, which is why aspirated foreign bodies lodge there more often.",
            "Anatomy",
            Some("Thorax"),
        ),
        (
            "The phrenic nerve arises from spinal segments C3-C5.",
            true,
            "C3, 4, 5 keep the diaphragm alive.",
            "Anatomy",
            Some("Thorax"),
        ),
        (
            "The ulnar nerve passes through the carpal tunnel.",
            false,
            "The ulnar nerve enters the hand through Guyon's canal, superficial to the flexor retinaculum.",
            "Anatomy",
            Some("Upper Limb"),
        ),
        (
            "Erythropoietin is produced mainly by the kidneys in adults.",
            true,
            "Peritubular interstitial cells of the renal cortex secrete most circulating erythropoietin.",
            "Physiology",
            Some("Blood"),
        ),
        (
            "Aldosterone increases sodium reabsorption in the distal nephron.",
            true,
            "Aldosterone upregulates ENaC and Na+/K+-ATPase in principal cells.",
            "Physiology",
            Some("Renal"),
        ),
        (
            "The resting membrane potential of a typical neuron is about +70 mV.",
            false,
            "The resting potential is approximately -70 mV, inside negative.",
            "Physiology",
            Some("Nerve and Muscle"),
        ),
    ];

    for (question, answer, explanation, category, subcategory) in samples {
        storage
            .create_question(CreateQuestionRequest {
                question: question.to_string(),
                answer,
                explanation: Some(explanation.to_string()),
                ai_explanation: None,
                references: None,
                category: category.to_string(),
                subcategory: subcategory.map(str::to_string),
            })
            .await?;
    }

    tracing::info!("Sample questions seeded.");
    Ok(())
}
