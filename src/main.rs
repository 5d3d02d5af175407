use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use moodmirror::config::Config;
use moodmirror::db::{self, JournalRepository, MemoryJournalRepository, PgJournalRepository};
use moodmirror::routes::build_router;
use moodmirror::services::{AnalysisService, OpenAiAnalyzer};
use moodmirror::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodmirror=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env().expect("Invalid configuration"));

    // Journal storage
    let journal: Arc<dyn JournalRepository> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url)
                .await
                .expect("Failed to create database pool");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");

            tracing::info!("Database migrations applied");
            Arc::new(PgJournalRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, journal entries are kept in memory");
            Arc::new(MemoryJournalRepository::new())
        }
    };

    // Analysis provider
    let analyzer: Option<Arc<dyn AnalysisService>> = match &config.openai_api_key {
        Some(key) => {
            let analyzer = OpenAiAnalyzer::new(
                config.openai_base_url.clone(),
                key.clone(),
                config.openai_model.clone(),
            )
            .expect("Failed to build OpenAI client");
            tracing::info!(model = %config.openai_model, "OpenAI analyzer configured");
            Some(Arc::new(analyzer))
        }
        None => {
            tracing::warn!("OPENAI_API_KEY not set, /api/analyze will report the service as unconfigured");
            None
        }
    };

    let state = AppState::new(journal, analyzer, config.clone());

    // Purge idle rate limit windows
    let limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    let app = build_router(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    // Client IP is needed for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
