use mimalloc::MiMalloc;
use runguide_rs::{app, config, state};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runguide_rs=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();
    let state = state::AppState::new(config.clone());

    // Evict stale runs
    let eviction_state = state.clone();
    let eviction_ttl = config.session_ttl;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await; // Every 5 minutes
            eviction_state.evict_expired(eviction_ttl);
        }
    });

    let router = app(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("RunGuide-RS listening on {}", addr);
    tracing::info!(
        "Guidance: off-course at {} m, accuracy limit {} m",
        config.guidance.off_course_threshold_meters,
        config.guidance.min_acceptable_accuracy_meters
    );
    tracing::info!("Courses: POST http://{}/api/courses", addr);
    tracing::info!("Runs: POST http://{}/api/runs", addr);

    axum::serve(listener, router).await
}
