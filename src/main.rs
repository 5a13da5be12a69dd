use clap::Parser;
use foodscope::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::Settings,
    db, Error, Result,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,foodscope=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Recommend {
            ingredients,
            tags,
            min_calories,
            max_calories,
        } => {
            foodscope::cli::commands::recommend(
                &settings.server_url(),
                ingredients,
                tags,
                min_calories,
                max_calories,
            )
            .await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting FoodScope recommendation server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);
    info!(
        "Snapshot cache: {:?}, unknown tags: {:?}",
        settings.recommender.cache_policy, settings.recommender.unknown_tag_policy
    );

    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    let state = AppState::new(pool, settings.clone());

    // Warm the snapshot so the first request does not pay for the fit
    match state.recommender.snapshot().await {
        Ok(snapshot) => info!(
            "Recipe snapshot ready: {} recipes, {} ingredient terms",
            snapshot.corpus.len(),
            snapshot.model.vocabulary_len()
        ),
        Err(e) => tracing::warn!("Could not preload recipe snapshot: {}", e.log_safe()),
    }

    let app = routes::create_router(state, &settings)?;

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("FoodScope Recommendation Server");
    println!("========================================");
    println!("Address: http://{addr}");
    println!("\nAPI Endpoints:");
    println!("  POST /api/recommend");
    println!("  GET  /api/tags");
    println!("  GET  /api/stats");
    println!("  POST /api/cache/invalidate");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed successfully");
    Ok(())
}
