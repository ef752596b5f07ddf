use bodyecho::api::{create_router, AppState};
use bodyecho::cli::{self, Cli, Commands};
use bodyecho::config::AppConfig;
use bodyecho::error::{BodyEchoError, Result};
use bodyecho::food::FoodSearchClient;
use bodyecho::ml::ModelRegistry;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    if let Some(dir) = &cli.models_dir {
        config.models.dir = dir.clone();
    }

    match &cli.command {
        None => {
            init_logging(&config.logging);
            run_server(config).await?;
        }
        Some(Commands::Serve { port }) => {
            init_logging(&config.logging);
            if let Some(port) = port {
                config.server.port = *port;
            }
            run_server(config).await?;
        }
        Some(Commands::Predict { input }) => {
            init_logging_simple();
            let registry = ModelRegistry::from_dir(&config.models.dir);
            cli::run_predict(&registry, input)?;
        }
        Some(Commands::Models) => {
            init_logging_simple();
            let registry = ModelRegistry::from_dir(&config.models.dir);
            cli::show_models(&registry)?;
        }
        Some(Commands::Search { query }) => {
            init_logging_simple();
            let client = FoodSearchClient::new(&config.food_search)?;
            cli::search_foods(&client, query).await?;
        }
    }

    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;

    info!(
        models_dir = %config.models.dir.display(),
        food_search_credentials = state.food_search.has_credentials(),
        "Starting bodyecho v{}",
        env!("CARGO_PKG_VERSION")
    );

    if config.models.preload {
        let registry = Arc::clone(&state.registry);
        tokio::task::spawn_blocking(move || registry.ensure_loaded())
            .await
            .map_err(|e| BodyEchoError::Internal(format!("model preload aborted: {}", e)))?;
        let loaded = state
            .registry
            .statuses()
            .values()
            .filter(|s| matches!(s, bodyecho::ml::ModelStatus::Loaded { .. }))
            .count();
        info!(loaded, total = bodyecho::risk::RiskCategory::ALL.len(), "Models preloaded");
    }

    let app = create_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
