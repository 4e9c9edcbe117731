use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use job_scout::cli::{Cli, Command};
use job_scout::config::{AppConfig, LoggingConfig};
use job_scout::web::{AppState, create_router};
use job_scout::SearchService;

fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("job_scout={},tower_http=info", logging.level)))
        .context("invalid log filter")?;

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &logging.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::from_env(),
    }
    .context("failed to load configuration")?;

    let _guard = init_tracing(&config.logging)?;

    let command = cli.resolved_command();
    if let Some(request) = command.search_request() {
        let service = SearchService::from_config(&config)?;
        let response = service.search(&request).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Command::Serve { host, port } = command {
        if let Some(host) = host {
            config.server.host = host;
        }
        if let Some(port) = port {
            config.server.port = port;
        }
    }

    let metrics = if config.metrics.enabled {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .context("failed to install metrics recorder")?,
        )
    } else {
        None
    };

    info!("Starting job-scout v{}", env!("CARGO_PKG_VERSION"));
    let search = SearchService::from_config(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        search: Arc::new(search),
        config: Arc::new(config),
        metrics,
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
