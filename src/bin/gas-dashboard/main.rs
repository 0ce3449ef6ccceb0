mod args;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context as _, Result};
use args::Args;
use axum::{Json, Router, extract::State, routing::get};
use clap::Parser as _;
use gas_level::{
    config::Settings,
    dashboard::{DashboardView, build_dashboard},
    db::PgStore,
    gas::units,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct AppState {
    store: PgStore,
    settings: Settings,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let store = PgStore::connect_lazy(&args.database_url).context("invalid database URL")?;
    let state = Arc::new(AppState {
        store,
        settings: Settings::from(args.settings),
    });

    let app = Router::new()
        .route("/", get(dashboard))
        .with_state(state);

    let listener = TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!(listen = %args.listen, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("dashboard server failed")?;

    Ok(())
}

async fn dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(build_dashboard(&state.store, &state.settings, units::now()).await)
}
