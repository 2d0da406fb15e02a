mod cli;
mod controller;
mod hub;
mod ipc;
mod protocol;
mod store;

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use trellis_common::TrellisError;
use trellis_config::config_to_json;
use trellis_windows::{DetachedLauncher, ProcessLauncher, SurfaceLauncher};

use crate::controller::Controller;

const DEFAULT_DIRECTIVE: &str = "trellis=info";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "trellis exited with error");
        eprintln!("trellis: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), TrellisError> {
    // Load .env before anything reads the environment
    trellis_config::load_dotenv(Path::new(".env"));

    let args = cli::parse();

    let loaded = trellis_config::load_config(args.config.as_deref()).map(|mut loaded| {
        args.apply_overrides(&mut loaded.config);
        loaded
    });

    if args.print_config {
        println!("{}", config_to_json(&loaded?.config));
        return Ok(());
    }

    let directive = match (&args.log_level, &loaded) {
        (Some(level), _) => level.as_str(),
        (None, Ok(loaded)) => loaded.config.logging.level.directive(),
        (None, Err(_)) => DEFAULT_DIRECTIVE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(
            directive.parse().unwrap_or_else(|_| {
                DEFAULT_DIRECTIVE
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into())
            }),
        ))
        .init();

    // A config that fails to load stops startup; there is no fallback.
    let loaded = loaded?;
    info!(
        source = %loaded.source,
        env_overrides = loaded.env_applied,
        "config loaded"
    );
    let config = loaded.config;

    info!(version = env!("CARGO_PKG_VERSION"), "trellis starting");

    let listener = TcpListener::bind(config.ipc.bind_addr()).await?;

    let launcher: Arc<dyn SurfaceLauncher> =
        match ProcessLauncher::from_config(&config.windows, &config.ipc) {
            Some(launcher) => Arc::new(launcher),
            None => {
                info!("no renderer configured; windows are tracked but not launched");
                Arc::new(DetachedLauncher)
            }
        };

    let controller = Controller::init(&config, launcher)?;
    let (dispatcher, mut task) = controller.spawn();
    let server = tokio::spawn(ipc::serve(listener, dispatcher.clone()));

    tokio::select! {
        result = &mut task => {
            if let Err(e) = result {
                error!(error = %e, "dispatcher task failed");
            }
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
            if let Err(e) = dispatcher.shutdown().await {
                warn!(error = %e, "dispatcher already stopped");
            }
            if let Err(e) = task.await {
                error!(error = %e, "dispatcher task failed");
            }
        }
    }

    server.abort();
    info!("trellis stopped");
    Ok(())
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
