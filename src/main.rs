//! Team File Host - team-scoped file storage and heatmap rendering.
//!
//! This binary starts the HTTP server and configures all components.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use team_file_host::{
    config::{CheckConfig, Cli, Command, HashTokenConfig, ServeConfig},
    heatmap::{HeatmapCompositor, MuscleGroup, BASE_ASSET, BUCKET_COUNT},
    server::{create_router, hash_token, AppState, RouterConfig, TokenGate},
    store::TeamFileStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::HashToken(config) => run_hash_token(config),
        Command::Check(config) => run_check(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let token_gate = match TokenGate::new(&config.token_hash) {
        Ok(gate) => gate,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Team File Host v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Files root: {}", config.files_root.display());
    info!("  Heatmap assets: {}", config.assets_dir.display());
    info!("  Allowed hosts: {}", config.allowed_hosts.join(", "));
    info!("  Max upload: {}MB", config.max_upload_bytes / (1024 * 1024));
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => warn!("  CORS: any origin"),
    }

    let heatmap = match HeatmapCompositor::load(&config.assets_dir) {
        Ok(compositor) => {
            let (width, height) = compositor.dimensions();
            info!("  Loaded heatmap assets ({}x{})", width, height);
            compositor
        }
        Err(e) => {
            error!("Failed to load heatmap assets: {}", e);
            error!("  Run `team-file-host check` to list missing files");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&config.files_root) {
        error!(
            "Failed to create files root {}: {}",
            config.files_root.display(),
            e
        );
        return ExitCode::FAILURE;
    }

    let state = AppState::new(TeamFileStore::new(&config.files_root), heatmap);
    let router = create_router(state, build_router_config(&config, token_gate));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl -H 'Host: localhost' http://{}/health", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "team_file_host=debug,tower_http=debug"
    } else {
        "team_file_host=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig, token_gate: TokenGate) -> RouterConfig {
    let mut router_config = RouterConfig::new(token_gate)
        .with_allowed_hosts(config.allowed_hosts.clone())
        .with_max_upload_bytes(config.max_upload_bytes);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Hash Token Command
// =============================================================================

fn run_hash_token(config: HashTokenConfig) -> ExitCode {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match hash_token(&config.token) {
        Ok(hash) => {
            println!("{}", hash);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Team File Host Configuration Check");
    println!("═══════════════════════════════════");
    println!();

    let missing = missing_assets(&config.assets_dir);
    if missing.is_empty() {
        println!("✓ Heatmap assets: {}", config.assets_dir.display());
    } else {
        println!(
            "✗ Heatmap assets: {} file(s) missing in {}",
            missing.len(),
            config.assets_dir.display()
        );
        for name in &missing {
            println!("    {}", name);
        }
        return ExitCode::FAILURE;
    }

    print!("Decoding heatmap assets... ");
    match HeatmapCompositor::load(&config.assets_dir) {
        Ok(compositor) => {
            let (width, height) = compositor.dimensions();
            println!("✓ {}x{}", width, height);
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match std::fs::create_dir_all(&config.files_root) {
        Ok(()) => println!("✓ Files root: {}", config.files_root.display()),
        Err(e) => {
            println!("✗ Files root: {} ({})", config.files_root.display(), e);
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("═══════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}

/// Names of expected heatmap assets absent from `dir`.
fn missing_assets(dir: &Path) -> Vec<String> {
    let expected = std::iter::once(BASE_ASSET.to_string()).chain(
        MuscleGroup::ALL
            .iter()
            .flat_map(|group| (0..BUCKET_COUNT).map(move |tier| group.asset_name(tier))),
    );

    expected.filter(|name| !dir.join(name).is_file()).collect()
}
