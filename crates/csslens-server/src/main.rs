//! csslens: CSS extraction and design-token interpretation server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("CSSLENS_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn build_state() -> anyhow::Result<Arc<AppState>> {
    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = csslens_core::CssLensConfig::from_env(&data_dir)?;
    let state = AppState::new(config).map_err(|e| anyhow::anyhow!("Failed to initialize: {}", e))?;
    Ok(Arc::new(state))
}

/// Open `url` in a tab and print the reply of one relay action as JSON.
async fn run_once(action: &str, url: &str) -> anyhow::Result<bool> {
    let state = build_state()?;
    let tab = state
        .tabs
        .open(url)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let message = serde_json::json!({ "action": action, "tabId": tab.id });
    let reply = state.relay.handle_value(message).await;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(reply.ok)
}

fn print_help() {
    println!("csslens: CSS extraction and design-token interpretation");
    println!();
    println!("Usage: csslens [command]");
    println!();
    println!("Commands:");
    println!("  (none)               Start the server");
    println!("  extract <url>        Print the CSS snapshot of a page");
    println!("  tokens <url>         Derive and save design tokens for a page");
    println!("  structure <url>      Derive and save a structure analysis for a page");
    println!("  help                 Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        let action = match args[1].as_str() {
            "extract" => "extract",
            "tokens" => "extractTokens",
            "structure" => "analyzeStructure",
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'csslens help' for usage.", args[1]);
                std::process::exit(1);
            }
        };
        let Some(url) = args.get(2) else {
            eprintln!("Usage: csslens {} <url>", args[1]);
            std::process::exit(1);
        };
        let ok = run_once(action, url).await?;
        std::process::exit(if ok { 0 } else { 1 });
    }

    // Normal server startup
    let state = build_state()?;
    let port = state.config.port;

    // Build router
    let app = routes::build_router(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("csslens server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
