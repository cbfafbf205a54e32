use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use successco_mcp::auth::AuthContext;
use successco_mcp::config::Config;
use successco_mcp::graphql::GraphQlClient;
use successco_mcp::http::{build_router, AppState};
use successco_mcp::server::McpServer;
use successco_mcp::session::SessionManager;
use successco_mcp::tools::ToolRegistry;
use successco_mcp::transport::stdio;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("successco_mcp=info,tower_http=info"));

    // stdout belongs to the stdio transport; everything else goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Arc::new(Config::from_env()?);
    let registry = Arc::new(ToolRegistry::new());
    let api = Arc::new(
        GraphQlClient::new(config.graphql_url.clone())
            .context("failed to build upstream client")?,
    );
    let sessions = Arc::new(SessionManager::new());

    info!(
        transport = ?config.transport,
        tools = registry.len(),
        upstream = %config.graphql_url,
        "starting successco-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    // The transports are independent failure domains: a dead HTTP bind must
    // not take down a working stdio pipe, and vice versa.
    let mut http_task = None;
    if config.transport.includes_http() {
        let state = AppState {
            sessions: sessions.clone(),
            registry: registry.clone(),
            api: api.clone(),
            config: config.clone(),
        };
        let addr = config.addr()?;
        http_task = Some(tokio::spawn(async move {
            match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => {
                    info!(%addr, "http transport listening");
                    if let Err(e) = axum::serve(listener, build_router(state)).await {
                        error!("http transport failed: {e}");
                    }
                }
                Err(e) => {
                    error!(%addr, "HTTP transport disabled: failed to bind: {e}");
                }
            }
        }));
    }

    let mut stdio_task = None;
    if config.transport.includes_stdio() {
        let server = McpServer::new(registry.clone(), api.clone());
        let ctx = AuthContext::from_config(&config);
        stdio_task = Some(tokio::spawn(async move {
            if let Err(e) = stdio::run(server, ctx).await {
                error!("stdio transport failed: {e}");
            }
        }));
    }

    // Run until interrupted, or until the stdio pipe closes (the spawning
    // host going away is our shutdown signal in stdio mode).
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
        _ = async {
            match stdio_task {
                Some(task) => { let _ = task.await; }
                None => std::future::pending::<()>().await,
            }
        } => {
            info!("stdio transport finished, shutting down");
        }
    }

    if let Some(task) = http_task {
        task.abort();
    }
    Ok(())
}
