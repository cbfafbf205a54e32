//! Stdio transport: line-delimited JSON-RPC on stdin/stdout.
//!
//! The AI host spawns the server as a child process and owns both pipes,
//! so there is exactly one caller and no session bookkeeping. All logging
//! goes to stderr; a single stray line on stdout would corrupt the framing.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::auth::AuthContext;
use crate::error::ServerError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RpcError};
use crate::server::McpServer;
use serde_json::Value;

/// Serve JSON-RPC on stdin/stdout until EOF. Every request runs as the
/// boot-configured identity.
pub async fn run(server: McpServer, ctx: AuthContext) -> Result<(), ServerError> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    info!("stdio transport ready");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => server.handle(request, &ctx).await,
            Err(e) => Some(JsonRpcResponse::error(
                Value::Null,
                RpcError::parse_error(e.to_string()),
            )),
        };

        if let Some(response) = response {
            match serde_json::to_string(&response) {
                Ok(payload) => {
                    stdout.write_all(payload.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                    stdout.flush().await?;
                }
                Err(e) => warn!("failed to serialize response: {e}"),
            }
        }
    }

    info!("stdin closed, stdio transport ended");
    Ok(())
}
