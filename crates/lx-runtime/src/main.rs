//! `lx-runtime` binary.

use anyhow::Result;
use lx_runtime::container::load_config;
use lx_runtime::logging::init_logging;
use lx_runtime::LexRuntime;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config();
    init_logging(&config.logging)?;

    let runtime = LexRuntime::new(config).await?;
    runtime.start().await?;

    info!("LexChain is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
