//! # Custody-Chain Contract Runtime
//!
//! Hosts the custody transfer contract for one peer.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `CC_*` environment variables)
//! 2. Install logging on stderr; stdout carries responses only
//! 3. Load trust material from `CC_TRUST_DIR`
//! 4. Wire the contract, registry and event bus
//! 5. Start the audit log on the bus
//! 6. Serve invocations from stdin until it closes

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use contract_runtime::{
    load_trust_context, spawn_audit_log, ContractContainer, ContractHost, RuntimeConfig,
};
use shared_bus::EventFilter;

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to read configuration")?;
    init_logging(&config.logging.level)?;
    config.validate().context("Invalid configuration")?;

    info!("===========================================");
    info!("  Custody-Chain Contract Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(peer = %config.peer.organization, trust_dir = ?config.trust.dir, "Starting");

    let trust = load_trust_context(&config.trust.dir).with_context(|| {
        format!("Failed to load trust material from {}", config.trust.dir.display())
    })?;
    let container = Arc::new(ContractContainer::new(config, trust));
    let audit = spawn_audit_log(container.bus().subscribe(EventFilter::all()));
    let host = ContractHost::new(container);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let handled = host
        .serve(stdin, tokio::io::stdout())
        .await
        .context("Invocation stream failed")?;

    // Dropping the host drops the bus, which ends the audit stream.
    drop(host);
    let audited = audit.await.context("Audit log task failed")?;

    info!(handled, audited, "Shutdown complete");
    Ok(())
}
