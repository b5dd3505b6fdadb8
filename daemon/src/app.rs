//! Node startup: open storage, check it, wire the registry to the RPC server.

use std::sync::Arc;

use anyhow::{bail, Context};
use proofpass_registry::{RegistryMetrics, VerificationRegistry};
use proofpass_rpc::{RpcServer, RpcState};
use proofpass_store::MetaStore;
use proofpass_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment, Migrator};
use proofpass_types::{Address, SystemClock};

use crate::config::DaemonConfig;
use crate::shutdown::ShutdownController;

/// Headroom above the thirteen databases the registry opens.
const MAX_DBS: u32 = 16;

/// Meta key holding the owner the data directory was created for.
const OWNER_META_KEY: &str = "owner";

/// Run the daemon until SIGINT/SIGTERM or until the RPC server fails.
pub async fn run(config: DaemonConfig) -> anyhow::Result<()> {
    let registry_config = config.registry_config()?;

    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, MAX_DBS, config.map_size)
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?;
    Migrator::run(&env)?;

    let report = check_integrity(&env)?;
    if !report.is_healthy() {
        for error in &report.errors {
            tracing::error!(%error, "integrity check failed");
        }
        bail!(
            "data directory {} failed its integrity check ({} problems)",
            config.data_dir.display(),
            report.errors.len()
        );
    }
    tracing::info!(
        databases = report.databases_checked,
        entries = report.total_entries,
        "integrity check passed"
    );

    pin_owner(&env, &registry_config.owner)?;

    let metrics = if config.enable_metrics {
        Some(Arc::new(RegistryMetrics::new()?))
    } else {
        None
    };
    let mut registry =
        VerificationRegistry::new(Arc::new(env), Arc::new(SystemClock), registry_config)?;
    if let Some(metrics) = &metrics {
        registry = registry.with_metrics(Arc::clone(metrics));
    }
    tracing::info!(owner = %registry.owner(), "registry ready");

    let state = RpcState {
        registry: Arc::new(registry),
        metrics,
    };
    let shutdown = ShutdownController::new();
    let server = RpcServer::new(config.rpc_bind, state, config.cors_origins.clone());
    let serve = server.serve(shutdown.signalled());
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => {
            result?;
            return Ok(());
        }
        _ = shutdown.wait_for_signal() => {}
    }
    serve.await?;
    tracing::info!("daemon stopped");
    Ok(())
}

/// Record the owner on first start and refuse to run a data directory
/// under a different owner afterwards.
pub fn pin_owner(meta: &impl MetaStore, owner: &Address) -> anyhow::Result<()> {
    match meta.get_meta(OWNER_META_KEY)? {
        None => {
            meta.put_meta(OWNER_META_KEY, owner.as_bytes())?;
            tracing::info!(%owner, "pinned registry owner");
            Ok(())
        }
        Some(stored) if stored.as_slice() == owner.as_bytes() => Ok(()),
        Some(stored) => {
            let recorded = <[u8; 20]>::try_from(stored.as_slice())
                .map(|bytes| Address::new(bytes).to_string())
                .unwrap_or_else(|_| format!("<{} malformed bytes>", stored.len()));
            bail!("data directory belongs to owner {recorded}, not {owner}")
        }
    }
}
