//! Prometheus metrics for registry mutations.
//!
//! [`RegistryMetrics`] owns a dedicated [`Registry`] that the RPC
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

pub struct RegistryMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Mutations that committed, by action.
    pub mutations_accepted: IntCounterVec,
    /// Mutations refused, by action and error kind.
    pub mutations_rejected: IntCounterVec,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Entries in the activity log after the last accepted mutation.
    pub activity_log_length: IntGauge,
}

impl RegistryMetrics {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let mutations_accepted = IntCounterVec::new(
            Opts::new(
                "proofpass_mutations_accepted_total",
                "Registry mutations committed",
            ),
            &["action"],
        )?;
        registry.register(Box::new(mutations_accepted.clone()))?;

        let mutations_rejected = IntCounterVec::new(
            Opts::new(
                "proofpass_mutations_rejected_total",
                "Registry mutations refused",
            ),
            &["action", "kind"],
        )?;
        registry.register(Box::new(mutations_rejected.clone()))?;

        let activity_log_length = IntGauge::new(
            "proofpass_activity_log_length",
            "Entries in the activity log",
        )?;
        registry.register(Box::new(activity_log_length.clone()))?;

        Ok(Self {
            registry,
            mutations_accepted,
            mutations_rejected,
            activity_log_length,
        })
    }

    pub fn record_accepted(&self, action: &str) {
        self.mutations_accepted.with_label_values(&[action]).inc();
    }

    pub fn record_rejected(&self, action: &str, kind: &str) {
        self.mutations_rejected
            .with_label_values(&[action, kind])
            .inc();
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }
}
