//! Metrics module for entitlement-core.
//! Provides Prometheus metrics for gate checks and per-tenant metering.

use prometheus::{
    opts, register_int_counter_vec, Encoder, IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Gate check counter (per-tenant metering)
pub static GATE_CHECKS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Gate denial counter (per-tenant metering)
pub static GATE_DENIALS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Near-limit warning counter
pub static NEAR_LIMIT_WARNINGS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup. Until then the `record_*`
/// functions are no-ops, so library consumers that do not scrape metrics
/// pay nothing.
pub fn init_metrics() {
    GATE_CHECKS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "gating_checks_total",
                "Total feature gate checks by tenant, feature and outcome"
            ),
            &["tenant_id", "feature", "outcome"]
        )
        .expect("Failed to register GATE_CHECKS_TOTAL")
    });

    GATE_DENIALS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "gating_denials_total",
                "Total feature gate denials by tenant, feature and reason"
            ),
            &["tenant_id", "feature", "reason"]
        )
        .expect("Failed to register GATE_DENIALS_TOTAL")
    });

    NEAR_LIMIT_WARNINGS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "gating_near_limit_warnings_total",
                "Total near-limit warnings surfaced by tenant and feature"
            ),
            &["tenant_id", "feature"]
        )
        .expect("Failed to register NEAR_LIMIT_WARNINGS_TOTAL")
    });
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a gate check outcome (`allowed` or `denied`).
pub fn record_gate_check(tenant_id: &str, feature: &str, outcome: &str) {
    if let Some(counter) = GATE_CHECKS_TOTAL.get() {
        counter.with_label_values(&[tenant_id, feature, outcome]).inc();
    }
}

/// Record a gate denial with its reason (`feature_disabled` or
/// `limit_reached`).
pub fn record_gate_denial(tenant_id: &str, feature: &str, reason: &str) {
    if let Some(counter) = GATE_DENIALS_TOTAL.get() {
        counter.with_label_values(&[tenant_id, feature, reason]).inc();
    }
}

/// Record a near-limit warning.
pub fn record_near_limit_warning(tenant_id: &str, feature: &str) {
    if let Some(counter) = NEAR_LIMIT_WARNINGS_TOTAL.get() {
        counter.with_label_values(&[tenant_id, feature]).inc();
    }
}
