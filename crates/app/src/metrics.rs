//! Process-wide claim and issuance counters.

use std::sync::OnceLock;

use prometheus::{IntCounter, Opts, Registry};
use tracing::error;

#[derive(Debug)]
struct ClaimMetrics {
    registry: Registry,
    claimed_grants: IntCounter,
    issued_credentials: IntCounter,
}

static CLAIM_METRICS: OnceLock<Option<ClaimMetrics>> = OnceLock::new();

/// Count one successful claim registration.
pub fn record_claimed_grant() {
    if let Some(metrics) = metrics() {
        metrics.claimed_grants.inc();
    }
}

/// Count one successfully completed credential issuance.
pub fn record_issued_credentials() {
    if let Some(metrics) = metrics() {
        metrics.issued_credentials.inc();
    }
}

/// The registry holding the claim counters, for text exposition.
#[must_use]
pub fn registry() -> Option<&'static Registry> {
    metrics().map(|metrics| &metrics.registry)
}

fn metrics() -> Option<&'static ClaimMetrics> {
    CLAIM_METRICS.get_or_init(build_metrics).as_ref()
}

fn build_metrics() -> Option<ClaimMetrics> {
    let registry = Registry::new();

    let claimed_grants = match IntCounter::with_opts(Opts::new(
        "rewards_claimed_grants_total",
        "Total number of successfully registered claims.",
    )) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create claimed_grants metric: {source}");
            return None;
        }
    };

    let issued_credentials = match IntCounter::with_opts(Opts::new(
        "rewards_issued_credentials_total",
        "Total number of claims whose credentials were signed and stored.",
    )) {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create issued_credentials metric: {source}");
            return None;
        }
    };

    if let Err(source) = registry.register(Box::new(claimed_grants.clone())) {
        error!("failed to register claimed_grants metric: {source}");
        return None;
    }

    if let Err(source) = registry.register(Box::new(issued_credentials.clone())) {
        error!("failed to register issued_credentials metric: {source}");
        return None;
    }

    Some(ClaimMetrics {
        registry,
        claimed_grants,
        issued_credentials,
    })
}
