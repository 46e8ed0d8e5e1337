//! Test helper module for entitlement-core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use entitlement_core::models::features;
use entitlement_core::sources::memory::{InMemorySubscriptions, InMemoryUsage};
use entitlement_core::{
    FeatureGate, PlanCatalog, SubscriptionSource, SubscriptionState, UsageSnapshot, UsageSource,
};
use std::collections::HashSet;
use uuid::Uuid;

pub const TEST_TENANT_ID: &str = "11111111-1111-1111-1111-111111111111";

pub fn test_tenant() -> Uuid {
    Uuid::parse_str(TEST_TENANT_ID).unwrap()
}

/// Catalog mirroring the spec scenarios: starter caps clients at 100,
/// enterprise is uncapped.
pub fn salon_catalog() -> PlanCatalog {
    PlanCatalog::builder()
        .plan("starter")
        .capped(features::CLIENTS, 100)
        .capped(features::APPOINTMENTS, 200)
        .capped(features::STAFF, 3)
        .disabled(features::PAYROLL)
        .done()
        .plan("professional")
        .capped(features::CLIENTS, 1000)
        .unlimited(features::APPOINTMENTS)
        .capped(features::STAFF, 15)
        .disabled(features::PAYROLL)
        .done()
        .plan("enterprise")
        .unlimited(features::CLIENTS)
        .unlimited(features::APPOINTMENTS)
        .unlimited(features::STAFF)
        .unlimited(features::PAYROLL)
        .done()
        .build()
        .expect("test catalog is well-formed")
}

pub fn trial_allowlist() -> HashSet<String> {
    [features::APPOINTMENTS, features::CLIENTS]
        .iter()
        .map(|id| id.to_string())
        .collect()
}

pub fn active_on(plan_id: &str) -> SubscriptionState {
    SubscriptionState::active(plan_id)
}

pub fn trial_with_days_left(days: i64) -> SubscriptionState {
    SubscriptionState::trial_until(Utc::now() + Duration::days(days))
}

pub fn usage_of(feature_id: &str, count: i64) -> UsageSnapshot {
    UsageSnapshot::from_counts([(feature_id, count)])
}

/// Gate plus handles to its in-memory sources.
pub struct TestGate {
    pub gate: FeatureGate<InMemorySubscriptions, InMemoryUsage>,
    pub subscriptions: InMemorySubscriptions,
    pub usage: InMemoryUsage,
}

/// Build a gate over the salon catalog with the test trial allowlist and
/// empty in-memory sources.
pub fn test_gate() -> TestGate {
    let subscriptions = InMemorySubscriptions::new();
    let usage = InMemoryUsage::new();
    let gate = FeatureGate::new(salon_catalog(), subscriptions.clone(), usage.clone())
        .with_trial_allowlist(trial_allowlist());
    TestGate {
        gate,
        subscriptions,
        usage,
    }
}

/// Subscription source that always fails, for fail-closed tests.
pub struct FailingSubscriptions;

#[async_trait]
impl SubscriptionSource for FailingSubscriptions {
    async fn subscription_state(
        &self,
        _tenant_id: Uuid,
    ) -> anyhow::Result<Option<SubscriptionState>> {
        Err(anyhow::anyhow!("subscription store offline"))
    }
}

/// Usage source that always fails, for fail-closed tests.
pub struct FailingUsage;

#[async_trait]
impl UsageSource for FailingUsage {
    async fn usage_snapshot(&self, _tenant_id: Uuid) -> anyhow::Result<UsageSnapshot> {
        Err(anyhow::anyhow!("usage store offline"))
    }
}
