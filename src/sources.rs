//! Collaborator contracts for the enforcement layer.
//!
//! The gating model owns no data. Subscription state and usage counts come
//! from these two sources; production embeddings back them with whatever
//! store holds the tenant records, and tests use the in-memory variants.

use crate::models::{SubscriptionState, UsageSnapshot};
use async_trait::async_trait;
use uuid::Uuid;

/// Supplies a tenant's current subscription state.
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    /// `Ok(None)` means the tenant has no subscription record at all; the
    /// gate treats that as fully disabled.
    async fn subscription_state(&self, tenant_id: Uuid)
        -> anyhow::Result<Option<SubscriptionState>>;
}

/// Supplies a tenant's usage counts for the current period.
///
/// If strict caps are required, atomic increment-if-below-cap belongs in the
/// store behind this trait; the gate check alone cannot close the gap
/// between check and increment.
#[async_trait]
pub trait UsageSource: Send + Sync {
    async fn usage_snapshot(&self, tenant_id: Uuid) -> anyhow::Result<UsageSnapshot>;
}

/// In-memory sources for tests and single-process embeddings.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mutex-guarded map of tenant subscriptions.
    #[derive(Clone, Default)]
    pub struct InMemorySubscriptions {
        inner: Arc<RwLock<HashMap<Uuid, SubscriptionState>>>,
    }

    impl InMemorySubscriptions {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn set(&self, tenant_id: Uuid, state: SubscriptionState) {
            self.inner.write().await.insert(tenant_id, state);
        }

        pub async fn remove(&self, tenant_id: Uuid) {
            self.inner.write().await.remove(&tenant_id);
        }
    }

    #[async_trait]
    impl SubscriptionSource for InMemorySubscriptions {
        async fn subscription_state(
            &self,
            tenant_id: Uuid,
        ) -> anyhow::Result<Option<SubscriptionState>> {
            Ok(self.inner.read().await.get(&tenant_id).cloned())
        }
    }

    /// Mutex-guarded map of tenant usage snapshots.
    #[derive(Clone, Default)]
    pub struct InMemoryUsage {
        inner: Arc<RwLock<HashMap<Uuid, UsageSnapshot>>>,
    }

    impl InMemoryUsage {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn set_snapshot(&self, tenant_id: Uuid, snapshot: UsageSnapshot) {
            self.inner.write().await.insert(tenant_id, snapshot);
        }

        pub async fn set_count(&self, tenant_id: Uuid, feature_id: &str, count: i64) {
            self.inner
                .write()
                .await
                .entry(tenant_id)
                .or_default()
                .set(feature_id, count);
        }
    }

    #[async_trait]
    impl UsageSource for InMemoryUsage {
        async fn usage_snapshot(&self, tenant_id: Uuid) -> anyhow::Result<UsageSnapshot> {
            Ok(self
                .inner
                .read()
                .await
                .get(&tenant_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}
