//! Feature access resolution.
//!
//! [`resolve_access`] is the core of the gating model: a pure function from
//! catalog, subscription state and usage counts to a per-feature decision.
//! It performs no I/O and holds no state; the enforcement layer supplies the
//! inputs and acts on the output.

use crate::models::{PlanCatalog, SubscriptionState, SubscriptionStatus, UsageSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Access decision for one `(tenant, feature)` pair at one point in time.
///
/// Computed fresh on every query; never a source of truth. Must not be
/// cached across usage-changing operations without invalidation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureAccessDecision {
    /// Whether the feature is available at all.
    pub enabled: bool,
    /// Whether usage is uncapped.
    pub unlimited: bool,
    /// Current consumption. 0 when unlimited or disabled.
    pub usage: u64,
    /// The cap, when one applies.
    pub limit: Option<u64>,
    /// `limit - usage`, clamped to >= 0. Absent when unlimited or disabled.
    pub remaining: Option<u64>,
    /// Whether one more unit may be consumed. Implies `enabled`.
    pub can_consume: bool,
    /// Whether usage has reached 80% of the cap. Only meaningful when not
    /// unlimited.
    pub near_limit: bool,
}

impl FeatureAccessDecision {
    /// Feature not available: everything false and zero.
    pub fn disabled() -> Self {
        Self::default()
    }

    fn unlimited_access() -> Self {
        Self {
            enabled: true,
            unlimited: true,
            usage: 0,
            limit: None,
            remaining: None,
            can_consume: true,
            near_limit: false,
        }
    }

    fn capped(cap: u64, usage: u64) -> Self {
        let remaining = cap.saturating_sub(usage);
        Self {
            enabled: true,
            unlimited: false,
            usage,
            limit: Some(cap),
            remaining: Some(remaining),
            can_consume: remaining > 0,
            // usage >= 0.8 * cap, in integer arithmetic
            near_limit: (usage as u128) * 5 >= (cap as u128) * 4,
        }
    }
}

/// Resolve access to `feature_id` for the tenant described by
/// `subscription` and `usage`.
///
/// Decision rules:
/// - `past_due` and `canceled` subscriptions lose all gated features.
/// - A trial grants unlimited access to allowlisted features and nothing
///   else; a trial past its end date grants nothing.
/// - An active subscription is gated by the catalog rule for its plan. A
///   missing rule, a missing plan or an absent `plan_id` all resolve as
///   disabled.
/// - A rule with `cap == 0` resolves as enabled but never consumable;
///   callers must check `can_consume`, not `enabled`, before a create
///   action.
///
/// `now` only matters for trial expiry; passing it in keeps the function
/// pure.
///
/// # Panics
///
/// Panics if `feature_id` is empty. That is a programmer error, not a
/// runtime condition, and is deliberately not represented in the decision.
pub fn resolve_access(
    catalog: &PlanCatalog,
    trial_allowlist: &HashSet<String>,
    subscription: &SubscriptionState,
    usage: &UsageSnapshot,
    feature_id: &str,
    now: DateTime<Utc>,
) -> FeatureAccessDecision {
    assert!(!feature_id.is_empty(), "feature_id must not be empty");

    match subscription.status {
        SubscriptionStatus::PastDue | SubscriptionStatus::Canceled => {
            FeatureAccessDecision::disabled()
        }
        SubscriptionStatus::Trial => {
            if subscription.trial_expired(now) {
                return FeatureAccessDecision::disabled();
            }
            if trial_allowlist.contains(feature_id) {
                FeatureAccessDecision::unlimited_access()
            } else {
                FeatureAccessDecision::disabled()
            }
        }
        SubscriptionStatus::Active => {
            let Some(plan_id) = subscription.plan_id.as_deref() else {
                return FeatureAccessDecision::disabled();
            };
            let Some(rule) = catalog.rule(plan_id, feature_id) else {
                return FeatureAccessDecision::disabled();
            };
            if !rule.enabled {
                return FeatureAccessDecision::disabled();
            }
            match rule.cap {
                None => FeatureAccessDecision::unlimited_access(),
                Some(cap) => FeatureAccessDecision::capped(cap, usage.count(feature_id)),
            }
        }
    }
}
