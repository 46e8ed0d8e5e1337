//! Enforcement layer.
//!
//! [`FeatureGate`] turns resolver decisions into actionable gates for
//! calling code: `enforce` before the action that consumes a feature,
//! `warn_if_near_limit` to surface advisory warnings. The gate itself never
//! increments usage; that belongs to the gated action, which keeps this
//! layer side-effect-free beyond the check.

use crate::error::GatingError;
use crate::metrics::{record_gate_check, record_gate_denial, record_near_limit_warning};
use crate::models::{default_trial_allowlist, feature_label, PlanCatalog, UsageSnapshot};
use crate::resolver::{resolve_access, FeatureAccessDecision};
use crate::sources::{SubscriptionSource, UsageSource};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// The actionable next step attached to a denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UpgradeHint {
    /// The named plan would permit the blocked action.
    UpgradeTo { plan_id: String },
    /// No catalog plan permits it; route the tenant to support/sales.
    ContactSupport,
}

/// Why a gated action was denied. An expected business outcome, not an
/// error; the payload is suitable for direct display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    /// The feature is not offered under the tenant's subscription.
    FeatureDisabled {
        feature_id: String,
        label: String,
        upgrade: UpgradeHint,
    },
    /// The feature is offered but its cap is exhausted.
    LimitReached {
        feature_id: String,
        label: String,
        usage: u64,
        limit: u64,
        upgrade: UpgradeHint,
    },
}

impl DenialReason {
    pub fn feature_id(&self) -> &str {
        match self {
            DenialReason::FeatureDisabled { feature_id, .. } => feature_id,
            DenialReason::LimitReached { feature_id, .. } => feature_id,
        }
    }

    pub fn upgrade(&self) -> &UpgradeHint {
        match self {
            DenialReason::FeatureDisabled { upgrade, .. } => upgrade,
            DenialReason::LimitReached { upgrade, .. } => upgrade,
        }
    }

    fn metric_label(&self) -> &'static str {
        match self {
            DenialReason::FeatureDisabled { .. } => "feature_disabled",
            DenialReason::LimitReached { .. } => "limit_reached",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenialReason::FeatureDisabled { label, upgrade, .. } => {
                write!(f, "{} is not available on your current plan.", label)?;
                match upgrade {
                    UpgradeHint::UpgradeTo { plan_id } => {
                        write!(f, " Upgrade to the {} plan to unlock it.", plan_id)
                    }
                    UpgradeHint::ContactSupport => {
                        write!(f, " Contact support to enable it.")
                    }
                }
            }
            DenialReason::LimitReached {
                label,
                usage,
                limit,
                upgrade,
                ..
            } => {
                write!(f, "{} limit reached ({} of {}).", label, usage, limit)?;
                match upgrade {
                    UpgradeHint::UpgradeTo { plan_id } => {
                        write!(f, " Upgrade to the {} plan to raise the limit.", plan_id)
                    }
                    UpgradeHint::ContactSupport => {
                        write!(f, " Contact support to raise the limit.")
                    }
                }
            }
        }
    }
}

impl std::error::Error for DenialReason {}

/// Outcome of [`FeatureGate::enforce`] when the action may not proceed.
///
/// `Denied` is the expected business outcome; `Source` means a collaborator
/// failed and the caller should still deny the action (fail closed), since
/// a denial is retryable while over-granting is not.
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Denied(#[from] DenialReason),

    #[error(transparent)]
    Source(#[from] GatingError),
}

/// Advisory payload from [`FeatureGate::warn_if_near_limit`]. Never blocks
/// the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitWarning {
    pub feature_id: String,
    pub usage: u64,
    pub limit: u64,
}

/// Feature gate over a plan catalog and the two collaborator sources.
///
/// Stateless per call: every check fetches subscription state and usage
/// fresh and resolves from scratch. Concurrent checks are independent pure
/// evaluations; there is no compare-and-increment atomicity here (see
/// [`UsageSource`]).
pub struct FeatureGate<S, U> {
    catalog: PlanCatalog,
    trial_allowlist: HashSet<String>,
    subscriptions: S,
    usage: U,
}

impl<S, U> FeatureGate<S, U>
where
    S: SubscriptionSource,
    U: UsageSource,
{
    /// Create a gate with the default trial allowlist.
    pub fn new(catalog: PlanCatalog, subscriptions: S, usage: U) -> Self {
        Self {
            catalog,
            trial_allowlist: default_trial_allowlist(),
            subscriptions,
            usage,
        }
    }

    /// Replace the trial allowlist.
    pub fn with_trial_allowlist(mut self, allowlist: HashSet<String>) -> Self {
        self.trial_allowlist = allowlist;
        self
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    /// Resolve the access decision for `(tenant_id, feature_id)`.
    ///
    /// A tenant with no subscription record resolves as fully disabled
    /// rather than erroring; only collaborator failures surface as
    /// [`GatingError`].
    pub async fn decision(
        &self,
        tenant_id: Uuid,
        feature_id: &str,
    ) -> Result<FeatureAccessDecision, GatingError> {
        let subscription = self
            .subscriptions
            .subscription_state(tenant_id)
            .await
            .map_err(GatingError::SubscriptionSource)?;

        let Some(subscription) = subscription else {
            tracing::debug!(
                tenant_id = %tenant_id,
                feature = %feature_id,
                "No subscription record, resolving as disabled"
            );
            return Ok(FeatureAccessDecision::disabled());
        };

        let usage = if subscription.plan_id.is_some() {
            self.usage
                .usage_snapshot(tenant_id)
                .await
                .map_err(GatingError::UsageSource)?
        } else {
            UsageSnapshot::new()
        };

        Ok(resolve_access(
            &self.catalog,
            &self.trial_allowlist,
            &subscription,
            &usage,
            feature_id,
            Utc::now(),
        ))
    }

    /// Gate an action that would consume one unit of `feature_id`.
    ///
    /// On success the caller proceeds with the action and its own usage
    /// increment; the gate records nothing. On denial the reason carries
    /// the feature label, usage figures where applicable and an upgrade
    /// hint.
    pub async fn enforce(&self, tenant_id: Uuid, feature_id: &str) -> Result<(), GateError> {
        let decision = self.decision(tenant_id, feature_id).await?;
        let tenant = tenant_id.to_string();

        if decision.can_consume {
            tracing::debug!(
                tenant_id = %tenant_id,
                feature = %feature_id,
                usage = decision.usage,
                "Gate check passed"
            );
            record_gate_check(&tenant, feature_id, "allowed");
            return Ok(());
        }

        let reason = self.denial_reason(feature_id, &decision);
        tracing::info!(
            tenant_id = %tenant_id,
            feature = %feature_id,
            reason = reason.metric_label(),
            usage = decision.usage,
            limit = decision.limit,
            "Gate check denied"
        );
        record_gate_check(&tenant, feature_id, "denied");
        record_gate_denial(&tenant, feature_id, reason.metric_label());
        Err(GateError::Denied(reason))
    }

    /// Advisory warning when usage has reached 80% of the cap but the
    /// action is still permitted.
    pub async fn warn_if_near_limit(
        &self,
        tenant_id: Uuid,
        feature_id: &str,
    ) -> Result<Option<LimitWarning>, GatingError> {
        let decision = self.decision(tenant_id, feature_id).await?;
        if !(decision.near_limit && decision.can_consume) {
            return Ok(None);
        }

        let limit = decision.limit.unwrap_or(0);
        tracing::info!(
            tenant_id = %tenant_id,
            feature = %feature_id,
            usage = decision.usage,
            limit = limit,
            "Usage nearing plan limit"
        );
        record_near_limit_warning(&tenant_id.to_string(), feature_id);
        Ok(Some(LimitWarning {
            feature_id: feature_id.to_string(),
            usage: decision.usage,
            limit,
        }))
    }

    fn denial_reason(&self, feature_id: &str, decision: &FeatureAccessDecision) -> DenialReason {
        let label = feature_label(feature_id).to_string();
        if decision.enabled {
            let limit = decision.limit.unwrap_or(0);
            DenialReason::LimitReached {
                feature_id: feature_id.to_string(),
                label,
                usage: decision.usage,
                limit,
                upgrade: self.suggest_upgrade(feature_id, decision.usage.saturating_add(1)),
            }
        } else {
            DenialReason::FeatureDisabled {
                feature_id: feature_id.to_string(),
                label,
                upgrade: self.suggest_upgrade(feature_id, 1),
            }
        }
    }

    /// Smallest plan whose rule for `feature_id` admits `needed` units.
    /// "Smallest" means the lowest sufficient cap, with unlimited plans
    /// last; ties break on plan id to keep the hint deterministic.
    fn suggest_upgrade(&self, feature_id: &str, needed: u64) -> UpgradeHint {
        let mut best: Option<(Option<u64>, &str)> = None;
        for (plan_id, rules) in self.catalog.iter() {
            let Some(rule) = rules.get(feature_id) else {
                continue;
            };
            if !rule.enabled {
                continue;
            }
            if rule.cap.is_some_and(|cap| cap < needed) {
                continue;
            }
            let better = match (&best, rule.cap) {
                (None, _) => true,
                (Some((Some(best_cap), _)), Some(cap)) => cap < *best_cap,
                (Some((None, _)), Some(_)) => true,
                (Some(_), None) => false,
            };
            if better {
                best = Some((rule.cap, plan_id));
            }
        }
        match best {
            Some((_, plan_id)) => UpgradeHint::UpgradeTo {
                plan_id: plan_id.to_string(),
            },
            None => UpgradeHint::ContactSupport,
        }
    }
}
