//! entitlement-core: feature gating and subscription limit enforcement for
//! multi-tenant salon operations.
//!
//! The library combines three inputs into per-feature access decisions:
//! a validated [`PlanCatalog`], a tenant's [`SubscriptionState`] and a
//! [`UsageSnapshot`] of current-period consumption. [`resolve_access`] is
//! the pure core; [`FeatureGate`] wraps it with the collaborator sources
//! and produces actionable outcomes with user-facing denial reasons.
//!
//! ```rust,ignore
//! use entitlement_core::{builtin_catalog, FeatureGate, GateError};
//!
//! let gate = FeatureGate::new(builtin_catalog().clone(), subscriptions, usage);
//! match gate.enforce(tenant_id, "clients").await {
//!     Ok(()) => { /* proceed, then increment the counter upstream */ }
//!     Err(GateError::Denied(reason)) => show_upgrade_prompt(reason),
//!     Err(GateError::Source(e)) => deny_and_report(e), // fail closed
//! }
//! ```

pub mod enforcement;
pub mod error;
pub mod metrics;
pub mod models;
pub mod resolver;
pub mod sources;

pub use enforcement::{DenialReason, FeatureGate, GateError, LimitWarning, UpgradeHint};
pub use error::GatingError;
pub use models::{
    builtin_catalog, default_trial_allowlist, feature_label, features, FeatureInfo, FeatureRule,
    PlanCatalog, SubscriptionState, SubscriptionStatus, UsageSnapshot, FEATURE_REGISTRY,
};
pub use resolver::{resolve_access, FeatureAccessDecision};
pub use sources::{SubscriptionSource, UsageSource};
