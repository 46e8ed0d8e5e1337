//! Domain models for entitlement-core.

mod feature;
mod plan;
mod subscription;
mod usage;

pub use feature::{default_trial_allowlist, feature_label, features, FeatureInfo, FEATURE_REGISTRY};
pub use plan::{builtin_catalog, CatalogBuilder, FeatureRule, PlanBuilder, PlanCatalog, PlanRules};
pub use subscription::{SubscriptionState, SubscriptionStatus};
pub use usage::UsageSnapshot;
