//! Plan catalog model.

use crate::error::GatingError;
use crate::models::feature::features;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Availability of one feature under one plan.
///
/// `cap == None` means unlimited. The rule is meaningless when
/// `enabled == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRule {
    pub enabled: bool,
    #[serde(default)]
    pub cap: Option<u64>,
}

impl FeatureRule {
    /// Enabled with a usage cap.
    pub fn capped(cap: u64) -> Self {
        Self {
            enabled: true,
            cap: Some(cap),
        }
    }

    /// Enabled with no usage cap.
    pub fn unlimited() -> Self {
        Self {
            enabled: true,
            cap: None,
        }
    }

    /// Not offered under the plan.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            cap: None,
        }
    }
}

/// Feature rules for one plan, keyed by feature id.
pub type PlanRules = BTreeMap<String, FeatureRule>;

/// Immutable mapping from plan id to feature rules.
///
/// Loaded once at startup, either from a literal via [`PlanCatalog::builder`]
/// or from configuration via [`PlanCatalog::from_json_str`]. Both paths
/// validate the catalog; a malformed catalog is rejected at load time rather
/// than surfacing at read sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanCatalog {
    plans: BTreeMap<String, PlanRules>,
}

impl PlanCatalog {
    /// Start building a catalog literal.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder {
            plans: BTreeMap::new(),
        }
    }

    /// Load and validate a catalog from its JSON representation:
    /// `{ "starter": { "clients": { "enabled": true, "cap": 100 } } }`.
    ///
    /// A negative cap fails deserialization; caps are non-negative by
    /// construction from here on.
    pub fn from_json_str(json: &str) -> Result<Self, GatingError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Rule for `(plan_id, feature_id)`.
    ///
    /// `None` means the feature does not exist for that plan; callers treat
    /// that as disabled (fail closed).
    pub fn rule(&self, plan_id: &str, feature_id: &str) -> Option<&FeatureRule> {
        self.plans.get(plan_id)?.get(feature_id)
    }

    /// Whether the catalog knows the plan at all.
    pub fn has_plan(&self, plan_id: &str) -> bool {
        self.plans.contains_key(plan_id)
    }

    /// Iterate plans in stable (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlanRules)> {
        self.plans.iter().map(|(id, rules)| (id.as_str(), rules))
    }

    /// All plan ids in stable order.
    pub fn plan_ids(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }

    fn validate(&self) -> Result<(), GatingError> {
        if self.plans.is_empty() {
            return Err(GatingError::InvalidCatalog(
                "catalog contains no plans".to_string(),
            ));
        }
        for (plan_id, rules) in &self.plans {
            if plan_id.trim().is_empty() {
                return Err(GatingError::InvalidCatalog(
                    "empty plan id".to_string(),
                ));
            }
            for feature_id in rules.keys() {
                if feature_id.trim().is_empty() {
                    return Err(GatingError::InvalidCatalog(format!(
                        "plan '{}' has an empty feature id",
                        plan_id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builder for catalog literals.
pub struct CatalogBuilder {
    plans: BTreeMap<String, PlanRules>,
}

impl CatalogBuilder {
    /// Open a plan; finish it with [`PlanBuilder::done`].
    pub fn plan(self, plan_id: impl Into<String>) -> PlanBuilder {
        PlanBuilder {
            parent: self,
            plan_id: plan_id.into(),
            rules: BTreeMap::new(),
        }
    }

    /// Validate and finish the catalog.
    pub fn build(self) -> Result<PlanCatalog, GatingError> {
        let catalog = PlanCatalog { plans: self.plans };
        catalog.validate()?;
        Ok(catalog)
    }
}

/// Builder for one plan's rules.
pub struct PlanBuilder {
    parent: CatalogBuilder,
    plan_id: String,
    rules: PlanRules,
}

impl PlanBuilder {
    /// Feature enabled with a usage cap.
    pub fn capped(mut self, feature_id: impl Into<String>, cap: u64) -> Self {
        self.rules.insert(feature_id.into(), FeatureRule::capped(cap));
        self
    }

    /// Feature enabled with no cap.
    pub fn unlimited(mut self, feature_id: impl Into<String>) -> Self {
        self.rules.insert(feature_id.into(), FeatureRule::unlimited());
        self
    }

    /// Feature explicitly not offered. Equivalent to omitting it, but keeps
    /// the plan definition self-documenting.
    pub fn disabled(mut self, feature_id: impl Into<String>) -> Self {
        self.rules.insert(feature_id.into(), FeatureRule::disabled());
        self
    }

    /// Close the plan and return to the catalog builder.
    pub fn done(mut self) -> CatalogBuilder {
        self.parent.plans.insert(self.plan_id, self.rules);
        self.parent
    }
}

static BUILTIN_CATALOG: Lazy<PlanCatalog> = Lazy::new(|| {
    PlanCatalog::builder()
        .plan("starter")
        .capped(features::APPOINTMENTS, 200)
        .capped(features::CLIENTS, 100)
        .capped(features::STAFF, 3)
        .capped(features::INVOICING, 50)
        .capped(features::REPORTS, 10)
        .disabled(features::INVENTORY)
        .disabled(features::PAYROLL)
        .disabled(features::ACCOUNTING)
        .disabled(features::MESSAGING)
        .done()
        .plan("professional")
        .capped(features::APPOINTMENTS, 2000)
        .capped(features::CLIENTS, 1000)
        .capped(features::STAFF, 15)
        .unlimited(features::INVOICING)
        .unlimited(features::REPORTS)
        .unlimited(features::INVENTORY)
        .capped(features::MESSAGING, 500)
        .disabled(features::PAYROLL)
        .disabled(features::ACCOUNTING)
        .done()
        .plan("enterprise")
        .unlimited(features::APPOINTMENTS)
        .unlimited(features::CLIENTS)
        .unlimited(features::STAFF)
        .unlimited(features::INVOICING)
        .unlimited(features::REPORTS)
        .unlimited(features::INVENTORY)
        .unlimited(features::MESSAGING)
        .unlimited(features::PAYROLL)
        .unlimited(features::ACCOUNTING)
        .done()
        .build()
        .expect("builtin catalog is well-formed")
});

/// The built-in salon plan catalog (starter / professional / enterprise).
pub fn builtin_catalog() -> &'static PlanCatalog {
    &BUILTIN_CATALOG
}
