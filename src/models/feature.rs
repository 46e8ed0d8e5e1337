//! Master feature registry.
//!
//! Every gated feature has a stable string identifier and a display label
//! used in denial messages. Plan catalogs are validated against this
//! registry in tests.

use std::collections::HashSet;

/// Gated feature identifiers.
pub mod features {
    /// Appointment booking and calendar.
    pub const APPOINTMENTS: &str = "appointments";

    /// Client records.
    pub const CLIENTS: &str = "clients";

    /// Staff accounts.
    pub const STAFF: &str = "staff";

    /// Product and stock tracking.
    pub const INVENTORY: &str = "inventory";

    /// Invoice creation.
    pub const INVOICING: &str = "invoicing";

    /// Payroll and commissions.
    pub const PAYROLL: &str = "payroll";

    /// Chart of accounts and journals.
    pub const ACCOUNTING: &str = "accounting";

    /// Business reports.
    pub const REPORTS: &str = "reports";

    /// WhatsApp/SMS client messaging.
    pub const MESSAGING: &str = "messaging";
}

/// Metadata for one registered feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureInfo {
    pub id: &'static str,
    pub label: &'static str,
}

/// All features known to the gating model.
pub const FEATURE_REGISTRY: &[FeatureInfo] = &[
    FeatureInfo {
        id: features::APPOINTMENTS,
        label: "Appointments",
    },
    FeatureInfo {
        id: features::CLIENTS,
        label: "Clients",
    },
    FeatureInfo {
        id: features::STAFF,
        label: "Staff",
    },
    FeatureInfo {
        id: features::INVENTORY,
        label: "Inventory",
    },
    FeatureInfo {
        id: features::INVOICING,
        label: "Invoicing",
    },
    FeatureInfo {
        id: features::PAYROLL,
        label: "Payroll",
    },
    FeatureInfo {
        id: features::ACCOUNTING,
        label: "Accounting",
    },
    FeatureInfo {
        id: features::REPORTS,
        label: "Reports",
    },
    FeatureInfo {
        id: features::MESSAGING,
        label: "Messaging",
    },
];

/// Display label for a feature id. Unregistered ids fall back to the id
/// itself so denial messages stay usable.
pub fn feature_label(feature_id: &str) -> &str {
    FEATURE_REGISTRY
        .iter()
        .find(|f| f.id == feature_id)
        .map(|f| f.label)
        .unwrap_or(feature_id)
}

/// Features usable during a trial with no paid plan assigned.
pub fn default_trial_allowlist() -> HashSet<String> {
    [features::APPOINTMENTS, features::CLIENTS, features::INVOICING]
        .iter()
        .map(|id| id.to_string())
        .collect()
}
