//! Subscription state model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    /// Unknown statuses map to `Canceled` so a malformed upstream value
    /// denies access rather than granting it.
    pub fn from_string(s: &str) -> Self {
        match s {
            "trial" => SubscriptionStatus::Trial,
            "active" => SubscriptionStatus::Active,
            "past_due" => SubscriptionStatus::PastDue,
            _ => SubscriptionStatus::Canceled,
        }
    }
}

/// A tenant's subscription as supplied by the subscription source.
///
/// Read-only from the gating model's perspective; billing events mutate it
/// upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionState {
    pub plan_id: Option<String>,
    pub status: SubscriptionStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl SubscriptionState {
    /// Active on the given plan.
    pub fn active(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: Some(plan_id.into()),
            status: SubscriptionStatus::Active,
            trial_ends_at: None,
        }
    }

    /// Trialing until the given time, with no paid plan assigned.
    pub fn trial_until(trial_ends_at: DateTime<Utc>) -> Self {
        Self {
            plan_id: None,
            status: SubscriptionStatus::Trial,
            trial_ends_at: Some(trial_ends_at),
        }
    }

    /// Whether a trial has run out as of `now`. Always false outside trial
    /// status or when no end date is set.
    pub fn trial_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Trial
            && self.trial_ends_at.is_some_and(|ends| ends < now)
    }
}
