//! Enforcement layer tests: gate outcomes, denial payloads, warnings and
//! fail-closed behavior.

mod common;

use common::{
    active_on, salon_catalog, test_gate, test_tenant, trial_allowlist, trial_with_days_left,
    FailingSubscriptions, FailingUsage,
};
use entitlement_core::models::features;
use entitlement_core::sources::memory::{InMemorySubscriptions, InMemoryUsage};
use entitlement_core::{
    DenialReason, FeatureGate, GateError, GatingError, SubscriptionState, SubscriptionStatus,
    UpgradeHint,
};

#[tokio::test]
async fn enforce_allows_under_cap() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 50).await;

    assert!(t.gate.enforce(tenant, features::CLIENTS).await.is_ok());
}

#[tokio::test]
async fn enforce_denies_at_cap_with_limit_reached() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 100).await;

    let err = t.gate.enforce(tenant, features::CLIENTS).await.unwrap_err();
    let GateError::Denied(reason) = err else {
        panic!("expected denial, got source error");
    };

    match &reason {
        DenialReason::LimitReached {
            label,
            usage,
            limit,
            upgrade,
            ..
        } => {
            assert_eq!(label, "Clients");
            assert_eq!(*usage, 100);
            assert_eq!(*limit, 100);
            // Professional's 1000-client cap is the smallest sufficient one.
            assert_eq!(
                upgrade,
                &UpgradeHint::UpgradeTo {
                    plan_id: "professional".to_string()
                }
            );
        }
        other => panic!("expected LimitReached, got {:?}", other),
    }

    let message = reason.to_string();
    assert!(message.contains("Clients limit reached (100 of 100)"));
    assert!(message.contains("professional"));
}

#[tokio::test]
async fn enforce_denies_disabled_feature_with_upgrade_hint() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;

    let err = t.gate.enforce(tenant, features::PAYROLL).await.unwrap_err();
    let GateError::Denied(reason) = err else {
        panic!("expected denial, got source error");
    };

    match &reason {
        DenialReason::FeatureDisabled { label, upgrade, .. } => {
            assert_eq!(label, "Payroll");
            // Only enterprise offers payroll in the test catalog.
            assert_eq!(
                upgrade,
                &UpgradeHint::UpgradeTo {
                    plan_id: "enterprise".to_string()
                }
            );
        }
        other => panic!("expected FeatureDisabled, got {:?}", other),
    }
}

#[tokio::test]
async fn enforce_suggests_contact_support_when_no_plan_offers_feature() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;

    // Messaging exists in the registry but no test-catalog plan offers it.
    let err = t.gate.enforce(tenant, features::MESSAGING).await.unwrap_err();
    let GateError::Denied(reason) = err else {
        panic!("expected denial, got source error");
    };
    assert_eq!(reason.upgrade(), &UpgradeHint::ContactSupport);
}

#[tokio::test]
async fn enforce_denies_tenant_without_subscription_record() {
    let t = test_gate();

    let err = t
        .gate
        .enforce(test_tenant(), features::CLIENTS)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GateError::Denied(DenialReason::FeatureDisabled { .. })
    ));
}

#[tokio::test]
async fn enforce_respects_trial_allowlist() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, trial_with_days_left(7)).await;

    assert!(t.gate.enforce(tenant, features::CLIENTS).await.is_ok());

    let err = t.gate.enforce(tenant, features::STAFF).await.unwrap_err();
    assert!(matches!(
        err,
        GateError::Denied(DenialReason::FeatureDisabled { .. })
    ));
}

#[tokio::test]
async fn enforce_denies_past_due_subscription() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions
        .set(
            tenant,
            SubscriptionState {
                plan_id: Some("enterprise".to_string()),
                status: SubscriptionStatus::PastDue,
                trial_ends_at: None,
            },
        )
        .await;

    let err = t.gate.enforce(tenant, features::CLIENTS).await.unwrap_err();
    assert!(matches!(err, GateError::Denied(_)));
}

#[tokio::test]
async fn enforce_propagates_subscription_source_failure() {
    let gate = FeatureGate::new(salon_catalog(), FailingSubscriptions, InMemoryUsage::new())
        .with_trial_allowlist(trial_allowlist());

    let err = gate
        .enforce(test_tenant(), features::CLIENTS)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GateError::Source(GatingError::SubscriptionSource(_))
    ));
}

#[tokio::test]
async fn enforce_propagates_usage_source_failure() {
    let subscriptions = InMemorySubscriptions::new();
    let tenant = test_tenant();
    subscriptions.set(tenant, active_on("starter")).await;

    let gate = FeatureGate::new(salon_catalog(), subscriptions, FailingUsage)
        .with_trial_allowlist(trial_allowlist());

    let err = gate.enforce(tenant, features::CLIENTS).await.unwrap_err();
    assert!(matches!(
        err,
        GateError::Source(GatingError::UsageSource(_))
    ));
}

#[tokio::test]
async fn warn_fires_at_eighty_percent_while_consumable() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 85).await;

    let warning = t
        .gate
        .warn_if_near_limit(tenant, features::CLIENTS)
        .await
        .unwrap()
        .expect("85 of 100 should warn");
    assert_eq!(warning.usage, 85);
    assert_eq!(warning.limit, 100);
}

#[tokio::test]
async fn warn_is_silent_under_eighty_percent() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 60).await;

    let warning = t
        .gate
        .warn_if_near_limit(tenant, features::CLIENTS)
        .await
        .unwrap();
    assert!(warning.is_none());
}

#[tokio::test]
async fn warn_is_silent_once_cap_is_exhausted() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 100).await;

    // Blocked actions get a denial from enforce, not an advisory warning.
    let warning = t
        .gate
        .warn_if_near_limit(tenant, features::CLIENTS)
        .await
        .unwrap();
    assert!(warning.is_none());
}

#[tokio::test]
async fn warn_never_fires_for_unlimited_features() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("enterprise")).await;
    t.usage.set_count(tenant, features::CLIENTS, 1_000_000).await;

    let warning = t
        .gate
        .warn_if_near_limit(tenant, features::CLIENTS)
        .await
        .unwrap();
    assert!(warning.is_none());
}

#[tokio::test]
async fn decision_is_fresh_after_usage_changes() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 99).await;

    let before = t.gate.decision(tenant, features::CLIENTS).await.unwrap();
    assert!(before.can_consume);

    t.usage.set_count(tenant, features::CLIENTS, 100).await;

    let after = t.gate.decision(tenant, features::CLIENTS).await.unwrap();
    assert!(!after.can_consume);
}

#[tokio::test]
async fn denial_reason_serializes_for_display() {
    let t = test_gate();
    let tenant = test_tenant();
    t.subscriptions.set(tenant, active_on("starter")).await;
    t.usage.set_count(tenant, features::CLIENTS, 100).await;

    let GateError::Denied(reason) = t.gate.enforce(tenant, features::CLIENTS).await.unwrap_err()
    else {
        panic!("expected denial");
    };

    let json = serde_json::to_value(&reason).unwrap();
    assert_eq!(json["reason"], "limit_reached");
    assert_eq!(json["usage"], 100);
    assert_eq!(json["limit"], 100);
    assert_eq!(json["upgrade"]["action"], "upgrade_to");
}
