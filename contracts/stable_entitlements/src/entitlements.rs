//! Entitlement enforcer: plan quotas and feature gates.
//!
//! The `can_*` functions are pure over a feature bundle and current usage.
//! Callers must pass the bundle of a reconciled subscription
//! ([`crate::state_machine::effective_features`] after
//! [`crate::state_machine::reconcile`]).

use crate::clock::{self, month_start};
use crate::state_machine::effective_features;
use crate::storage;
use crate::subscription::reconcile_in_memory;
use crate::types::{BoostWindow, DenyReason, Entitlement, Error, FeatureBundle};
use soroban_sdk::{Address, Env};

pub fn can_add_photos(features: &FeatureBundle, existing: u32, to_add: u32) -> Entitlement {
    let limit = features.max_photos;
    if existing.saturating_add(to_add) <= limit {
        Entitlement::allow(limit, existing)
    } else {
        Entitlement::deny(DenyReason::QuotaExceeded, limit, existing)
    }
}

pub fn can_activate_listing(features: &FeatureBundle, active: u32) -> Entitlement {
    let limit = features.max_listings;
    if active < limit {
        Entitlement::allow(limit, active)
    } else {
        Entitlement::deny(DenyReason::QuotaExceeded, limit, active)
    }
}

pub fn can_boost(features: &FeatureBundle, boost: &BoostWindow, now: u64) -> Entitlement {
    let days = features.featured_listing_boosts.duration_days;
    if days == 0 {
        return Entitlement::deny(DenyReason::FeatureUnavailable, 0, 0);
    }
    if boost_running(boost, now) {
        return Entitlement::deny(DenyReason::AlreadyActive, days, 1);
    }
    Entitlement::allow(days, 0)
}

pub fn can_spotlight(features: &FeatureBundle, used_this_month: u32) -> Entitlement {
    let limit = features.homepage_spotlights_per_month;
    if limit == 0 || features.spotlight_duration_days == 0 {
        return Entitlement::deny(DenyReason::FeatureUnavailable, 0, used_this_month);
    }
    if used_this_month >= limit {
        return Entitlement::deny(DenyReason::QuotaExceeded, limit, used_this_month);
    }
    Entitlement::allow(limit, used_this_month)
}

pub fn boost_running(boost: &BoostWindow, now: u64) -> bool {
    boost.active && boost.end > now
}

/// Spotlights the seller started since the first of the current month,
/// cancelled ones included.
pub fn spotlights_this_month(env: &Env, owner: &Address, now: u64) -> u32 {
    storage::spotlights_in_month(env, owner, month_start(now))
}

fn current_features(env: &Env, owner: &Address, now: u64) -> Result<FeatureBundle, Error> {
    let seller = reconcile_in_memory(env, owner, now)?;
    Ok(effective_features(env, &seller.subscription))
}

// ── Read-only checks exposed to clients ─────────────────────────────────────

pub fn do_check_photos(
    env: &Env,
    owner: Address,
    listing_id: u32,
    count: u32,
) -> Result<Entitlement, Error> {
    let now = clock::now(env);
    let features = current_features(env, &owner, now)?;
    let listing = storage::load_listing(env, listing_id)?;
    if listing.seller != owner {
        return Err(Error::NotOwner);
    }
    Ok(can_add_photos(&features, listing.images.len(), count))
}

pub fn do_check_listing_activation(env: &Env, owner: Address) -> Result<Entitlement, Error> {
    let seller = reconcile_in_memory(env, &owner, clock::now(env))?;
    Ok(can_activate_listing(
        &effective_features(env, &seller.subscription),
        seller.active_listings,
    ))
}

pub fn do_check_boost(env: &Env, owner: Address, listing_id: u32) -> Result<Entitlement, Error> {
    let now = clock::now(env);
    let features = current_features(env, &owner, now)?;
    let listing = storage::load_listing(env, listing_id)?;
    if listing.seller != owner {
        return Err(Error::NotOwner);
    }
    Ok(can_boost(&features, &listing.boost, now))
}

pub fn do_check_spotlight(env: &Env, owner: Address) -> Result<Entitlement, Error> {
    let now = clock::now(env);
    let features = current_features(env, &owner, now)?;
    Ok(can_spotlight(
        &features,
        spotlights_this_month(env, &owner, now),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{baseline_features, PlanCatalog};
    use crate::types::Plan;

    fn bundle(env: &Env, plan: Plan) -> FeatureBundle {
        PlanCatalog::standard(env).features_for(plan).unwrap()
    }

    #[test]
    fn photo_quota_counts_existing_images() {
        let env = Env::default();
        let trot = bundle(&env, Plan::Trot);

        let denied = can_add_photos(&trot, 4, 2);
        assert!(!denied.allowed);
        assert_eq!(denied.reason, DenyReason::QuotaExceeded);
        assert_eq!(denied.limit, 5);
        assert_eq!(denied.require(), Err(Error::QuotaExceeded));

        assert!(can_add_photos(&trot, 4, 1).allowed);
        assert!(can_add_photos(&trot, 0, 5).allowed);
        assert!(!can_add_photos(&trot, 0, u32::MAX).allowed);
    }

    #[test]
    fn listing_cap_is_exclusive() {
        let env = Env::default();
        let trot = bundle(&env, Plan::Trot);
        assert!(can_activate_listing(&trot, 4).allowed);
        assert!(!can_activate_listing(&trot, 5).allowed);
        assert!(!can_activate_listing(&baseline_features(&env), 0).allowed);
    }

    #[test]
    fn trot_has_no_boosts() {
        let env = Env::default();
        let idle = BoostWindow {
            active: false,
            start: 0,
            end: 0,
        };
        let denied = can_boost(&bundle(&env, Plan::Trot), &idle, 100);
        assert_eq!(denied.reason, DenyReason::FeatureUnavailable);
        assert_eq!(denied.require(), Err(Error::FeatureUnavailable));
        assert!(can_boost(&bundle(&env, Plan::Gallop), &idle, 100).allowed);
    }

    #[test]
    fn running_boost_blocks_another() {
        let env = Env::default();
        let gallop = bundle(&env, Plan::Gallop);
        let running = BoostWindow {
            active: true,
            start: 0,
            end: 500,
        };
        assert_eq!(
            can_boost(&gallop, &running, 499).reason,
            DenyReason::AlreadyActive
        );
        assert!(can_boost(&gallop, &running, 500).allowed);
    }

    #[test]
    fn spotlight_cap_per_tier() {
        let env = Env::default();
        let gallop = bundle(&env, Plan::Gallop);
        assert!(can_spotlight(&gallop, 1).allowed);
        assert_eq!(can_spotlight(&gallop, 2).reason, DenyReason::QuotaExceeded);

        let rs = bundle(&env, Plan::RoyalStallion);
        assert!(can_spotlight(&rs, 4).allowed);
        assert!(!can_spotlight(&rs, 5).allowed);

        assert_eq!(
            can_spotlight(&bundle(&env, Plan::Trot), 0).reason,
            DenyReason::FeatureUnavailable
        );
    }
}
