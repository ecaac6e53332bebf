//! Plan catalog: tier → price, validity window and feature bundle.
//!
//! Written to instance storage once by `init()` and never mutated afterwards.
//! Callers load it as a value and pass it into the state machine.

use crate::types::{
    BoostAllowance, CatalogEntry, DataKey, Error, FeatureBundle, Plan, SearchPlacement,
    VerificationLevel,
};
use soroban_sdk::{contracttype, Env, String, Vec};

/// Longest accepted plan name, in bytes.
const MAX_PLAN_NAME_LEN: usize = 32;

pub const PAID_PLAN_DAYS: u32 = 30;
pub const FREE_PLAN_DAYS: u32 = 7;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlanCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl PlanCatalog {
    /// The built-in tier table.
    pub fn standard(env: &Env) -> Self {
        let mut entries = Vec::new(env);
        entries.push_back(CatalogEntry {
            plan: Plan::RoyalStallion,
            name: plan_name(env, Plan::RoyalStallion),
            price: 499_900,
            duration_days: PAID_PLAN_DAYS,
            features: FeatureBundle {
                max_photos: 20,
                max_listings: 50,
                listing_duration_days: 90,
                verification_level: VerificationLevel::Premium,
                virtual_stable_tour: true,
                analytics: true,
                homepage_spotlights_per_month: 5,
                spotlight_duration_days: 7,
                featured_listing_boosts: BoostAllowance {
                    count: 5,
                    duration_days: 14,
                },
                priority_placement: true,
                badges: badges(env, &["Royal Stallion", "Verified Seller", "Premium Seller"]),
                search_placement: SearchPlacement::Premium,
                social_media_sharing: true,
                serious_buyer_access: true,
            },
        });
        entries.push_back(CatalogEntry {
            plan: Plan::Gallop,
            name: plan_name(env, Plan::Gallop),
            price: 299_900,
            duration_days: PAID_PLAN_DAYS,
            features: FeatureBundle {
                max_photos: 10,
                max_listings: 15,
                listing_duration_days: 60,
                verification_level: VerificationLevel::Premium,
                virtual_stable_tour: false,
                analytics: true,
                homepage_spotlights_per_month: 2,
                spotlight_duration_days: 5,
                featured_listing_boosts: BoostAllowance {
                    count: 2,
                    duration_days: 7,
                },
                priority_placement: false,
                badges: badges(env, &["Gallop Member", "Verified Seller"]),
                search_placement: SearchPlacement::Premium,
                social_media_sharing: true,
                serious_buyer_access: true,
            },
        });
        entries.push_back(CatalogEntry {
            plan: Plan::Trot,
            name: plan_name(env, Plan::Trot),
            price: 99_900,
            duration_days: PAID_PLAN_DAYS,
            features: FeatureBundle {
                max_photos: 5,
                max_listings: 5,
                listing_duration_days: 30,
                verification_level: VerificationLevel::Basic,
                virtual_stable_tour: false,
                analytics: false,
                homepage_spotlights_per_month: 0,
                spotlight_duration_days: 0,
                featured_listing_boosts: BoostAllowance {
                    count: 0,
                    duration_days: 0,
                },
                priority_placement: false,
                badges: badges(env, &["Trot Member"]),
                search_placement: SearchPlacement::Basic,
                social_media_sharing: false,
                serious_buyer_access: false,
            },
        });
        entries.push_back(CatalogEntry {
            plan: Plan::Free,
            name: plan_name(env, Plan::Free),
            price: 0,
            duration_days: FREE_PLAN_DAYS,
            features: FeatureBundle {
                max_photos: 3,
                max_listings: 1,
                listing_duration_days: 7,
                verification_level: VerificationLevel::None,
                virtual_stable_tour: false,
                analytics: false,
                homepage_spotlights_per_month: 0,
                spotlight_duration_days: 0,
                featured_listing_boosts: BoostAllowance {
                    count: 0,
                    duration_days: 0,
                },
                priority_placement: false,
                badges: badges(env, &["Free User"]),
                search_placement: SearchPlacement::None,
                social_media_sharing: false,
                serious_buyer_access: false,
            },
        });
        Self { entries }
    }

    pub fn load(env: &Env) -> Result<Self, Error> {
        env.storage()
            .instance()
            .get(&DataKey::Catalog)
            .ok_or(Error::NotInitialized)
    }

    pub fn entry(&self, plan: Plan) -> Result<CatalogEntry, Error> {
        self.entries
            .iter()
            .find(|e| e.plan == plan)
            .ok_or(Error::InvalidPlan)
    }

    /// Feature bundle for `plan`, as an owned snapshot.
    pub fn features_for(&self, plan: Plan) -> Result<FeatureBundle, Error> {
        Ok(self.entry(plan)?.features)
    }

    pub fn duration_days(&self, plan: Plan) -> Result<u32, Error> {
        Ok(self.entry(plan)?.duration_days)
    }
}

/// Entitlements left after a plan lapses with nothing queued.
pub fn baseline_features(env: &Env) -> FeatureBundle {
    FeatureBundle {
        verification_level: VerificationLevel::Basic,
        badges: badges(env, &["Free User"]),
        ..zeroed_features(env)
    }
}

/// Entitlements of a seller who holds no plan at all.
pub fn zeroed_features(env: &Env) -> FeatureBundle {
    FeatureBundle {
        max_photos: 0,
        max_listings: 0,
        listing_duration_days: 0,
        verification_level: VerificationLevel::None,
        virtual_stable_tour: false,
        analytics: false,
        homepage_spotlights_per_month: 0,
        spotlight_duration_days: 0,
        featured_listing_boosts: BoostAllowance {
            count: 0,
            duration_days: 0,
        },
        priority_placement: false,
        badges: Vec::new(env),
        search_placement: SearchPlacement::None,
        social_media_sharing: false,
        serious_buyer_access: false,
    }
}

/// Resolves a display name to its tier. "Starter" is the legacy name of Free.
pub fn parse_plan_name(name: &String) -> Result<Plan, Error> {
    let len = name.len() as usize;
    if len == 0 || len > MAX_PLAN_NAME_LEN {
        return Err(Error::InvalidPlan);
    }
    let mut buf = [0u8; MAX_PLAN_NAME_LEN];
    name.copy_into_slice(&mut buf[..len]);
    match &buf[..len] {
        b"Royal Stallion" => Ok(Plan::RoyalStallion),
        b"Gallop" => Ok(Plan::Gallop),
        b"Trot" => Ok(Plan::Trot),
        b"Free" | b"Starter" => Ok(Plan::Free),
        _ => Err(Error::InvalidPlan),
    }
}

pub fn plan_name(env: &Env, plan: Plan) -> String {
    let name = match plan {
        Plan::RoyalStallion => "Royal Stallion",
        Plan::Gallop => "Gallop",
        Plan::Trot => "Trot",
        Plan::Free => "Free",
    };
    String::from_str(env, name)
}

fn badges(env: &Env, names: &[&str]) -> Vec<String> {
    let mut out = Vec::new(env);
    for name in names {
        out.push_back(String::from_str(env, name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_tier_name() {
        let env = Env::default();
        let cases = [
            ("Royal Stallion", Plan::RoyalStallion),
            ("Gallop", Plan::Gallop),
            ("Trot", Plan::Trot),
            ("Free", Plan::Free),
            ("Starter", Plan::Free),
        ];
        for (name, plan) in cases {
            assert_eq!(parse_plan_name(&String::from_str(&env, name)), Ok(plan));
        }
    }

    #[test]
    fn rejects_unknown_and_oversized_names() {
        let env = Env::default();
        for name in ["", "Canter", "royal stallion", "Royal Stallion Royal Stallion Royal"] {
            assert_eq!(
                parse_plan_name(&String::from_str(&env, name)),
                Err(Error::InvalidPlan)
            );
        }
    }

    #[test]
    fn priorities_rank_tiers() {
        assert!(Plan::RoyalStallion.priority() > Plan::Gallop.priority());
        assert!(Plan::Gallop.priority() > Plan::Trot.priority());
        assert!(Plan::Trot.priority() > Plan::Free.priority());
    }

    #[test]
    fn free_tier_is_time_boxed() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        assert_eq!(catalog.duration_days(Plan::Free), Ok(FREE_PLAN_DAYS));
        assert_eq!(catalog.duration_days(Plan::Gallop), Ok(PAID_PLAN_DAYS));
        assert_eq!(catalog.entry(Plan::Free).unwrap().price, 0);
    }

    #[test]
    fn features_for_returns_an_independent_snapshot() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);

        let mut granted = catalog.features_for(Plan::Gallop).unwrap();
        granted.badges.push_back(String::from_str(&env, "Tampered"));
        granted.featured_listing_boosts.count = 99;

        let fresh = catalog.features_for(Plan::Gallop).unwrap();
        assert_eq!(fresh.badges.len(), 2);
        assert_eq!(fresh.featured_listing_boosts.count, 2);
        assert_ne!(fresh, granted);
    }

    #[test]
    fn spotlight_table_matches_tiers() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let rs = catalog.features_for(Plan::RoyalStallion).unwrap();
        let gallop = catalog.features_for(Plan::Gallop).unwrap();
        let trot = catalog.features_for(Plan::Trot).unwrap();
        assert_eq!((rs.homepage_spotlights_per_month, rs.spotlight_duration_days), (5, 7));
        assert_eq!((gallop.homepage_spotlights_per_month, gallop.spotlight_duration_days), (2, 5));
        assert_eq!(trot.spotlight_duration_days, 0);
    }

    #[test]
    fn baseline_keeps_free_user_badge() {
        let env = Env::default();
        let base = baseline_features(&env);
        assert_eq!(base.max_listings, 0);
        assert_eq!(base.verification_level, VerificationLevel::Basic);
        assert_eq!(base.badges.get(0), Some(String::from_str(&env, "Free User")));
    }
}
