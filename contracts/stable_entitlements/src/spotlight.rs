//! Homepage spotlights, limited per calendar month by plan.

use crate::clock::{self, add_days, month_start};
use crate::entitlements::{can_spotlight, spotlights_this_month};
use crate::listing::owned_listing;
use crate::state_machine::{current_plan, effective_features};
use crate::storage;
use crate::subscription::reconciled_seller;
use crate::types::{
    DataKey, Error, ListingStatus, Spotlight, SpotlightCreatedEvent, SpotlightStatus,
};
use soroban_sdk::{Address, Env, Symbol, Vec};

const MAX_PAGE: u32 = 100;

pub fn do_create_spotlight(env: &Env, owner: Address, listing_id: u32) -> Result<u32, Error> {
    owner.require_auth();
    let now = clock::now(env);
    let seller = reconciled_seller(env, &owner, now)?;
    let listing = owned_listing(env, &owner, listing_id)?;
    if listing.status != ListingStatus::Active {
        return Err(Error::InvalidInput);
    }

    let features = effective_features(env, &seller.subscription);
    can_spotlight(&features, spotlights_this_month(env, &owner, now)).require()?;
    let plan = current_plan(&seller.subscription).ok_or(Error::FeatureUnavailable)?;

    let id = storage::next_spotlight_id(env);
    let end_date = add_days(now, features.spotlight_duration_days)?;
    storage::save_spotlight(
        env,
        &Spotlight {
            id,
            listing_id,
            seller: owner.clone(),
            start_date: now,
            end_date,
            status: SpotlightStatus::Active,
            plan,
        },
    );
    storage::count_spotlight(env, &owner, month_start(now))?;

    env.events().publish(
        (Symbol::new(env, "spotlight_created"), owner.clone()),
        SpotlightCreatedEvent {
            spotlight_id: id,
            listing_id,
            seller: owner,
            end_date,
        },
    );
    Ok(id)
}

/// Ends a spotlight early. It still counts toward this month's quota.
pub fn do_cancel_spotlight(env: &Env, owner: Address, id: u32) -> Result<(), Error> {
    owner.require_auth();
    let mut spotlight = storage::load_spotlight(env, id)?;
    if spotlight.seller != owner {
        return Err(Error::NotOwner);
    }
    if spotlight.status != SpotlightStatus::Active {
        return Err(Error::InvalidStatusTransition);
    }
    spotlight.status = SpotlightStatus::Cancelled;
    storage::save_spotlight(env, &spotlight);
    env.events()
        .publish((Symbol::new(env, "spotlight_cancelled"), owner), id);
    Ok(())
}

/// Loads a spotlight, reporting `Expired` once its window has passed.
pub fn do_get_spotlight(env: &Env, id: u32) -> Result<Spotlight, Error> {
    let mut spotlight = storage::load_spotlight(env, id)?;
    settle(&mut spotlight, clock::now(env));
    Ok(spotlight)
}

/// Running spotlights with ids in `[start_id, start_id + limit)`.
pub fn do_active_spotlights(env: &Env, start_id: u32, limit: u32) -> Result<Vec<Spotlight>, Error> {
    if limit == 0 || limit > MAX_PAGE {
        return Err(Error::InvalidLimit);
    }
    let now = clock::now(env);
    let end_id = start_id
        .saturating_add(limit)
        .min(storage::id_bound(env, &DataKey::NextSpotlightId));

    let mut out = Vec::new(env);
    let mut id = start_id;
    while id < end_id {
        if let Ok(mut spotlight) = storage::load_spotlight(env, id) {
            settle(&mut spotlight, now);
            if spotlight.status == SpotlightStatus::Active {
                out.push_back(spotlight);
            }
        }
        id += 1;
    }
    Ok(out)
}

fn settle(spotlight: &mut Spotlight, now: u64) {
    if spotlight.status == SpotlightStatus::Active && now >= spotlight.end_date {
        spotlight.status = SpotlightStatus::Expired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Plan;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn spotlight_expires_at_end_date() {
        let env = Env::default();
        let mut s = Spotlight {
            id: 0,
            listing_id: 0,
            seller: Address::generate(&env),
            start_date: 100,
            end_date: 200,
            status: SpotlightStatus::Active,
            plan: Plan::Gallop,
        };
        settle(&mut s, 199);
        assert_eq!(s.status, SpotlightStatus::Active);
        settle(&mut s, 200);
        assert_eq!(s.status, SpotlightStatus::Expired);

        s.status = SpotlightStatus::Cancelled;
        settle(&mut s, 500);
        assert_eq!(s.status, SpotlightStatus::Cancelled);
    }
}
