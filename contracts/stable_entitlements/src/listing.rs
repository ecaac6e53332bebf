//! Listing lifecycle: draft → active → expired, boosts, and verification.

use crate::clock::{self, add_days};
use crate::entitlements::{can_activate_listing, can_boost};
use crate::state_machine::effective_features;
use crate::storage;
use crate::subscription::reconciled_seller;
use crate::types::{
    BoostWindow, DataKey, Error, HorseDetails, HorseListing, ListingBoostedEvent, ListingStatus,
    ListingUpdate, Seller, SweepReport, VerificationStatus, VerificationSubmission,
};
use soroban_sdk::{log, Address, Env, Map, String, Symbol, Vec};

pub fn do_create_listing(env: &Env, owner: Address, details: HorseDetails) -> Result<u32, Error> {
    owner.require_auth();
    if details.name.len() == 0 || details.price < 0 {
        return Err(Error::InvalidInput);
    }
    let now = clock::now(env);
    reconciled_seller(env, &owner, now)?;

    let id = storage::next_listing_id(env);
    let listing = HorseListing {
        id,
        seller: owner.clone(),
        details,
        status: ListingStatus::Draft,
        images: Vec::new(env),
        next_image_id: 0,
        verification_status: VerificationStatus::Unverified,
        verification: None,
        boost: BoostWindow {
            active: false,
            start: 0,
            end: 0,
        },
        created_at: now,
        activated_at: 0,
    };
    storage::save_listing(env, &listing);
    storage::index_listing(env, &owner, id);

    env.events()
        .publish((Symbol::new(env, "listing_created"), owner), id);
    Ok(id)
}

/// Loads a listing and checks that `owner` holds it.
pub fn owned_listing(env: &Env, owner: &Address, id: u32) -> Result<HorseListing, Error> {
    let listing = storage::load_listing(env, id)?;
    if &listing.seller != owner {
        return Err(Error::NotOwner);
    }
    Ok(listing)
}

pub fn do_update_listing(
    env: &Env,
    owner: Address,
    id: u32,
    update: ListingUpdate,
) -> Result<HorseListing, Error> {
    owner.require_auth();
    let mut listing = owned_listing(env, &owner, id)?;
    let d = &mut listing.details;

    if let Some(v) = update.name {
        if v.len() == 0 {
            return Err(Error::InvalidInput);
        }
        d.name = v;
    }
    if let Some(v) = update.breed {
        d.breed = v;
    }
    if let Some(v) = update.age {
        d.age = v;
    }
    if let Some(v) = update.gender {
        d.gender = v;
    }
    if let Some(v) = update.color {
        d.color = v;
    }
    if let Some(v) = update.price {
        if v < 0 {
            return Err(Error::InvalidInput);
        }
        d.price = v;
    }
    if let Some(v) = update.description {
        d.description = v;
    }
    if let Some(v) = update.location {
        d.location = v;
    }
    if let Some(v) = update.specifications {
        d.specifications = v;
    }

    storage::save_listing(env, &listing);
    Ok(listing)
}

/// Publishes a draft (or relists an expired listing) within the plan's listing cap.
pub fn do_activate_listing(env: &Env, owner: Address, id: u32) -> Result<(), Error> {
    owner.require_auth();
    let now = clock::now(env);
    let mut seller = reconciled_seller(env, &owner, now)?;
    let mut listing = owned_listing(env, &owner, id)?;
    if listing.status == ListingStatus::Active {
        return Ok(());
    }

    let features = effective_features(env, &seller.subscription);
    can_activate_listing(&features, seller.active_listings).require()?;

    listing.status = ListingStatus::Active;
    listing.activated_at = now;
    storage::save_listing(env, &listing);
    seller.active_listings = seller
        .active_listings
        .checked_add(1)
        .ok_or(Error::Overflow)?;
    storage::save_seller(env, &seller);

    env.events()
        .publish((Symbol::new(env, "listing_activated"), owner), id);
    Ok(())
}

pub fn do_get_listing(env: &Env, id: u32) -> Result<HorseListing, Error> {
    storage::load_listing(env, id)
}

pub fn do_listings_of(env: &Env, owner: Address) -> Vec<u32> {
    storage::seller_listings(env, &owner)
}

/// Starts a featured-listing boost for the plan's boost duration. A running
/// boost is never extended.
pub fn do_boost_listing(env: &Env, owner: Address, id: u32) -> Result<BoostWindow, Error> {
    owner.require_auth();
    let now = clock::now(env);
    let seller = reconciled_seller(env, &owner, now)?;
    let mut listing = owned_listing(env, &owner, id)?;

    let features = effective_features(env, &seller.subscription);
    can_boost(&features, &listing.boost, now).require()?;

    let end = add_days(now, features.featured_listing_boosts.duration_days)?;
    listing.boost = BoostWindow {
        active: true,
        start: now,
        end,
    };
    storage::save_listing(env, &listing);

    env.events().publish(
        (Symbol::new(env, "listing_boosted"), owner.clone()),
        ListingBoostedEvent {
            listing_id: id,
            seller: owner,
            start: now,
            end,
        },
    );
    Ok(listing.boost)
}

/// Names of the fields a listing still needs before it can be verified.
pub fn missing_fields(env: &Env, listing: &HorseListing) -> Vec<Symbol> {
    let d = &listing.details;
    let mut missing = Vec::new(env);
    let checks: [(&str, bool); 10] = [
        ("name", d.name.len() == 0),
        ("breed", d.breed.len() == 0),
        ("age", d.age == 0),
        ("gender", d.gender.len() == 0),
        ("color", d.color.len() == 0),
        ("price", d.price <= 0),
        ("description", d.description.len() == 0),
        ("location", d.location.len() == 0),
        ("specifications", d.specifications.len() == 0),
        ("images", listing.images.is_empty()),
    ];
    for (field, absent) in checks {
        if absent {
            missing.push_back(Symbol::new(env, field));
        }
    }
    missing
}

pub fn do_missing_verification_fields(env: &Env, id: u32) -> Result<Vec<Symbol>, Error> {
    let listing = storage::load_listing(env, id)?;
    Ok(missing_fields(env, &listing))
}

pub fn do_submit_for_verification(
    env: &Env,
    owner: Address,
    id: u32,
    documents: Vec<String>,
    notes: String,
) -> Result<(), Error> {
    owner.require_auth();
    let mut listing = owned_listing(env, &owner, id)?;

    if listing.verification_status == VerificationStatus::Pending {
        return Err(Error::AlreadyPending);
    }
    if !missing_fields(env, &listing).is_empty() {
        return Err(Error::MissingFields);
    }

    let now = clock::now(env);
    listing.verification_status = VerificationStatus::Pending;
    listing.verification = Some(VerificationSubmission {
        submitted_by: owner.clone(),
        submitted_at: now,
        documents,
        notes,
    });
    storage::save_listing(env, &listing);

    env.events()
        .publish((Symbol::new(env, "verification_submitted"), owner), id);
    Ok(())
}

pub fn review_verification(env: &Env, id: u32, approve: bool, notes: String) -> Result<(), Error> {
    let mut listing = storage::load_listing(env, id)?;
    if listing.verification_status != VerificationStatus::Pending {
        return Err(Error::InvalidStatusTransition);
    }
    listing.verification_status = if approve {
        VerificationStatus::Verified
    } else {
        VerificationStatus::Rejected
    };
    if let Some(mut submission) = listing.verification.clone() {
        submission.notes = notes;
        listing.verification = Some(submission);
    }
    storage::save_listing(env, &listing);

    env.events().publish(
        (Symbol::new(env, "verification_reviewed"), listing.seller),
        (id, approve),
    );
    Ok(())
}

/// Age is measured from activation; the allowed age comes from the seller's
/// plan as reconciled at sweep time, so a later upgrade extends old listings.
pub fn is_overdue(listing: &HorseListing, listing_duration_days: u32, now: u64) -> Result<bool, Error> {
    let deadline = add_days(listing.activated_at, listing_duration_days)?;
    Ok(now > deadline)
}

/// Expires overdue listings with ids in `[start_id, start_id + limit)`.
///
/// Each seller is reconciled once per page and written back once with its
/// active-listing count reduced by the listings expired here.
pub fn sweep_expiry(env: &Env, start_id: u32, limit: u32, now: u64) -> Result<SweepReport, Error> {
    let bound = storage::id_bound(env, &DataKey::NextListingId);
    let end_id = start_id.saturating_add(limit).min(bound);

    let mut sellers: Map<Address, Seller> = Map::new(env);
    let mut expired_by: Map<Address, u32> = Map::new(env);
    let mut scanned = 0u32;
    let mut expired = 0u32;
    let mut id = start_id;
    while id < end_id {
        if let Ok(mut listing) = storage::load_listing(env, id) {
            scanned += 1;
            if listing.status == ListingStatus::Active {
                let owner = listing.seller.clone();
                let seller = match sellers.get(owner.clone()) {
                    Some(seller) => seller,
                    None => {
                        let seller = reconciled_seller(env, &owner, now)?;
                        sellers.set(owner.clone(), seller.clone());
                        seller
                    }
                };
                let days = effective_features(env, &seller.subscription).listing_duration_days;
                if is_overdue(&listing, days, now)? {
                    listing.status = ListingStatus::Expired;
                    storage::save_listing(env, &listing);
                    expired += 1;
                    let count = expired_by.get(owner.clone()).unwrap_or(0);
                    expired_by.set(owner.clone(), count + 1);
                    env.events()
                        .publish((Symbol::new(env, "listing_expired"), owner), id);
                }
            }
        }
        id += 1;
    }

    for (owner, count) in expired_by.iter() {
        if let Some(mut seller) = sellers.get(owner) {
            seller.active_listings = seller.active_listings.saturating_sub(count);
            storage::save_seller(env, &seller);
        }
    }

    log!(env, "expiry sweep: scanned={} expired={}", scanned, expired);
    Ok(SweepReport {
        scanned,
        expired,
        next_id: end_id.max(start_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DAY_SECONDS;
    use crate::types::HorseImage;
    use soroban_sdk::testutils::Address as _;

    fn listing(env: &Env) -> HorseListing {
        HorseListing {
            id: 0,
            seller: Address::generate(env),
            details: HorseDetails {
                name: String::from_str(env, "Midnight Comet"),
                breed: String::from_str(env, "Marwari"),
                age: 6,
                gender: String::from_str(env, "Mare"),
                color: String::from_str(env, "Bay"),
                price: 450_000,
                description: String::from_str(env, "Calm trail mare"),
                location: String::from_str(env, "Jodhpur"),
                specifications: String::from_str(env, "15.2hh"),
            },
            status: ListingStatus::Active,
            images: Vec::new(env),
            next_image_id: 0,
            verification_status: VerificationStatus::Unverified,
            verification: None,
            boost: BoostWindow {
                active: false,
                start: 0,
                end: 0,
            },
            created_at: 0,
            activated_at: 1_000,
        }
    }

    #[test]
    fn images_are_required_for_verification() {
        let env = Env::default();
        let mut l = listing(&env);
        let missing = missing_fields(&env, &l);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing.get(0), Some(Symbol::new(&env, "images")));

        l.images.push_back(HorseImage {
            id: 0,
            url: String::from_str(&env, "https://img/1.jpg"),
            public_id: String::from_str(&env, "h/1"),
            width: 800,
            height: 600,
            format: Symbol::new(&env, "jpg"),
        });
        assert!(missing_fields(&env, &l).is_empty());
    }

    #[test]
    fn every_blank_field_is_reported() {
        let env = Env::default();
        let mut l = listing(&env);
        l.details.breed = String::from_str(&env, "");
        l.details.age = 0;
        l.details.price = 0;
        let missing = missing_fields(&env, &l);
        assert!(missing.contains(Symbol::new(&env, "breed")));
        assert!(missing.contains(Symbol::new(&env, "age")));
        assert!(missing.contains(Symbol::new(&env, "price")));
        assert!(!missing.contains(Symbol::new(&env, "name")));
    }

    #[test]
    fn overdue_after_duration() {
        let env = Env::default();
        let l = listing(&env);
        let deadline = 1_000 + 30 * DAY_SECONDS;
        assert_eq!(is_overdue(&l, 30, deadline), Ok(false));
        assert_eq!(is_overdue(&l, 30, deadline + 1), Ok(true));
        assert_eq!(is_overdue(&l, 90, deadline + 1), Ok(false));
    }
}
