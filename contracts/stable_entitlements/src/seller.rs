//! Seller registration and profile maintenance.

use crate::clock;
use crate::state_machine::inactive_subscription;
use crate::storage;
use crate::subscription::reconciled_seller;
use crate::types::{Error, ProfileUpdate, Seller, SellerProfile, SellerRegisteredEvent};
use soroban_sdk::{Address, Env, Symbol};

pub fn do_register_seller(
    env: &Env,
    owner: Address,
    profile: SellerProfile,
) -> Result<Seller, Error> {
    owner.require_auth();
    storage::config(env)?;

    if storage::has_seller(env, &owner) {
        return Err(Error::AlreadyRegistered);
    }
    if profile.business_name.len() == 0 {
        return Err(Error::InvalidInput);
    }

    let now = clock::now(env);
    let seller = Seller {
        owner: owner.clone(),
        profile,
        subscription: inactive_subscription(env),
        active_listings: 0,
        created_at: now,
    };
    storage::save_seller(env, &seller);

    env.events().publish(
        (Symbol::new(env, "seller_registered"),),
        SellerRegisteredEvent {
            seller: owner,
            timestamp: now,
        },
    );
    Ok(seller)
}

/// Applies only the fields present in `update`; the subscription is untouched.
pub fn do_update_profile(
    env: &Env,
    owner: Address,
    update: ProfileUpdate,
) -> Result<Seller, Error> {
    owner.require_auth();
    let mut seller = storage::load_seller(env, &owner)?;

    if let Some(name) = update.business_name {
        if name.len() == 0 {
            return Err(Error::InvalidInput);
        }
        seller.profile.business_name = name;
    }
    if let Some(location) = update.location {
        seller.profile.location = location;
    }
    if let Some(contact) = update.contact {
        seller.profile.contact = contact;
    }

    storage::save_seller(env, &seller);
    Ok(seller)
}

pub fn do_get_seller(env: &Env, owner: Address) -> Result<Seller, Error> {
    reconciled_seller(env, &owner, clock::now(env))
}
