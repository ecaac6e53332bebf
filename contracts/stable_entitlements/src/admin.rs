//! Admin and config: init, admin rotation, verification review, expiry sweep.
//!
//! **PRs that only change admin or configuration behavior should edit this file only.**

use crate::catalog::PlanCatalog;
use crate::clock;
use crate::listing;
use crate::types::{DataKey, Error, GatewayConfig, SweepReport, STORAGE_VERSION};
use soroban_sdk::{Address, Env, String, Symbol};

const MAX_SWEEP_LIMIT: u32 = 25;

pub fn do_init(env: &Env, admin: Address, config: GatewayConfig) -> Result<(), Error> {
    if env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::AlreadyInitialized);
    }
    admin.require_auth();
    if config.secret.len() == 0 {
        return Err(Error::InvalidInput);
    }

    let storage = env.storage().instance();
    storage.set(&DataKey::Admin, &admin);
    storage.set(&DataKey::Config, &config);
    storage.set(&DataKey::Catalog, &PlanCatalog::standard(env));
    storage.set(&DataKey::SchemaVersion, &STORAGE_VERSION);

    env.events().publish(
        (Symbol::new(env, "initialized"),),
        (admin, config.gateway, config.media_store, config.test_mode),
    );
    Ok(())
}

pub fn require_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn require_admin_auth(env: &Env, admin: &Address) -> Result<(), Error> {
    admin.require_auth();
    let stored = require_admin(env)?;
    if admin != &stored {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

pub fn save_config(env: &Env, config: &GatewayConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn do_get_admin(env: &Env) -> Result<Address, Error> {
    require_admin(env)
}

pub fn do_rotate_admin(env: &Env, current_admin: Address, new_admin: Address) -> Result<(), Error> {
    require_admin_auth(env, &current_admin)?;
    env.storage().instance().set(&DataKey::Admin, &new_admin);

    env.events().publish(
        (Symbol::new(env, "admin_rotation"), current_admin.clone()),
        (current_admin, new_admin, clock::now(env)),
    );
    Ok(())
}

pub fn do_review_verification(
    env: &Env,
    admin: Address,
    listing_id: u32,
    approve: bool,
    notes: String,
) -> Result<(), Error> {
    require_admin_auth(env, &admin)?;
    listing::review_verification(env, listing_id, approve, notes)
}

/// Expires active listings in `[start_id, start_id + limit)` that outlived the
/// listing duration of their seller's current plan.
pub fn do_sweep_expiry(
    env: &Env,
    admin: Address,
    start_id: u32,
    limit: u32,
) -> Result<SweepReport, Error> {
    require_admin_auth(env, &admin)?;
    if limit == 0 || limit > MAX_SWEEP_LIMIT {
        return Err(Error::InvalidLimit);
    }
    listing::sweep_expiry(env, start_id, limit, clock::now(env))
}
