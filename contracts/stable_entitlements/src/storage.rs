//! Persistent-storage accessors. Every write bumps the entry TTL.

use crate::types::{
    DataKey, Error, GatewayConfig, HorseListing, PendingOrder, Seller, Spotlight, Transaction,
    ORDER_TTL_LEDGERS, PERSISTENT_BUMP_LEDGERS,
};
use soroban_sdk::{Address, Env, String, Vec};

fn put<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    let store = env.storage().persistent();
    store.set(key, value);
    store.extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

fn next_id(env: &Env, key: &DataKey) -> u32 {
    let id: u32 = env.storage().instance().get(key).unwrap_or(0);
    env.storage().instance().set(key, &(id + 1));
    id
}

pub fn id_bound(env: &Env, key: &DataKey) -> u32 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn config(env: &Env) -> Result<GatewayConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

// ── Sellers ──────────────────────────────────────────────────────────────────

pub fn has_seller(env: &Env, owner: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Seller(owner.clone()))
}

pub fn load_seller(env: &Env, owner: &Address) -> Result<Seller, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Seller(owner.clone()))
        .ok_or(Error::SellerNotFound)
}

pub fn save_seller(env: &Env, seller: &Seller) {
    put(env, &DataKey::Seller(seller.owner.clone()), seller);
}

// ── Listings ─────────────────────────────────────────────────────────────────

pub fn next_listing_id(env: &Env) -> u32 {
    next_id(env, &DataKey::NextListingId)
}

pub fn load_listing(env: &Env, id: u32) -> Result<HorseListing, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Listing(id))
        .ok_or(Error::ListingNotFound)
}

pub fn save_listing(env: &Env, listing: &HorseListing) {
    put(env, &DataKey::Listing(listing.id), listing);
}

pub fn seller_listings(env: &Env, owner: &Address) -> Vec<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::SellerListings(owner.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn index_listing(env: &Env, owner: &Address, id: u32) {
    let mut ids = seller_listings(env, owner);
    ids.push_back(id);
    put(env, &DataKey::SellerListings(owner.clone()), &ids);
}

// ── Transactions and orders ──────────────────────────────────────────────────

pub fn next_transaction_id(env: &Env) -> u32 {
    next_id(env, &DataKey::NextTransactionId)
}

pub fn load_transaction(env: &Env, id: u32) -> Result<Transaction, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Transaction(id))
        .ok_or(Error::TransactionNotFound)
}

/// Writes a new transaction. Existing records are never overwritten.
pub fn insert_transaction(env: &Env, tx: &Transaction) -> Result<(), Error> {
    let key = DataKey::Transaction(tx.id);
    if env.storage().persistent().has(&key) {
        return Err(Error::InvalidInput);
    }
    put(env, &key, tx);

    let index = DataKey::SellerTransactions(tx.seller.clone());
    let mut ids: Vec<u32> = env
        .storage()
        .persistent()
        .get(&index)
        .unwrap_or_else(|| Vec::new(env));
    ids.push_back(tx.id);
    put(env, &index, &ids);
    Ok(())
}

pub fn seller_transactions(env: &Env, owner: &Address) -> Vec<u32> {
    env.storage()
        .persistent()
        .get(&DataKey::SellerTransactions(owner.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn load_order(env: &Env, order_id: &String) -> Result<PendingOrder, Error> {
    env.storage()
        .temporary()
        .get(&DataKey::Order(order_id.clone()))
        .ok_or(Error::OrderNotFound)
}

/// Orders live in temporary storage so abandoned ones are evicted by the host.
pub fn save_order(env: &Env, order_id: &String, order: &PendingOrder) {
    let key = DataKey::Order(order_id.clone());
    let store = env.storage().temporary();
    store.set(&key, order);
    store.extend_ttl(&key, ORDER_TTL_LEDGERS, ORDER_TTL_LEDGERS);
}

pub fn remove_order(env: &Env, order_id: &String) {
    env.storage()
        .temporary()
        .remove(&DataKey::Order(order_id.clone()));
}

// ── Spotlights ───────────────────────────────────────────────────────────────

pub fn next_spotlight_id(env: &Env) -> u32 {
    next_id(env, &DataKey::NextSpotlightId)
}

pub fn load_spotlight(env: &Env, id: u32) -> Result<Spotlight, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Spotlight(id))
        .ok_or(Error::SpotlightNotFound)
}

pub fn save_spotlight(env: &Env, spotlight: &Spotlight) {
    put(env, &DataKey::Spotlight(spotlight.id), spotlight);
}

pub fn spotlights_in_month(env: &Env, owner: &Address, month_start: u64) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::SpotlightsInMonth(owner.clone(), month_start))
        .unwrap_or(0)
}

pub fn count_spotlight(env: &Env, owner: &Address, month_start: u64) -> Result<(), Error> {
    let used = spotlights_in_month(env, owner, month_start)
        .checked_add(1)
        .ok_or(Error::Overflow)?;
    put(env, &DataKey::SpotlightsInMonth(owner.clone(), month_start), &used);
    Ok(())
}
