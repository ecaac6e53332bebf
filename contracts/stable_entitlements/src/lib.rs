#![no_std]

// ── Modules ──────────────────────────────────────────────────────────────────
mod admin;
mod catalog;
mod clock;
mod entitlements;
mod external;
mod listing;
mod payment;
mod photo;
mod seller;
mod signature;
mod spotlight;
mod state_machine;
mod storage;
mod subscription;
pub mod types;

// ── Re-exports (used by tests and external consumers) ────────────────────────
pub use catalog::PlanCatalog;
pub use external::{MediaStore, MediaStoreClient, PaymentGateway, PaymentGatewayClient};
pub use state_machine::{can_transition, get_allowed_transitions, validate_status_transition};
pub use types::*;

use soroban_sdk::{contract, contractimpl, Address, Bytes, Env, String, Symbol, Vec};

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StableEntitlements;

#[contractimpl]
impl StableEntitlements {
    // ── Admin / Config ───────────────────────────────────────────────────

    /// Initialize the contract: admin, payment gateway, media store and the
    /// shared secret used to verify gateway payment signatures.
    pub fn init(env: Env, admin: Address, config: GatewayConfig) -> Result<(), Error> {
        admin::do_init(&env, admin, config)
    }

    pub fn get_admin(env: Env) -> Result<Address, Error> {
        admin::do_get_admin(&env)
    }

    /// Rotate admin to a new address. Only callable by current admin.
    ///
    /// Takes effect immediately and emits an `admin_rotation` event.
    pub fn rotate_admin(env: Env, current_admin: Address, new_admin: Address) -> Result<(), Error> {
        admin::do_rotate_admin(&env, current_admin, new_admin)
    }

    /// **ADMIN ONLY**: Replace the gateway signing secret.
    ///
    /// The secret lives in instance storage and is readable by anyone who can
    /// read the ledger; treat it as a correlation key, not a credential.
    pub fn rotate_payment_secret(env: Env, admin: Address, secret: Bytes) -> Result<(), Error> {
        payment::do_rotate_secret(&env, admin, secret)
    }

    // ── Plan catalog ─────────────────────────────────────────────────────

    /// Look up a tier by display name ("Royal Stallion", "Gallop", "Trot", "Free").
    pub fn get_plan(env: Env, name: String) -> Result<CatalogEntry, Error> {
        let plan = catalog::parse_plan_name(&name)?;
        PlanCatalog::load(&env)?.entry(plan)
    }

    pub fn list_plans(env: Env) -> Result<Vec<CatalogEntry>, Error> {
        Ok(PlanCatalog::load(&env)?.entries)
    }

    // ── Sellers ──────────────────────────────────────────────────────────

    pub fn register_seller(env: Env, owner: Address, profile: SellerProfile) -> Result<Seller, Error> {
        seller::do_register_seller(&env, owner, profile)
    }

    pub fn update_seller_profile(
        env: Env,
        owner: Address,
        update: ProfileUpdate,
    ) -> Result<Seller, Error> {
        seller::do_update_profile(&env, owner, update)
    }

    /// Seller record with any due expiry or queued activation applied.
    pub fn get_seller(env: Env, owner: Address) -> Result<Seller, Error> {
        seller::do_get_seller(&env, owner)
    }

    // ── Subscription lifecycle ───────────────────────────────────────────

    /// Select a package by name.
    ///
    /// With `queue` set and a plan still running, the selection is queued
    /// behind it; otherwise the subscription moves to `PendingPayment`. The
    /// Free tier needs no payment and activates immediately.
    ///
    /// Fails with `InvalidUpgrade` unless the tier ranks above the active plan.
    pub fn select_package(
        env: Env,
        owner: Address,
        plan_name: String,
        queue: bool,
    ) -> Result<Subscription, Error> {
        subscription::do_select_package(&env, owner, plan_name, queue)
    }

    pub fn get_subscription(env: Env, owner: Address) -> Result<Subscription, Error> {
        subscription::do_get_subscription(&env, owner)
    }

    /// Cancel the subscription. Queued plans are dropped and entitlements
    /// revert to nothing.
    pub fn cancel_subscription(env: Env, owner: Address) -> Result<Subscription, Error> {
        subscription::do_cancel_subscription(&env, owner)
    }

    // ── Payments ─────────────────────────────────────────────────────────

    /// Open a gateway order for a paid tier.
    pub fn create_order(env: Env, owner: Address, plan_name: String) -> Result<OrderHandle, Error> {
        payment::do_create_order(&env, owner, plan_name)
    }

    /// Confirm a gateway payment.
    ///
    /// `signature` is the lowercase or uppercase hex of
    /// HMAC-SHA256(secret, `order_id|payment_id`). On success a completed
    /// transaction is recorded and the plan is activated or queued; on a bad
    /// signature nothing is written.
    pub fn verify_payment(
        env: Env,
        owner: Address,
        order_id: String,
        payment_id: String,
        signature: String,
    ) -> Result<Subscription, Error> {
        payment::do_verify_payment(&env, owner, order_id, payment_id, signature)
    }

    pub fn verify_signature(
        env: Env,
        order_id: String,
        payment_id: String,
        signature: String,
    ) -> Result<bool, Error> {
        payment::do_verify_signature(&env, order_id, payment_id, signature)
    }

    pub fn get_transaction(env: Env, id: u32) -> Result<Transaction, Error> {
        payment::do_get_transaction(&env, id)
    }

    pub fn transactions_of(env: Env, owner: Address) -> Vec<u32> {
        storage::seller_transactions(&env, &owner)
    }

    // ── Entitlement checks (read-only) ───────────────────────────────────

    pub fn check_photos(
        env: Env,
        owner: Address,
        listing_id: u32,
        count: u32,
    ) -> Result<Entitlement, Error> {
        entitlements::do_check_photos(&env, owner, listing_id, count)
    }

    pub fn check_listing_activation(env: Env, owner: Address) -> Result<Entitlement, Error> {
        entitlements::do_check_listing_activation(&env, owner)
    }

    pub fn check_boost(env: Env, owner: Address, listing_id: u32) -> Result<Entitlement, Error> {
        entitlements::do_check_boost(&env, owner, listing_id)
    }

    pub fn check_spotlight(env: Env, owner: Address) -> Result<Entitlement, Error> {
        entitlements::do_check_spotlight(&env, owner)
    }

    // ── Listings ─────────────────────────────────────────────────────────

    /// Create a draft listing. Drafts do not count toward the listing cap.
    pub fn create_listing(env: Env, owner: Address, details: HorseDetails) -> Result<u32, Error> {
        listing::do_create_listing(&env, owner, details)
    }

    pub fn update_listing(
        env: Env,
        owner: Address,
        listing_id: u32,
        update: ListingUpdate,
    ) -> Result<HorseListing, Error> {
        listing::do_update_listing(&env, owner, listing_id, update)
    }

    pub fn activate_listing(env: Env, owner: Address, listing_id: u32) -> Result<(), Error> {
        listing::do_activate_listing(&env, owner, listing_id)
    }

    pub fn get_listing(env: Env, listing_id: u32) -> Result<HorseListing, Error> {
        listing::do_get_listing(&env, listing_id)
    }

    pub fn listings_of(env: Env, owner: Address) -> Vec<u32> {
        listing::do_listings_of(&env, owner)
    }

    pub fn boost_listing(env: Env, owner: Address, listing_id: u32) -> Result<BoostWindow, Error> {
        listing::do_boost_listing(&env, owner, listing_id)
    }

    /// Submit a listing for verification. Every listing field and at least one
    /// photo must be present.
    pub fn submit_for_verification(
        env: Env,
        owner: Address,
        listing_id: u32,
        documents: Vec<String>,
        notes: String,
    ) -> Result<(), Error> {
        listing::do_submit_for_verification(&env, owner, listing_id, documents, notes)
    }

    pub fn missing_verification_fields(env: Env, listing_id: u32) -> Result<Vec<Symbol>, Error> {
        listing::do_missing_verification_fields(&env, listing_id)
    }

    /// **ADMIN ONLY**: Approve or reject a pending verification.
    pub fn review_verification(
        env: Env,
        admin: Address,
        listing_id: u32,
        approve: bool,
        notes: String,
    ) -> Result<(), Error> {
        admin::do_review_verification(&env, admin, listing_id, approve, notes)
    }

    /// **ADMIN ONLY**: Expire overdue active listings in one page of ids.
    ///
    /// Resume from the returned `next_id`. `limit` is capped at 25.
    pub fn sweep_expiry(
        env: Env,
        admin: Address,
        start_id: u32,
        limit: u32,
    ) -> Result<SweepReport, Error> {
        admin::do_sweep_expiry(&env, admin, start_id, limit)
    }

    // ── Photos ───────────────────────────────────────────────────────────

    /// Upload photos through the media store. Rejected up front if the plan's
    /// photo limit would be exceeded.
    pub fn add_photos(
        env: Env,
        owner: Address,
        listing_id: u32,
        contents: Vec<Bytes>,
    ) -> Result<Vec<HorseImage>, Error> {
        photo::do_add_photos(&env, owner, listing_id, contents)
    }

    pub fn remove_photo(env: Env, owner: Address, listing_id: u32, image_id: u32) -> Result<(), Error> {
        photo::do_remove_photo(&env, owner, listing_id, image_id)
    }

    pub fn reorder_photos(
        env: Env,
        owner: Address,
        listing_id: u32,
        order: Vec<u32>,
    ) -> Result<Vec<HorseImage>, Error> {
        photo::do_reorder_photos(&env, owner, listing_id, order)
    }

    // ── Spotlights ───────────────────────────────────────────────────────

    pub fn create_spotlight(env: Env, owner: Address, listing_id: u32) -> Result<u32, Error> {
        spotlight::do_create_spotlight(&env, owner, listing_id)
    }

    pub fn cancel_spotlight(env: Env, owner: Address, spotlight_id: u32) -> Result<(), Error> {
        spotlight::do_cancel_spotlight(&env, owner, spotlight_id)
    }

    pub fn get_spotlight(env: Env, spotlight_id: u32) -> Result<Spotlight, Error> {
        spotlight::do_get_spotlight(&env, spotlight_id)
    }

    pub fn active_spotlights(env: Env, start_id: u32, limit: u32) -> Result<Vec<Spotlight>, Error> {
        spotlight::do_active_spotlights(&env, start_id, limit)
    }
}
