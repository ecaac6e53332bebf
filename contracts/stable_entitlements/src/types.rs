//! Contract types: errors, storage keys, and the seller/listing data model.
//!
//! Kept in a separate module to reduce merge conflicts when editing the state
//! machine, the entitlement rules, or contract entrypoints.

use soroban_sdk::{contracterror, contracttype, Address, Bytes, String, Symbol, Vec};

/// Increment this constant whenever the on-chain storage schema changes.
///
/// ⚠️ Upgrade-sensitive: written to [`DataKey::SchemaVersion`] during `init()`.
pub const STORAGE_VERSION: u32 = 1;

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

/// Lifetime of a pending gateway order in ledgers (~1 day at 5 s/ledger).
pub const ORDER_TTL_LEDGERS: u32 = 17_280;

/// Canonical storage key enum for all contract state.
///
/// ⚠️ Upgrade-sensitive: discriminant order is fixed. Only append new variants.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Authorized admin address. Discriminant 0.
    Admin,
    /// Gateway, media store, currency, secret and test-mode flag. Discriminant 1.
    Config,
    /// Plan catalog written once at init. Discriminant 2.
    Catalog,
    /// On-chain storage schema version. Discriminant 3.
    SchemaVersion,
    /// Next listing id. Discriminant 4.
    NextListingId,
    /// Next transaction id. Discriminant 5.
    NextTransactionId,
    /// Next spotlight id. Discriminant 6.
    NextSpotlightId,
    /// Seller aggregate keyed by the owning account. Discriminant 7.
    Seller(Address),
    /// Listing keyed by id. Discriminant 8.
    Listing(u32),
    /// Seller → listing id index. Discriminant 9.
    SellerListings(Address),
    /// Transaction keyed by id. Discriminant 10.
    Transaction(u32),
    /// Seller → transaction id index. Discriminant 11.
    SellerTransactions(Address),
    /// Pending gateway order keyed by the gateway's order id, in temporary
    /// storage. Discriminant 12.
    Order(String),
    /// Spotlight keyed by id. Discriminant 13.
    Spotlight(u32),
    /// Spotlights a seller started in the month beginning at the given
    /// timestamp. Discriminant 14.
    SpotlightsInMonth(Address, u64),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    InvalidStatusTransition = 400,
    Unauthorized = 401,
    /// Caller does not own the listing or spotlight.
    NotOwner = 403,
    SellerNotFound = 404,
    ListingNotFound = 405,
    TransactionNotFound = 406,
    OrderNotFound = 407,
    SpotlightNotFound = 408,
    ImageNotFound = 409,
    NotInitialized = 410,
    AlreadyInitialized = 411,
    AlreadyRegistered = 412,
    /// Plan name is not one of the catalog tiers.
    InvalidPlan = 1001,
    /// Target plan does not rank strictly above the current one.
    InvalidUpgrade = 1002,
    /// Payment signature did not match the HMAC of `order_id|payment_id`.
    InvalidSignature = 1003,
    /// Required listing fields are empty; see `missing_verification_fields`.
    MissingFields = 1004,
    /// Plan quota for the action is used up.
    QuotaExceeded = 1005,
    /// Current plan does not include the feature.
    FeatureUnavailable = 1006,
    /// An unexpired boost already exists on the listing.
    AlreadyActive = 1007,
    /// Listing already awaits verification review.
    AlreadyPending = 1008,
    /// Zero-priced plans are committed without a gateway order.
    NoPaymentRequired = 1009,
    InvalidInput = 1010,
    InvalidLimit = 1011,
    /// Arithmetic overflow on timestamps or counters.
    Overflow = 1012,
    /// Gateway order is older than the settlement window.
    OrderExpired = 1013,
}

// ── Plans and feature bundles ────────────────────────────────────────────────

/// Plan tier. The discriminant is the upgrade priority.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Plan {
    Free = 0,
    Trot = 1,
    Gallop = 2,
    RoyalStallion = 3,
}

impl Plan {
    pub const fn priority(self) -> u32 {
        self as u32
    }
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VerificationLevel {
    None = 0,
    Basic = 1,
    Premium = 2,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SearchPlacement {
    None = 0,
    Basic = 1,
    Premium = 2,
}

/// Featured-listing boost allowance. A zero duration means the tier has no boosts.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoostAllowance {
    pub count: u32,
    pub duration_days: u32,
}

/// Entitlements granted by a plan.
///
/// Stored by value inside each seller's subscription, so a bundle is a
/// snapshot taken at activation and never aliases the catalog.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FeatureBundle {
    pub max_photos: u32,
    pub max_listings: u32,
    pub listing_duration_days: u32,
    pub verification_level: VerificationLevel,
    pub virtual_stable_tour: bool,
    pub analytics: bool,
    pub homepage_spotlights_per_month: u32,
    pub spotlight_duration_days: u32,
    pub featured_listing_boosts: BoostAllowance,
    pub priority_placement: bool,
    pub badges: Vec<String>,
    pub search_placement: SearchPlacement,
    pub social_media_sharing: bool,
    pub serious_buyer_access: bool,
}

/// One row of the plan catalog.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogEntry {
    pub plan: Plan,
    pub name: String,
    /// Price in minor currency units.
    pub price: i128,
    pub duration_days: u32,
    pub features: FeatureBundle,
}

// ── Subscription ─────────────────────────────────────────────────────────────

/// Lifecycle state of a seller subscription.
///
/// - **Inactive**: never purchased. Can move to `PendingPayment` or `Active` (free tier).
/// - **PendingPayment**: package selected, awaiting a verified payment.
/// - **Active**: plan in force until `end_date`.
/// - **Expired**: `end_date` passed with nothing queued; baseline entitlements.
/// - **Cancelled**: ended by the seller; zeroed entitlements.
///
/// See [`crate::state_machine::validate_status_transition`] for the full table.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SubscriptionStatus {
    Inactive = 0,
    PendingPayment = 1,
    Active = 2,
    Expired = 3,
    Cancelled = 4,
}

/// Plan bought while another plan is still active.
///
/// `transaction` is `None` and the dates are zero while the entry only records
/// a package selection; payment confirmation fills them in.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueuedPlan {
    pub plan: Plan,
    pub transaction: Option<u32>,
    pub start_date: u64,
    pub end_date: u64,
    pub features: FeatureBundle,
}

/// Subscription embedded in a [`Seller`].
///
/// ⚠️ Upgrade-sensitive: field order and types are serialised as XDR.
///
/// `status` is managed by the state machine; use the transition helpers in
/// [`crate::state_machine`], never set it directly.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub plan: Option<Plan>,
    pub status: SubscriptionStatus,
    pub start_date: u64,
    pub end_date: u64,
    pub features: FeatureBundle,
    pub last_payment: Option<u32>,
    pub queued_plans: Vec<QueuedPlan>,
}

// ── Seller ───────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SellerProfile {
    pub business_name: String,
    pub location: String,
    pub contact: String,
}

/// Allow-listed profile changes. `None` leaves a field untouched.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProfileUpdate {
    pub business_name: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Seller {
    pub owner: Address,
    pub profile: SellerProfile,
    pub subscription: Subscription,
    /// Listings currently in `Active` status.
    pub active_listings: u32,
    pub created_at: u64,
}

// ── Payments ─────────────────────────────────────────────────────────────────

/// External contracts and secrets the payment gate and photo upload need.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GatewayConfig {
    pub gateway: Address,
    pub media_store: Address,
    pub currency: Symbol,
    pub secret: Bytes,
    /// Skips signature verification. Test deployments only.
    pub test_mode: bool,
}

/// Order as returned by the payment gateway.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i128,
    pub currency: Symbol,
}

/// Gateway order correlated with the seller and plan it pays for.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingOrder {
    pub seller: Address,
    pub plan: Plan,
    pub amount: i128,
    pub currency: Symbol,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderHandle {
    pub order_id: String,
    pub plan: Plan,
    pub amount: i128,
    pub currency: Symbol,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransactionKind {
    Subscription = 0,
    Other = 1,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    Pending = 0,
    Completed = 1,
    Failed = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubscriptionDetails {
    pub plan: Plan,
    pub duration_days: u32,
    pub start_date: u64,
    pub end_date: u64,
}

/// Record of a subscription payment. Written once, never updated.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub id: u32,
    pub seller: Address,
    pub kind: TransactionKind,
    pub amount: i128,
    pub currency: Symbol,
    pub status: TransactionStatus,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub details: SubscriptionDetails,
    pub created_at: u64,
}

// ── Listings ─────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ListingStatus {
    Draft = 0,
    Active = 1,
    Expired = 2,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VerificationStatus {
    Unverified = 0,
    Pending = 1,
    Verified = 2,
    Rejected = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HorseDetails {
    pub name: String,
    pub breed: String,
    pub age: u32,
    pub gender: String,
    pub color: String,
    pub price: i128,
    pub description: String,
    pub location: String,
    pub specifications: String,
}

/// Allow-listed listing changes. `None` leaves a field untouched.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListingUpdate {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub color: Option<String>,
    pub price: Option<i128>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub specifications: Option<String>,
}

/// What the media store hands back after an upload.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
    pub format: Symbol,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HorseImage {
    /// Stable per-listing id; never reused after removal.
    pub id: u32,
    pub url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
    pub format: Symbol,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoostWindow {
    pub active: bool,
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationSubmission {
    pub submitted_by: Address,
    pub submitted_at: u64,
    pub documents: Vec<String>,
    pub notes: String,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HorseListing {
    pub id: u32,
    pub seller: Address,
    pub details: HorseDetails,
    pub status: ListingStatus,
    pub images: Vec<HorseImage>,
    pub next_image_id: u32,
    pub verification_status: VerificationStatus,
    pub verification: Option<VerificationSubmission>,
    pub boost: BoostWindow,
    pub created_at: u64,
    pub activated_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SweepReport {
    pub scanned: u32,
    pub expired: u32,
    /// First id not yet scanned; pass as `start_id` to continue.
    pub next_id: u32,
}

// ── Spotlights ───────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SpotlightStatus {
    Active = 0,
    Expired = 1,
    Cancelled = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Spotlight {
    pub id: u32,
    pub listing_id: u32,
    pub seller: Address,
    pub start_date: u64,
    pub end_date: u64,
    pub status: SpotlightStatus,
    pub plan: Plan,
}

// ── Entitlement decisions ────────────────────────────────────────────────────

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DenyReason {
    None = 0,
    QuotaExceeded = 1,
    FeatureUnavailable = 2,
    AlreadyActive = 3,
}

impl DenyReason {
    pub const fn into_error(self) -> Option<Error> {
        match self {
            DenyReason::None => None,
            DenyReason::QuotaExceeded => Some(Error::QuotaExceeded),
            DenyReason::FeatureUnavailable => Some(Error::FeatureUnavailable),
            DenyReason::AlreadyActive => Some(Error::AlreadyActive),
        }
    }
}

/// Outcome of an entitlement check, with the limit that applied.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entitlement {
    pub allowed: bool,
    pub reason: DenyReason,
    pub limit: u32,
    pub used: u32,
}

impl Entitlement {
    pub fn allow(limit: u32, used: u32) -> Self {
        Self {
            allowed: true,
            reason: DenyReason::None,
            limit,
            used,
        }
    }

    pub fn deny(reason: DenyReason, limit: u32, used: u32) -> Self {
        Self {
            allowed: false,
            reason,
            limit,
            used,
        }
    }

    /// Converts a denial into the caller-visible error.
    pub fn require(&self) -> Result<(), Error> {
        if self.allowed {
            return Ok(());
        }
        Err(self.reason.into_error().unwrap_or(Error::FeatureUnavailable))
    }
}

// ── Events ───────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug)]
pub struct SellerRegisteredEvent {
    pub seller: Address,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PackageSelectedEvent {
    pub seller: Address,
    pub plan: Plan,
    pub queued: bool,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SubscriptionActivatedEvent {
    pub seller: Address,
    pub plan: Plan,
    pub start_date: u64,
    pub end_date: u64,
    pub transaction: Option<u32>,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SubscriptionExpiredEvent {
    pub seller: Address,
    pub plan: Option<Plan>,
    pub end_date: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct PaymentVerifiedEvent {
    pub seller: Address,
    pub transaction: u32,
    pub order_id: String,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ListingBoostedEvent {
    pub listing_id: u32,
    pub seller: Address,
    pub start: u64,
    pub end: u64,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct SpotlightCreatedEvent {
    pub spotlight_id: u32,
    pub listing_id: u32,
    pub seller: Address,
    pub end_date: u64,
}
