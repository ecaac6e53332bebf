//! Clients for the contracts this one calls out to.

use crate::types::{GatewayOrder, MediaAsset};
use soroban_sdk::{Bytes, Env, String, Symbol};

/// Payment gateway: opens an order the buyer then pays off-ledger.
#[soroban_sdk::contractclient(name = "PaymentGatewayClient")]
pub trait PaymentGateway {
    fn create_order(env: Env, amount: i128, currency: Symbol, receipt: String) -> GatewayOrder;
}

/// Image host for listing photos.
#[soroban_sdk::contractclient(name = "MediaStoreClient")]
pub trait MediaStore {
    fn upload(env: Env, content: Bytes) -> MediaAsset;
    fn delete(env: Env, public_id: String);
}
