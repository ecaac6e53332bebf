//! Payment verification gate: gateway orders, signature checks, transaction
//! records, and the hand-off to the subscription state machine.
//!
//! A transaction is written before the subscription that references it, and
//! nothing is written when the signature check fails.

use crate::catalog::{parse_plan_name, PlanCatalog};
use crate::clock;
use crate::external::PaymentGatewayClient;
use crate::signature;
use crate::state_machine::{self, Confirmation};
use crate::storage;
use crate::subscription::{publish_activation, reconciled_seller};
use crate::types::{
    Error, OrderHandle, PaymentVerifiedEvent, PendingOrder, Plan, Seller, SubscriptionDetails,
    Subscription, Transaction, TransactionKind, TransactionStatus,
};
use soroban_sdk::{log, Address, Bytes, Env, String, Symbol};

/// Orders not settled within this many days are refused.
const ORDER_SETTLEMENT_DAYS: u32 = 1;

/// Gateway correlation fields for one payment.
pub struct PaymentReceipt {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub amount: i128,
    pub currency: Symbol,
}

impl PaymentReceipt {
    /// Receipt for a plan that costs nothing and never touches the gateway.
    pub fn zero_cost(env: &Env, currency: Symbol) -> Self {
        let empty = String::from_str(env, "");
        Self {
            order_id: empty.clone(),
            payment_id: empty.clone(),
            signature: empty,
            amount: 0,
            currency,
        }
    }
}

pub fn do_create_order(env: &Env, owner: Address, plan_name: String) -> Result<OrderHandle, Error> {
    owner.require_auth();
    let plan = parse_plan_name(&plan_name)?;
    let catalog = PlanCatalog::load(env)?;
    let config = storage::config(env)?;
    let now = clock::now(env);

    let seller = reconciled_seller(env, &owner, now)?;
    state_machine::check_upgrade(&seller.subscription, plan)?;

    let amount = catalog.entry(plan)?.price;
    if amount == 0 {
        return Err(Error::NoPaymentRequired);
    }

    let gateway = PaymentGatewayClient::new(env, &config.gateway);
    let order = gateway.create_order(&amount, &config.currency, &catalog.entry(plan)?.name);
    if order.amount != amount || order.currency != config.currency {
        return Err(Error::InvalidInput);
    }

    storage::save_order(
        env,
        &order.id,
        &PendingOrder {
            seller: owner,
            plan,
            amount,
            currency: config.currency.clone(),
            created_at: now,
        },
    );

    Ok(OrderHandle {
        order_id: order.id,
        plan,
        amount,
        currency: config.currency,
    })
}

pub fn do_verify_payment(
    env: &Env,
    owner: Address,
    order_id: String,
    payment_id: String,
    signature_hex: String,
) -> Result<Subscription, Error> {
    owner.require_auth();
    let config = storage::config(env)?;
    let order = storage::load_order(env, &order_id)?;
    if order.seller != owner {
        return Err(Error::NotOwner);
    }
    let now = clock::now(env);
    if now > clock::add_days(order.created_at, ORDER_SETTLEMENT_DAYS)? {
        return Err(Error::OrderExpired);
    }

    if !config.test_mode
        && !signature::verify(env, &config.secret, &order_id, &payment_id, &signature_hex)
    {
        log!(env, "payment signature rejected for order {}", order_id.clone());
        return Err(Error::InvalidSignature);
    }

    let catalog = PlanCatalog::load(env)?;
    let mut seller = reconciled_seller(env, &owner, now)?;

    commit_payment(
        env,
        &mut seller,
        &catalog,
        order.plan,
        PaymentReceipt {
            order_id: order_id.clone(),
            payment_id,
            signature: signature_hex,
            amount: order.amount,
            currency: order.currency,
        },
        now,
    )?;
    storage::remove_order(env, &order_id);
    Ok(seller.subscription)
}

/// Records a completed transaction, then confirms the plan on `seller` and
/// persists it. The tier is rechecked here because an order may be settled
/// after a higher plan was bought.
pub fn commit_payment(
    env: &Env,
    seller: &mut Seller,
    catalog: &PlanCatalog,
    plan: Plan,
    receipt: PaymentReceipt,
    now: u64,
) -> Result<u32, Error> {
    state_machine::check_upgrade(&seller.subscription, plan)?;
    let (start_date, end_date) =
        state_machine::confirmation_window(&seller.subscription, catalog, plan, now)?;

    let id = storage::next_transaction_id(env);
    let tx = Transaction {
        id,
        seller: seller.owner.clone(),
        kind: TransactionKind::Subscription,
        amount: receipt.amount,
        currency: receipt.currency,
        status: TransactionStatus::Completed,
        order_id: receipt.order_id,
        payment_id: receipt.payment_id,
        signature: receipt.signature,
        details: SubscriptionDetails {
            plan,
            duration_days: catalog.duration_days(plan)?,
            start_date,
            end_date,
        },
        created_at: now,
    };
    storage::insert_transaction(env, &tx)?;

    let confirmation =
        state_machine::confirm_payment(&mut seller.subscription, catalog, plan, Some(id), now)?;
    storage::save_seller(env, seller);

    env.events().publish(
        (Symbol::new(env, "payment_verified"), seller.owner.clone()),
        PaymentVerifiedEvent {
            seller: seller.owner.clone(),
            transaction: id,
            order_id: tx.order_id,
            amount: tx.amount,
        },
    );
    if confirmation == Confirmation::Activated {
        publish_activation(env, &seller.owner, &seller.subscription);
    }
    Ok(id)
}

pub fn do_verify_signature(
    env: &Env,
    order_id: String,
    payment_id: String,
    signature_hex: String,
) -> Result<bool, Error> {
    let config = storage::config(env)?;
    Ok(signature::verify(
        env,
        &config.secret,
        &order_id,
        &payment_id,
        &signature_hex,
    ))
}

pub fn do_get_transaction(env: &Env, id: u32) -> Result<Transaction, Error> {
    storage::load_transaction(env, id)
}

pub fn do_rotate_secret(env: &Env, admin: Address, secret: Bytes) -> Result<(), Error> {
    crate::admin::require_admin_auth(env, &admin)?;
    if secret.len() == 0 {
        return Err(Error::InvalidInput);
    }
    let mut config = storage::config(env)?;
    config.secret = secret;
    crate::admin::save_config(env, &config);
    env.events()
        .publish((Symbol::new(env, "payment_secret_rotated"),), admin);
    Ok(())
}
