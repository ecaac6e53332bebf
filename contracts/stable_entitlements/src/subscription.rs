//! Subscription entrypoints: package selection, reconciling reads, cancellation.
//!
//! Every path that gates an action loads the seller through
//! [`reconciled_seller`] or [`reconcile_in_memory`] first, so a lapsed plan
//! never grants its old quotas.

use crate::catalog::{parse_plan_name, PlanCatalog};
use crate::clock;
use crate::payment::{commit_payment, PaymentReceipt};
use crate::state_machine::{self, Selection};
use crate::storage;
use crate::types::{
    Error, PackageSelectedEvent, Seller, Subscription, SubscriptionActivatedEvent,
    SubscriptionExpiredEvent, SubscriptionStatus,
};
use soroban_sdk::{log, Address, Env, String, Symbol};

/// Loads the seller and applies due expiries without writing them back.
pub fn reconcile_in_memory(env: &Env, owner: &Address, now: u64) -> Result<Seller, Error> {
    let mut seller = storage::load_seller(env, owner)?;
    state_machine::reconcile(env, &mut seller.subscription, now);
    Ok(seller)
}

/// Loads the seller, applies due expiries, and persists them if anything moved.
pub fn reconciled_seller(env: &Env, owner: &Address, now: u64) -> Result<Seller, Error> {
    let mut seller = storage::load_seller(env, owner)?;
    let before = seller.subscription.clone();
    if state_machine::reconcile(env, &mut seller.subscription, now) {
        storage::save_seller(env, &seller);
        publish_reconciliation(env, owner, &before, &seller.subscription);
    }
    Ok(seller)
}

pub fn do_select_package(
    env: &Env,
    owner: Address,
    plan_name: String,
    queue: bool,
) -> Result<Subscription, Error> {
    owner.require_auth();
    let plan = parse_plan_name(&plan_name)?;
    let catalog = PlanCatalog::load(env)?;
    let now = clock::now(env);
    let mut seller = reconciled_seller(env, &owner, now)?;

    let selection =
        state_machine::select_package(&mut seller.subscription, &catalog, plan, queue, now)?;

    env.events().publish(
        (Symbol::new(env, "package_selected"), owner.clone()),
        PackageSelectedEvent {
            seller: owner.clone(),
            plan,
            queued: selection == Selection::Queued,
            timestamp: now,
        },
    );

    let price = catalog.entry(plan)?.price;
    if selection == Selection::Pending && price == 0 {
        log!(env, "zero-cost plan committed without gateway: {}", owner.clone());
        let currency = storage::config(env)?.currency;
        commit_payment(
            env,
            &mut seller,
            &catalog,
            plan,
            PaymentReceipt::zero_cost(env, currency),
            now,
        )?;
    } else {
        storage::save_seller(env, &seller);
    }
    Ok(seller.subscription)
}

pub fn do_get_subscription(env: &Env, owner: Address) -> Result<Subscription, Error> {
    Ok(reconciled_seller(env, &owner, clock::now(env))?.subscription)
}

pub fn do_cancel_subscription(env: &Env, owner: Address) -> Result<Subscription, Error> {
    owner.require_auth();
    let mut seller = reconciled_seller(env, &owner, clock::now(env))?;
    state_machine::cancel(env, &mut seller.subscription)?;
    storage::save_seller(env, &seller);

    env.events().publish(
        (Symbol::new(env, "subscription_cancelled"), owner),
        seller.subscription.plan,
    );
    Ok(seller.subscription)
}

pub fn publish_activation(env: &Env, owner: &Address, sub: &Subscription) {
    if let Some(plan) = sub.plan {
        env.events().publish(
            (Symbol::new(env, "subscription_activated"), owner.clone()),
            SubscriptionActivatedEvent {
                seller: owner.clone(),
                plan,
                start_date: sub.start_date,
                end_date: sub.end_date,
                transaction: sub.last_payment,
            },
        );
    }
}

fn publish_reconciliation(env: &Env, owner: &Address, before: &Subscription, after: &Subscription) {
    if after.status == SubscriptionStatus::Expired {
        log!(env, "subscription expired: {}", owner.clone());
        env.events().publish(
            (Symbol::new(env, "subscription_expired"), owner.clone()),
            SubscriptionExpiredEvent {
                seller: owner.clone(),
                plan: after.plan,
                end_date: after.end_date,
            },
        );
    } else if after.start_date != before.start_date {
        log!(env, "queued plan activated: {}", owner.clone());
        publish_activation(env, owner, after);
    }
}
