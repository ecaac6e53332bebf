//! Subscription state machine: transition table plus the pure transitions
//! (select, confirm, reconcile, cancel) applied to an in-memory [`Subscription`].
//!
//! Nothing here touches storage or reads the clock. Callers load the seller,
//! apply one of these, and write the seller back in a single step.

use crate::catalog::{baseline_features, zeroed_features, PlanCatalog};
use crate::clock::add_days;
use crate::types::{Error, FeatureBundle, Plan, QueuedPlan, Subscription, SubscriptionStatus};
use soroban_sdk::{Env, Vec};

/// Validates if a status transition is allowed by the state machine.
///
/// # State Transition Rules
///
/// | From           | To                                        |
/// |----------------|-------------------------------------------|
/// | Inactive       | PendingPayment, Active                    |
/// | PendingPayment | Active, Cancelled                         |
/// | Active         | PendingPayment, Expired, Cancelled        |
/// | Expired        | PendingPayment, Active                    |
/// | Cancelled      | PendingPayment, Active                    |
/// | *any*          | Same status (idempotent)                  |
pub fn validate_status_transition(
    from: &SubscriptionStatus,
    to: &SubscriptionStatus,
) -> Result<(), Error> {
    if from == to || get_allowed_transitions(from).contains(to) {
        Ok(())
    } else {
        Err(Error::InvalidStatusTransition)
    }
}

/// Returns all valid target statuses for a given current status.
pub fn get_allowed_transitions(status: &SubscriptionStatus) -> &'static [SubscriptionStatus] {
    match status {
        SubscriptionStatus::Inactive => &[
            SubscriptionStatus::PendingPayment,
            SubscriptionStatus::Active,
        ],
        SubscriptionStatus::PendingPayment => {
            &[SubscriptionStatus::Active, SubscriptionStatus::Cancelled]
        }
        SubscriptionStatus::Active => &[
            SubscriptionStatus::PendingPayment,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Cancelled,
        ],
        SubscriptionStatus::Expired | SubscriptionStatus::Cancelled => &[
            SubscriptionStatus::PendingPayment,
            SubscriptionStatus::Active,
        ],
    }
}

pub fn can_transition(from: &SubscriptionStatus, to: &SubscriptionStatus) -> bool {
    validate_status_transition(from, to).is_ok()
}

/// Outcome of a package selection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Appended to the queue behind the active plan.
    Queued,
    /// Awaiting payment (or an immediate commit for the free tier).
    Pending,
}

/// Outcome of a payment confirmation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Confirmation {
    Activated,
    Queued { start_date: u64, end_date: u64 },
}

/// Subscription of a freshly registered seller.
pub fn inactive_subscription(env: &Env) -> Subscription {
    Subscription {
        plan: None,
        status: SubscriptionStatus::Inactive,
        start_date: 0,
        end_date: 0,
        features: zeroed_features(env),
        last_payment: None,
        queued_plans: Vec::new(env),
    }
}

/// The plan currently in force, if any. Lapsed, pending and cancelled
/// subscriptions hold no current plan.
pub fn current_plan(sub: &Subscription) -> Option<Plan> {
    match sub.status {
        SubscriptionStatus::Active => sub.plan,
        _ => None,
    }
}

/// Highest tier the seller holds or has already paid to queue.
pub fn committed_plan(sub: &Subscription) -> Option<Plan> {
    let current = current_plan(sub)?;
    Some(
        sub.queued_plans
            .iter()
            .filter(|q| q.transaction.is_some())
            .map(|q| q.plan)
            .fold(current, |best, p| {
                if p.priority() > best.priority() {
                    p
                } else {
                    best
                }
            }),
    )
}

/// Only tiers strictly above everything in force or paid for may be bought,
/// so a queued purchase never steps the seller down.
pub fn check_upgrade(sub: &Subscription, plan: Plan) -> Result<(), Error> {
    match committed_plan(sub) {
        Some(held) if plan.priority() <= held.priority() => Err(Error::InvalidUpgrade),
        _ => Ok(()),
    }
}

pub fn select_package(
    sub: &mut Subscription,
    catalog: &PlanCatalog,
    plan: Plan,
    queue: bool,
    now: u64,
) -> Result<Selection, Error> {
    check_upgrade(sub, plan)?;
    let entry = catalog.entry(plan)?;

    if queue && sub.status == SubscriptionStatus::Active {
        if placeholder_index(sub, plan).is_some() {
            return Err(Error::AlreadyPending);
        }
        sub.queued_plans.push_back(QueuedPlan {
            plan,
            transaction: None,
            start_date: 0,
            end_date: 0,
            features: entry.features,
        });
        return Ok(Selection::Queued);
    }

    // Replacing a running plan forfeits its remaining days and anything queued behind it.
    validate_status_transition(&sub.status, &SubscriptionStatus::PendingPayment)?;
    sub.queued_plans = Vec::new(sub.queued_plans.env());
    sub.status = SubscriptionStatus::PendingPayment;
    sub.plan = Some(plan);
    sub.start_date = now;
    sub.end_date = add_days(now, entry.duration_days)?;
    sub.features = entry.features;
    Ok(Selection::Pending)
}

/// Validity window a confirmed purchase of `plan` would get at `now`.
///
/// While the current plan is still running the purchase starts when the last
/// paid queued plan (or the current plan) ends; otherwise it starts at `now`.
pub fn confirmation_window(
    sub: &Subscription,
    catalog: &PlanCatalog,
    plan: Plan,
    now: u64,
) -> Result<(u64, u64), Error> {
    let days = catalog.duration_days(plan)?;
    let start = if runs_past(sub, now) {
        queue_tail(sub)
    } else {
        now
    };
    Ok((start, add_days(start, days)?))
}

/// Commits a verified purchase of `plan`, queueing it behind a running plan.
pub fn confirm_payment(
    sub: &mut Subscription,
    catalog: &PlanCatalog,
    plan: Plan,
    transaction: Option<u32>,
    now: u64,
) -> Result<Confirmation, Error> {
    let features = catalog.features_for(plan)?;
    let (start_date, end_date) = confirmation_window(sub, catalog, plan, now)?;

    if runs_past(sub, now) {
        let paid = QueuedPlan {
            plan,
            transaction,
            start_date,
            end_date,
            features,
        };
        // Paid entries stay in start-date order; the placeholder only marked intent.
        if let Some(i) = placeholder_index(sub, plan) {
            sub.queued_plans.remove(i);
        }
        sub.queued_plans.push_back(paid);
        return Ok(Confirmation::Queued {
            start_date,
            end_date,
        });
    }

    validate_status_transition(&sub.status, &SubscriptionStatus::Active)?;
    sub.status = SubscriptionStatus::Active;
    sub.plan = Some(plan);
    sub.start_date = start_date;
    sub.end_date = end_date;
    sub.features = features;
    sub.last_payment = transaction;
    Ok(Confirmation::Activated)
}

/// Applies any expiry that `now` has made due. Returns whether anything changed.
///
/// Paid queued plans run in the window recorded when they were paid for,
/// which starts where the previous plan ends. Unpaid
/// selections are dropped when reached. With nothing left to run the
/// subscription expires and falls back to the baseline bundle, keeping `plan`
/// for display. Running it again at the same `now` is a no-op.
pub fn reconcile(env: &Env, sub: &mut Subscription, now: u64) -> bool {
    let mut changed = false;
    while sub.status == SubscriptionStatus::Active && now > sub.end_date {
        changed = true;
        match pop_paid(sub) {
            Some(next) => {
                sub.plan = Some(next.plan);
                sub.start_date = next.start_date;
                sub.end_date = next.end_date;
                sub.features = next.features;
                sub.last_payment = next.transaction;
            }
            None => {
                sub.status = SubscriptionStatus::Expired;
                sub.features = baseline_features(env);
                sub.queued_plans = Vec::new(env);
            }
        }
    }
    changed
}

pub fn cancel(env: &Env, sub: &mut Subscription) -> Result<(), Error> {
    validate_status_transition(&sub.status, &SubscriptionStatus::Cancelled)?;
    sub.status = SubscriptionStatus::Cancelled;
    sub.features = zeroed_features(env);
    sub.queued_plans = Vec::new(env);
    Ok(())
}

/// Bundle the enforcer should consult. Only an active plan or the post-expiry
/// baseline grants anything; pending and cancelled subscriptions grant nothing.
pub fn effective_features(env: &Env, sub: &Subscription) -> FeatureBundle {
    match sub.status {
        SubscriptionStatus::Active | SubscriptionStatus::Expired => sub.features.clone(),
        _ => zeroed_features(env),
    }
}

fn runs_past(sub: &Subscription, now: u64) -> bool {
    sub.status == SubscriptionStatus::Active && sub.end_date > now
}

fn queue_tail(sub: &Subscription) -> u64 {
    sub.queued_plans
        .iter()
        .filter(|q| q.transaction.is_some())
        .map(|q| q.end_date)
        .fold(sub.end_date, u64::max)
}

fn placeholder_index(sub: &Subscription, plan: Plan) -> Option<u32> {
    sub.queued_plans
        .iter()
        .position(|q| q.plan == plan && q.transaction.is_none())
        .map(|i| i as u32)
}

fn pop_paid(sub: &mut Subscription) -> Option<QueuedPlan> {
    while let Some(next) = sub.queued_plans.pop_front() {
        if next.transaction.is_some() {
            return Some(next);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DAY_SECONDS;

    const T0: u64 = 1_700_000_000;

    fn active(env: &Env, catalog: &PlanCatalog, plan: Plan, now: u64) -> Subscription {
        let mut sub = inactive_subscription(env);
        select_package(&mut sub, catalog, plan, false, now).unwrap();
        confirm_payment(&mut sub, catalog, plan, Some(1), now).unwrap();
        sub
    }

    #[test]
    fn transition_table() {
        use SubscriptionStatus::*;
        assert!(can_transition(&Inactive, &PendingPayment));
        assert!(can_transition(&PendingPayment, &Active));
        assert!(can_transition(&Active, &Expired));
        assert!(can_transition(&Expired, &PendingPayment));
        assert!(can_transition(&Active, &Active));
        assert!(!can_transition(&Inactive, &Expired));
        assert!(!can_transition(&Inactive, &Cancelled));
        assert!(!can_transition(&PendingPayment, &Expired));
        assert_eq!(
            validate_status_transition(&Expired, &Cancelled),
            Err(Error::InvalidStatusTransition)
        );
    }

    #[test]
    fn upgrade_only_moves_up() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);

        let mut gallop = active(&env, &catalog, Plan::Gallop, T0);
        assert_eq!(
            select_package(&mut gallop, &catalog, Plan::Trot, false, T0),
            Err(Error::InvalidUpgrade)
        );
        assert_eq!(
            select_package(&mut gallop, &catalog, Plan::Gallop, true, T0),
            Err(Error::InvalidUpgrade)
        );

        let mut trot = active(&env, &catalog, Plan::Trot, T0);
        assert_eq!(
            select_package(&mut trot, &catalog, Plan::Gallop, false, T0),
            Ok(Selection::Pending)
        );
    }

    #[test]
    fn any_plan_is_allowed_without_a_current_plan() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        for plan in [Plan::Free, Plan::Trot, Plan::Gallop, Plan::RoyalStallion] {
            let mut sub = inactive_subscription(&env);
            assert_eq!(
                select_package(&mut sub, &catalog, plan, false, T0),
                Ok(Selection::Pending)
            );
            assert_eq!(sub.status, SubscriptionStatus::PendingPayment);
        }
    }

    #[test]
    fn lapsed_plan_does_not_block_a_lower_tier() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::RoyalStallion, T0);
        assert!(reconcile(&env, &mut sub, T0 + 31 * DAY_SECONDS));
        assert_eq!(
            select_package(&mut sub, &catalog, Plan::Trot, false, T0 + 31 * DAY_SECONDS),
            Ok(Selection::Pending)
        );
    }

    #[test]
    fn pending_window_uses_plan_duration() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);

        let mut free = inactive_subscription(&env);
        select_package(&mut free, &catalog, Plan::Free, false, T0).unwrap();
        assert_eq!(free.end_date, T0 + 7 * DAY_SECONDS);

        let mut trot = inactive_subscription(&env);
        select_package(&mut trot, &catalog, Plan::Trot, false, T0).unwrap();
        assert_eq!(trot.end_date, T0 + 30 * DAY_SECONDS);
        assert_eq!(trot.features, catalog.features_for(Plan::Trot).unwrap());
    }

    #[test]
    fn queued_plan_activates_at_previous_end() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        let t = sub.end_date;

        assert_eq!(
            select_package(&mut sub, &catalog, Plan::Gallop, true, T0),
            Ok(Selection::Queued)
        );
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan, Some(Plan::Trot));

        let confirmed = confirm_payment(&mut sub, &catalog, Plan::Gallop, Some(2), T0).unwrap();
        assert_eq!(
            confirmed,
            Confirmation::Queued {
                start_date: t,
                end_date: t + 30 * DAY_SECONDS
            }
        );
        assert_eq!(sub.queued_plans.len(), 1);

        assert!(reconcile(&env, &mut sub, t + 1));
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan, Some(Plan::Gallop));
        assert_eq!(sub.start_date, t);
        assert_eq!(sub.end_date, t + 30 * DAY_SECONDS);
        assert_eq!(sub.last_payment, Some(2));
        assert_eq!(sub.features, catalog.features_for(Plan::Gallop).unwrap());
        assert!(sub.queued_plans.is_empty());
    }

    #[test]
    fn unpaid_selection_is_not_activated() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        select_package(&mut sub, &catalog, Plan::Gallop, true, T0).unwrap();

        let after = sub.end_date + 1;
        assert!(reconcile(&env, &mut sub, after));
        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert_eq!(sub.plan, Some(Plan::Trot));
        assert_eq!(sub.features, baseline_features(&env));
        assert!(sub.queued_plans.is_empty());
    }

    #[test]
    fn long_absence_runs_through_the_whole_queue() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        confirm_payment(&mut sub, &catalog, Plan::Gallop, Some(2), T0).unwrap();
        confirm_payment(&mut sub, &catalog, Plan::RoyalStallion, Some(3), T0).unwrap();

        let rs = sub.queued_plans.get(1).unwrap();
        assert_eq!(rs.start_date, T0 + 60 * DAY_SECONDS);

        assert!(reconcile(&env, &mut sub, T0 + 65 * DAY_SECONDS));
        assert_eq!(sub.plan, Some(Plan::RoyalStallion));
        assert_eq!(sub.start_date, T0 + 60 * DAY_SECONDS);

        assert!(reconcile(&env, &mut sub, T0 + 200 * DAY_SECONDS));
        assert_eq!(sub.status, SubscriptionStatus::Expired);
    }

    #[test]
    fn paid_placeholder_moves_behind_earlier_purchases() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        let t = sub.end_date;
        let month = 30 * DAY_SECONDS;

        select_package(&mut sub, &catalog, Plan::Gallop, true, T0).unwrap();
        confirm_payment(&mut sub, &catalog, Plan::RoyalStallion, Some(2), T0).unwrap();
        confirm_payment(&mut sub, &catalog, Plan::Gallop, Some(3), T0).unwrap();

        assert_eq!(sub.queued_plans.len(), 2);
        let first = sub.queued_plans.get(0).unwrap();
        let second = sub.queued_plans.get(1).unwrap();
        assert_eq!((first.plan, first.start_date, first.end_date), (Plan::RoyalStallion, t, t + month));
        assert_eq!((second.plan, second.start_date), (Plan::Gallop, t + month));

        reconcile(&env, &mut sub, t + 1);
        assert_eq!(sub.plan, Some(Plan::RoyalStallion));
        assert_eq!((sub.start_date, sub.end_date), (t, t + month));
        assert_eq!(sub.last_payment, Some(2));

        reconcile(&env, &mut sub, t + month + 1);
        assert_eq!(sub.plan, Some(Plan::Gallop));
        assert_eq!((sub.start_date, sub.end_date), (t + month, t + 2 * month));
        assert_eq!(sub.last_payment, Some(3));
    }

    #[test]
    fn paid_queue_raises_the_upgrade_floor() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        confirm_payment(&mut sub, &catalog, Plan::RoyalStallion, Some(2), T0).unwrap();

        assert_eq!(committed_plan(&sub), Some(Plan::RoyalStallion));
        assert_eq!(check_upgrade(&sub, Plan::Gallop), Err(Error::InvalidUpgrade));
        assert_eq!(
            select_package(&mut sub, &catalog, Plan::Gallop, true, T0),
            Err(Error::InvalidUpgrade)
        );
    }

    #[test]
    fn one_placeholder_per_tier() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        select_package(&mut sub, &catalog, Plan::Gallop, true, T0).unwrap();
        assert_eq!(
            select_package(&mut sub, &catalog, Plan::Gallop, true, T0),
            Err(Error::AlreadyPending)
        );
        assert_eq!(sub.queued_plans.len(), 1);
    }

    #[test]
    fn replacing_a_running_plan_drops_its_queue() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        confirm_payment(&mut sub, &catalog, Plan::Gallop, Some(2), T0).unwrap();

        select_package(&mut sub, &catalog, Plan::RoyalStallion, false, T0).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::PendingPayment);
        assert!(sub.queued_plans.is_empty());
        assert_eq!(effective_features(&env, &sub), zeroed_features(&env));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Gallop, T0);
        let later = sub.end_date + 10;

        assert!(reconcile(&env, &mut sub, later));
        let snapshot = sub.clone();
        assert!(!reconcile(&env, &mut sub, later));
        assert_eq!(sub, snapshot);
    }

    #[test]
    fn reconcile_leaves_running_plan_alone() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Gallop, T0);
        let end = sub.end_date;
        assert!(!reconcile(&env, &mut sub, end));
        assert_eq!(sub.status, SubscriptionStatus::Active);
    }

    #[test]
    fn confirm_after_expiry_commits_immediately() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Trot, T0);
        let later = sub.end_date + DAY_SECONDS;
        reconcile(&env, &mut sub, later);

        assert_eq!(
            confirm_payment(&mut sub, &catalog, Plan::Trot, Some(9), later),
            Ok(Confirmation::Activated)
        );
        assert_eq!(sub.start_date, later);
        assert_eq!(sub.last_payment, Some(9));
    }

    #[test]
    fn granted_bundles_do_not_alias() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut first = active(&env, &catalog, Plan::Gallop, T0);
        let second = active(&env, &catalog, Plan::Gallop, T0);

        first.features.badges.push_back(soroban_sdk::String::from_str(&env, "Edited"));
        first.features.max_photos = 1;

        assert_eq!(second.features, catalog.features_for(Plan::Gallop).unwrap());
    }

    #[test]
    fn cancel_zeroes_entitlements() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = active(&env, &catalog, Plan::Gallop, T0);
        confirm_payment(&mut sub, &catalog, Plan::RoyalStallion, Some(5), T0).unwrap();

        cancel(&env, &mut sub).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert!(sub.queued_plans.is_empty());
        assert_eq!(effective_features(&env, &sub).max_listings, 0);
        assert_eq!(cancel(&env, &mut inactive_subscription(&env)), Err(Error::InvalidStatusTransition));
    }

    #[test]
    fn pending_subscription_grants_nothing() {
        let env = Env::default();
        let catalog = PlanCatalog::standard(&env);
        let mut sub = inactive_subscription(&env);
        select_package(&mut sub, &catalog, Plan::RoyalStallion, false, T0).unwrap();
        assert_eq!(sub.features.max_photos, 20);
        assert_eq!(effective_features(&env, &sub), zeroed_features(&env));
    }
}
