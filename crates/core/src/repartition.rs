// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission repartition.
//!
//! Drains a collector's waiting account for a calculated period into the
//! salary account, the agency tax passage account and the agency product
//! account. A repartition runs at most once per collector and period.
//!
//! Legs are posted through [`post_between`], so an account held by another
//! agency is reached through the liaison account.

use crate::engine::{post_between, require_account};
use crate::error::CoreError;
use crate::store::LedgerStore;
use collecte_domain::{
    Account, AccountKind, AgencyId, Collector, CollectorId, CommissionHistory, CommissionResult,
    Direction, HistoryStatus, MovementKind, MovementRequest, NewRemuneration, Period,
    Remuneration, RemunerationPlan, RemunerationPolicy, Rubrique, plan_remuneration,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Accounts touched by a repartition, resolved before any posting.
struct RepartitionAccounts {
    waiting: Account,
    salary: Account,
    charge: Account,
    product: Account,
    passage_tax: Account,
}

impl RepartitionAccounts {
    fn resolve<S: LedgerStore>(store: &mut S, collector: &Collector) -> Result<Self, CoreError> {
        let agency: AgencyId = collector.agency_id;
        // The service and liaison accounts are not posted to but must exist.
        require_account(store, &AccountKind::CollectorService(collector.collector_id))?;
        require_account(store, &AccountKind::AgencyLiaison(agency))?;
        Ok(Self {
            waiting: require_account(
                store,
                &AccountKind::CollectorWaiting(collector.collector_id),
            )?,
            salary: require_account(
                store,
                &AccountKind::CollectorSalary(collector.collector_id),
            )?,
            charge: require_account(store, &AccountKind::Charge(agency))?,
            product: require_account(store, &AccountKind::Product(agency))?,
            passage_tax: require_account(store, &AccountKind::PassageTax(agency))?,
        })
    }
}

fn applicable_rubriques<S: LedgerStore>(
    store: &mut S,
    collector_id: CollectorId,
    period: &Period,
) -> Result<Vec<Rubrique>, CoreError> {
    let mut applicable: Vec<Rubrique> = Vec::new();
    for rubrique in store.list_rubriques()? {
        if rubrique.applies_to(collector_id, period)? {
            applicable.push(rubrique);
        }
    }
    Ok(applicable)
}

/// Distributes a collector's calculated commissions for a period.
///
/// # Arguments
///
/// * `store` - The store, inside an active transaction
/// * `policy` - Rates and seniority rules
/// * `collector_id` - The collector
/// * `period` - The calculated period
/// * `now` - Remuneration timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The collector, its history for the period, or a required account does
///   not exist
/// - The period was already remunerated
/// - The policy is invalid
pub fn repartir_commissions<S: LedgerStore>(
    store: &mut S,
    policy: &RemunerationPolicy,
    collector_id: CollectorId,
    period: &Period,
    now: OffsetDateTime,
) -> Result<Remuneration, CoreError> {
    let collector: Collector = store
        .get_collector(collector_id)?
        .ok_or_else(|| CoreError::not_found("collector", collector_id))?;

    let key: String = format!("collector {collector_id} for {period}");
    if store.find_remuneration(collector_id, period)?.is_some() {
        return Err(CoreError::duplicate("remuneration", &key));
    }
    let history: CommissionHistory = store
        .find_commission_history(collector_id, period)?
        .ok_or_else(|| CoreError::not_found("commission history", &key))?;
    if history.status == HistoryStatus::Remunere {
        return Err(CoreError::duplicate("remuneration", &key));
    }

    let accounts: RepartitionAccounts = RepartitionAccounts::resolve(store, &collector)?;
    let rubriques: Vec<Rubrique> = applicable_rubriques(store, collector_id, period)?;
    debug!(
        collector_id = %collector_id,
        rubrique_count = rubriques.len(),
        "Applicable rubriques loaded"
    );

    let plan: RemunerationPlan = plan_remuneration(
        policy,
        history.total_commission,
        history.net_pool(),
        collector.seniority_months,
        &rubriques,
    )?;

    let legs: [(Decimal, &Account, &Account, MovementKind, &str); 5] = [
        (
            plan.from_waiting,
            &accounts.waiting,
            &accounts.salary,
            MovementKind::Remuneration,
            "Salary",
        ),
        (
            plan.top_up,
            &accounts.charge,
            &accounts.salary,
            MovementKind::Remuneration,
            "Salary top-up",
        ),
        (
            plan.emf_tax,
            &accounts.waiting,
            &accounts.passage_tax,
            MovementKind::Tax,
            "EMF share tax",
        ),
        (
            plan.emf_product,
            &accounts.waiting,
            &accounts.product,
            MovementKind::Remuneration,
            "EMF share",
        ),
        (
            plan.retained,
            &accounts.waiting,
            &accounts.product,
            MovementKind::Remuneration,
            "Retained",
        ),
    ];
    for (amount, source, destination, kind, label) in legs {
        if amount <= Decimal::ZERO {
            continue;
        }
        let request: MovementRequest = MovementRequest::new(
            source.account_id,
            destination.account_id,
            amount,
            kind,
            Direction::Credit,
            format!("{label} collector {} {period}", collector.name),
            period.end(),
        );
        post_between(store, &request, now)?;
    }

    let remuneration: Remuneration = store.insert_remuneration(&NewRemuneration {
        collector_id,
        period: *period,
        plan,
        created_at: now,
    })?;
    store.mark_history_remunerated(history.history_id, remuneration.remuneration_id, now)?;

    info!(
        collector_id = %collector_id,
        period = %period,
        remuneration_id = remuneration.remuneration_id,
        base = %remuneration.base,
        salary_paid = %remuneration.salary_paid,
        top_up = %remuneration.top_up,
        emf_share = %remuneration.emf_share,
        retained = %remuneration.retained,
        "Commissions distributed"
    );
    Ok(remuneration)
}

/// Distributes the commissions described by a calculation result.
///
/// # Errors
///
/// Returns any error of [`repartir_commissions`].
pub fn process_repartition<S: LedgerStore>(
    store: &mut S,
    policy: &RemunerationPolicy,
    result: &CommissionResult,
    now: OffsetDateTime,
) -> Result<Remuneration, CoreError> {
    repartir_commissions(store, policy, result.collector_id, &result.period, now)
}
