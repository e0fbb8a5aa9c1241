// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission calculation.
//!
//! The commission is computed exactly, then posted in two rounded legs:
//! the tax goes to the agency tax passage account and the rest of the
//! rounded commission goes to the collector's waiting account.

use crate::engine::{post_between, require_account};
use crate::error::CoreError;
use crate::store::LedgerStore;
use collecte_domain::{
    Account, AccountKind, Client, ClientId, Collector, CollectorId, CommissionAmounts,
    CommissionHistory, CommissionParameter, CommissionResult, Direction, MovementKind,
    MovementRequest, NewCommissionHistory, ParameterScope, Period, RemunerationPolicy,
    checked_amount, compute_commission, resolve_parameter,
};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

/// Outcome of a batch calculation for one collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorCommission {
    /// The `COLLECTEUR_GLOBAL` aggregate.
    pub global: CommissionResult,
    /// Per-client results, for clients with collected deposits.
    pub clients: Vec<CommissionResult>,
    /// The stored history record.
    pub history: CommissionHistory,
}

fn load_client<S: LedgerStore>(store: &mut S, client_id: ClientId) -> Result<Client, CoreError> {
    store
        .get_client(client_id)?
        .ok_or_else(|| CoreError::not_found("client", client_id))
}

/// Finds the most specific active parameter for a client.
fn resolve_for_client<S: LedgerStore>(
    store: &mut S,
    client: &Client,
) -> Result<CommissionParameter, CoreError> {
    let mut candidates: Vec<CommissionParameter> = Vec::with_capacity(3);
    for scope in [
        ParameterScope::Client(client.client_id),
        ParameterScope::Collector(client.collector_id),
        ParameterScope::Agency(client.agency_id),
    ] {
        if let Some(parameter) = store.find_commission_parameter(&scope)? {
            candidates.push(parameter);
        }
    }
    let parameter: CommissionParameter = resolve_parameter(
        &candidates,
        client.client_id,
        client.collector_id,
        client.agency_id,
    )
    .cloned()
    .ok_or_else(|| {
        CoreError::not_found("commission parameter", format!("client {}", client.client_id))
    })?;
    debug!(
        client_id = %client.client_id,
        parameter_id = parameter.parameter_id,
        scope = %parameter.scope,
        "Commission parameter resolved"
    );
    Ok(parameter)
}

/// Posts the tax and net legs of a commission, skipping zero legs.
fn post_commission<S: LedgerStore>(
    store: &mut S,
    client: &Client,
    amounts: &CommissionAmounts,
    period: &Period,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    let client_account: Account = require_account(store, &AccountKind::Client(client.client_id))?;
    let tax_account: Account = require_account(store, &AccountKind::PassageTax(client.agency_id))?;
    let waiting: Account =
        require_account(store, &AccountKind::CollectorWaiting(client.collector_id))?;

    let legs: [(Decimal, &Account, MovementKind, &str); 2] = [
        (amounts.posted_tax(), &tax_account, MovementKind::Tax, "Commission tax"),
        (
            amounts.posted_net(),
            &waiting,
            MovementKind::Commission,
            "Commission",
        ),
    ];
    for (amount, destination, kind, label) in legs {
        if amount <= Decimal::ZERO {
            continue;
        }
        let request: MovementRequest = MovementRequest::new(
            client_account.account_id,
            destination.account_id,
            amount,
            kind,
            Direction::Debit,
            format!("{label} client {} {period}", client.name),
            period.end(),
        );
        post_between(store, &request, now)?;
    }
    Ok(())
}

/// Calculates and posts the commission for one client on a given total.
///
/// A zero total yields a zero result and posts nothing.
///
/// # Arguments
///
/// * `store` - The store, inside an active transaction
/// * `policy` - Supplies the tax rate
/// * `client_id` - The client charged
/// * `period` - The period the commission covers
/// * `montant_total` - The collected amount the commission is based on
/// * `now` - Calculation timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The client or a required account does not exist
/// - No commission parameter applies
/// - The parameter is invalid (including malformed tiers)
/// - The client balance does not cover the commission
pub fn calculate_commission_for_client<S: LedgerStore>(
    store: &mut S,
    policy: &RemunerationPolicy,
    client_id: ClientId,
    period: &Period,
    montant_total: Decimal,
    now: OffsetDateTime,
) -> Result<CommissionResult, CoreError> {
    let client: Client = load_client(store, client_id)?;
    let parameter: CommissionParameter = resolve_for_client(store, &client)?;
    let amounts: CommissionAmounts =
        compute_commission(&parameter.rule, montant_total, policy.vat_rate)?;

    if amounts.commission > Decimal::ZERO {
        post_commission(store, &client, &amounts, period, now)?;
    }

    let result: CommissionResult = CommissionResult {
        montant_commission: amounts.commission,
        montant_tva: amounts.tva,
        montant_net: amounts.net,
        calculation_type: parameter.rule.calculation_type(),
        client_id: Some(client_id),
        collector_id: client.collector_id,
        period: *period,
        montant_total,
        calculated_at: now,
    };
    info!(
        client_id = %client_id,
        period = %period,
        montant_total = %montant_total,
        commission = %result.montant_commission,
        tva = %result.montant_tva,
        calculation_type = %result.calculation_type,
        "Commission calculated"
    );
    Ok(result)
}

/// Calculates the commission for one client on its deposits in the period.
///
/// # Errors
///
/// Returns any error of [`calculate_commission_for_client`].
pub fn calculate_commission_for_client_in_period<S: LedgerStore>(
    store: &mut S,
    policy: &RemunerationPolicy,
    client_id: ClientId,
    period: &Period,
    now: OffsetDateTime,
) -> Result<CommissionResult, CoreError> {
    let account: Account = require_account(store, &AccountKind::Client(client_id))?;
    let total: Decimal = store.sum_credited(account.account_id, MovementKind::Deposit, period)?;
    debug!(client_id = %client_id, period = %period, total = %total, "Deposits collected");
    calculate_commission_for_client(store, policy, client_id, period, total, now)
}

/// Calculates the commissions of every client of a collector for a period
/// and records the collector's history.
///
/// Clients without deposits in the period are skipped.
///
/// # Errors
///
/// Returns `Duplicate` if the period was already calculated for the
/// collector, or any error of [`calculate_commission_for_client`].
pub fn calculate_commissions_for_collector<S: LedgerStore>(
    store: &mut S,
    policy: &RemunerationPolicy,
    collector_id: CollectorId,
    period: &Period,
    now: OffsetDateTime,
) -> Result<CollectorCommission, CoreError> {
    let collector: Collector = store
        .get_collector(collector_id)?
        .ok_or_else(|| CoreError::not_found("collector", collector_id))?;
    if store
        .find_commission_history(collector_id, period)?
        .is_some()
    {
        return Err(CoreError::duplicate(
            "commission history",
            format!("collector {collector_id} for {period}"),
        ));
    }

    let mut results: Vec<CommissionResult> = Vec::new();
    for client in store.list_clients_of_collector(collector.collector_id)? {
        let account: Account = require_account(store, &AccountKind::Client(client.client_id))?;
        let total: Decimal =
            store.sum_credited(account.account_id, MovementKind::Deposit, period)?;
        if total.is_zero() {
            debug!(client_id = %client.client_id, "No deposits in period, skipping");
            continue;
        }
        results.push(calculate_commission_for_client(
            store,
            policy,
            client.client_id,
            period,
            total,
            now,
        )?);
    }

    let global: CommissionResult =
        CommissionResult::aggregate(collector_id, *period, &results, now)?;

    let charged: Vec<CommissionAmounts> = results
        .iter()
        .map(CommissionResult::amounts)
        .filter(|amounts| amounts.commission > Decimal::ZERO)
        .collect();
    let client_count: u32 = u32::try_from(charged.len())
        .map_err(|e| CoreError::InvalidOperation(format!("too many clients: {e}")))?;
    let history: CommissionHistory = store.insert_commission_history(&NewCommissionHistory {
        collector_id,
        period: *period,
        total_commission: checked_total(
            "posted commissions",
            charged.iter().map(|a| a.posted_tax() + a.posted_net()),
        )?,
        total_tax: checked_total("posted taxes", charged.iter().map(CommissionAmounts::posted_tax))?,
        client_count,
        calculated_at: now,
    })?;

    info!(
        collector_id = %collector_id,
        period = %period,
        client_count,
        total_commission = %history.total_commission,
        total_tax = %history.total_tax,
        "Collector commissions calculated"
    );
    Ok(CollectorCommission {
        global,
        clients: results,
        history,
    })
}

fn checked_total(what: &str, amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, CoreError> {
    let mut total: Decimal = Decimal::ZERO;
    for amount in amounts {
        total = checked_amount(&format!("summing {what}"), total.checked_add(amount))?;
    }
    Ok(total)
}
