// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Daily collection: journals, deposits and withdrawals.
//!
//! Deposits credit the client from the agency liaison account; withdrawals
//! do the reverse. Both are attached to the collector's journal for the
//! value date, which is opened on first use.

use crate::engine::{effectuer_mouvement, require_account};
use crate::error::CoreError;
use crate::store::LedgerStore;
use collecte_audit::NotificationEvent;
use collecte_domain::{
    Account, AccountKind, Client, ClientId, Collector, CollectorId, Direction, Journal, JournalId,
    JournalSummary, Movement, MovementKind, MovementRequest, RemunerationPolicy, round_money,
    summarize_journal, validate_positive_amount,
};
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

/// An account together with every movement touching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatement {
    /// The account.
    pub account: Account,
    /// Movements in insertion order.
    pub movements: Vec<Movement>,
}

/// The result of a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalOutcome {
    /// The posted movement.
    pub movement: Movement,
    /// Notification to publish once the transaction has committed.
    pub notification: Option<NotificationEvent>,
}

fn load_client<S: LedgerStore>(store: &mut S, client_id: ClientId) -> Result<Client, CoreError> {
    store
        .get_client(client_id)?
        .ok_or_else(|| CoreError::not_found("client", client_id))
}

fn load_collector<S: LedgerStore>(
    store: &mut S,
    collector_id: CollectorId,
) -> Result<Collector, CoreError> {
    store
        .get_collector(collector_id)?
        .ok_or_else(|| CoreError::not_found("collector", collector_id))
}

/// Opens a collector's journal for a day.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the collector does not exist and
/// `Duplicate` if the journal is already open or was closed.
pub fn open_journal<S: LedgerStore>(
    store: &mut S,
    collector_id: CollectorId,
    journal_date: Date,
    now: OffsetDateTime,
) -> Result<Journal, CoreError> {
    load_collector(store, collector_id)?;
    let journal: Journal = store.insert_journal(collector_id, journal_date, now)?;
    info!(
        journal_id = %journal.journal_id,
        collector_id = %collector_id,
        journal_date = %journal_date,
        "Journal opened"
    );
    Ok(journal)
}

/// Returns the collector's journal for a day, opening it if needed.
fn journal_for<S: LedgerStore>(
    store: &mut S,
    collector_id: CollectorId,
    journal_date: Date,
    now: OffsetDateTime,
) -> Result<Journal, CoreError> {
    if let Some(journal) = store.find_journal(collector_id, journal_date)? {
        debug!(journal_id = %journal.journal_id, "Using existing journal");
        return Ok(journal);
    }
    open_journal(store, collector_id, journal_date, now)
}

/// Closes a journal and summarises it.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the journal does not exist and
/// `InvalidOperation` if it is already closed.
pub fn close_journal<S: LedgerStore>(
    store: &mut S,
    journal_id: JournalId,
    now: OffsetDateTime,
) -> Result<JournalSummary, CoreError> {
    let journal: Journal = store
        .get_journal(journal_id)?
        .ok_or_else(|| CoreError::not_found("journal", journal_id))?;
    if journal.closed {
        return Err(CoreError::InvalidOperation(format!(
            "journal {journal_id} is already closed"
        )));
    }
    let closed: Journal = store.close_journal(journal_id, now)?;
    let movements: Vec<Movement> = store.movements_for_journal(journal_id)?;
    let summary: JournalSummary = summarize_journal(closed, &movements);
    info!(
        journal_id = %journal_id,
        movement_count = summary.movement_count,
        total_deposits = %summary.total_deposits,
        total_withdrawals = %summary.total_withdrawals,
        "Journal closed"
    );
    Ok(summary)
}

/// Records a client deposit collected by the client's collector.
///
/// # Errors
///
/// Returns an error if the amount is not positive, the client or its
/// accounts do not exist, or the day's journal is closed.
pub fn deposit<S: LedgerStore>(
    store: &mut S,
    client_id: ClientId,
    amount: Decimal,
    operation_date: Date,
    now: OffsetDateTime,
) -> Result<Movement, CoreError> {
    validate_positive_amount("amount", amount)?;
    let client: Client = load_client(store, client_id)?;
    let journal: Journal = journal_for(store, client.collector_id, operation_date, now)?;
    let liaison: Account = require_account(store, &AccountKind::AgencyLiaison(client.agency_id))?;
    let account: Account = require_account(store, &AccountKind::Client(client_id))?;

    let request: MovementRequest = MovementRequest::new(
        liaison.account_id,
        account.account_id,
        amount,
        MovementKind::Deposit,
        Direction::Credit,
        format!("Deposit client {}", client.name),
        operation_date,
    )
    .in_journal(journal.journal_id);
    let movement: Movement = effectuer_mouvement(store, &request, now)?;
    info!(
        client_id = %client_id,
        collector_id = %client.collector_id,
        amount = %movement.amount,
        "Deposit recorded"
    );
    Ok(movement)
}

/// Pays out a client withdrawal.
///
/// The collector's maximum is checked before the balance, so an amount
/// above the maximum fails even when the client could cover it.
///
/// # Errors
///
/// Returns an error if:
/// - The amount is not positive
/// - The client, collector or accounts do not exist
/// - The amount exceeds the collector's maximum withdrawal
/// - The client balance does not cover the amount
/// - The day's journal is closed
pub fn withdraw<S: LedgerStore>(
    store: &mut S,
    policy: &RemunerationPolicy,
    client_id: ClientId,
    amount: Decimal,
    operation_date: Date,
    now: OffsetDateTime,
) -> Result<WithdrawalOutcome, CoreError> {
    validate_positive_amount("amount", amount)?;
    let client: Client = load_client(store, client_id)?;
    let collector: Collector = load_collector(store, client.collector_id)?;

    let requested: Decimal = round_money(amount);
    if requested > collector.max_withdrawal {
        return Err(CoreError::MaxWithdrawalExceeded {
            collector: collector.collector_id.value(),
            max: collector.max_withdrawal,
            requested,
        });
    }

    let journal: Journal = journal_for(store, collector.collector_id, operation_date, now)?;
    let account: Account = require_account(store, &AccountKind::Client(client_id))?;
    let liaison: Account = require_account(store, &AccountKind::AgencyLiaison(client.agency_id))?;

    let request: MovementRequest = MovementRequest::new(
        account.account_id,
        liaison.account_id,
        requested,
        MovementKind::Withdrawal,
        Direction::Debit,
        format!("Withdrawal client {}", client.name),
        operation_date,
    )
    .in_journal(journal.journal_id);
    let movement: Movement = effectuer_mouvement(store, &request, now)?;
    info!(
        client_id = %client_id,
        collector_id = %collector.collector_id,
        amount = %movement.amount,
        "Withdrawal recorded"
    );

    let notification: Option<NotificationEvent> = policy
        .is_large_withdrawal(movement.amount)
        .then(|| NotificationEvent::LargeWithdrawal {
            client_id,
            collector_id: collector.collector_id,
            agency_id: client.agency_id,
            amount: movement.amount,
            threshold: policy.large_withdrawal_threshold,
            occurred_on: operation_date,
        });
    Ok(WithdrawalOutcome {
        movement,
        notification,
    })
}

/// Returns an account and its movements.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the account does not exist.
pub fn account_statement<S: LedgerStore>(
    store: &mut S,
    kind: &AccountKind,
) -> Result<AccountStatement, CoreError> {
    let account: Account = require_account(store, kind)?;
    let movements: Vec<Movement> = store.movements_for_account(account.account_id)?;
    Ok(AccountStatement { account, movements })
}
