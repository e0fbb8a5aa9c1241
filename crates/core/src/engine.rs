// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The movement engine.
//!
//! This is the only code that changes account balances. Each call debits one
//! account, credits another by the same rounded amount, and appends exactly
//! one movement. Callers are expected to run it inside
//! [`LedgerStore::atomically`] so that a failed step leaves no trace.

use crate::error::CoreError;
use crate::store::LedgerStore;
use collecte_domain::{
    Account, AccountId, AccountKind, AgencyId, Journal, Movement, MovementRequest,
    checked_amount,
};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Loads an account by identifier.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the account does not exist.
pub fn load_account<S: LedgerStore>(
    store: &mut S,
    account_id: AccountId,
) -> Result<Account, CoreError> {
    store
        .get_account(account_id)?
        .ok_or_else(|| CoreError::not_found("account", account_id))
}

/// Resolves an account by kind and owner.
///
/// # Errors
///
/// Returns `ResourceNotFound` if the account was never provisioned.
pub fn require_account<S: LedgerStore>(
    store: &mut S,
    kind: &AccountKind,
) -> Result<Account, CoreError> {
    debug!(kind = %kind, "Resolving account");
    store
        .find_account(kind)?
        .ok_or_else(|| CoreError::not_found("account", kind))
}

/// Moves money between two accounts.
///
/// # Arguments
///
/// * `store` - The store, inside an active transaction
/// * `request` - Source, destination, amount and labelling of the movement
/// * `now` - Timestamp recorded on the movement
///
/// # Errors
///
/// Returns an error if:
/// - The rounded amount is not positive, or source equals destination
/// - Either account does not exist
/// - The referenced journal does not exist or is closed
/// - A bounded source account does not cover the amount
/// - Either resulting balance leaves the representable range
/// - Either account was modified concurrently
pub fn effectuer_mouvement<S: LedgerStore>(
    store: &mut S,
    request: &MovementRequest,
    now: OffsetDateTime,
) -> Result<Movement, CoreError> {
    let amount: Decimal = request.posted_amount()?;

    let source: Account = load_account(store, request.source)?;
    let destination: Account = load_account(store, request.destination)?;

    if let Some(journal_id) = request.journal {
        let journal: Journal = store
            .get_journal(journal_id)?
            .ok_or_else(|| CoreError::not_found("journal", journal_id))?;
        journal.ensure_open()?;
    }

    if !source.can_debit(amount) {
        warn!(
            account = %source.account_number,
            balance = %source.balance,
            requested = %amount,
            "Insufficient balance"
        );
        return Err(CoreError::InsufficientBalance {
            account: source.account_number,
            balance: source.balance,
            requested: amount,
        });
    }

    // Both balances are computed before either write.
    let debited: Decimal = checked_amount(
        &format!("debiting {amount} from account {}", source.account_number),
        source.balance.checked_sub(amount),
    )?;
    let credited: Decimal = checked_amount(
        &format!("crediting {amount} to account {}", destination.account_number),
        destination.balance.checked_add(amount),
    )?;

    store.update_account_balance(source.account_id, source.version, debited)?;
    store.update_account_balance(destination.account_id, destination.version, credited)?;

    let posted: MovementRequest = MovementRequest {
        amount,
        ..request.clone()
    };
    let movement: Movement = store.insert_movement(&posted, now)?;

    debug!(
        movement_id = %movement.movement_id,
        source = %source.account_number,
        destination = %destination.account_number,
        amount = %amount,
        kind = movement.kind.as_str(),
        "Movement posted"
    );
    Ok(movement)
}

/// Moves money between two accounts, hopping through a liaison account when
/// they belong to different agencies.
///
/// The hop goes through the source agency's liaison account, whose balance
/// is unchanged once both legs are posted. Accounts in the same agency, and
/// transfers that already start from the source agency's liaison account,
/// produce a single movement.
///
/// # Errors
///
/// Returns any error of [`effectuer_mouvement`], or `ResourceNotFound` if the
/// liaison account is missing.
pub fn post_between<S: LedgerStore>(
    store: &mut S,
    request: &MovementRequest,
    now: OffsetDateTime,
) -> Result<Vec<Movement>, CoreError> {
    let source: Account = load_account(store, request.source)?;
    let destination: Account = load_account(store, request.destination)?;

    let hop_agency: Option<AgencyId> = match (source.agency_id, destination.agency_id) {
        (Some(from), Some(to))
            if from != to && source.kind != AccountKind::AgencyLiaison(from) =>
        {
            Some(from)
        }
        _ => None,
    };

    let Some(agency_id) = hop_agency else {
        return Ok(vec![effectuer_mouvement(store, request, now)?]);
    };

    let liaison: Account = require_account(store, &AccountKind::AgencyLiaison(agency_id))?;
    debug!(
        source = %source.account_number,
        destination = %destination.account_number,
        liaison = %liaison.account_number,
        "Routing inter-agency movement through liaison"
    );

    let first_leg: MovementRequest = MovementRequest {
        destination: liaison.account_id,
        ..request.clone()
    };
    let second_leg: MovementRequest = MovementRequest {
        source: liaison.account_id,
        ..request.clone()
    };
    Ok(vec![
        effectuer_mouvement(store, &first_leg, now)?,
        effectuer_mouvement(store, &second_leg, now)?,
    ])
}
