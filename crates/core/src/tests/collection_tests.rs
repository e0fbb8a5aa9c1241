// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{Fixture, day};
use crate::{AccountStatement, CoreError, LedgerStore};
use collecte_audit::NotificationEvent;
use collecte_domain::{
    AccountKind, CollectorId, DomainError, Journal, JournalSummary, Movement, MovementKind,
};
use rust_decimal_macros::dec;
use time::macros::date;

#[test]
fn test_deposit_opens_the_day_journal_once() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(100));
    fixture.deposit(dec!(200));

    let journal: Journal = fixture
        .ledger
        .store_mut()
        .find_journal(fixture.collector.collector_id, day())
        .unwrap()
        .unwrap();
    let movements: Vec<Movement> = fixture
        .ledger
        .store_mut()
        .movements_for_journal(journal.journal_id)
        .unwrap();
    assert!(!journal.closed);
    assert_eq!(movements.len(), 2);
    assert!(movements.iter().all(|m| m.kind == MovementKind::Deposit));
}

#[test]
fn test_opening_an_existing_journal_is_a_duplicate() {
    let mut fixture: Fixture = Fixture::new();
    let collector_id: CollectorId = fixture.collector.collector_id;
    fixture
        .ledger
        .open_journal(&fixture.ctx, collector_id, day())
        .unwrap();

    let result: Result<Journal, CoreError> =
        fixture.ledger.open_journal(&fixture.ctx, collector_id, day());

    assert!(matches!(result, Err(CoreError::Duplicate { .. })));
}

#[test]
fn test_open_journal_for_unknown_collector_fails() {
    let mut fixture: Fixture = Fixture::new();
    let result: Result<Journal, CoreError> = fixture.ledger.open_journal(
        &fixture.ctx,
        CollectorId::new(404),
        day(),
    );
    assert!(matches!(result, Err(CoreError::ResourceNotFound { .. })));
}

#[test]
fn test_close_journal_summarises_movements() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(1000));
    fixture.deposit(dec!(500));
    fixture
        .ledger
        .withdraw(&fixture.ctx, fixture.client.client_id, dec!(300), day())
        .unwrap();
    let journal: Journal = fixture
        .ledger
        .store_mut()
        .find_journal(fixture.collector.collector_id, day())
        .unwrap()
        .unwrap();

    let summary: JournalSummary = fixture
        .ledger
        .close_journal(&fixture.ctx, journal.journal_id)
        .unwrap();

    assert!(summary.journal.closed);
    assert!(summary.journal.closed_at.is_some());
    assert_eq!(summary.movement_count, 3);
    assert_eq!(summary.total_deposits, dec!(1500));
    assert_eq!(summary.total_withdrawals, dec!(300));
}

#[test]
fn test_closing_twice_is_invalid() {
    let mut fixture: Fixture = Fixture::new();
    let journal: Journal = fixture
        .ledger
        .open_journal(&fixture.ctx, fixture.collector.collector_id, day())
        .unwrap();
    fixture
        .ledger
        .close_journal(&fixture.ctx, journal.journal_id)
        .unwrap();

    let result: Result<JournalSummary, CoreError> =
        fixture.ledger.close_journal(&fixture.ctx, journal.journal_id);

    assert!(matches!(result, Err(CoreError::InvalidOperation(_))));
}

#[test]
fn test_closed_journal_rejects_movements() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(100));
    let journal: Journal = fixture
        .ledger
        .store_mut()
        .find_journal(fixture.collector.collector_id, day())
        .unwrap()
        .unwrap();
    fixture
        .ledger
        .close_journal(&fixture.ctx, journal.journal_id)
        .unwrap();

    let result: Result<Movement, CoreError> =
        fixture
            .ledger
            .deposit(&fixture.ctx, fixture.client.client_id, dec!(50), day());

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::JournalClosed { journal_id }))
            if journal_id == journal.journal_id.value()
    ));
    assert_eq!(fixture.client_balance(), dec!(100));
}

#[test]
fn test_next_day_gets_a_fresh_journal() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(100));
    let first: Journal = fixture
        .ledger
        .store_mut()
        .find_journal(fixture.collector.collector_id, day())
        .unwrap()
        .unwrap();
    fixture
        .ledger
        .close_journal(&fixture.ctx, first.journal_id)
        .unwrap();

    let movement: Movement = fixture
        .ledger
        .deposit(
            &fixture.ctx,
            fixture.client.client_id,
            dec!(40),
            date!(2026 - 03 - 03),
        )
        .unwrap();

    assert_ne!(movement.journal, Some(first.journal_id));
    assert!(movement.journal.is_some());
}

#[test]
fn test_deposit_rejects_non_positive_amounts() {
    let mut fixture: Fixture = Fixture::new();
    let result: Result<Movement, CoreError> =
        fixture
            .ledger
            .deposit(&fixture.ctx, fixture.client.client_id, dec!(0), day());
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::NonPositiveAmount { .. }))
    ));
}

#[test]
fn test_withdrawal_at_the_maximum_is_allowed() {
    let mut fixture: Fixture = Fixture::with_collector(12, dec!(50000));
    fixture.deposit(dec!(80000));

    let movement: Movement = fixture
        .ledger
        .withdraw(&fixture.ctx, fixture.client.client_id, dec!(50000), day())
        .unwrap();

    assert_eq!(movement.amount, dec!(50000));
    assert_eq!(movement.kind, MovementKind::Withdrawal);
    assert_eq!(fixture.client_balance(), dec!(30000));
}

#[test]
fn test_withdrawal_above_the_maximum_fails_even_with_funds() {
    let mut fixture: Fixture = Fixture::with_collector(12, dec!(50000));
    fixture.deposit(dec!(80000));

    let result: Result<Movement, CoreError> =
        fixture
            .ledger
            .withdraw(&fixture.ctx, fixture.client.client_id, dec!(50000.01), day());

    assert!(matches!(
        result,
        Err(CoreError::MaxWithdrawalExceeded { max, requested, .. })
            if max == dec!(50000) && requested == dec!(50000.01)
    ));
    assert_eq!(fixture.client_balance(), dec!(80000));
}

#[test]
fn test_large_withdrawal_publishes_a_notification() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(700000));

    fixture
        .ledger
        .withdraw(&fixture.ctx, fixture.client.client_id, dec!(500000), day())
        .unwrap();

    let events: Vec<NotificationEvent> = fixture.sink.events();
    assert_eq!(events.len(), 1);
    let NotificationEvent::LargeWithdrawal {
        client_id,
        amount,
        threshold,
        ..
    } = &events[0];
    assert_eq!(*client_id, fixture.client.client_id);
    assert_eq!(*amount, dec!(500000));
    assert_eq!(*threshold, dec!(500000));
}

#[test]
fn test_small_and_failed_withdrawals_publish_nothing() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(1000));
    fixture
        .ledger
        .withdraw(&fixture.ctx, fixture.client.client_id, dec!(999), day())
        .unwrap();
    let failed: Result<Movement, CoreError> =
        fixture
            .ledger
            .withdraw(&fixture.ctx, fixture.client.client_id, dec!(600000), day());

    assert!(failed.is_err());
    assert!(fixture.sink.events().is_empty());
}

#[test]
fn test_statement_lists_account_movements() {
    let mut fixture: Fixture = Fixture::new();
    fixture.deposit(dec!(100));
    fixture.deposit(dec!(50));

    let statement: AccountStatement = fixture
        .ledger
        .account_statement(&AccountKind::Client(fixture.client.client_id))
        .unwrap();

    assert_eq!(statement.account.balance, dec!(150));
    assert_eq!(statement.movements.len(), 2);
    assert_eq!(statement.movements[0].amount, dec!(100));
}
