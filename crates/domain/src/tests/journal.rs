// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AccountId, CollectorId, Direction, DomainError, Journal, JournalId, JournalSummary, Movement,
    MovementId, MovementKind, MovementRequest, summarize_journal,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::{date, datetime};

fn journal(closed: bool) -> Journal {
    Journal {
        journal_id: JournalId::new(1),
        collector_id: CollectorId::new(1),
        journal_date: date!(2026 - 03 - 02),
        opened_at: datetime!(2026-03-02 07:00 UTC),
        closed,
        closed_at: None,
    }
}

fn movement(id: i64, journal: Option<i64>, kind: MovementKind, amount: Decimal) -> Movement {
    Movement {
        movement_id: MovementId::new(id),
        amount,
        label: String::from("test"),
        direction: Direction::Credit,
        kind,
        operation_date: date!(2026 - 03 - 02),
        source: AccountId::new(1),
        destination: AccountId::new(2),
        journal: journal.map(JournalId::new),
        version: 0,
        created_at: datetime!(2026-03-02 09:00 UTC),
    }
}

#[test]
fn test_closed_journal_rejects_movements() {
    assert!(journal(false).ensure_open().is_ok());
    assert!(matches!(
        journal(true).ensure_open(),
        Err(DomainError::JournalClosed { journal_id: 1 })
    ));
}

#[test]
fn test_summary_counts_only_own_movements() {
    let movements: Vec<Movement> = vec![
        movement(1, Some(1), MovementKind::Deposit, dec!(1000)),
        movement(2, Some(1), MovementKind::Deposit, dec!(2500.50)),
        movement(3, Some(1), MovementKind::Withdrawal, dec!(300)),
        movement(4, Some(2), MovementKind::Deposit, dec!(9999)),
        movement(5, None, MovementKind::Commission, dec!(20)),
    ];
    let summary: JournalSummary = summarize_journal(journal(true), &movements);
    assert_eq!(summary.movement_count, 3);
    assert_eq!(summary.total_deposits, dec!(3500.50));
    assert_eq!(summary.total_withdrawals, dec!(300));
}

#[test]
fn test_movement_request_rounds_and_validates_amount() {
    let request: MovementRequest = MovementRequest::new(
        AccountId::new(1),
        AccountId::new(2),
        dec!(10.005),
        MovementKind::Transfer,
        Direction::Debit,
        "transfer",
        date!(2026 - 03 - 02),
    );
    assert_eq!(request.posted_amount().unwrap(), dec!(10.01));

    let tiny: MovementRequest = MovementRequest {
        amount: dec!(0.004),
        ..request.clone()
    };
    assert!(matches!(
        tiny.posted_amount(),
        Err(DomainError::NonPositiveAmount { .. })
    ));

    let looped: MovementRequest = MovementRequest {
        destination: AccountId::new(1),
        ..request
    };
    assert!(matches!(
        looped.posted_amount(),
        Err(DomainError::SameSourceAndDestination { account_id: 1 })
    ));
}
