// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::DomainError;
use rust_decimal_macros::dec;
use time::macros::date;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::NonPositiveAmount {
        field: String::from("amount"),
        amount: dec!(0),
    };
    assert_eq!(format!("{err}"), "Amount for 'amount' must be positive, got 0");

    let err: DomainError = DomainError::SameSourceAndDestination { account_id: 7 };
    assert_eq!(
        format!("{err}"),
        "Account 7 cannot be both source and destination of a movement"
    );

    let err: DomainError = DomainError::InvalidPeriod {
        start: date!(2026 - 02 - 01),
        end: date!(2026 - 01 - 01),
    };
    assert_eq!(
        format!("{err}"),
        "Invalid period: 2026-02-01 is after 2026-01-01"
    );

    let err: DomainError = DomainError::InvalidCni(String::from("test"));
    assert_eq!(format!("{err}"), "Invalid CNI: test");

    let err: DomainError = DomainError::NoMatchingTier { amount: dec!(12.5) };
    assert_eq!(format!("{err}"), "No commission tier contains amount 12.5");

    let err: DomainError = DomainError::InvalidAccountOwner {
        account_type: String::from("SYSTEM"),
        owner_id: Some(3),
    };
    assert_eq!(format!("{err}"), "Account type SYSTEM cannot be owned by 3");

    let err: DomainError = DomainError::InvalidAccountOwner {
        account_type: String::from("CLIENT"),
        owner_id: None,
    };
    assert_eq!(format!("{err}"), "Account type CLIENT requires an owner");

    let err: DomainError = DomainError::JournalClosed { journal_id: 12 };
    assert_eq!(format!("{err}"), "Journal 12 is closed");

    let err: DomainError = DomainError::AmountOutOfRange {
        operation: String::from("crediting account 4"),
    };
    assert_eq!(
        format!("{err}"),
        "Amount out of range while crediting account 4"
    );
}

#[test]
fn test_domain_error_is_std_error() {
    let err: DomainError = DomainError::InvalidName(String::from("empty"));
    let boxed: Box<dyn std::error::Error> = Box::new(err);
    assert_eq!(boxed.to_string(), "Invalid name: empty");
}
