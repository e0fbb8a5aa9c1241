// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger movements.
//!
//! A movement transfers a positive amount between exactly two accounts. Once
//! stored it is never updated.

use crate::error::DomainError;
use crate::money::round_money;
use crate::types::{AccountId, JournalId, MovementId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

/// Semantic tag carried on a movement's label.
///
/// The amount itself is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money leaves the account of interest.
    Debit,
    /// Money enters the account of interest.
    Credit,
}

impl Direction {
    /// Converts this direction to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEBIT" => Ok(Self::Debit),
            "CREDIT" => Ok(Self::Credit),
            _ => Err(DomainError::InvalidDirection(s.to_string())),
        }
    }
}

/// Business category of a movement, used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    /// Client savings collected by a collector.
    Deposit,
    /// Cash paid out to a client.
    Withdrawal,
    /// Net commission taken from a client.
    Commission,
    /// Tax share of a commission or of the EMF share.
    Tax,
    /// Repartition leg (salary, product, top-up).
    Remuneration,
    /// Any other transfer, including liaison hops.
    Transfer,
}

impl MovementKind {
    /// Converts this kind to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Commission => "COMMISSION",
            Self::Tax => "TAX",
            Self::Remuneration => "REMUNERATION",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "COMMISSION" => Ok(Self::Commission),
            "TAX" => Ok(Self::Tax),
            "REMUNERATION" => Ok(Self::Remuneration),
            "TRANSFER" => Ok(Self::Transfer),
            _ => Err(DomainError::InvalidMovementKind(s.to_string())),
        }
    }
}

/// A request to move money between two resolved accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementRequest {
    /// Amount to transfer, rounded to two decimals when posted.
    pub amount: Decimal,
    /// Free-text label.
    pub label: String,
    /// Semantic direction tag.
    pub direction: Direction,
    /// Business category.
    pub kind: MovementKind,
    /// Value date.
    pub operation_date: Date,
    /// Account debited.
    pub source: AccountId,
    /// Account credited.
    pub destination: AccountId,
    /// Collector journal the movement belongs to, if any.
    pub journal: Option<JournalId>,
}

impl MovementRequest {
    /// Creates a request that is not attached to a journal.
    #[must_use]
    pub fn new(
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
        kind: MovementKind,
        direction: Direction,
        label: impl Into<String>,
        operation_date: Date,
    ) -> Self {
        Self {
            amount,
            label: label.into(),
            direction,
            kind,
            operation_date,
            source,
            destination,
            journal: None,
        }
    }

    /// Attaches the request to a collector journal.
    #[must_use]
    pub const fn in_journal(mut self, journal: JournalId) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Validates the request and returns the amount that will be posted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rounded amount is not strictly positive
    /// - The source and destination are the same account
    pub fn posted_amount(&self) -> Result<Decimal, DomainError> {
        if self.source == self.destination {
            return Err(DomainError::SameSourceAndDestination {
                account_id: self.source.value(),
            });
        }
        let amount: Decimal = round_money(self.amount);
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount {
                field: String::from("amount"),
                amount: self.amount,
            });
        }
        Ok(amount)
    }
}

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// The canonical identifier.
    pub movement_id: MovementId,
    /// Amount transferred (always positive, two decimals).
    pub amount: Decimal,
    /// Free-text label.
    pub label: String,
    /// Semantic direction tag.
    pub direction: Direction,
    /// Business category.
    pub kind: MovementKind,
    /// Value date.
    pub operation_date: Date,
    /// Account debited.
    pub source: AccountId,
    /// Account credited.
    pub destination: AccountId,
    /// Collector journal, if any.
    pub journal: Option<JournalId>,
    /// Row version; movements are never updated so this stays at its initial value.
    pub version: i64,
    /// Insertion timestamp.
    pub created_at: OffsetDateTime,
}
