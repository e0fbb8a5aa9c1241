// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use time::Date;

/// Errors that can occur during domain validation.
///
/// These are raised before any ledger mutation takes place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An amount that must be strictly positive was zero or negative.
    NonPositiveAmount {
        /// The field carrying the amount.
        field: String,
        /// The rejected amount.
        amount: Decimal,
    },
    /// An amount that must not be negative was negative.
    NegativeAmount {
        /// The field carrying the amount.
        field: String,
        /// The rejected amount.
        amount: Decimal,
    },
    /// A movement named the same account as source and destination.
    SameSourceAndDestination {
        /// The account used on both sides.
        account_id: i64,
    },
    /// A period ends before it starts.
    InvalidPeriod {
        /// The period start.
        start: Date,
        /// The period end.
        end: Date,
    },
    /// A name is empty or invalid.
    InvalidName(String),
    /// A national identity card number is malformed.
    InvalidCni(String),
    /// An agency code is empty or malformed.
    InvalidAgencyCode(String),
    /// A rate lies outside its permitted range.
    InvalidRate {
        /// The rate being validated.
        name: String,
        /// The rejected value.
        rate: Decimal,
    },
    /// A tiered commission parameter is not a contiguous partition of `[0, +inf)`.
    InvalidTierConfiguration {
        /// Description of the defect.
        reason: String,
    },
    /// No tier bracket contains the amount.
    NoMatchingTier {
        /// The amount that was looked up.
        amount: Decimal,
    },
    /// The remuneration policy is inconsistent.
    InvalidPolicy {
        /// Description of the inconsistency.
        reason: String,
    },
    /// An account type string could not be parsed.
    InvalidAccountType(String),
    /// An account type was paired with an owner that does not fit it.
    InvalidAccountOwner {
        /// The account type.
        account_type: String,
        /// The owner identifier that was supplied.
        owner_id: Option<i64>,
    },
    /// A movement direction string could not be parsed.
    InvalidDirection(String),
    /// A movement kind string could not be parsed.
    InvalidMovementKind(String),
    /// A calculation type string could not be parsed.
    InvalidCalculationType(String),
    /// A commission parameter scope could not be parsed.
    InvalidParameterScope(String),
    /// A history status string could not be parsed.
    InvalidHistoryStatus(String),
    /// A rubrique kind string could not be parsed.
    InvalidRubriqueKind(String),
    /// The journal is closed and accepts no further movements.
    JournalClosed {
        /// The closed journal.
        journal_id: i64,
    },
    /// Monetary arithmetic left the representable range.
    AmountOutOfRange {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse a date from a string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveAmount { field, amount } => {
                write!(f, "Amount for '{field}' must be positive, got {amount}")
            }
            Self::NegativeAmount { field, amount } => {
                write!(f, "Amount for '{field}' must not be negative, got {amount}")
            }
            Self::SameSourceAndDestination { account_id } => {
                write!(
                    f,
                    "Account {account_id} cannot be both source and destination of a movement"
                )
            }
            Self::InvalidPeriod { start, end } => {
                write!(f, "Invalid period: {start} is after {end}")
            }
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidCni(msg) => write!(f, "Invalid CNI: {msg}"),
            Self::InvalidAgencyCode(msg) => write!(f, "Invalid agency code: {msg}"),
            Self::InvalidRate { name, rate } => {
                write!(f, "Invalid rate for '{name}': {rate}")
            }
            Self::InvalidTierConfiguration { reason } => {
                write!(f, "Invalid tier configuration: {reason}")
            }
            Self::NoMatchingTier { amount } => {
                write!(f, "No commission tier contains amount {amount}")
            }
            Self::InvalidPolicy { reason } => write!(f, "Invalid remuneration policy: {reason}"),
            Self::InvalidAccountType(value) => write!(f, "Invalid account type: {value}"),
            Self::InvalidAccountOwner {
                account_type,
                owner_id,
            } => match owner_id {
                Some(id) => write!(f, "Account type {account_type} cannot be owned by {id}"),
                None => write!(f, "Account type {account_type} requires an owner"),
            },
            Self::InvalidDirection(value) => write!(f, "Invalid movement direction: {value}"),
            Self::InvalidMovementKind(value) => write!(f, "Invalid movement kind: {value}"),
            Self::InvalidCalculationType(value) => {
                write!(f, "Invalid calculation type: {value}")
            }
            Self::InvalidParameterScope(value) => {
                write!(f, "Invalid commission parameter scope: {value}")
            }
            Self::InvalidHistoryStatus(value) => write!(f, "Invalid history status: {value}"),
            Self::InvalidRubriqueKind(value) => write!(f, "Invalid rubrique kind: {value}"),
            Self::JournalClosed { journal_id } => {
                write!(f, "Journal {journal_id} is closed")
            }
            Self::AmountOutOfRange { operation } => {
                write!(f, "Amount out of range while {operation}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
