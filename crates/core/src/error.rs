// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use collecte_domain::DomainError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by ledger operations.
///
/// Every error rolls back the enclosing store transaction. Only
/// [`CoreError::Conflict`] and [`CoreError::Infrastructure`] are retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),

    /// A bounded account does not hold enough to cover a debit.
    #[error("Insufficient balance on account {account}: balance {balance}, requested {requested}")]
    InsufficientBalance {
        account: String,
        balance: Decimal,
        requested: Decimal,
    },

    /// A withdrawal exceeds the collector's authorised maximum.
    #[error("Withdrawal of {requested} exceeds collector {collector} maximum of {max}")]
    MaxWithdrawalExceeded {
        collector: i64,
        max: Decimal,
        requested: Decimal,
    },

    /// The operation is not valid in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A required record does not exist.
    #[error("{resource} not found: {key}")]
    ResourceNotFound { resource: String, key: String },

    /// A record with the same business key already exists.
    #[error("{resource} already exists: {key}")]
    Duplicate { resource: String, key: String },

    /// A concurrent update won the race for a row.
    #[error("Concurrent modification: {0}")]
    Conflict(String),

    /// The store failed for reasons unrelated to the request.
    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

impl CoreError {
    /// Whether the operation may succeed if attempted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_) | Self::Infrastructure(_))
    }

    /// Builds a `ResourceNotFound` error.
    pub(crate) fn not_found(resource: &str, key: impl ToString) -> Self {
        Self::ResourceNotFound {
            resource: resource.to_string(),
            key: key.to_string(),
        }
    }

    /// Builds a `Duplicate` error.
    pub(crate) fn duplicate(resource: &str, key: impl ToString) -> Self {
        Self::Duplicate {
            resource: resource.to_string(),
            key: key.to_string(),
        }
    }
}
