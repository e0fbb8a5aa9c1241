// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

/// Declares a canonical numeric identifier assigned by the store.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of an agency.
    AgencyId
);
id_type!(
    /// Identifier of a field collector.
    CollectorId
);
id_type!(
    /// Identifier of a client.
    ClientId
);
id_type!(
    /// Identifier of a ledger account.
    AccountId
);
id_type!(
    /// Identifier of a ledger movement.
    MovementId
);
id_type!(
    /// Identifier of a collector journal.
    JournalId
);

/// An inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    start: Date,
    end: Date,
}

impl Period {
    /// Creates a new period.
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the first day of the period.
    #[must_use]
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Returns the last day of the period.
    #[must_use]
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Checks whether a date falls within the period (bounds included).
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// An agency of the institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    /// The canonical identifier.
    pub agency_id: AgencyId,
    /// Short unique code (e.g. `DLA01`).
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Input for registering an agency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgency {
    /// Short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// A field collector working for an agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collector {
    /// The canonical identifier.
    pub collector_id: CollectorId,
    /// The agency the collector belongs to.
    pub agency_id: AgencyId,
    /// Display name.
    pub name: String,
    /// Tenure in whole months.
    pub seniority_months: u32,
    /// Largest single withdrawal the collector may pay out.
    pub max_withdrawal: Decimal,
}

/// Input for registering a collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollector {
    /// The agency the collector belongs to.
    pub agency_id: AgencyId,
    /// Display name.
    pub name: String,
    /// Tenure in whole months.
    pub seniority_months: u32,
    /// Largest single withdrawal the collector may pay out.
    pub max_withdrawal: Decimal,
}

/// A saver followed by a collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// The canonical identifier.
    pub client_id: ClientId,
    /// The collector following this client.
    pub collector_id: CollectorId,
    /// The agency holding the client's account.
    pub agency_id: AgencyId,
    /// Display name.
    pub name: String,
    /// National identity card number.
    pub cni: String,
}

/// Input for registering a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    /// The collector following this client.
    pub collector_id: CollectorId,
    /// Display name.
    pub name: String,
    /// National identity card number.
    pub cni: String,
}

/// Parses an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns an error if the string is not a valid date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    let format: &[time::format_description::BorrowedFormatItem<'_>] =
        time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(value, format).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}
