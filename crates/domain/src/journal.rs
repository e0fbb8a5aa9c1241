// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::movement::{Movement, MovementKind};
use crate::types::{CollectorId, JournalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// One collector's working day.
///
/// A journal is closed at most once; after closure it accepts no movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// The canonical identifier.
    pub journal_id: JournalId,
    /// The collector owning the journal.
    pub collector_id: CollectorId,
    /// The working day.
    pub journal_date: Date,
    /// When the journal was opened.
    pub opened_at: OffsetDateTime,
    /// Terminal flag.
    pub closed: bool,
    /// When the journal was closed.
    pub closed_at: Option<OffsetDateTime>,
}

impl Journal {
    /// Ensures the journal still accepts movements.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal is closed.
    pub const fn ensure_open(&self) -> Result<(), DomainError> {
        if self.closed {
            return Err(DomainError::JournalClosed {
                journal_id: self.journal_id.value(),
            });
        }
        Ok(())
    }
}

/// Totals of a journal at closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSummary {
    /// The journal summarised.
    pub journal: Journal,
    /// Number of movements recorded in the journal.
    pub movement_count: usize,
    /// Sum of deposit movements.
    pub total_deposits: Decimal,
    /// Sum of withdrawal movements.
    pub total_withdrawals: Decimal,
}

/// Summarises the movements of a journal.
///
/// Movements belonging to other journals are ignored.
#[must_use]
pub fn summarize_journal(journal: Journal, movements: &[Movement]) -> JournalSummary {
    let own: Vec<&Movement> = movements
        .iter()
        .filter(|m| m.journal == Some(journal.journal_id))
        .collect();

    let total_of = |kind: MovementKind| -> Decimal {
        own.iter()
            .filter(|m| m.kind == kind)
            .map(|m| m.amount)
            .sum()
    };

    JournalSummary {
        movement_count: own.len(),
        total_deposits: total_of(MovementKind::Deposit),
        total_withdrawals: total_of(MovementKind::Withdrawal),
        journal,
    }
}
