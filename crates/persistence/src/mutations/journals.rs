// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Journal opening and closing.

use collecte_domain::{CollectorId, Journal, JournalId};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{JournalRow, encode_date, encode_flag, encode_timestamp};
use crate::diesel_schema::journals;
use crate::error::PersistenceError;

backend_fn! {
/// Inserts an open journal.
///
/// # Errors
///
/// Returns `Duplicate` if the collector already has a journal for the date.
pub fn insert_journal(
    conn: &mut _,
    collector_id: CollectorId,
    journal_date: Date,
    opened_at: OffsetDateTime,
) -> Result<Journal, PersistenceError> {
    diesel::insert_into(journals::table)
        .values((
            journals::collector_id.eq(collector_id.value()),
            journals::journal_date.eq(encode_date(journal_date)),
            journals::opened_at.eq(encode_timestamp(opened_at)?),
            journals::closed.eq(encode_flag(false)),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation(
            "journal",
            format!("collector {collector_id} on {journal_date}"),
        ))?;
    let journal_id: i64 = conn.get_last_insert_rowid()?;
    debug!(journal_id, collector_id = %collector_id, journal_date = %journal_date, "Inserted journal");
    Ok(Journal {
        journal_id: JournalId::new(journal_id),
        collector_id,
        journal_date,
        opened_at,
        closed: false,
        closed_at: None,
    })
}
}

backend_fn! {
/// Marks a journal closed.
///
/// # Errors
///
/// Returns `NotFound` if the journal does not exist.
pub fn close_journal(
    conn: &mut _,
    journal_id: i64,
    closed_at: OffsetDateTime,
) -> Result<Journal, PersistenceError> {
    let updated: usize = diesel::update(journals::table.find(journal_id))
        .set((
            journals::closed.eq(encode_flag(true)),
            journals::closed_at.eq(Some(encode_timestamp(closed_at)?)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!("journal {journal_id}")));
    }
    journals::table
        .find(journal_id)
        .select(JournalRow::as_select())
        .first(conn)?
        .into_domain()
}
}
