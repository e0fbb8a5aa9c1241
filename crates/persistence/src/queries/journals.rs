// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Journal lookups.

use collecte_domain::Journal;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::JournalRow;
use crate::diesel_schema::journals;
use crate::error::PersistenceError;

backend_fn! {
/// Looks up a journal by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn get_journal(conn: &mut _, journal_id: i64) -> Result<Option<Journal>, PersistenceError> {
    let row: Option<JournalRow> = journals::table
        .find(journal_id)
        .select(JournalRow::as_select())
        .first(conn)
        .optional()?;
    row.map(JournalRow::into_domain).transpose()
}
}

backend_fn! {
/// Looks up a collector's journal for a date.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `collector_id` - The collector
/// * `journal_date` - The day, `YYYY-MM-DD`
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn find_journal(
    conn: &mut _,
    collector_id: i64,
    journal_date: &str,
) -> Result<Option<Journal>, PersistenceError> {
    let row: Option<JournalRow> = journals::table
        .filter(journals::collector_id.eq(collector_id))
        .filter(journals::journal_date.eq(journal_date))
        .select(JournalRow::as_select())
        .first(conn)
        .optional()?;
    row.map(JournalRow::into_domain).transpose()
}
}
