// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Movement queries.
//!
//! Amounts are summed in Rust after decoding; SQL aggregation over the
//! decimal text columns would go through floating point on `SQLite`.

use collecte_domain::Movement;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use rust_decimal::Decimal;

use crate::data_models::{MovementRow, decode_decimal};
use crate::diesel_schema::movements;
use crate::error::PersistenceError;

fn decode_all(rows: Vec<MovementRow>) -> Result<Vec<Movement>, PersistenceError> {
    rows.into_iter().map(MovementRow::into_domain).collect()
}

backend_fn! {
/// Lists the movements touching an account, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is corrupt.
pub fn movements_for_account(
    conn: &mut _,
    account_id: i64,
) -> Result<Vec<Movement>, PersistenceError> {
    let rows: Vec<MovementRow> = movements::table
        .filter(
            movements::source_account_id
                .eq(account_id)
                .or(movements::destination_account_id.eq(account_id)),
        )
        .order(movements::movement_id.asc())
        .select(MovementRow::as_select())
        .load(conn)?;
    decode_all(rows)
}
}

backend_fn! {
/// Lists the movements recorded in a journal, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is corrupt.
pub fn movements_for_journal(
    conn: &mut _,
    journal_id: i64,
) -> Result<Vec<Movement>, PersistenceError> {
    let rows: Vec<MovementRow> = movements::table
        .filter(movements::journal_id.eq(journal_id))
        .order(movements::movement_id.asc())
        .select(MovementRow::as_select())
        .load(conn)?;
    decode_all(rows)
}
}

backend_fn! {
/// Sums the movements of one kind credited to an account between two
/// dates, both inclusive.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `destination` - The credited account
/// * `kind` - The stored movement kind
/// * `start` - First operation date, `YYYY-MM-DD`
/// * `end` - Last operation date, `YYYY-MM-DD`
///
/// # Errors
///
/// Returns an error if the database query fails or an amount is corrupt.
pub fn sum_credited(
    conn: &mut _,
    destination: i64,
    kind: &str,
    start: &str,
    end: &str,
) -> Result<Decimal, PersistenceError> {
    let amounts: Vec<String> = movements::table
        .filter(movements::destination_account_id.eq(destination))
        .filter(movements::kind.eq(kind))
        .filter(movements::operation_date.ge(start))
        .filter(movements::operation_date.le(end))
        .select(movements::amount)
        .load(conn)?;
    amounts
        .iter()
        .try_fold(
            Decimal::ZERO,
            |total: Decimal, amount: &String| -> Result<Decimal, PersistenceError> {
                Ok(total + decode_decimal("movements", amount)?)
            },
        )
}
}
