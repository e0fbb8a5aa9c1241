// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account lookups.

use collecte_domain::Account;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::AccountRow;
use crate::diesel_schema::accounts;
use crate::error::PersistenceError;

backend_fn! {
/// Looks up an account by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn get_account(conn: &mut _, account_id: i64) -> Result<Option<Account>, PersistenceError> {
    let row: Option<AccountRow> = accounts::table
        .find(account_id)
        .select(AccountRow::as_select())
        .first(conn)
        .optional()?;
    row.map(AccountRow::into_domain).transpose()
}
}

backend_fn! {
/// Looks up an account by its kind key.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `account_key` - The key produced by `data_models::account_key`
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn find_account_by_key(
    conn: &mut _,
    account_key: &str,
) -> Result<Option<Account>, PersistenceError> {
    let row: Option<AccountRow> = accounts::table
        .filter(accounts::account_key.eq(account_key))
        .select(AccountRow::as_select())
        .first(conn)
        .optional()?;
    row.map(AccountRow::into_domain).transpose()
}
}
