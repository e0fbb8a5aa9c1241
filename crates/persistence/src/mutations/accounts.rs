// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Account creation and balance updates.
//!
//! A balance only changes through `update_account_balance`, an `UPDATE`
//! guarded by the version the caller read. Zero affected rows means either
//! the account vanished or another writer got there first.

use collecte_domain::{Account, AccountId, NewAccount};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use rust_decimal::Decimal;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{AccountRow, account_key, encode_decimal};
use crate::diesel_schema::accounts;
use crate::error::PersistenceError;

backend_fn! {
/// Inserts an account with a zero balance at version zero.
///
/// # Errors
///
/// Returns `Duplicate` if the account number or kind is taken.
pub fn insert_account(conn: &mut _, account: &NewAccount) -> Result<Account, PersistenceError> {
    let key: String = account_key(&account.kind);
    diesel::insert_into(accounts::table)
        .values((
            accounts::account_number.eq(&account.account_number),
            accounts::account_key.eq(&key),
            accounts::name.eq(&account.name),
            accounts::account_type.eq(account.kind.account_type().as_str()),
            accounts::owner_id.eq(account.kind.owner_id()),
            accounts::agency_id.eq(account.agency_id.map(|id| id.value())),
            accounts::balance.eq(encode_decimal(Decimal::ZERO)),
            accounts::version.eq(0_i64),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation("account", &key))?;
    let account_id: i64 = conn.get_last_insert_rowid()?;
    debug!(account_id, kind = %account.kind, number = %account.account_number, "Inserted account");
    Ok(Account {
        account_id: AccountId::new(account_id),
        account_number: account.account_number.clone(),
        name: account.name.clone(),
        kind: account.kind,
        agency_id: account.agency_id,
        balance: Decimal::ZERO,
        version: 0,
    })
}
}

backend_fn! {
/// Sets an account balance if its version still matches, bumping the version.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `account_id` - The account
/// * `expected_version` - The version the caller read
/// * `new_balance` - The balance to store
///
/// # Errors
///
/// Returns `VersionConflict` if the stored version moved on and
/// `NotFound` if the account does not exist.
pub fn update_account_balance(
    conn: &mut _,
    account_id: i64,
    expected_version: i64,
    new_balance: Decimal,
) -> Result<Account, PersistenceError> {
    let updated: usize = diesel::update(
        accounts::table
            .filter(accounts::account_id.eq(account_id))
            .filter(accounts::version.eq(expected_version)),
    )
    .set((
        accounts::balance.eq(encode_decimal(new_balance)),
        accounts::version.eq(expected_version + 1),
    ))
    .execute(conn)?;

    if updated == 0 {
        let exists: Option<i64> = accounts::table
            .find(account_id)
            .select(accounts::account_id)
            .first(conn)
            .optional()?;
        return Err(match exists {
            Some(_) => PersistenceError::VersionConflict {
                account_id,
                expected_version,
            },
            None => PersistenceError::NotFound(format!("account {account_id}")),
        });
    }

    accounts::table
        .find(account_id)
        .select(AccountRow::as_select())
        .first(conn)?
        .into_domain()
}
}
