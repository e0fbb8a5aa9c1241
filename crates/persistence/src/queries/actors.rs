// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Agency, collector and client lookups.

use collecte_domain::{Agency, Client, Collector};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{AgencyRow, ClientRow, CollectorRow};
use crate::diesel_schema::{agencies, clients, collectors};
use crate::error::PersistenceError;

backend_fn! {
/// Looks up an agency by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_agency(conn: &mut _, agency_id: i64) -> Result<Option<Agency>, PersistenceError> {
    let row: Option<AgencyRow> = agencies::table
        .find(agency_id)
        .select(AgencyRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Agency::from))
}
}

backend_fn! {
/// Looks up a collector by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn get_collector(
    conn: &mut _,
    collector_id: i64,
) -> Result<Option<Collector>, PersistenceError> {
    let row: Option<CollectorRow> = collectors::table
        .find(collector_id)
        .select(CollectorRow::as_select())
        .first(conn)
        .optional()?;
    row.map(CollectorRow::into_domain).transpose()
}
}

backend_fn! {
/// Looks up a client by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_client(conn: &mut _, client_id: i64) -> Result<Option<Client>, PersistenceError> {
    let row: Option<ClientRow> = clients::table
        .find(client_id)
        .select(ClientRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.map(Client::from))
}
}

backend_fn! {
/// Lists the clients followed by a collector, ordered by identifier.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `collector_id` - The collector whose portfolio is listed
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_clients_of_collector(
    conn: &mut _,
    collector_id: i64,
) -> Result<Vec<Client>, PersistenceError> {
    let rows: Vec<ClientRow> = clients::table
        .filter(clients::collector_id.eq(collector_id))
        .order(clients::client_id.asc())
        .select(ClientRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Client::from).collect())
}
}
