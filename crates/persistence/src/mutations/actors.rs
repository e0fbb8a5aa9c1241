// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Agency, collector and client registration.

use collecte_domain::{
    Agency, AgencyId, Client, ClientId, Collector, CollectorId, NewAgency, NewClient, NewCollector,
};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{encode_count, encode_decimal};
use crate::diesel_schema::{agencies, clients, collectors};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts an agency.
///
/// # Errors
///
/// Returns `Duplicate` if the agency code is taken.
pub fn insert_agency(conn: &mut _, agency: &NewAgency) -> Result<Agency, PersistenceError> {
    diesel::insert_into(agencies::table)
        .values((
            agencies::code.eq(&agency.code),
            agencies::name.eq(&agency.name),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation("agency", &agency.code))?;
    let agency_id: i64 = conn.get_last_insert_rowid()?;
    debug!(agency_id, code = %agency.code, "Inserted agency");
    Ok(Agency {
        agency_id: AgencyId::new(agency_id),
        code: agency.code.clone(),
        name: agency.name.clone(),
    })
}
}

backend_fn! {
/// Inserts a collector.
///
/// # Errors
///
/// Returns an error if the agency does not exist or the insert fails.
pub fn insert_collector(
    conn: &mut _,
    collector: &NewCollector,
) -> Result<Collector, PersistenceError> {
    diesel::insert_into(collectors::table)
        .values((
            collectors::agency_id.eq(collector.agency_id.value()),
            collectors::name.eq(&collector.name),
            collectors::seniority_months.eq(encode_count("collectors", collector.seniority_months)?),
            collectors::max_withdrawal.eq(encode_decimal(collector.max_withdrawal)),
        ))
        .execute(conn)?;
    let collector_id: i64 = conn.get_last_insert_rowid()?;
    debug!(collector_id, agency_id = %collector.agency_id, "Inserted collector");
    Ok(Collector {
        collector_id: CollectorId::new(collector_id),
        agency_id: collector.agency_id,
        name: collector.name.clone(),
        seniority_months: collector.seniority_months,
        max_withdrawal: collector.max_withdrawal,
    })
}
}

backend_fn! {
/// Inserts a client attached to an agency.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `client` - The client, with its collector
/// * `agency_id` - The collector's agency
///
/// # Errors
///
/// Returns `Duplicate` if the CNI is taken.
pub fn insert_client(
    conn: &mut _,
    client: &NewClient,
    agency_id: i64,
) -> Result<Client, PersistenceError> {
    diesel::insert_into(clients::table)
        .values((
            clients::collector_id.eq(client.collector_id.value()),
            clients::agency_id.eq(agency_id),
            clients::name.eq(&client.name),
            clients::cni.eq(&client.cni),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation("client", &client.cni))?;
    let client_id: i64 = conn.get_last_insert_rowid()?;
    debug!(client_id, collector_id = %client.collector_id, "Inserted client");
    Ok(Client {
        client_id: ClientId::new(client_id),
        collector_id: client.collector_id,
        agency_id: AgencyId::new(agency_id),
        name: client.name.clone(),
        cni: client.cni.clone(),
    })
}
}
