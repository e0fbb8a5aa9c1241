// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.
//!
//! Actor, cause, action and amounts are stored as JSON so the event shape
//! can grow without a migration; the outcome and entity stay in plain
//! columns for filtering.

use collecte_audit::AuditEvent;
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, ActorData, AmountData, CauseData, encode_timestamp};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

backend_fn! {
/// Appends an audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn record_audit_event(conn: &mut _, event: &AuditEvent) -> Result<i64, PersistenceError> {
    let actor_json: String = serde_json::to_string(&ActorData::from(&event.actor))?;
    let cause_json: String = serde_json::to_string(&CauseData::from(&event.cause))?;
    let action_json: String = serde_json::to_string(&ActionData::from(&event.action))?;
    let amounts: Vec<AmountData> = event.amounts.iter().map(AmountData::from).collect();
    let amounts_json: String = serde_json::to_string(&amounts)?;

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::actor_json.eq(&actor_json),
            audit_events::cause_json.eq(&cause_json),
            audit_events::action_json.eq(&action_json),
            audit_events::entity_type.eq(&event.entity.entity_type),
            audit_events::entity_id.eq(event.entity.entity_id.as_deref()),
            audit_events::amounts_json.eq(&amounts_json),
            audit_events::outcome.eq(event.outcome.as_str()),
            audit_events::outcome_message.eq(event.outcome.message()),
            audit_events::recorded_at.eq(encode_timestamp(event.recorded_at)?),
        ))
        .execute(conn)?;
    let event_id: i64 = conn.get_last_insert_rowid()?;
    debug!(event_id, action = %event.action.name, outcome = event.outcome.as_str(), "Recorded audit event");
    Ok(event_id)
}
}
