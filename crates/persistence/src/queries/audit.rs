// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use collecte_audit::{Action, Actor, AuditAmount, AuditEvent, Cause, EntityRef, Outcome};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{
    ActionData, ActorData, AmountData, AuditEventRow, CauseData, decode_decimal, decode_timestamp,
};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

const TABLE: &str = "audit_events";

/// Reconstructs an audit event from its stored row.
///
/// # Errors
///
/// Returns an error if a JSON column cannot be deserialized or the outcome
/// is unknown.
fn event_from_row(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let actor: ActorData = serde_json::from_str(&row.actor_json)?;
    let cause: CauseData = serde_json::from_str(&row.cause_json)?;
    let action: ActionData = serde_json::from_str(&row.action_json)?;
    let amounts: Vec<AmountData> = serde_json::from_str(&row.amounts_json)?;

    let outcome: Outcome = match row.outcome.as_str() {
        "SUCCESS" => Outcome::Success,
        "FAILURE" => Outcome::Failure {
            message: row.outcome_message.unwrap_or_default(),
        },
        other => {
            return Err(PersistenceError::corrupt(
                TABLE,
                format!("unknown outcome '{other}'"),
            ));
        }
    };

    Ok(AuditEvent {
        actor: Actor::new(actor.id, actor.actor_type),
        cause: Cause::new(cause.id, cause.description),
        action: Action::new(action.name, action.details),
        entity: EntityRef {
            entity_type: row.entity_type,
            entity_id: row.entity_id,
        },
        amounts: amounts
            .into_iter()
            .map(|amount| {
                Ok(AuditAmount {
                    label: amount.label,
                    amount: decode_decimal(TABLE, &amount.amount)?,
                })
            })
            .collect::<Result<Vec<AuditAmount>, PersistenceError>>()?,
        outcome,
        recorded_at: decode_timestamp(TABLE, &row.recorded_at)?,
    })
}

backend_fn! {
/// Lists every audit event, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails or an event cannot be
/// reconstructed.
pub fn list_audit_events(conn: &mut _) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .order(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;
    rows.into_iter().map(event_from_row).collect()
}
}
