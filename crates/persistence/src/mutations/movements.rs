// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use collecte_domain::{Movement, MovementId, MovementRequest};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use time::OffsetDateTime;

use crate::backend::PersistenceBackend;
use crate::data_models::{encode_date, encode_decimal, encode_timestamp};
use crate::diesel_schema::movements;
use crate::error::PersistenceError;

backend_fn! {
/// Appends a movement at version zero.
///
/// # Errors
///
/// Returns an error if an account or journal does not exist or the insert fails.
pub fn insert_movement(
    conn: &mut _,
    request: &MovementRequest,
    created_at: OffsetDateTime,
) -> Result<Movement, PersistenceError> {
    diesel::insert_into(movements::table)
        .values((
            movements::amount.eq(encode_decimal(request.amount)),
            movements::label.eq(&request.label),
            movements::direction.eq(request.direction.as_str()),
            movements::kind.eq(request.kind.as_str()),
            movements::operation_date.eq(encode_date(request.operation_date)),
            movements::source_account_id.eq(request.source.value()),
            movements::destination_account_id.eq(request.destination.value()),
            movements::journal_id.eq(request.journal.map(|id| id.value())),
            movements::version.eq(0_i64),
            movements::created_at.eq(encode_timestamp(created_at)?),
        ))
        .execute(conn)?;
    let movement_id: i64 = conn.get_last_insert_rowid()?;
    Ok(Movement {
        movement_id: MovementId::new(movement_id),
        amount: request.amount,
        label: request.label.clone(),
        direction: request.direction,
        kind: request.kind,
        operation_date: request.operation_date,
        source: request.source,
        destination: request.destination,
        journal: request.journal,
        version: 0,
        created_at,
    })
}
}
