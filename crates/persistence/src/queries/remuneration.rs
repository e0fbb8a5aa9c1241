// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Remuneration and rubrique lookups.

use std::collections::BTreeMap;

use collecte_domain::{CollectorId, Remuneration, Rubrique, RubriqueKind};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{
    RemunerationRow, RubriqueRow, decode_count, decode_date, decode_decimal, decode_flag,
};
use crate::diesel_schema::{remuneration_rubriques, remunerations, rubrique_collectors};
use crate::error::PersistenceError;

const RUBRIQUES: &str = "remuneration_rubriques";

fn rubrique_from_row(
    row: RubriqueRow,
    collectors: Vec<CollectorId>,
) -> Result<Rubrique, PersistenceError> {
    let kind: RubriqueKind =
        RubriqueKind::from_parts(&row.kind, decode_decimal(RUBRIQUES, &row.value)?)
            .map_err(|e| PersistenceError::corrupt(RUBRIQUES, e))?;
    Ok(Rubrique {
        rubrique_id: row.rubrique_id,
        name: row.name,
        kind,
        collectors,
        application_date: decode_date(RUBRIQUES, &row.application_date)?,
        validity_days: row
            .validity_days
            .map(|days| decode_count(RUBRIQUES, days))
            .transpose()?,
        active: decode_flag(row.active),
    })
}

backend_fn! {
/// Looks up a collector's remuneration for an exact period.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn find_remuneration(
    conn: &mut _,
    collector_id: i64,
    period_start: &str,
    period_end: &str,
) -> Result<Option<Remuneration>, PersistenceError> {
    let row: Option<RemunerationRow> = remunerations::table
        .filter(remunerations::collector_id.eq(collector_id))
        .filter(remunerations::period_start.eq(period_start))
        .filter(remunerations::period_end.eq(period_end))
        .select(RemunerationRow::as_select())
        .first(conn)
        .optional()?;
    row.map(RemunerationRow::into_domain).transpose()
}
}

backend_fn! {
/// Lists every rubrique with its collectors, ordered by identifier.
///
/// # Errors
///
/// Returns an error if the database query fails or a row is corrupt.
pub fn list_rubriques(conn: &mut _) -> Result<Vec<Rubrique>, PersistenceError> {
    let rows: Vec<RubriqueRow> = remuneration_rubriques::table
        .order(remuneration_rubriques::rubrique_id.asc())
        .select(RubriqueRow::as_select())
        .load(conn)?;
    let links: Vec<(i64, i64)> = rubrique_collectors::table
        .order((
            rubrique_collectors::rubrique_id.asc(),
            rubrique_collectors::collector_id.asc(),
        ))
        .select((rubrique_collectors::rubrique_id, rubrique_collectors::collector_id))
        .load(conn)?;

    let mut collectors_by_rubrique: BTreeMap<i64, Vec<CollectorId>> = BTreeMap::new();
    for (rubrique_id, collector_id) in links {
        collectors_by_rubrique
            .entry(rubrique_id)
            .or_default()
            .push(CollectorId::new(collector_id));
    }

    rows.into_iter()
        .map(|row| {
            let collectors: Vec<CollectorId> = collectors_by_rubrique
                .remove(&row.rubrique_id)
                .unwrap_or_default();
            rubrique_from_row(row, collectors)
        })
        .collect()
}
}
