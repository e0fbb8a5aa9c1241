// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission parameter and history lookups.

use collecte_domain::{
    CalculationType, CommissionHistory, CommissionParameter, CommissionRule, CommissionTier,
    ParameterScope,
};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use crate::data_models::{
    CommissionHistoryRow, CommissionParameterRow, CommissionTierRow, decode_decimal, decode_flag,
};
use crate::diesel_schema::{commission_history, commission_parameters, commission_tiers};
use crate::error::PersistenceError;

const TABLE: &str = "commission_parameters";

/// Rebuilds a parameter from its row and its tiers in position order.
///
/// # Errors
///
/// Returns `CorruptRow` if the scope, type or amounts cannot be decoded,
/// or if the column required by the calculation type is missing.
fn parameter_from_rows(
    row: CommissionParameterRow,
    tiers: Vec<CommissionTierRow>,
) -> Result<CommissionParameter, PersistenceError> {
    let scope: ParameterScope = ParameterScope::from_parts(&row.scope_kind, row.scope_owner_id)
        .map_err(|e| PersistenceError::corrupt(TABLE, e))?;
    let calculation_type: CalculationType = row
        .calculation_type
        .parse()
        .map_err(|e| PersistenceError::corrupt(TABLE, e))?;
    let missing = |column: &str| {
        PersistenceError::corrupt(
            TABLE,
            format!(
                "parameter {} of type {calculation_type} has no {column}",
                row.parameter_id
            ),
        )
    };

    let rule: CommissionRule = match calculation_type {
        CalculationType::Fixed => {
            let amount: &str = row.fixed_amount.as_deref().ok_or_else(|| missing("fixed_amount"))?;
            CommissionRule::Fixed(decode_decimal(TABLE, amount)?)
        }
        CalculationType::Percentage => {
            let rate: &str = row.rate.as_deref().ok_or_else(|| missing("rate"))?;
            CommissionRule::Percentage(decode_decimal(TABLE, rate)?)
        }
        CalculationType::Tier => CommissionRule::Tier(
            tiers
                .into_iter()
                .map(CommissionTierRow::into_domain)
                .collect::<Result<Vec<CommissionTier>, PersistenceError>>()?,
        ),
        CalculationType::CollecteurGlobal => {
            return Err(PersistenceError::corrupt(
                TABLE,
                "COLLECTEUR_GLOBAL is not a parameter type",
            ));
        }
    };

    Ok(CommissionParameter {
        parameter_id: row.parameter_id,
        scope,
        rule,
        active: decode_flag(row.active),
    })
}

backend_fn! {
/// Looks up the parameter attached to a scope, with its tiers.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `scope_kind` - `CLIENT`, `COLLECTOR` or `AGENCY`
/// * `owner_id` - The scoped entity
///
/// # Errors
///
/// Returns an error if the database query fails or the rows are corrupt.
pub fn find_commission_parameter(
    conn: &mut _,
    scope_kind: &str,
    owner_id: i64,
) -> Result<Option<CommissionParameter>, PersistenceError> {
    let row: Option<CommissionParameterRow> = commission_parameters::table
        .filter(commission_parameters::scope_kind.eq(scope_kind))
        .filter(commission_parameters::scope_owner_id.eq(owner_id))
        .select(CommissionParameterRow::as_select())
        .first(conn)
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };
    let tiers: Vec<CommissionTierRow> = commission_tiers::table
        .filter(commission_tiers::parameter_id.eq(row.parameter_id))
        .order(commission_tiers::position.asc())
        .select(CommissionTierRow::as_select())
        .load(conn)?;
    parameter_from_rows(row, tiers).map(Some)
}
}

backend_fn! {
/// Looks up a collector's history for an exact period.
///
/// # Errors
///
/// Returns an error if the database query fails or the row is corrupt.
pub fn find_commission_history(
    conn: &mut _,
    collector_id: i64,
    period_start: &str,
    period_end: &str,
) -> Result<Option<CommissionHistory>, PersistenceError> {
    let row: Option<CommissionHistoryRow> = commission_history::table
        .filter(commission_history::collector_id.eq(collector_id))
        .filter(commission_history::period_start.eq(period_start))
        .filter(commission_history::period_end.eq(period_end))
        .select(CommissionHistoryRow::as_select())
        .first(conn)
        .optional()?;
    row.map(CommissionHistoryRow::into_domain).transpose()
}
}
