// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission parameters and history.

use collecte_domain::{
    CommissionHistory, CommissionParameter, CommissionRule, HistoryStatus, NewCommissionHistory,
    NewCommissionParameter,
};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use time::OffsetDateTime;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{
    CommissionHistoryRow, encode_count, encode_date, encode_decimal, encode_flag,
    encode_timestamp,
};
use crate::diesel_schema::{commission_history, commission_parameters, commission_tiers};
use crate::error::PersistenceError;

/// Splits a rule into its `(fixed_amount, rate)` columns.
fn rule_columns(rule: &CommissionRule) -> (Option<String>, Option<String>) {
    match rule {
        CommissionRule::Fixed(amount) => (Some(encode_decimal(*amount)), None),
        CommissionRule::Percentage(rate) => (None, Some(encode_decimal(*rate))),
        CommissionRule::Tier(_) => (None, None),
    }
}

backend_fn! {
/// Inserts a commission parameter and, for tiered rules, its tiers.
///
/// # Errors
///
/// Returns `Duplicate` if the scope already has a parameter.
pub fn insert_commission_parameter(
    conn: &mut _,
    parameter: &NewCommissionParameter,
) -> Result<CommissionParameter, PersistenceError> {
    let (fixed_amount, rate): (Option<String>, Option<String>) = rule_columns(&parameter.rule);
    diesel::insert_into(commission_parameters::table)
        .values((
            commission_parameters::scope_kind.eq(parameter.scope.kind_str()),
            commission_parameters::scope_owner_id.eq(parameter.scope.owner_id()),
            commission_parameters::calculation_type
                .eq(parameter.rule.calculation_type().as_str()),
            commission_parameters::fixed_amount.eq(fixed_amount),
            commission_parameters::rate.eq(rate),
            commission_parameters::active.eq(encode_flag(parameter.active)),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation(
            "commission parameter",
            parameter.scope,
        ))?;
    let parameter_id: i64 = conn.get_last_insert_rowid()?;

    if let CommissionRule::Tier(tiers) = &parameter.rule {
        for (index, tier) in tiers.iter().enumerate() {
            let position: i32 = index.to_i32().ok_or_else(|| {
                PersistenceError::corrupt("commission_tiers", format!("tier index {index}"))
            })?;
            diesel::insert_into(commission_tiers::table)
                .values((
                    commission_tiers::parameter_id.eq(parameter_id),
                    commission_tiers::position.eq(position),
                    commission_tiers::min_amount.eq(encode_decimal(tier.min)),
                    commission_tiers::max_amount.eq(tier.max.map(encode_decimal)),
                    commission_tiers::rate.eq(encode_decimal(tier.rate)),
                ))
                .execute(conn)?;
        }
    }

    debug!(parameter_id, scope = %parameter.scope, "Inserted commission parameter");
    Ok(CommissionParameter {
        parameter_id,
        scope: parameter.scope,
        rule: parameter.rule.clone(),
        active: parameter.active,
    })
}
}

backend_fn! {
/// Inserts a calculated commission history.
///
/// # Errors
///
/// Returns `Duplicate` if the collector already has a history for the period.
pub fn insert_commission_history(
    conn: &mut _,
    history: &NewCommissionHistory,
) -> Result<CommissionHistory, PersistenceError> {
    diesel::insert_into(commission_history::table)
        .values((
            commission_history::collector_id.eq(history.collector_id.value()),
            commission_history::period_start.eq(encode_date(history.period.start())),
            commission_history::period_end.eq(encode_date(history.period.end())),
            commission_history::total_commission.eq(encode_decimal(history.total_commission)),
            commission_history::total_tax.eq(encode_decimal(history.total_tax)),
            commission_history::client_count
                .eq(encode_count("commission_history", history.client_count)?),
            commission_history::status.eq(HistoryStatus::Calcule.as_str()),
            commission_history::calculated_at.eq(encode_timestamp(history.calculated_at)?),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation(
            "commission history",
            format!("collector {} for {}", history.collector_id, history.period),
        ))?;
    let history_id: i64 = conn.get_last_insert_rowid()?;
    Ok(CommissionHistory {
        history_id,
        collector_id: history.collector_id,
        period: history.period,
        total_commission: history.total_commission,
        total_tax: history.total_tax,
        client_count: history.client_count,
        status: HistoryStatus::Calcule,
        remuneration_id: None,
        remunerated_at: None,
        calculated_at: history.calculated_at,
    })
}
}

backend_fn! {
/// Marks a history remunerated and links it to its remuneration.
///
/// # Errors
///
/// Returns `NotFound` if the history does not exist.
pub fn mark_history_remunerated(
    conn: &mut _,
    history_id: i64,
    remuneration_id: i64,
    remunerated_at: OffsetDateTime,
) -> Result<CommissionHistory, PersistenceError> {
    let updated: usize = diesel::update(commission_history::table.find(history_id))
        .set((
            commission_history::status.eq(HistoryStatus::Remunere.as_str()),
            commission_history::remuneration_id.eq(Some(remuneration_id)),
            commission_history::remunerated_at.eq(Some(encode_timestamp(remunerated_at)?)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "commission history {history_id}"
        )));
    }
    commission_history::table
        .find(history_id)
        .select(CommissionHistoryRow::as_select())
        .first(conn)?
        .into_domain()
}
}
