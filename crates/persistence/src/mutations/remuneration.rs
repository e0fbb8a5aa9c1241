// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Remunerations and rubriques.

use collecte_domain::{NewRemuneration, NewRubrique, Remuneration, RemunerationPlan, Rubrique};
use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::{
    encode_count, encode_date, encode_decimal, encode_flag, encode_timestamp,
};
use crate::diesel_schema::{remuneration_rubriques, remunerations, rubrique_collectors};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts the remuneration computed for a collector and period.
///
/// # Errors
///
/// Returns `Duplicate` if the collector already has one for the period.
pub fn insert_remuneration(
    conn: &mut _,
    remuneration: &NewRemuneration,
) -> Result<Remuneration, PersistenceError> {
    let plan: &RemunerationPlan = &remuneration.plan;
    diesel::insert_into(remunerations::table)
        .values((
            remunerations::collector_id.eq(remuneration.collector_id.value()),
            remunerations::period_start.eq(encode_date(remuneration.period.start())),
            remunerations::period_end.eq(encode_date(remuneration.period.end())),
            remunerations::base.eq(encode_decimal(plan.base)),
            remunerations::gross_salary.eq(encode_decimal(plan.gross_salary)),
            remunerations::deductions.eq(encode_decimal(plan.total_deductions)),
            remunerations::salary_paid.eq(encode_decimal(plan.salary_paid)),
            remunerations::top_up.eq(encode_decimal(plan.top_up)),
            remunerations::emf_share.eq(encode_decimal(plan.emf_share)),
            remunerations::emf_tax.eq(encode_decimal(plan.emf_tax)),
            remunerations::emf_product.eq(encode_decimal(plan.emf_product)),
            remunerations::retained.eq(encode_decimal(plan.retained)),
            remunerations::created_at.eq(encode_timestamp(remuneration.created_at)?),
        ))
        .execute(conn)
        .map_err(PersistenceError::unique_violation(
            "remuneration",
            format!(
                "collector {} for {}",
                remuneration.collector_id, remuneration.period
            ),
        ))?;
    let remuneration_id: i64 = conn.get_last_insert_rowid()?;
    debug!(remuneration_id, collector_id = %remuneration.collector_id, "Inserted remuneration");
    Ok(Remuneration {
        remuneration_id,
        collector_id: remuneration.collector_id,
        period: remuneration.period,
        base: plan.base,
        gross_salary: plan.gross_salary,
        deductions: plan.total_deductions,
        salary_paid: plan.salary_paid,
        top_up: plan.top_up,
        emf_share: plan.emf_share,
        emf_tax: plan.emf_tax,
        emf_product: plan.emf_product,
        retained: plan.retained,
        created_at: remuneration.created_at,
    })
}
}

backend_fn! {
/// Inserts a rubrique and its collector assignments.
///
/// # Errors
///
/// Returns an error if a collector does not exist or the insert fails.
pub fn insert_rubrique(conn: &mut _, rubrique: &NewRubrique) -> Result<Rubrique, PersistenceError> {
    let validity_days: Option<i32> = rubrique
        .validity_days
        .map(|days| encode_count("remuneration_rubriques", days))
        .transpose()?;
    diesel::insert_into(remuneration_rubriques::table)
        .values((
            remuneration_rubriques::name.eq(&rubrique.name),
            remuneration_rubriques::kind.eq(rubrique.kind.kind_str()),
            remuneration_rubriques::value.eq(encode_decimal(rubrique.kind.value())),
            remuneration_rubriques::application_date.eq(encode_date(rubrique.application_date)),
            remuneration_rubriques::validity_days.eq(validity_days),
            remuneration_rubriques::active.eq(encode_flag(rubrique.active)),
        ))
        .execute(conn)?;
    let rubrique_id: i64 = conn.get_last_insert_rowid()?;

    for collector_id in &rubrique.collectors {
        diesel::insert_into(rubrique_collectors::table)
            .values((
                rubrique_collectors::rubrique_id.eq(rubrique_id),
                rubrique_collectors::collector_id.eq(collector_id.value()),
            ))
            .execute(conn)
            .map_err(PersistenceError::unique_violation(
                "rubrique collector",
                format!("rubrique {rubrique_id} collector {collector_id}"),
            ))?;
    }

    debug!(rubrique_id, collector_count = rubrique.collectors.len(), "Inserted rubrique");
    Ok(Rubrique {
        rubrique_id,
        name: rubrique.name.clone(),
        kind: rubrique.kind,
        collectors: rubrique.collectors.clone(),
        application_date: rubrique.application_date,
        validity_days: rubrique.validity_days,
        active: rubrique.active,
    })
}
}
