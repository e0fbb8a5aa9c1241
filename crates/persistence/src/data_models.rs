// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and column codecs.
//!
//! Amounts are stored as decimal strings, dates as `YYYY-MM-DD` and
//! timestamps as RFC 3339, so both backends hold identical text and
//! comparisons on dates stay lexicographic.
//!
//! Row structs are `Selectable` over their table and decode into domain
//! types, reporting undecodable values as `CorruptRow`.

use std::str::FromStr;

use collecte_audit::{Action, Actor, AuditAmount, Cause};
use collecte_domain::{
    Account, AccountId, AccountKind, AccountType, Agency, AgencyId, Client, ClientId, Collector,
    CollectorId, CommissionHistory, CommissionTier, HistoryStatus, Journal, JournalId, Movement,
    MovementId, Period, Remuneration, parse_date,
};
use diesel::{Queryable, Selectable};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime};

use crate::diesel_schema::{
    accounts, agencies, audit_events, clients, collectors, commission_history,
    commission_parameters, commission_tiers, journals, movements, remuneration_rubriques,
    remunerations,
};
use crate::error::PersistenceError;

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

impl From<&Actor> for ActorData {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id.clone(),
            actor_type: actor.actor_type.clone(),
        }
    }
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

impl From<&Cause> for CauseData {
    fn from(cause: &Cause) -> Self {
        Self {
            id: cause.id.clone(),
            description: cause.description.clone(),
        }
    }
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

impl From<&Action> for ActionData {
    fn from(action: &Action) -> Self {
        Self {
            name: action.name.clone(),
            details: action.details.clone(),
        }
    }
}

/// Serializable representation of a labelled audit amount.
///
/// The amount is kept as a string so JSON never rounds it through a float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountData {
    pub label: String,
    pub amount: String,
}

impl From<&AuditAmount> for AmountData {
    fn from(amount: &AuditAmount) -> Self {
        Self {
            label: amount.label.clone(),
            amount: encode_decimal(amount.amount),
        }
    }
}

// ============================================================================
// Column codecs
// ============================================================================

pub fn encode_decimal(value: Decimal) -> String {
    value.to_string()
}

pub fn decode_decimal(table: &str, value: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(value)
        .map_err(|e| PersistenceError::corrupt(table, format!("amount '{value}': {e}")))
}

pub fn decode_optional_decimal(
    table: &str,
    value: Option<&str>,
) -> Result<Option<Decimal>, PersistenceError> {
    value.map(|v| decode_decimal(table, v)).transpose()
}

pub fn encode_date(value: Date) -> String {
    value.to_string()
}

pub fn decode_date(table: &str, value: &str) -> Result<Date, PersistenceError> {
    parse_date(value).map_err(|e| PersistenceError::corrupt(table, e))
}

/// Encodes a timestamp as RFC 3339.
///
/// # Errors
///
/// Returns `SerializationError` for timestamps RFC 3339 cannot express.
pub fn encode_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

pub fn decode_timestamp(table: &str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::corrupt(table, format!("timestamp '{value}': {e}")))
}

pub fn decode_optional_timestamp(
    table: &str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|v| decode_timestamp(table, v)).transpose()
}

pub fn encode_count(table: &str, value: u32) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::corrupt(table, format!("count {value} out of range")))
}

pub fn decode_count(table: &str, value: i32) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| PersistenceError::corrupt(table, format!("negative count {value}")))
}

pub fn encode_flag(value: bool) -> i32 {
    i32::from(value)
}

pub const fn decode_flag(value: i32) -> bool {
    value != 0
}

pub fn decode_period(table: &str, start: &str, end: &str) -> Result<Period, PersistenceError> {
    Period::new(decode_date(table, start)?, decode_date(table, end)?)
        .map_err(|e| PersistenceError::corrupt(table, e))
}

/// The unique key of an account kind: its type and owner.
pub fn account_key(kind: &AccountKind) -> String {
    kind.to_string()
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = agencies)]
pub struct AgencyRow {
    pub agency_id: i64,
    pub code: String,
    pub name: String,
}

impl From<AgencyRow> for Agency {
    fn from(row: AgencyRow) -> Self {
        Self {
            agency_id: AgencyId::new(row.agency_id),
            code: row.code,
            name: row.name,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = collectors)]
pub struct CollectorRow {
    pub collector_id: i64,
    pub agency_id: i64,
    pub name: String,
    pub seniority_months: i32,
    pub max_withdrawal: String,
}

impl CollectorRow {
    pub fn into_domain(self) -> Result<Collector, PersistenceError> {
        Ok(Collector {
            collector_id: CollectorId::new(self.collector_id),
            agency_id: AgencyId::new(self.agency_id),
            name: self.name,
            seniority_months: decode_count("collectors", self.seniority_months)?,
            max_withdrawal: decode_decimal("collectors", &self.max_withdrawal)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = clients)]
pub struct ClientRow {
    pub client_id: i64,
    pub collector_id: i64,
    pub agency_id: i64,
    pub name: String,
    pub cni: String,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            client_id: ClientId::new(row.client_id),
            collector_id: CollectorId::new(row.collector_id),
            agency_id: AgencyId::new(row.agency_id),
            name: row.name,
            cni: row.cni,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = accounts)]
pub struct AccountRow {
    pub account_id: i64,
    pub account_number: String,
    pub account_key: String,
    pub name: String,
    pub account_type: String,
    pub owner_id: Option<i64>,
    pub agency_id: Option<i64>,
    pub balance: String,
    pub version: i64,
}

impl AccountRow {
    pub fn into_domain(self) -> Result<Account, PersistenceError> {
        let account_type: AccountType = AccountType::from_str(&self.account_type)
            .map_err(|e| PersistenceError::corrupt("accounts", e))?;
        let kind: AccountKind = AccountKind::from_parts(account_type, self.owner_id)
            .map_err(|e| PersistenceError::corrupt("accounts", e))?;
        if self.account_key != account_key(&kind) {
            return Err(PersistenceError::corrupt(
                "accounts",
                format!("key '{}' does not match {kind}", self.account_key),
            ));
        }
        Ok(Account {
            account_id: AccountId::new(self.account_id),
            account_number: self.account_number,
            name: self.name,
            kind,
            agency_id: self.agency_id.map(AgencyId::new),
            balance: decode_decimal("accounts", &self.balance)?,
            version: self.version,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = journals)]
pub struct JournalRow {
    pub journal_id: i64,
    pub collector_id: i64,
    pub journal_date: String,
    pub opened_at: String,
    pub closed: i32,
    pub closed_at: Option<String>,
}

impl JournalRow {
    pub fn into_domain(self) -> Result<Journal, PersistenceError> {
        Ok(Journal {
            journal_id: JournalId::new(self.journal_id),
            collector_id: CollectorId::new(self.collector_id),
            journal_date: decode_date("journals", &self.journal_date)?,
            opened_at: decode_timestamp("journals", &self.opened_at)?,
            closed: decode_flag(self.closed),
            closed_at: decode_optional_timestamp("journals", self.closed_at.as_deref())?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = movements)]
pub struct MovementRow {
    pub movement_id: i64,
    pub amount: String,
    pub label: String,
    pub direction: String,
    pub kind: String,
    pub operation_date: String,
    pub source_account_id: i64,
    pub destination_account_id: i64,
    pub journal_id: Option<i64>,
    pub version: i64,
    pub created_at: String,
}

impl MovementRow {
    pub fn into_domain(self) -> Result<Movement, PersistenceError> {
        Ok(Movement {
            movement_id: MovementId::new(self.movement_id),
            amount: decode_decimal("movements", &self.amount)?,
            label: self.label,
            direction: self
                .direction
                .parse()
                .map_err(|e| PersistenceError::corrupt("movements", e))?,
            kind: self
                .kind
                .parse()
                .map_err(|e| PersistenceError::corrupt("movements", e))?,
            operation_date: decode_date("movements", &self.operation_date)?,
            source: AccountId::new(self.source_account_id),
            destination: AccountId::new(self.destination_account_id),
            journal: self.journal_id.map(JournalId::new),
            version: self.version,
            created_at: decode_timestamp("movements", &self.created_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = commission_parameters)]
pub struct CommissionParameterRow {
    pub parameter_id: i64,
    pub scope_kind: String,
    pub scope_owner_id: i64,
    pub calculation_type: String,
    pub fixed_amount: Option<String>,
    pub rate: Option<String>,
    pub active: i32,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = commission_tiers)]
pub struct CommissionTierRow {
    pub min_amount: String,
    pub max_amount: Option<String>,
    pub rate: String,
}

impl CommissionTierRow {
    pub fn into_domain(self) -> Result<CommissionTier, PersistenceError> {
        Ok(CommissionTier::new(
            decode_decimal("commission_tiers", &self.min_amount)?,
            decode_optional_decimal("commission_tiers", self.max_amount.as_deref())?,
            decode_decimal("commission_tiers", &self.rate)?,
        ))
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = commission_history)]
pub struct CommissionHistoryRow {
    pub history_id: i64,
    pub collector_id: i64,
    pub period_start: String,
    pub period_end: String,
    pub total_commission: String,
    pub total_tax: String,
    pub client_count: i32,
    pub status: String,
    pub remuneration_id: Option<i64>,
    pub remunerated_at: Option<String>,
    pub calculated_at: String,
}

impl CommissionHistoryRow {
    pub fn into_domain(self) -> Result<CommissionHistory, PersistenceError> {
        const TABLE: &str = "commission_history";
        let status: HistoryStatus = self
            .status
            .parse()
            .map_err(|e| PersistenceError::corrupt(TABLE, e))?;
        Ok(CommissionHistory {
            history_id: self.history_id,
            collector_id: CollectorId::new(self.collector_id),
            period: decode_period(TABLE, &self.period_start, &self.period_end)?,
            total_commission: decode_decimal(TABLE, &self.total_commission)?,
            total_tax: decode_decimal(TABLE, &self.total_tax)?,
            client_count: decode_count(TABLE, self.client_count)?,
            status,
            remuneration_id: self.remuneration_id,
            remunerated_at: decode_optional_timestamp(TABLE, self.remunerated_at.as_deref())?,
            calculated_at: decode_timestamp(TABLE, &self.calculated_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = remunerations)]
pub struct RemunerationRow {
    pub remuneration_id: i64,
    pub collector_id: i64,
    pub period_start: String,
    pub period_end: String,
    pub base: String,
    pub gross_salary: String,
    pub deductions: String,
    pub salary_paid: String,
    pub top_up: String,
    pub emf_share: String,
    pub emf_tax: String,
    pub emf_product: String,
    pub retained: String,
    pub created_at: String,
}

impl RemunerationRow {
    pub fn into_domain(self) -> Result<Remuneration, PersistenceError> {
        const TABLE: &str = "remunerations";
        Ok(Remuneration {
            remuneration_id: self.remuneration_id,
            collector_id: CollectorId::new(self.collector_id),
            period: decode_period(TABLE, &self.period_start, &self.period_end)?,
            base: decode_decimal(TABLE, &self.base)?,
            gross_salary: decode_decimal(TABLE, &self.gross_salary)?,
            deductions: decode_decimal(TABLE, &self.deductions)?,
            salary_paid: decode_decimal(TABLE, &self.salary_paid)?,
            top_up: decode_decimal(TABLE, &self.top_up)?,
            emf_share: decode_decimal(TABLE, &self.emf_share)?,
            emf_tax: decode_decimal(TABLE, &self.emf_tax)?,
            emf_product: decode_decimal(TABLE, &self.emf_product)?,
            retained: decode_decimal(TABLE, &self.retained)?,
            created_at: decode_timestamp(TABLE, &self.created_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = remuneration_rubriques)]
pub struct RubriqueRow {
    pub rubrique_id: i64,
    pub name: String,
    pub kind: String,
    pub value: String,
    pub application_date: String,
    pub validity_days: Option<i32>,
    pub active: i32,
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRow {
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub amounts_json: String,
    pub outcome: String,
    pub outcome_message: Option<String>,
    pub recorded_at: String,
}
