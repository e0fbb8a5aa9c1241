// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod account;
mod commission;
mod error;
mod journal;
mod money;
mod movement;
mod remuneration;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use account::{Account, AccountKind, AccountType, NewAccount, account_number};
pub use commission::{
    CalculationType, CommissionAmounts, CommissionParameter, CommissionResult, CommissionRule,
    CommissionTier, NewCommissionParameter, ParameterScope, compute_commission,
    resolve_parameter, select_tier, validate_rule, validate_tiers,
};
pub use error::DomainError;
pub use journal::{Journal, JournalSummary, summarize_journal};
pub use money::{MONEY_SCALE, checked_amount, percent_of, round_money};
pub use movement::{Direction, Movement, MovementKind, MovementRequest};
pub use remuneration::{
    CommissionHistory, HistoryStatus, NewCommissionHistory, NewRemuneration, NewRubrique,
    Remuneration, RemunerationPlan, RemunerationPolicy, Rubrique, RubriqueDeduction, RubriqueKind,
    SeniorityTier, plan_remuneration,
};
pub use types::{
    AccountId, Agency, AgencyId, Client, ClientId, Collector, CollectorId, JournalId,
    MovementId, NewAgency, NewClient, NewCollector, Period, parse_date,
};
pub use validation::{
    validate_agency_code, validate_cni, validate_name, validate_new_agency, validate_new_client,
    validate_new_collector, validate_positive_amount,
};
