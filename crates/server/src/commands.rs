// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runs a [`LedgerCommand`] against a ledger and renders the result as JSON.

use collecte::{CoreError, Ledger, LedgerStore, OperationContext, require_account};
use collecte_domain::{
    Account, AccountKind, AccountType, AgencyId, ClientId, CollectorId, CommissionRule,
    CommissionTier, Direction, JournalId, MovementKind, MovementRequest, NewAgency, NewClient,
    NewCollector, NewCommissionParameter, NewRubrique, ParameterScope, Period, RubriqueKind,
};
use rust_decimal::Decimal;
use serde_json::Value;
use time::Date;
use tracing::debug;

use crate::authorization::AuthorizationError;
use crate::cli::{LedgerCommand, RubriqueKindArg, ScopeArg};

/// Errors from running a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The ledger refused or failed the operation.
    #[error(transparent)]
    Ledger(#[from] CoreError),
    /// The command arguments do not describe a valid request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The operator may not run the command.
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),
    /// The result could not be rendered.
    #[error("Failed to render result: {0}")]
    Output(#[from] serde_json::Error),
}

/// Runs one command.
///
/// # Arguments
///
/// * `ledger` - The ledger to operate on
/// * `context` - Actor and cause recorded in the audit trail
/// * `command` - The command to run
///
/// # Errors
///
/// Returns the ledger's error, or `InvalidInput` if the command is
/// malformed (e.g. a parameter with no rule).
#[allow(clippy::too_many_lines)]
pub fn execute<S: LedgerStore>(
    ledger: &mut Ledger<S>,
    context: &OperationContext,
    command: &LedgerCommand,
) -> Result<Value, CommandError> {
    debug!(action = command.action(), actor = %context.actor, "Executing command");
    let value: Value = match command {
        LedgerCommand::Init => serde_json::to_value(ledger.ensure_system_account(context)?)?,
        LedgerCommand::RegisterAgency { code, name } => serde_json::to_value(
            ledger.register_agency(
                context,
                &NewAgency {
                    code: code.clone(),
                    name: name.clone(),
                },
            )?,
        )?,
        LedgerCommand::RegisterCollector {
            agency,
            name,
            seniority_months,
            max_withdrawal,
        } => serde_json::to_value(ledger.register_collector(
            context,
            &NewCollector {
                agency_id: AgencyId::new(*agency),
                name: name.clone(),
                seniority_months: *seniority_months,
                max_withdrawal: *max_withdrawal,
            },
        )?)?,
        LedgerCommand::RegisterClient {
            collector,
            name,
            cni,
        } => serde_json::to_value(ledger.register_client(
            context,
            &NewClient {
                collector_id: CollectorId::new(*collector),
                name: name.clone(),
                cni: cni.clone(),
            },
        )?)?,
        LedgerCommand::SetParameter {
            scope,
            owner,
            fixed,
            rate,
            tiers,
        } => {
            let parameter: NewCommissionParameter = NewCommissionParameter {
                scope: parameter_scope(*scope, *owner),
                rule: commission_rule(*fixed, *rate, tiers)?,
                active: true,
            };
            serde_json::to_value(ledger.set_commission_parameter(context, &parameter)?)?
        }
        LedgerCommand::AddRubrique {
            name,
            kind,
            value,
            collectors,
            application_date,
            validity_days,
        } => {
            let rubrique: NewRubrique = NewRubrique {
                name: name.clone(),
                kind: match kind {
                    RubriqueKindArg::Constant => RubriqueKind::Constant(*value),
                    RubriqueKindArg::Percentage => RubriqueKind::Percentage(*value),
                },
                collectors: collectors.iter().copied().map(CollectorId::new).collect(),
                application_date: *application_date,
                validity_days: *validity_days,
                active: true,
            };
            serde_json::to_value(ledger.add_rubrique(context, &rubrique)?)?
        }
        LedgerCommand::Deposit {
            client,
            amount,
            date,
        } => serde_json::to_value(ledger.deposit(
            context,
            ClientId::new(*client),
            *amount,
            *date,
        )?)?,
        LedgerCommand::Withdraw {
            client,
            amount,
            date,
        } => serde_json::to_value(ledger.withdraw(
            context,
            ClientId::new(*client),
            *amount,
            *date,
        )?)?,
        LedgerCommand::Transfer {
            from_type,
            from_owner,
            to_type,
            to_owner,
            amount,
            label,
            date,
        } => {
            let source: AccountKind = account_kind(*from_type, *from_owner)?;
            let destination: AccountKind = account_kind(*to_type, *to_owner)?;
            transfer(ledger, context, &source, &destination, *amount, label, *date)?
        }
        LedgerCommand::OpenJournal { collector, date } => serde_json::to_value(
            ledger.open_journal(context, CollectorId::new(*collector), *date)?,
        )?,
        LedgerCommand::CloseJournal { journal } => {
            serde_json::to_value(ledger.close_journal(context, JournalId::new(*journal))?)?
        }
        LedgerCommand::Calculate {
            collector,
            client,
            from,
            to,
        } => {
            let period: Period = Period::new(*from, *to).map_err(CoreError::from)?;
            match client {
                Some(client) => serde_json::to_value(
                    ledger.calculate_commission_for_client_in_period(
                        context,
                        ClientId::new(*client),
                        &period,
                    )?,
                )?,
                None => serde_json::to_value(ledger.calculate_commissions_for_collector(
                    context,
                    CollectorId::new(*collector),
                    &period,
                )?)?,
            }
        }
        LedgerCommand::Repartition { collector, from, to } => {
            let period: Period = Period::new(*from, *to).map_err(CoreError::from)?;
            serde_json::to_value(ledger.repartir_commissions(
                context,
                CollectorId::new(*collector),
                &period,
            )?)?
        }
        LedgerCommand::Statement {
            account_type,
            owner,
        } => {
            let kind: AccountKind = account_kind(*account_type, *owner)?;
            serde_json::to_value(ledger.account_statement(&kind)?)?
        }
        LedgerCommand::Audit => serde_json::to_value(ledger.audit_events()?)?,
    };
    Ok(value)
}

const fn parameter_scope(scope: ScopeArg, owner: i64) -> ParameterScope {
    match scope {
        ScopeArg::Client => ParameterScope::Client(ClientId::new(owner)),
        ScopeArg::Collector => ParameterScope::Collector(CollectorId::new(owner)),
        ScopeArg::Agency => ParameterScope::Agency(AgencyId::new(owner)),
    }
}

/// Picks the single rule the arguments describe.
fn commission_rule(
    fixed: Option<Decimal>,
    rate: Option<Decimal>,
    tiers: &[CommissionTier],
) -> Result<CommissionRule, CommandError> {
    match (fixed, rate, tiers.is_empty()) {
        (Some(amount), None, true) => Ok(CommissionRule::Fixed(amount)),
        (None, Some(rate), true) => Ok(CommissionRule::Percentage(rate)),
        (None, None, false) => Ok(CommissionRule::Tier(tiers.to_vec())),
        _ => Err(CommandError::InvalidInput(String::from(
            "exactly one of fixed, rate or tiers is required",
        ))),
    }
}

fn account_kind(account_type: AccountType, owner: Option<i64>) -> Result<AccountKind, CoreError> {
    Ok(AccountKind::from_parts(account_type, owner)?)
}

fn transfer<S: LedgerStore>(
    ledger: &mut Ledger<S>,
    context: &OperationContext,
    source: &AccountKind,
    destination: &AccountKind,
    amount: Decimal,
    label: &str,
    date: Date,
) -> Result<Value, CommandError> {
    let from: Account = require_account(ledger.store_mut(), source)?;
    let to: Account = require_account(ledger.store_mut(), destination)?;
    let request: MovementRequest = MovementRequest::new(
        from.account_id,
        to.account_id,
        amount,
        MovementKind::Transfer,
        Direction::Debit,
        label,
        date,
    );
    Ok(serde_json::to_value(ledger.transfer(
        context,
        source,
        destination,
        &request,
    )?)?)
}
