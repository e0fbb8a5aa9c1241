// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor registration and eager account provisioning.

use crate::error::CoreError;
use crate::store::LedgerStore;
use collecte_domain::{
    Account, AccountKind, Agency, AgencyId, Client, Collector, CommissionParameter, DomainError,
    NewAccount, NewAgency, NewClient, NewCollector, NewCommissionParameter, NewRubrique, Rubrique,
    validate_name, validate_new_agency, validate_new_client, validate_new_collector,
    validate_rule,
};
use rust_decimal::Decimal;
use tracing::info;

/// Name given to the system account.
const SYSTEM_ACCOUNT_OWNER: &str = "Collecte";

fn open_accounts<S: LedgerStore>(
    store: &mut S,
    kinds: &[AccountKind],
    agency: Option<AgencyId>,
    owner_name: &str,
) -> Result<Vec<Account>, CoreError> {
    let mut accounts: Vec<Account> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let account: Account =
            store.insert_account(&NewAccount::for_kind(*kind, agency, owner_name))?;
        info!(
            account_number = %account.account_number,
            kind = %account.kind,
            "Account provisioned"
        );
        accounts.push(account);
    }
    Ok(accounts)
}

/// Creates the system account if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the store fails.
pub fn ensure_system_account<S: LedgerStore>(store: &mut S) -> Result<Account, CoreError> {
    if let Some(account) = store.find_account(&AccountKind::System)? {
        return Ok(account);
    }
    let mut accounts: Vec<Account> =
        open_accounts(store, &[AccountKind::System], None, SYSTEM_ACCOUNT_OWNER)?;
    accounts
        .pop()
        .ok_or_else(|| CoreError::Infrastructure(String::from("system account was not created")))
}

/// Registers an agency and opens its six institutional accounts.
///
/// # Errors
///
/// Returns an error if the agency is invalid or its code is taken.
pub fn register_agency<S: LedgerStore>(
    store: &mut S,
    agency: &NewAgency,
) -> Result<Agency, CoreError> {
    validate_new_agency(agency)?;
    let stored: Agency = store.insert_agency(agency)?;
    open_accounts(
        store,
        &AccountKind::agency_accounts(stored.agency_id),
        Some(stored.agency_id),
        &stored.name,
    )?;
    info!(agency_id = %stored.agency_id, code = %stored.code, "Agency registered");
    Ok(stored)
}

/// Registers a collector and opens its service, waiting and salary accounts.
///
/// # Errors
///
/// Returns an error if the collector is invalid or its agency does not exist.
pub fn register_collector<S: LedgerStore>(
    store: &mut S,
    collector: &NewCollector,
) -> Result<Collector, CoreError> {
    validate_new_collector(collector)?;
    store
        .get_agency(collector.agency_id)?
        .ok_or_else(|| CoreError::not_found("agency", collector.agency_id))?;
    let stored: Collector = store.insert_collector(collector)?;
    open_accounts(
        store,
        &AccountKind::collector_accounts(stored.collector_id),
        Some(stored.agency_id),
        &stored.name,
    )?;
    info!(
        collector_id = %stored.collector_id,
        agency_id = %stored.agency_id,
        "Collector registered"
    );
    Ok(stored)
}

/// Registers a client in its collector's agency and opens its account.
///
/// # Errors
///
/// Returns an error if the client is invalid, its collector does not exist,
/// or its CNI is taken.
pub fn register_client<S: LedgerStore>(
    store: &mut S,
    client: &NewClient,
) -> Result<Client, CoreError> {
    validate_new_client(client)?;
    let collector: Collector = store
        .get_collector(client.collector_id)?
        .ok_or_else(|| CoreError::not_found("collector", client.collector_id))?;
    let stored: Client = store.insert_client(client, collector.agency_id)?;
    open_accounts(
        store,
        &[AccountKind::Client(stored.client_id)],
        Some(stored.agency_id),
        &stored.name,
    )?;
    info!(
        client_id = %stored.client_id,
        collector_id = %stored.collector_id,
        "Client registered"
    );
    Ok(stored)
}

/// Stores a commission parameter after validating its rule.
///
/// # Errors
///
/// Returns an error if the rule is invalid or the scope already has one.
pub fn set_commission_parameter<S: LedgerStore>(
    store: &mut S,
    parameter: &NewCommissionParameter,
) -> Result<CommissionParameter, CoreError> {
    validate_rule(&parameter.rule)?;
    let stored: CommissionParameter = store.insert_commission_parameter(parameter)?;
    info!(
        parameter_id = stored.parameter_id,
        scope = %stored.scope,
        calculation_type = %stored.rule.calculation_type(),
        "Commission parameter stored"
    );
    Ok(stored)
}

/// Stores a remuneration rubrique.
///
/// # Errors
///
/// Returns an error if the name is empty or the rubrique value is negative.
pub fn add_rubrique<S: LedgerStore>(
    store: &mut S,
    rubrique: &NewRubrique,
) -> Result<Rubrique, CoreError> {
    validate_name(&rubrique.name)?;
    if rubrique.kind.value() < Decimal::ZERO {
        return Err(DomainError::NegativeAmount {
            field: String::from("rubrique value"),
            amount: rubrique.kind.value(),
        }
        .into());
    }
    let stored: Rubrique = store.insert_rubrique(rubrique)?;
    info!(
        rubrique_id = stored.rubrique_id,
        name = %stored.name,
        kind = stored.kind.kind_str(),
        "Rubrique stored"
    );
    Ok(stored)
}
