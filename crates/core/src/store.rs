// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The ledger store boundary.
//!
//! Services never touch storage directly; they go through [`LedgerStore`].
//! Every ledger mutation runs inside [`LedgerStore::atomically`], and account
//! balances change only through [`LedgerStore::update_account_balance`],
//! a compare-and-swap on the account version.

use crate::error::CoreError;
use collecte_audit::AuditEvent;
use collecte_domain::{
    Account, AccountId, AccountKind, Agency, AgencyId, Client, ClientId, Collector, CollectorId,
    CommissionHistory, CommissionParameter, Journal, JournalId, Movement, MovementKind,
    MovementRequest, NewAccount, NewAgency, NewClient, NewCollector, NewCommissionHistory,
    NewCommissionParameter, NewRemuneration, NewRubrique, ParameterScope, Period, Remuneration,
    Rubrique,
};
use rust_decimal::Decimal;
use thiserror::Error;
use time::{Date, OffsetDateTime};

/// Errors reported by a store implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A row referenced by an update does not exist.
    #[error("{resource} not found: {key}")]
    NotFound { resource: String, key: String },

    /// A unique business key is already taken.
    #[error("{resource} already exists: {key}")]
    Duplicate { resource: String, key: String },

    /// An account was updated with a stale version.
    #[error("Account {account_id} changed since version {expected_version}")]
    VersionConflict {
        account_id: i64,
        expected_version: i64,
    },

    /// The backend failed.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { resource, key } => Self::ResourceNotFound { resource, key },
            StoreError::Duplicate { resource, key } => Self::Duplicate { resource, key },
            StoreError::VersionConflict {
                account_id,
                expected_version,
            } => Self::Conflict(format!(
                "account {account_id} changed since version {expected_version}"
            )),
            StoreError::Backend(message) => Self::Infrastructure(message),
        }
    }
}

/// Storage for accounts, movements, actors and the commission pipeline.
///
/// Lookups return `Ok(None)` on a miss; the services decide whether a miss
/// is fatal. Inserts report `StoreError::Duplicate` when a unique business
/// key is already taken.
pub trait LedgerStore {
    /// Runs `operation` as one transaction.
    ///
    /// If the operation returns an error every change it made is rolled
    /// back and the error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or `CoreError::Infrastructure` if the
    /// transaction itself could not be started or committed.
    fn atomically<T, F>(&mut self, operation: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, CoreError>;

    /// Inserts an agency.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the agency code is taken.
    fn insert_agency(&mut self, agency: &NewAgency) -> Result<Agency, StoreError>;

    /// Looks up an agency.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_agency(&mut self, agency_id: AgencyId) -> Result<Option<Agency>, StoreError>;

    /// Inserts a collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_collector(&mut self, collector: &NewCollector) -> Result<Collector, StoreError>;

    /// Looks up a collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_collector(&mut self, collector_id: CollectorId)
    -> Result<Option<Collector>, StoreError>;

    /// Inserts a client attached to the agency of its collector.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the CNI is taken.
    fn insert_client(&mut self, client: &NewClient, agency_id: AgencyId)
    -> Result<Client, StoreError>;

    /// Looks up a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_client(&mut self, client_id: ClientId) -> Result<Option<Client>, StoreError>;

    /// Lists the clients followed by a collector, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_clients_of_collector(
        &mut self,
        collector_id: CollectorId,
    ) -> Result<Vec<Client>, StoreError>;

    /// Inserts an account with a zero balance and version zero.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the account number or kind is taken.
    fn insert_account(&mut self, account: &NewAccount) -> Result<Account, StoreError>;

    /// Looks up an account by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_account(&mut self, account_id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Looks up an account by kind and owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_account(&mut self, kind: &AccountKind) -> Result<Option<Account>, StoreError>;

    /// Sets an account balance if its version still matches.
    ///
    /// The version is incremented on success.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the stored version differs from
    /// `expected_version`, `NotFound` if the account does not exist.
    fn update_account_balance(
        &mut self,
        account_id: AccountId,
        expected_version: i64,
        new_balance: Decimal,
    ) -> Result<Account, StoreError>;

    /// Appends a movement.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_movement(
        &mut self,
        movement: &MovementRequest,
        created_at: OffsetDateTime,
    ) -> Result<Movement, StoreError>;

    /// Lists the movements touching an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn movements_for_account(&mut self, account_id: AccountId)
    -> Result<Vec<Movement>, StoreError>;

    /// Lists the movements recorded in a journal, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn movements_for_journal(&mut self, journal_id: JournalId)
    -> Result<Vec<Movement>, StoreError>;

    /// Sums the movements of one kind credited to an account within a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn sum_credited(
        &mut self,
        destination: AccountId,
        kind: MovementKind,
        period: &Period,
    ) -> Result<Decimal, StoreError>;

    /// Inserts an open journal.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the collector already has a journal for the date.
    fn insert_journal(
        &mut self,
        collector_id: CollectorId,
        journal_date: Date,
        opened_at: OffsetDateTime,
    ) -> Result<Journal, StoreError>;

    /// Looks up a journal by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn get_journal(&mut self, journal_id: JournalId) -> Result<Option<Journal>, StoreError>;

    /// Looks up a collector's journal for a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_journal(
        &mut self,
        collector_id: CollectorId,
        journal_date: Date,
    ) -> Result<Option<Journal>, StoreError>;

    /// Marks a journal closed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the journal does not exist.
    fn close_journal(
        &mut self,
        journal_id: JournalId,
        closed_at: OffsetDateTime,
    ) -> Result<Journal, StoreError>;

    /// Inserts a commission parameter.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the scope already has a parameter.
    fn insert_commission_parameter(
        &mut self,
        parameter: &NewCommissionParameter,
    ) -> Result<CommissionParameter, StoreError>;

    /// Looks up the parameter of a scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_commission_parameter(
        &mut self,
        scope: &ParameterScope,
    ) -> Result<Option<CommissionParameter>, StoreError>;

    /// Inserts a commission history.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the collector already has a history for the period.
    fn insert_commission_history(
        &mut self,
        history: &NewCommissionHistory,
    ) -> Result<CommissionHistory, StoreError>;

    /// Looks up a collector's history for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_commission_history(
        &mut self,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Option<CommissionHistory>, StoreError>;

    /// Marks a history remunerated.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the history does not exist.
    fn mark_history_remunerated(
        &mut self,
        history_id: i64,
        remuneration_id: i64,
        remunerated_at: OffsetDateTime,
    ) -> Result<CommissionHistory, StoreError>;

    /// Inserts a remuneration.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the collector already has one for the period.
    fn insert_remuneration(
        &mut self,
        remuneration: &NewRemuneration,
    ) -> Result<Remuneration, StoreError>;

    /// Looks up a collector's remuneration for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn find_remuneration(
        &mut self,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Option<Remuneration>, StoreError>;

    /// Inserts a rubrique.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn insert_rubrique(&mut self, rubrique: &NewRubrique) -> Result<Rubrique, StoreError>;

    /// Lists every rubrique, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_rubriques(&mut self) -> Result<Vec<Rubrique>, StoreError>;

    /// Appends an audit event and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn record_audit_event(&mut self, event: &AuditEvent) -> Result<i64, StoreError>;

    /// Lists every audit event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn list_audit_events(&mut self) -> Result<Vec<AuditEvent>, StoreError>;
}
