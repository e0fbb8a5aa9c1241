// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! [`LedgerStore`] over the Diesel backends.
//!
//! Each trait method dispatches to the `_sqlite` or `_mysql` variant of a
//! query or mutation. `atomically` drives the connection's transaction
//! manager directly, so nested calls become savepoints.

use collecte::{CoreError, LedgerStore, StoreError};
use collecte_audit::AuditEvent;
use collecte_domain::{
    Account, AccountId, AccountKind, Agency, AgencyId, Client, ClientId, Collector, CollectorId,
    CommissionHistory, CommissionParameter, Journal, JournalId, Movement, MovementKind,
    MovementRequest, NewAccount, NewAgency, NewClient, NewCollector, NewCommissionHistory,
    NewCommissionParameter, NewRemuneration, NewRubrique, ParameterScope, Period, Remuneration,
    Rubrique,
};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};
use tracing::{debug, error};

use crate::Persistence;
use crate::data_models::{account_key, encode_date};
use crate::error::PersistenceError;

fn infrastructure(err: &PersistenceError) -> CoreError {
    CoreError::Infrastructure(err.to_string())
}

impl LedgerStore for Persistence {
    fn atomically<T, F>(&mut self, operation: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, CoreError>,
    {
        self.begin_transaction()
            .map_err(|e| infrastructure(&e))?;
        match operation(self) {
            Ok(value) => {
                self.commit_transaction()
                    .map_err(|e| infrastructure(&e))?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, backend = self.backend_name(), "Rolling back ledger transaction");
                if let Err(rollback) = self.rollback_transaction() {
                    error!(error = %rollback, "Ledger transaction rollback failed");
                }
                Err(err)
            }
        }
    }

    fn insert_agency(&mut self, agency: &NewAgency) -> Result<Agency, StoreError> {
        Ok(with_backend!(self, mutations::actors, insert_agency(agency))?)
    }

    fn get_agency(&mut self, agency_id: AgencyId) -> Result<Option<Agency>, StoreError> {
        Ok(with_backend!(self, queries::actors, get_agency(agency_id.value()))?)
    }

    fn insert_collector(&mut self, collector: &NewCollector) -> Result<Collector, StoreError> {
        Ok(with_backend!(self, mutations::actors, insert_collector(collector))?)
    }

    fn get_collector(
        &mut self,
        collector_id: CollectorId,
    ) -> Result<Option<Collector>, StoreError> {
        Ok(with_backend!(self, queries::actors, get_collector(collector_id.value()))?)
    }

    fn insert_client(
        &mut self,
        client: &NewClient,
        agency_id: AgencyId,
    ) -> Result<Client, StoreError> {
        Ok(with_backend!(
            self,
            mutations::actors,
            insert_client(client, agency_id.value())
        )?)
    }

    fn get_client(&mut self, client_id: ClientId) -> Result<Option<Client>, StoreError> {
        Ok(with_backend!(self, queries::actors, get_client(client_id.value()))?)
    }

    fn list_clients_of_collector(
        &mut self,
        collector_id: CollectorId,
    ) -> Result<Vec<Client>, StoreError> {
        Ok(with_backend!(
            self,
            queries::actors,
            list_clients_of_collector(collector_id.value())
        )?)
    }

    fn insert_account(&mut self, account: &NewAccount) -> Result<Account, StoreError> {
        Ok(with_backend!(self, mutations::accounts, insert_account(account))?)
    }

    fn get_account(&mut self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(with_backend!(self, queries::accounts, get_account(account_id.value()))?)
    }

    fn find_account(&mut self, kind: &AccountKind) -> Result<Option<Account>, StoreError> {
        let key: String = account_key(kind);
        Ok(with_backend!(self, queries::accounts, find_account_by_key(&key))?)
    }

    fn update_account_balance(
        &mut self,
        account_id: AccountId,
        expected_version: i64,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        Ok(with_backend!(
            self,
            mutations::accounts,
            update_account_balance(account_id.value(), expected_version, new_balance)
        )?)
    }

    fn insert_movement(
        &mut self,
        movement: &MovementRequest,
        created_at: OffsetDateTime,
    ) -> Result<Movement, StoreError> {
        Ok(with_backend!(
            self,
            mutations::movements,
            insert_movement(movement, created_at)
        )?)
    }

    fn movements_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Movement>, StoreError> {
        Ok(with_backend!(
            self,
            queries::movements,
            movements_for_account(account_id.value())
        )?)
    }

    fn movements_for_journal(
        &mut self,
        journal_id: JournalId,
    ) -> Result<Vec<Movement>, StoreError> {
        Ok(with_backend!(
            self,
            queries::movements,
            movements_for_journal(journal_id.value())
        )?)
    }

    fn sum_credited(
        &mut self,
        destination: AccountId,
        kind: MovementKind,
        period: &Period,
    ) -> Result<Decimal, StoreError> {
        let start: String = encode_date(period.start());
        let end: String = encode_date(period.end());
        Ok(with_backend!(
            self,
            queries::movements,
            sum_credited(destination.value(), kind.as_str(), &start, &end)
        )?)
    }

    fn insert_journal(
        &mut self,
        collector_id: CollectorId,
        journal_date: Date,
        opened_at: OffsetDateTime,
    ) -> Result<Journal, StoreError> {
        Ok(with_backend!(
            self,
            mutations::journals,
            insert_journal(collector_id, journal_date, opened_at)
        )?)
    }

    fn get_journal(&mut self, journal_id: JournalId) -> Result<Option<Journal>, StoreError> {
        Ok(with_backend!(self, queries::journals, get_journal(journal_id.value()))?)
    }

    fn find_journal(
        &mut self,
        collector_id: CollectorId,
        journal_date: Date,
    ) -> Result<Option<Journal>, StoreError> {
        let date: String = encode_date(journal_date);
        Ok(with_backend!(
            self,
            queries::journals,
            find_journal(collector_id.value(), &date)
        )?)
    }

    fn close_journal(
        &mut self,
        journal_id: JournalId,
        closed_at: OffsetDateTime,
    ) -> Result<Journal, StoreError> {
        Ok(with_backend!(
            self,
            mutations::journals,
            close_journal(journal_id.value(), closed_at)
        )?)
    }

    fn insert_commission_parameter(
        &mut self,
        parameter: &NewCommissionParameter,
    ) -> Result<CommissionParameter, StoreError> {
        Ok(with_backend!(
            self,
            mutations::commission,
            insert_commission_parameter(parameter)
        )?)
    }

    fn find_commission_parameter(
        &mut self,
        scope: &ParameterScope,
    ) -> Result<Option<CommissionParameter>, StoreError> {
        Ok(with_backend!(
            self,
            queries::commission,
            find_commission_parameter(scope.kind_str(), scope.owner_id())
        )?)
    }

    fn insert_commission_history(
        &mut self,
        history: &NewCommissionHistory,
    ) -> Result<CommissionHistory, StoreError> {
        Ok(with_backend!(
            self,
            mutations::commission,
            insert_commission_history(history)
        )?)
    }

    fn find_commission_history(
        &mut self,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Option<CommissionHistory>, StoreError> {
        let start: String = encode_date(period.start());
        let end: String = encode_date(period.end());
        Ok(with_backend!(
            self,
            queries::commission,
            find_commission_history(collector_id.value(), &start, &end)
        )?)
    }

    fn mark_history_remunerated(
        &mut self,
        history_id: i64,
        remuneration_id: i64,
        remunerated_at: OffsetDateTime,
    ) -> Result<CommissionHistory, StoreError> {
        Ok(with_backend!(
            self,
            mutations::commission,
            mark_history_remunerated(history_id, remuneration_id, remunerated_at)
        )?)
    }

    fn insert_remuneration(
        &mut self,
        remuneration: &NewRemuneration,
    ) -> Result<Remuneration, StoreError> {
        Ok(with_backend!(
            self,
            mutations::remuneration,
            insert_remuneration(remuneration)
        )?)
    }

    fn find_remuneration(
        &mut self,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Option<Remuneration>, StoreError> {
        let start: String = encode_date(period.start());
        let end: String = encode_date(period.end());
        Ok(with_backend!(
            self,
            queries::remuneration,
            find_remuneration(collector_id.value(), &start, &end)
        )?)
    }

    fn insert_rubrique(&mut self, rubrique: &NewRubrique) -> Result<Rubrique, StoreError> {
        Ok(with_backend!(self, mutations::remuneration, insert_rubrique(rubrique))?)
    }

    fn list_rubriques(&mut self) -> Result<Vec<Rubrique>, StoreError> {
        Ok(with_backend!(self, queries::remuneration, list_rubriques())?)
    }

    fn record_audit_event(&mut self, event: &AuditEvent) -> Result<i64, StoreError> {
        Ok(with_backend!(self, mutations::audit, record_audit_event(event))?)
    }

    fn list_audit_events(&mut self) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(with_backend!(self, queries::audit, list_audit_events())?)
    }
}
