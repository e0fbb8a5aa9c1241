// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory reference implementation of [`LedgerStore`].
//!
//! Transactions snapshot the whole store and restore the snapshot when the
//! operation fails. Uniqueness and version rules mirror the SQL schema.

use crate::error::CoreError;
use crate::store::{LedgerStore, StoreError};
use collecte_audit::AuditEvent;
use collecte_domain::{
    Account, AccountId, AccountKind, Agency, AgencyId, Client, ClientId, Collector, CollectorId,
    CommissionHistory, CommissionParameter, HistoryStatus, Journal, JournalId, Movement,
    MovementId, MovementKind, MovementRequest, NewAccount, NewAgency, NewClient, NewCollector,
    NewCommissionHistory, NewCommissionParameter, NewRemuneration, NewRubrique, ParameterScope,
    Period, Remuneration, RemunerationPlan, Rubrique,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use time::{Date, OffsetDateTime};
use tracing::debug;

/// A [`LedgerStore`] held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    next_id: i64,
    agencies: BTreeMap<i64, Agency>,
    collectors: BTreeMap<i64, Collector>,
    clients: BTreeMap<i64, Client>,
    accounts: BTreeMap<i64, Account>,
    movements: BTreeMap<i64, Movement>,
    journals: BTreeMap<i64, Journal>,
    parameters: BTreeMap<i64, CommissionParameter>,
    histories: BTreeMap<i64, CommissionHistory>,
    remunerations: BTreeMap<i64, Remuneration>,
    rubriques: BTreeMap<i64, Rubrique>,
    audit_events: Vec<AuditEvent>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn duplicate(resource: &str, key: impl ToString) -> StoreError {
    StoreError::Duplicate {
        resource: resource.to_string(),
        key: key.to_string(),
    }
}

fn not_found(resource: &str, key: impl ToString) -> StoreError {
    StoreError::NotFound {
        resource: resource.to_string(),
        key: key.to_string(),
    }
}

impl LedgerStore for MemoryStore {
    fn atomically<T, F>(&mut self, operation: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Self) -> Result<T, CoreError>,
    {
        let snapshot: Self = self.clone();
        let result: Result<T, CoreError> = operation(self);
        if let Err(err) = &result {
            debug!(error = %err, "Rolling back in-memory transaction");
            // Audit events are written outside transactions and survive rollback.
            let audit_events: Vec<AuditEvent> = std::mem::take(&mut self.audit_events);
            *self = snapshot;
            self.audit_events = audit_events;
        }
        result
    }

    fn insert_agency(&mut self, agency: &NewAgency) -> Result<Agency, StoreError> {
        if self.agencies.values().any(|a| a.code == agency.code) {
            return Err(duplicate("agency", &agency.code));
        }
        let agency_id: AgencyId = AgencyId::new(self.allocate_id());
        let stored: Agency = Agency {
            agency_id,
            code: agency.code.clone(),
            name: agency.name.clone(),
        };
        self.agencies.insert(agency_id.value(), stored.clone());
        Ok(stored)
    }

    fn get_agency(&mut self, agency_id: AgencyId) -> Result<Option<Agency>, StoreError> {
        Ok(self.agencies.get(&agency_id.value()).cloned())
    }

    fn insert_collector(&mut self, collector: &NewCollector) -> Result<Collector, StoreError> {
        let collector_id: CollectorId = CollectorId::new(self.allocate_id());
        let stored: Collector = Collector {
            collector_id,
            agency_id: collector.agency_id,
            name: collector.name.clone(),
            seniority_months: collector.seniority_months,
            max_withdrawal: collector.max_withdrawal,
        };
        self.collectors.insert(collector_id.value(), stored.clone());
        Ok(stored)
    }

    fn get_collector(
        &mut self,
        collector_id: CollectorId,
    ) -> Result<Option<Collector>, StoreError> {
        Ok(self.collectors.get(&collector_id.value()).cloned())
    }

    fn insert_client(
        &mut self,
        client: &NewClient,
        agency_id: AgencyId,
    ) -> Result<Client, StoreError> {
        if self.clients.values().any(|c| c.cni == client.cni) {
            return Err(duplicate("client", &client.cni));
        }
        let client_id: ClientId = ClientId::new(self.allocate_id());
        let stored: Client = Client {
            client_id,
            collector_id: client.collector_id,
            agency_id,
            name: client.name.clone(),
            cni: client.cni.clone(),
        };
        self.clients.insert(client_id.value(), stored.clone());
        Ok(stored)
    }

    fn get_client(&mut self, client_id: ClientId) -> Result<Option<Client>, StoreError> {
        Ok(self.clients.get(&client_id.value()).cloned())
    }

    fn list_clients_of_collector(
        &mut self,
        collector_id: CollectorId,
    ) -> Result<Vec<Client>, StoreError> {
        Ok(self
            .clients
            .values()
            .filter(|c| c.collector_id == collector_id)
            .cloned()
            .collect())
    }

    fn insert_account(&mut self, account: &NewAccount) -> Result<Account, StoreError> {
        if self
            .accounts
            .values()
            .any(|a| a.account_number == account.account_number)
        {
            return Err(duplicate("account", &account.account_number));
        }
        if self.accounts.values().any(|a| a.kind == account.kind) {
            return Err(duplicate("account", account.kind));
        }
        let account_id: AccountId = AccountId::new(self.allocate_id());
        let stored: Account = Account {
            account_id,
            account_number: account.account_number.clone(),
            name: account.name.clone(),
            kind: account.kind,
            agency_id: account.agency_id,
            balance: Decimal::ZERO,
            version: 0,
        };
        self.accounts.insert(account_id.value(), stored.clone());
        Ok(stored)
    }

    fn get_account(&mut self, account_id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&account_id.value()).cloned())
    }

    fn find_account(&mut self, kind: &AccountKind) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.values().find(|a| a.kind == *kind).cloned())
    }

    fn update_account_balance(
        &mut self,
        account_id: AccountId,
        expected_version: i64,
        new_balance: Decimal,
    ) -> Result<Account, StoreError> {
        let account: &mut Account = self
            .accounts
            .get_mut(&account_id.value())
            .ok_or_else(|| not_found("account", account_id))?;
        if account.version != expected_version {
            return Err(StoreError::VersionConflict {
                account_id: account_id.value(),
                expected_version,
            });
        }
        account.balance = new_balance;
        account.version += 1;
        Ok(account.clone())
    }

    fn insert_movement(
        &mut self,
        movement: &MovementRequest,
        created_at: OffsetDateTime,
    ) -> Result<Movement, StoreError> {
        let movement_id: MovementId = MovementId::new(self.allocate_id());
        let stored: Movement = Movement {
            movement_id,
            amount: movement.amount,
            label: movement.label.clone(),
            direction: movement.direction,
            kind: movement.kind,
            operation_date: movement.operation_date,
            source: movement.source,
            destination: movement.destination,
            journal: movement.journal,
            version: 0,
            created_at,
        };
        self.movements.insert(movement_id.value(), stored.clone());
        Ok(stored)
    }

    fn movements_for_account(
        &mut self,
        account_id: AccountId,
    ) -> Result<Vec<Movement>, StoreError> {
        Ok(self
            .movements
            .values()
            .filter(|m| m.source == account_id || m.destination == account_id)
            .cloned()
            .collect())
    }

    fn movements_for_journal(
        &mut self,
        journal_id: JournalId,
    ) -> Result<Vec<Movement>, StoreError> {
        Ok(self
            .movements
            .values()
            .filter(|m| m.journal == Some(journal_id))
            .cloned()
            .collect())
    }

    fn sum_credited(
        &mut self,
        destination: AccountId,
        kind: MovementKind,
        period: &Period,
    ) -> Result<Decimal, StoreError> {
        Ok(self
            .movements
            .values()
            .filter(|m| {
                m.destination == destination
                    && m.kind == kind
                    && period.contains(m.operation_date)
            })
            .map(|m| m.amount)
            .sum())
    }

    fn insert_journal(
        &mut self,
        collector_id: CollectorId,
        journal_date: Date,
        opened_at: OffsetDateTime,
    ) -> Result<Journal, StoreError> {
        if self
            .journals
            .values()
            .any(|j| j.collector_id == collector_id && j.journal_date == journal_date)
        {
            return Err(duplicate(
                "journal",
                format!("collector {collector_id} on {journal_date}"),
            ));
        }
        let journal_id: JournalId = JournalId::new(self.allocate_id());
        let stored: Journal = Journal {
            journal_id,
            collector_id,
            journal_date,
            opened_at,
            closed: false,
            closed_at: None,
        };
        self.journals.insert(journal_id.value(), stored.clone());
        Ok(stored)
    }

    fn get_journal(&mut self, journal_id: JournalId) -> Result<Option<Journal>, StoreError> {
        Ok(self.journals.get(&journal_id.value()).cloned())
    }

    fn find_journal(
        &mut self,
        collector_id: CollectorId,
        journal_date: Date,
    ) -> Result<Option<Journal>, StoreError> {
        Ok(self
            .journals
            .values()
            .find(|j| j.collector_id == collector_id && j.journal_date == journal_date)
            .cloned())
    }

    fn close_journal(
        &mut self,
        journal_id: JournalId,
        closed_at: OffsetDateTime,
    ) -> Result<Journal, StoreError> {
        let journal: &mut Journal = self
            .journals
            .get_mut(&journal_id.value())
            .ok_or_else(|| not_found("journal", journal_id))?;
        journal.closed = true;
        journal.closed_at = Some(closed_at);
        Ok(journal.clone())
    }

    fn insert_commission_parameter(
        &mut self,
        parameter: &NewCommissionParameter,
    ) -> Result<CommissionParameter, StoreError> {
        if self.parameters.values().any(|p| p.scope == parameter.scope) {
            return Err(duplicate("commission parameter", parameter.scope));
        }
        let parameter_id: i64 = self.allocate_id();
        let stored: CommissionParameter = CommissionParameter {
            parameter_id,
            scope: parameter.scope,
            rule: parameter.rule.clone(),
            active: parameter.active,
        };
        self.parameters.insert(parameter_id, stored.clone());
        Ok(stored)
    }

    fn find_commission_parameter(
        &mut self,
        scope: &ParameterScope,
    ) -> Result<Option<CommissionParameter>, StoreError> {
        Ok(self
            .parameters
            .values()
            .find(|p| p.scope == *scope)
            .cloned())
    }

    fn insert_commission_history(
        &mut self,
        history: &NewCommissionHistory,
    ) -> Result<CommissionHistory, StoreError> {
        if self
            .histories
            .values()
            .any(|h| h.collector_id == history.collector_id && h.period == history.period)
        {
            return Err(duplicate(
                "commission history",
                format!("collector {} for {}", history.collector_id, history.period),
            ));
        }
        let history_id: i64 = self.allocate_id();
        let stored: CommissionHistory = CommissionHistory {
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
        };
        self.histories.insert(history_id, stored.clone());
        Ok(stored)
    }

    fn find_commission_history(
        &mut self,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Option<CommissionHistory>, StoreError> {
        Ok(self
            .histories
            .values()
            .find(|h| h.collector_id == collector_id && h.period == *period)
            .cloned())
    }

    fn mark_history_remunerated(
        &mut self,
        history_id: i64,
        remuneration_id: i64,
        remunerated_at: OffsetDateTime,
    ) -> Result<CommissionHistory, StoreError> {
        let history: &mut CommissionHistory = self
            .histories
            .get_mut(&history_id)
            .ok_or_else(|| not_found("commission history", history_id))?;
        history.status = HistoryStatus::Remunere;
        history.remuneration_id = Some(remuneration_id);
        history.remunerated_at = Some(remunerated_at);
        Ok(history.clone())
    }

    fn insert_remuneration(
        &mut self,
        remuneration: &NewRemuneration,
    ) -> Result<Remuneration, StoreError> {
        if self.remunerations.values().any(|r| {
            r.collector_id == remuneration.collector_id && r.period == remuneration.period
        }) {
            return Err(duplicate(
                "remuneration",
                format!(
                    "collector {} for {}",
                    remuneration.collector_id, remuneration.period
                ),
            ));
        }
        let remuneration_id: i64 = self.allocate_id();
        let plan: &RemunerationPlan = &remuneration.plan;
        let stored: Remuneration = Remuneration {
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
        };
        self.remunerations.insert(remuneration_id, stored.clone());
        Ok(stored)
    }

    fn find_remuneration(
        &mut self,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Option<Remuneration>, StoreError> {
        Ok(self
            .remunerations
            .values()
            .find(|r| r.collector_id == collector_id && r.period == *period)
            .cloned())
    }

    fn insert_rubrique(&mut self, rubrique: &NewRubrique) -> Result<Rubrique, StoreError> {
        let rubrique_id: i64 = self.allocate_id();
        let stored: Rubrique = Rubrique {
            rubrique_id,
            name: rubrique.name.clone(),
            kind: rubrique.kind,
            collectors: rubrique.collectors.clone(),
            application_date: rubrique.application_date,
            validity_days: rubrique.validity_days,
            active: rubrique.active,
        };
        self.rubriques.insert(rubrique_id, stored.clone());
        Ok(stored)
    }

    fn list_rubriques(&mut self) -> Result<Vec<Rubrique>, StoreError> {
        Ok(self.rubriques.values().cloned().collect())
    }

    fn record_audit_event(&mut self, event: &AuditEvent) -> Result<i64, StoreError> {
        self.audit_events.push(event.clone());
        i64::try_from(self.audit_events.len())
            .map_err(|e| StoreError::Backend(format!("audit event count overflow: {e}")))
    }

    fn list_audit_events(&mut self) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(self.audit_events.clone())
    }
}
