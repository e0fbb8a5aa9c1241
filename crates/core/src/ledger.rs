// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The public entry points of the ledger.
//!
//! Every mutating operation follows the same shape: run the service inside
//! one store transaction, retry that transaction on retryable errors, record
//! one audit event for the outcome, and publish notifications only after
//! the commit.

use crate::audit::{AuditSubject, OperationContext, audited};
use crate::calculation::{
    CollectorCommission, calculate_commission_for_client,
    calculate_commission_for_client_in_period, calculate_commissions_for_collector,
};
use crate::collection::{
    AccountStatement, WithdrawalOutcome, account_statement, close_journal, deposit, open_journal,
    withdraw,
};
use crate::engine::{effectuer_mouvement, post_between, require_account};
use crate::error::CoreError;
use crate::notification::{LoggingNotificationSink, NotificationSink};
use crate::provisioning::{
    add_rubrique, ensure_system_account, register_agency, register_client, register_collector,
    set_commission_parameter,
};
use crate::repartition::{process_repartition, repartir_commissions};
use crate::retry::RetryPolicy;
use crate::store::LedgerStore;
use collecte_audit::{AuditEvent, EntityRef};
use collecte_domain::{
    Account, AccountKind, Agency, Client, ClientId, Collector, CollectorId, CommissionParameter,
    CommissionResult, Journal, JournalId, JournalSummary, Movement, MovementRequest, NewAgency,
    NewClient, NewCollector, NewCommissionParameter, NewRubrique, Period, Remuneration,
    RemunerationPolicy, Rubrique,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use time::{Date, OffsetDateTime};

/// The ledger service bound to a store.
pub struct Ledger<S: LedgerStore> {
    store: S,
    policy: RemunerationPolicy,
    retry: RetryPolicy,
    notifier: Arc<dyn NotificationSink>,
}

impl<S: LedgerStore> std::fmt::Debug for Ledger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("policy", &self.policy)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl<S: LedgerStore> Ledger<S> {
    /// Creates a ledger with the default retry policy and a logging notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the remuneration policy is invalid.
    pub fn new(store: S, policy: RemunerationPolicy) -> Result<Self, CoreError> {
        policy.validate()?;
        Ok(Self {
            store,
            policy,
            retry: RetryPolicy::default(),
            notifier: Arc::new(LoggingNotificationSink),
        })
    }

    /// Replaces the notification sink.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The active remuneration policy.
    #[must_use]
    pub const fn policy(&self) -> &RemunerationPolicy {
        &self.policy
    }

    /// Direct access to the store, for read-only inspection.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consumes the ledger and returns its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs `operation` in a retried transaction wrapped by the audit record.
    fn execute<T, F, M>(
        &mut self,
        context: &OperationContext,
        subject: AuditSubject,
        mut operation: F,
        summarize: M,
    ) -> Result<T, CoreError>
    where
        F: FnMut(&mut S, &RemunerationPolicy, OffsetDateTime) -> Result<T, CoreError>,
        M: FnOnce(&T) -> Vec<(&'static str, Decimal)>,
    {
        let retry: RetryPolicy = self.retry;
        let policy: RemunerationPolicy = self.policy;
        let action: String = subject.action.clone();
        audited(
            &mut self.store,
            context,
            subject,
            |store: &mut S| {
                retry.run(&action, || {
                    let now: OffsetDateTime = OffsetDateTime::now_utc();
                    store.atomically(|tx: &mut S| operation(tx, &policy, now))
                })
            },
            summarize,
        )
    }

    /// Creates the system account if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn ensure_system_account(
        &mut self,
        context: &OperationContext,
    ) -> Result<Account, CoreError> {
        self.execute(
            context,
            AuditSubject::new("EnsureSystemAccount", EntityRef::of_type("Account")),
            |store, _, _| ensure_system_account(store),
            |_| Vec::new(),
        )
    }

    /// Registers an agency with its accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the agency is invalid or its code is taken.
    pub fn register_agency(
        &mut self,
        context: &OperationContext,
        agency: &NewAgency,
    ) -> Result<Agency, CoreError> {
        self.execute(
            context,
            AuditSubject::new("RegisterAgency", EntityRef::new("Agency", &agency.code)),
            |store, _, _| register_agency(store, agency),
            |_| Vec::new(),
        )
    }

    /// Registers a collector with its accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector is invalid or its agency does not exist.
    pub fn register_collector(
        &mut self,
        context: &OperationContext,
        collector: &NewCollector,
    ) -> Result<Collector, CoreError> {
        self.execute(
            context,
            AuditSubject::new("RegisterCollector", EntityRef::new("Agency", collector.agency_id))
                .with_amount("max_withdrawal", collector.max_withdrawal),
            |store, _, _| register_collector(store, collector),
            |_| Vec::new(),
        )
    }

    /// Registers a client with its account.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is invalid, its collector does not
    /// exist, or its CNI is taken.
    pub fn register_client(
        &mut self,
        context: &OperationContext,
        client: &NewClient,
    ) -> Result<Client, CoreError> {
        self.execute(
            context,
            AuditSubject::new("RegisterClient", EntityRef::new("Collector", client.collector_id)),
            |store, _, _| register_client(store, client),
            |_| Vec::new(),
        )
    }

    /// Stores a commission parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is invalid or the scope already has one.
    pub fn set_commission_parameter(
        &mut self,
        context: &OperationContext,
        parameter: &NewCommissionParameter,
    ) -> Result<CommissionParameter, CoreError> {
        self.execute(
            context,
            AuditSubject::new(
                "SetCommissionParameter",
                EntityRef::new("CommissionParameter", parameter.scope),
            ),
            |store, _, _| set_commission_parameter(store, parameter),
            |_| Vec::new(),
        )
    }

    /// Stores a remuneration rubrique.
    ///
    /// # Errors
    ///
    /// Returns an error if the rubrique is invalid.
    pub fn add_rubrique(
        &mut self,
        context: &OperationContext,
        rubrique: &NewRubrique,
    ) -> Result<Rubrique, CoreError> {
        self.execute(
            context,
            AuditSubject::new("AddRubrique", EntityRef::new("Rubrique", &rubrique.name))
                .with_amount("value", rubrique.kind.value()),
            |store, _, _| add_rubrique(store, rubrique),
            |_| Vec::new(),
        )
    }

    /// Posts a single movement between two accounts.
    ///
    /// # Errors
    ///
    /// Returns any error of the movement engine.
    pub fn effectuer_mouvement(
        &mut self,
        context: &OperationContext,
        request: &MovementRequest,
    ) -> Result<Movement, CoreError> {
        self.execute(
            context,
            AuditSubject::new("EffectuerMouvement", EntityRef::new("Account", request.source))
                .with_amount("amount", request.amount),
            |store, _, now| effectuer_mouvement(store, request, now),
            |movement| vec![("posted", movement.amount)],
        )
    }

    /// Transfers between two accounts by kind, through the liaison account
    /// when they belong to different agencies.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if an account is missing, or any error of
    /// the movement engine.
    pub fn transfer(
        &mut self,
        context: &OperationContext,
        source: &AccountKind,
        destination: &AccountKind,
        request: &MovementRequest,
    ) -> Result<Vec<Movement>, CoreError> {
        self.execute(
            context,
            AuditSubject::new("Transfer", EntityRef::new("Account", source))
                .with_amount("amount", request.amount),
            |store, _, now| {
                let from: Account = require_account(store, source)?;
                let to: Account = require_account(store, destination)?;
                let resolved: MovementRequest = MovementRequest {
                    source: from.account_id,
                    destination: to.account_id,
                    ..request.clone()
                };
                post_between(store, &resolved, now)
            },
            |movements| vec![("legs", Decimal::from(movements.len()))],
        )
    }

    /// Opens a collector's journal for a day.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector does not exist or the journal exists.
    pub fn open_journal(
        &mut self,
        context: &OperationContext,
        collector_id: CollectorId,
        journal_date: Date,
    ) -> Result<Journal, CoreError> {
        self.execute(
            context,
            AuditSubject::new("OpenJournal", EntityRef::new("Collector", collector_id)),
            |store, _, now| open_journal(store, collector_id, journal_date, now),
            |_| Vec::new(),
        )
    }

    /// Closes a journal.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal does not exist or is already closed.
    pub fn close_journal(
        &mut self,
        context: &OperationContext,
        journal_id: JournalId,
    ) -> Result<JournalSummary, CoreError> {
        self.execute(
            context,
            AuditSubject::new("CloseJournal", EntityRef::new("Journal", journal_id)),
            |store, _, now| close_journal(store, journal_id, now),
            |summary| {
                vec![
                    ("total_deposits", summary.total_deposits),
                    ("total_withdrawals", summary.total_withdrawals),
                ]
            },
        )
    }

    /// Records a deposit.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount, client, accounts or journal are invalid.
    pub fn deposit(
        &mut self,
        context: &OperationContext,
        client_id: ClientId,
        amount: Decimal,
        operation_date: Date,
    ) -> Result<Movement, CoreError> {
        self.execute(
            context,
            AuditSubject::new("Deposit", EntityRef::new("Client", client_id))
                .with_amount("amount", amount),
            |store, _, now| deposit(store, client_id, amount, operation_date, now),
            |_| Vec::new(),
        )
    }

    /// Pays out a withdrawal and publishes a notification for large amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount exceeds the collector maximum or the
    /// client balance, or if the client, accounts or journal are invalid.
    pub fn withdraw(
        &mut self,
        context: &OperationContext,
        client_id: ClientId,
        amount: Decimal,
        operation_date: Date,
    ) -> Result<Movement, CoreError> {
        let outcome: WithdrawalOutcome = self.execute(
            context,
            AuditSubject::new("Withdraw", EntityRef::new("Client", client_id))
                .with_amount("amount", amount),
            |store, policy, now| withdraw(store, policy, client_id, amount, operation_date, now),
            |_| Vec::new(),
        )?;
        if let Some(event) = outcome.notification {
            self.notifier.publish(event);
        }
        Ok(outcome.movement)
    }

    /// Returns an account and its movements.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the account does not exist.
    pub fn account_statement(&mut self, kind: &AccountKind) -> Result<AccountStatement, CoreError> {
        account_statement(&mut self.store, kind)
    }

    /// Calculates and posts one client's commission on a given total.
    ///
    /// # Errors
    ///
    /// Returns an error if no parameter applies, the parameter is invalid,
    /// an account is missing, or the client cannot cover the commission.
    pub fn calculate_commission_for_client(
        &mut self,
        context: &OperationContext,
        client_id: ClientId,
        period: &Period,
        montant_total: Decimal,
    ) -> Result<CommissionResult, CoreError> {
        self.execute(
            context,
            AuditSubject::new("CalculateCommission", EntityRef::new("Client", client_id))
                .with_amount("montant_total", montant_total),
            |store, policy, now| {
                calculate_commission_for_client(store, policy, client_id, period, montant_total, now)
            },
            commission_amounts,
        )
    }

    /// Calculates and posts one client's commission on its deposits in the period.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Ledger::calculate_commission_for_client`].
    pub fn calculate_commission_for_client_in_period(
        &mut self,
        context: &OperationContext,
        client_id: ClientId,
        period: &Period,
    ) -> Result<CommissionResult, CoreError> {
        self.execute(
            context,
            AuditSubject::new("CalculateCommission", EntityRef::new("Client", client_id)),
            |store, policy, now| {
                calculate_commission_for_client_in_period(store, policy, client_id, period, now)
            },
            commission_amounts,
        )
    }

    /// Calculates every client commission of a collector for a period.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the period was already calculated, or any error
    /// of the per-client calculation.
    pub fn calculate_commissions_for_collector(
        &mut self,
        context: &OperationContext,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<CollectorCommission, CoreError> {
        self.execute(
            context,
            AuditSubject::new(
                "CalculateCollectorCommissions",
                EntityRef::new("Collector", collector_id),
            ),
            |store, policy, now| {
                calculate_commissions_for_collector(store, policy, collector_id, period, now)
            },
            |run| commission_amounts(&run.global),
        )
    }

    /// Distributes a collector's calculated commissions for a period.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the period was already distributed, or
    /// `ResourceNotFound` if it was never calculated.
    pub fn repartir_commissions(
        &mut self,
        context: &OperationContext,
        collector_id: CollectorId,
        period: &Period,
    ) -> Result<Remuneration, CoreError> {
        self.execute(
            context,
            AuditSubject::new("RepartirCommissions", EntityRef::new("Collector", collector_id)),
            |store, policy, now| repartir_commissions(store, policy, collector_id, period, now),
            remuneration_amounts,
        )
    }

    /// Distributes the commissions described by a calculation result.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Ledger::repartir_commissions`].
    pub fn process_repartition(
        &mut self,
        context: &OperationContext,
        result: &CommissionResult,
    ) -> Result<Remuneration, CoreError> {
        self.execute(
            context,
            AuditSubject::new(
                "RepartirCommissions",
                EntityRef::new("Collector", result.collector_id),
            )
            .with_amount("montant_commission", result.montant_commission),
            |store, policy, now| process_repartition(store, policy, result, now),
            remuneration_amounts,
        )
    }

    /// Lists the recorded audit events.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn audit_events(&mut self) -> Result<Vec<AuditEvent>, CoreError> {
        Ok(self.store.list_audit_events()?)
    }
}

fn commission_amounts(result: &CommissionResult) -> Vec<(&'static str, Decimal)> {
    vec![
        ("montant_total", result.montant_total),
        ("commission", result.montant_commission),
        ("tva", result.montant_tva),
        ("net", result.montant_net),
    ]
}

fn remuneration_amounts(remuneration: &Remuneration) -> Vec<(&'static str, Decimal)> {
    vec![
        ("base", remuneration.base),
        ("salary_paid", remuneration.salary_paid),
        ("top_up", remuneration.top_up),
        ("emf_tax", remuneration.emf_tax),
        ("emf_product", remuneration.emf_product),
        ("retained", remuneration.retained),
    ]
}
