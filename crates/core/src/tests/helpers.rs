// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Ledger, LedgerStore, MemoryStore, NotificationSink, OperationContext, RetryPolicy};
use collecte_audit::{Actor, Cause, NotificationEvent};
use collecte_domain::{
    Account, AccountKind, Agency, AgencyId, Client, Collector, CollectorId, CommissionRule,
    NewAgency, NewClient, NewCollector, NewCommissionParameter, ParameterScope, Period,
    RemunerationPolicy,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use time::Date;
use time::macros::date;

/// Collects published notifications for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: NotificationEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn create_test_context() -> OperationContext {
    OperationContext::new(
        Actor::operator("caissier-01"),
        Cause::new(String::from("req-100"), String::from("Counter operation")),
    )
}

pub fn day() -> Date {
    date!(2026 - 03 - 02)
}

pub fn march() -> Period {
    Period::new(date!(2026 - 03 - 01), date!(2026 - 03 - 31)).unwrap()
}

/// A ledger with one agency, one collector and one client.
pub struct Fixture {
    pub ledger: Ledger<MemoryStore>,
    pub sink: Arc<RecordingSink>,
    pub ctx: OperationContext,
    pub agency: Agency,
    pub collector: Collector,
    pub client: Client,
}

impl Fixture {
    /// Builds the fixture with an established collector.
    pub fn new() -> Self {
        Self::with_collector(12, dec!(1000000))
    }

    pub fn with_collector(seniority_months: u32, max_withdrawal: Decimal) -> Self {
        let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
        let mut ledger: Ledger<MemoryStore> =
            Ledger::new(MemoryStore::new(), RemunerationPolicy::default())
                .unwrap()
                .with_retry(RetryPolicy::no_retry())
                .with_notifier(sink.clone());
        let ctx: OperationContext = create_test_context();
        ledger.ensure_system_account(&ctx).unwrap();
        let agency: Agency = ledger
            .register_agency(
                &ctx,
                &NewAgency {
                    code: String::from("DLA01"),
                    name: String::from("Douala Akwa"),
                },
            )
            .unwrap();
        let collector: Collector = add_collector(
            &mut ledger,
            &ctx,
            agency.agency_id,
            seniority_months,
            max_withdrawal,
        );
        let client: Client = add_client(&mut ledger, &ctx, collector.collector_id, "CM12345678");
        Self {
            ledger,
            sink,
            ctx,
            agency,
            collector,
            client,
        }
    }

    pub fn account(&mut self, kind: AccountKind) -> Account {
        self.ledger
            .store_mut()
            .find_account(&kind)
            .unwrap()
            .unwrap()
    }

    pub fn balance(&mut self, kind: AccountKind) -> Decimal {
        self.account(kind).balance
    }

    pub fn client_balance(&mut self) -> Decimal {
        let kind: AccountKind = AccountKind::Client(self.client.client_id);
        self.balance(kind)
    }

    pub fn deposit(&mut self, amount: Decimal) {
        self.ledger
            .deposit(&self.ctx, self.client.client_id, amount, day())
            .unwrap();
    }

    pub fn set_agency_rule(&mut self, rule: CommissionRule) {
        self.ledger
            .set_commission_parameter(
                &self.ctx,
                &NewCommissionParameter {
                    scope: ParameterScope::Agency(self.agency.agency_id),
                    rule,
                    active: true,
                },
            )
            .unwrap();
    }
}

pub fn add_collector(
    ledger: &mut Ledger<MemoryStore>,
    ctx: &OperationContext,
    agency_id: AgencyId,
    seniority_months: u32,
    max_withdrawal: Decimal,
) -> Collector {
    ledger
        .register_collector(
            ctx,
            &NewCollector {
                agency_id,
                name: String::from("Ngono Marie"),
                seniority_months,
                max_withdrawal,
            },
        )
        .unwrap()
}

pub fn add_client(
    ledger: &mut Ledger<MemoryStore>,
    ctx: &OperationContext,
    collector_id: CollectorId,
    cni: &str,
) -> Client {
    ledger
        .register_client(
            ctx,
            &NewClient {
                collector_id,
                name: String::from("Essomba Paul"),
                cni: cni.to_string(),
            },
        )
        .unwrap()
}
