// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod initialization_tests;

use crate::Persistence;
use collecte::{Ledger, LedgerStore, OperationContext, RetryPolicy};
use collecte_audit::{Actor, Cause};
use collecte_domain::{
    Account, AccountKind, Agency, Client, Collector, NewAgency, NewClient, NewCollector, Period,
    RemunerationPolicy,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::date;
use time::{Date, OffsetDateTime};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_context() -> OperationContext {
    OperationContext::new(
        Actor::operator("caissier-01"),
        Cause::new(String::from("req-200"), String::from("Counter operation")),
    )
}

pub fn day() -> Date {
    date!(2026 - 03 - 02)
}

pub fn march() -> Period {
    Period::new(date!(2026 - 03 - 01), date!(2026 - 03 - 31)).unwrap()
}

/// A fixed instant so stored timestamps can be compared exactly.
pub fn instant() -> OffsetDateTime {
    date!(2026 - 03 - 02).midnight().assume_utc()
}

/// A ledger over in-memory `SQLite` with one agency, collector and client.
pub struct SeededLedger {
    pub ledger: Ledger<Persistence>,
    pub ctx: OperationContext,
    pub agency: Agency,
    pub collector: Collector,
    pub client: Client,
}

impl SeededLedger {
    pub fn new(seniority_months: u32) -> Self {
        let mut ledger: Ledger<Persistence> =
            Ledger::new(create_test_persistence(), RemunerationPolicy::default())
                .unwrap()
                .with_retry(RetryPolicy::no_retry());
        let ctx: OperationContext = create_test_context();
        ledger.ensure_system_account(&ctx).unwrap();
        let agency: Agency = ledger
            .register_agency(
                &ctx,
                &NewAgency {
                    code: String::from("BFM01"),
                    name: String::from("Bafoussam Centre"),
                },
            )
            .unwrap();
        let collector: Collector = ledger
            .register_collector(
                &ctx,
                &NewCollector {
                    agency_id: agency.agency_id,
                    name: String::from("Tchoupo Alain"),
                    seniority_months,
                    max_withdrawal: dec!(200000),
                },
            )
            .unwrap();
        let client: Client = ledger
            .register_client(
                &ctx,
                &NewClient {
                    collector_id: collector.collector_id,
                    name: String::from("Kamga Sylvie"),
                    cni: String::from("CM87654321"),
                },
            )
            .unwrap();
        Self {
            ledger,
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
}
