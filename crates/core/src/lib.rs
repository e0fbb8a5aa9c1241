// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger services for daily collection.
//!
//! The services are generic over a [`LedgerStore`]. [`Ledger`] binds them
//! to a store and wraps every mutation in a transaction, a retry loop and
//! an audit record.

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

mod audit;
mod calculation;
mod collection;
mod engine;
mod error;
mod ledger;
mod memory;
mod notification;
mod permission;
mod provisioning;
mod repartition;
mod retry;
mod store;

#[cfg(test)]
mod tests;

pub use audit::{AuditSubject, OperationContext, audited};
pub use calculation::{
    CollectorCommission, calculate_commission_for_client,
    calculate_commission_for_client_in_period, calculate_commissions_for_collector,
};
pub use collection::{
    AccountStatement, WithdrawalOutcome, account_statement, close_journal, deposit, open_journal,
    withdraw,
};
pub use engine::{effectuer_mouvement, load_account, post_between, require_account};
pub use error::CoreError;
pub use ledger::Ledger;
pub use memory::MemoryStore;
pub use notification::{LoggingNotificationSink, NotificationSink};
pub use permission::PermissionCache;
pub use provisioning::{
    add_rubrique, ensure_system_account, register_agency, register_client, register_collector,
    set_commission_parameter,
};
pub use repartition::{process_repartition, repartir_commissions};
pub use retry::RetryPolicy;
pub use store::{LedgerStore, StoreError};
