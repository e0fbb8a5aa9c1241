// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod authorization_tests;
mod config_tests;
mod notifier_tests;
mod session_tests;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use collecte::{Ledger, NotificationSink, OperationContext, PermissionCache, RetryPolicy};
use collecte_audit::{Actor, Cause, NotificationEvent};
use collecte_domain::RemunerationPolicy;
use collecte_persistence::Persistence;

use crate::authorization::Authorizer;

/// Collects forwarded notifications for inspection.
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

pub fn create_test_ledger() -> Ledger<Persistence> {
    Ledger::new(
        Persistence::new_in_memory().expect("Failed to create in-memory persistence"),
        RemunerationPolicy::default(),
    )
    .unwrap()
    .with_retry(RetryPolicy::no_retry())
}

pub fn create_test_context() -> OperationContext {
    OperationContext::new(
        Actor::operator("admin-01"),
        Cause::new(String::from("test-cause"), String::from("Test command")),
    )
}

pub fn create_test_authorizer() -> Authorizer {
    Authorizer::new(Arc::new(PermissionCache::new(Duration::from_secs(300))))
}
