// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The audit wrapper.
//!
//! [`audited`] runs an operation and then records exactly one
//! [`AuditEvent`] describing it, whether it succeeded or failed. The event
//! is written after the operation's transaction has finished, so failures
//! are recorded even though their ledger changes were rolled back.

use crate::error::CoreError;
use crate::store::LedgerStore;
use collecte_audit::{Action, Actor, AuditEvent, Cause, EntityRef, Outcome};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{error, info, warn};

/// Who asked for an operation and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    /// The requesting actor.
    pub actor: Actor,
    /// The reason for the request.
    pub cause: Cause,
}

impl OperationContext {
    /// Creates a new context.
    #[must_use]
    pub const fn new(actor: Actor, cause: Cause) -> Self {
        Self { actor, cause }
    }
}

/// What an audited operation is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSubject {
    /// Action name (e.g., "`Deposit`").
    pub action: String,
    /// The entity concerned.
    pub entity: EntityRef,
    /// Amounts known before the operation runs.
    pub amounts: Vec<(String, Decimal)>,
}

impl AuditSubject {
    /// Creates a subject with no amounts.
    #[must_use]
    pub fn new(action: &str, entity: EntityRef) -> Self {
        Self {
            action: action.to_string(),
            entity,
            amounts: Vec::new(),
        }
    }

    /// Adds a requested amount.
    #[must_use]
    pub fn with_amount(mut self, label: &str, amount: Decimal) -> Self {
        self.amounts.push((label.to_string(), amount));
        self
    }
}

/// Runs `operation` and records its audit event.
///
/// On success, `summarize` contributes the amounts produced by the
/// operation. A failure to write the audit event is logged and does not
/// change the operation's result.
///
/// # Errors
///
/// Returns the operation's error unchanged.
pub fn audited<S, T, F, M>(
    store: &mut S,
    context: &OperationContext,
    subject: AuditSubject,
    operation: F,
    summarize: M,
) -> Result<T, CoreError>
where
    S: LedgerStore,
    F: FnOnce(&mut S) -> Result<T, CoreError>,
    M: FnOnce(&T) -> Vec<(&'static str, Decimal)>,
{
    let result: Result<T, CoreError> = operation(store);

    let mut amounts: Vec<(String, Decimal)> = subject.amounts;
    let outcome: Outcome = match &result {
        Ok(value) => {
            amounts.extend(
                summarize(value)
                    .into_iter()
                    .map(|(label, amount)| (label.to_string(), amount)),
            );
            Outcome::Success
        }
        Err(err) => Outcome::Failure {
            message: err.to_string(),
        },
    };

    let event: AuditEvent = amounts.into_iter().fold(
        AuditEvent::new(
            context.actor.clone(),
            context.cause.clone(),
            Action::new(subject.action, None),
            subject.entity,
            outcome,
            OffsetDateTime::now_utc(),
        ),
        |event, (label, amount)| event.with_amount(&label, amount),
    );

    match &event.outcome {
        Outcome::Success => info!(
            action = %event.action.name,
            actor = %event.actor,
            entity = %event.entity.entity_type,
            entity_id = event.entity.entity_id.as_deref().unwrap_or("-"),
            "Audit: operation succeeded"
        ),
        Outcome::Failure { message } => warn!(
            action = %event.action.name,
            actor = %event.actor,
            entity = %event.entity.entity_type,
            entity_id = event.entity.entity_id.as_deref().unwrap_or("-"),
            error = %message,
            "Audit: operation failed"
        ),
    }

    if let Err(err) = store.record_audit_event(&event) {
        error!(action = %event.action.name, error = %err, "Failed to persist audit event");
    }
    result
}
