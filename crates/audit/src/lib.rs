// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use collecte_domain::{AgencyId, ClientId, CollectorId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

#[cfg(test)]
mod tests;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a ledger change:
/// an operator at the counter, a collector in the field, or a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "operator", "collector", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor used for operations the process performs on its own.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }

    /// An operator identified by login.
    #[must_use]
    pub fn operator(login: &str) -> Self {
        Self::new(login.to_string(), String::from("operator"))
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.actor_type, self.id)
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, batch ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The name of the action (e.g., "`Deposit`", "`RepartirCommissions`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The business entity an action touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// The entity type (e.g., "Client", "Collector", "Journal").
    pub entity_type: String,
    /// The entity identifier, when one exists.
    pub entity_id: Option<String>,
}

impl EntityRef {
    /// Creates a reference to an identified entity.
    #[must_use]
    pub fn new(entity_type: &str, entity_id: impl ToString) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id: Some(entity_id.to_string()),
        }
    }

    /// Creates a reference to an entity type without a specific instance.
    #[must_use]
    pub fn of_type(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id: None,
        }
    }
}

/// A labelled monetary amount carried by an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAmount {
    /// What the amount represents (e.g., "amount", "commission", "tva").
    pub label: String,
    /// The amount.
    pub amount: Decimal,
}

/// How an audited operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The operation committed.
    Success,
    /// The operation failed and was rolled back.
    Failure {
        /// The error message.
        message: String,
    },
}

impl Outcome {
    /// Converts this outcome to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure { .. } => "FAILURE",
        }
    }

    /// Returns the failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { message } => Some(message),
        }
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// An immutable record of an attempted ledger operation.
///
/// One event is produced per audited operation, whether it committed or
/// rolled back. Events capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - Which entity it concerned (entity)
/// - The amounts involved (amounts)
/// - How it ended (outcome)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The actor who initiated the operation.
    pub actor: Actor,
    /// The cause or reason for the operation.
    pub cause: Cause,
    /// The action that was attempted.
    pub action: Action,
    /// The entity the action concerned.
    pub entity: EntityRef,
    /// Labelled amounts.
    pub amounts: Vec<AuditAmount>,
    /// Success or failure.
    pub outcome: Outcome,
    /// When the event was recorded.
    pub recorded_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent` with no amounts.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the operation
    /// * `cause` - The reason for the operation
    /// * `action` - The action that was attempted
    /// * `entity` - The entity concerned
    /// * `outcome` - How the operation ended
    /// * `recorded_at` - When the event was recorded
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        entity: EntityRef,
        outcome: Outcome,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            entity,
            amounts: Vec::new(),
            outcome,
            recorded_at,
        }
    }

    /// Appends a labelled amount.
    #[must_use]
    pub fn with_amount(mut self, label: &str, amount: Decimal) -> Self {
        self.amounts.push(AuditAmount {
            label: label.to_string(),
            amount,
        });
        self
    }

    /// Looks up an amount by label.
    #[must_use]
    pub fn amount(&self, label: &str) -> Option<Decimal> {
        self.amounts
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.amount)
    }
}

/// An event published to the notification boundary after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// A withdrawal at or above the configured threshold.
    LargeWithdrawal {
        /// The client who withdrew.
        client_id: ClientId,
        /// The collector who paid out.
        collector_id: CollectorId,
        /// The client's agency.
        agency_id: AgencyId,
        /// The amount withdrawn.
        amount: Decimal,
        /// The threshold that was reached.
        threshold: Decimal,
        /// The value date of the withdrawal.
        occurred_on: Date,
    },
}

impl NotificationEvent {
    /// Returns a short name for the event kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LargeWithdrawal { .. } => "LargeWithdrawal",
        }
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargeWithdrawal {
                client_id,
                collector_id,
                amount,
                threshold,
                occurred_on,
                ..
            } => write!(
                f,
                "Client {client_id} withdrew {amount} via collector {collector_id} on {occurred_on} (threshold {threshold})"
            ),
        }
    }
}
