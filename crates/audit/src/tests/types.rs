// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Action, Actor, AuditEvent, Cause, EntityRef, NotificationEvent, Outcome};
use collecte_domain::{AgencyId, ClientId, CollectorId};
use rust_decimal_macros::dec;
use time::macros::{date, datetime};

fn deposit_event(outcome: Outcome) -> AuditEvent {
    AuditEvent::new(
        Actor::operator("caissier1"),
        Cause::new(String::from("req-1"), String::from("Counter deposit")),
        Action::new(String::from("Deposit"), None),
        EntityRef::new("Client", 7),
        outcome,
        datetime!(2026-03-02 10:15 UTC),
    )
}

#[test]
fn test_actor_constructors() {
    let actor: Actor = Actor::operator("caissier1");
    assert_eq!(actor.id, "caissier1");
    assert_eq!(actor.actor_type, "operator");
    assert_eq!(actor.to_string(), "operator:caissier1");

    assert_eq!(Actor::system().actor_type, "system");
}

#[test]
fn test_cause_creation_requires_all_fields() {
    let cause: Cause = Cause::new(String::from("req-456"), String::from("Batch calculation"));

    assert_eq!(cause.id, "req-456");
    assert_eq!(cause.description, "Batch calculation");
}

#[test]
fn test_action_creation_with_details() {
    let action: Action = Action::new(
        String::from("Withdraw"),
        Some(String::from("Cash out at counter")),
    );

    assert_eq!(action.name, "Withdraw");
    assert_eq!(action.details, Some(String::from("Cash out at counter")));
}

#[test]
fn test_entity_ref() {
    let entity: EntityRef = EntityRef::new("Journal", 12);
    assert_eq!(entity.entity_type, "Journal");
    assert_eq!(entity.entity_id.as_deref(), Some("12"));

    assert_eq!(EntityRef::of_type("Agency").entity_id, None);
}

#[test]
fn test_event_carries_labelled_amounts() {
    let event: AuditEvent = deposit_event(Outcome::Success)
        .with_amount("amount", dec!(2500))
        .with_amount("balance_after", dec!(7500.50));

    assert_eq!(event.amount("amount"), Some(dec!(2500)));
    assert_eq!(event.amount("balance_after"), Some(dec!(7500.50)));
    assert_eq!(event.amount("tva"), None);
    assert_eq!(event.amounts.len(), 2);
}

#[test]
fn test_outcome_representation() {
    let success: AuditEvent = deposit_event(Outcome::Success);
    assert!(success.outcome.is_success());
    assert_eq!(success.outcome.as_str(), "SUCCESS");
    assert_eq!(success.outcome.message(), None);

    let failure: AuditEvent = deposit_event(Outcome::Failure {
        message: String::from("Insufficient balance"),
    });
    assert!(!failure.outcome.is_success());
    assert_eq!(failure.outcome.as_str(), "FAILURE");
    assert_eq!(failure.outcome.message(), Some("Insufficient balance"));
}

#[test]
fn test_audit_event_equality() {
    let event1: AuditEvent = deposit_event(Outcome::Success).with_amount("amount", dec!(10));
    let event2: AuditEvent = deposit_event(Outcome::Success).with_amount("amount", dec!(10));
    let event3: AuditEvent = deposit_event(Outcome::Success).with_amount("amount", dec!(11));

    assert_eq!(event1, event2);
    assert_ne!(event1, event3);
}

#[test]
fn test_large_withdrawal_notification() {
    let event: NotificationEvent = NotificationEvent::LargeWithdrawal {
        client_id: ClientId::new(7),
        collector_id: CollectorId::new(2),
        agency_id: AgencyId::new(1),
        amount: dec!(600000),
        threshold: dec!(500000),
        occurred_on: date!(2026 - 03 - 02),
    };
    assert_eq!(event.kind(), "LargeWithdrawal");
    assert_eq!(
        event.to_string(),
        "Client 7 withdrew 600000 via collector 2 on 2026-03-02 (threshold 500000)"
    );
}
