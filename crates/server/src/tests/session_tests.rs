// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use collecte::{Ledger, NotificationSink};
use collecte_audit::NotificationEvent;
use collecte_persistence::Persistence;
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::io::BufReader;

use super::{RecordingSink, create_test_authorizer, create_test_ledger};
use crate::authorization::Role;
use crate::cli::LedgerCommand;
use crate::session::{Session, SessionRequest, SessionResponse, run};

fn create_test_session() -> Session<Persistence> {
    Session::new(create_test_ledger(), create_test_authorizer())
}

/// Runs a request that must succeed and returns the id under `field`.
fn created_id(session: &mut Session<Persistence>, line: &str, field: &str) -> i64 {
    let response: SessionResponse = session.handle_line(line);
    assert!(response.ok, "request failed: {:?}", response.error);
    response.result.unwrap()[field].as_i64().unwrap()
}

/// Registers an agency, a collector and a client, returning the client id.
fn seed(session: &mut Session<Persistence>) -> i64 {
    let agency: i64 = created_id(
        session,
        r#"{"actor":"admin-01","role":"admin","command":"register-agency","code":"KRI05","name":"Kribi Port"}"#,
        "agency_id",
    );
    let collector: i64 = created_id(
        session,
        &format!(
            r#"{{"actor":"admin-01","role":"admin","command":"register-collector","agency":{agency},"name":"Nkodo Blaise","seniority_months":8,"max_withdrawal":"1000000"}}"#
        ),
        "collector_id",
    );
    created_id(
        session,
        &format!(
            r#"{{"actor":"caissier-01","role":"cashier","command":"register-client","collector":{collector},"name":"Bella Rose","cni":"CM99001122"}}"#
        ),
        "client_id",
    )
}

#[test]
fn test_request_parses_with_defaults() {
    let request: SessionRequest = serde_json::from_str(
        r#"{"actor":"caissier-01","role":"cashier","command":"close-journal","journal":9}"#,
    )
    .unwrap();

    assert_eq!(request.actor, "caissier-01");
    assert_eq!(request.role, Role::Cashier);
    assert_eq!(request.cause_id, None);
    assert_eq!(request.command, LedgerCommand::CloseJournal { journal: 9 });
}

#[test]
fn test_malformed_line_is_answered_with_error() {
    let mut session: Session<Persistence> = create_test_session();

    let response: SessionResponse = session.handle_line("{not json");

    assert!(!response.ok);
    assert!(response.error.unwrap().starts_with("Invalid input"));
    assert_eq!(session.handled(), 1);
}

#[test]
fn test_unknown_command_is_rejected() {
    let mut session: Session<Persistence> = create_test_session();

    let response: SessionResponse =
        session.handle_line(r#"{"actor":"admin-01","role":"admin","command":"rewrite-history"}"#);

    assert!(!response.ok);
}

#[test]
fn test_refused_request_reports_role() {
    let mut session: Session<Persistence> = create_test_session();

    let response: SessionResponse = session.handle_line(
        r#"{"actor":"caissier-01","role":"cashier","command":"register-agency","code":"KRI05","name":"Kribi Port"}"#,
    );

    assert_eq!(
        response,
        SessionResponse {
            ok: false,
            result: None,
            error: Some(String::from(
                "Role 'cashier' is not authorized to run 'register-agency'"
            )),
        }
    );
}

#[test]
fn test_deposit_through_session_updates_balance() {
    let mut session: Session<Persistence> = create_test_session();
    let client: i64 = seed(&mut session);

    let deposit: SessionResponse = session.handle_line(&format!(
        r#"{{"actor":"caissier-01","role":"cashier","cause_id":"bordereau-17","reason":"Daily round","command":"deposit","client":{client},"amount":"45000","date":"2026-03-02"}}"#
    ));
    assert!(deposit.ok, "{:?}", deposit.error);

    let statement: SessionResponse = session.handle_line(&format!(
        r#"{{"actor":"caissier-01","role":"cashier","command":"statement","account_type":"CLIENT","owner":{client}}}"#
    ));
    let result: Value = statement.result.unwrap();
    let balance: rust_decimal::Decimal =
        serde_json::from_value(result["account"]["balance"].clone()).unwrap();
    assert_eq!(balance, dec!(45000));
}

#[test]
fn test_large_withdrawal_reaches_notifier() {
    let recorder: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let ledger: Ledger<Persistence> =
        create_test_ledger().with_notifier(Arc::clone(&recorder) as Arc<dyn NotificationSink>);
    let mut session: Session<Persistence> = Session::new(ledger, create_test_authorizer());
    let client: i64 = seed(&mut session);

    for line in [
        format!(
            r#"{{"actor":"caissier-01","role":"cashier","command":"deposit","client":{client},"amount":"700000","date":"2026-03-02"}}"#
        ),
        format!(
            r#"{{"actor":"caissier-01","role":"cashier","command":"withdraw","client":{client},"amount":"500000","date":"2026-03-02"}}"#
        ),
    ] {
        let response: SessionResponse = session.handle_line(&line);
        assert!(response.ok, "{:?}", response.error);
    }

    let events: Vec<NotificationEvent> = recorder.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), "LargeWithdrawal");
}

#[tokio::test]
async fn test_run_answers_each_line() {
    let mut session: Session<Persistence> = create_test_session();
    let input: &[u8] = concat!(
        r#"{"actor":"admin-01","role":"admin","command":"init"}"#,
        "\n",
        "\n",
        "garbage\n",
        r#"{"actor":"caissier-01","role":"cashier","command":"audit"}"#,
        "\n",
        r#"{"actor":"audit-02","role":"supervisor","command":"audit"}"#,
        "\n",
    )
    .as_bytes();
    let mut output: Vec<u8> = Vec::new();

    let handled: u64 = run(&mut session, BufReader::new(input), &mut output)
        .await
        .unwrap();

    assert_eq!(handled, 4);
    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let outcomes: Vec<bool> = responses
        .iter()
        .map(|response| response["ok"].as_bool().unwrap())
        .collect();
    assert_eq!(outcomes, vec![true, false, false, true]);
    assert!(responses[1].get("result").is_none());
    assert!(responses[3]["result"].is_array());
}
