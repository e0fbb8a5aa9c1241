// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;
use std::time::Duration;

use collecte::PermissionCache;
use rust_decimal_macros::dec;
use time::macros::date;

use super::create_test_authorizer;
use crate::authorization::{AuthorizationError, Authorizer, Capability, Role, spawn_eviction};
use crate::cli::LedgerCommand;

fn register_agency() -> LedgerCommand {
    LedgerCommand::RegisterAgency {
        code: String::from("DLA03"),
        name: String::from("Douala Akwa"),
    }
}

fn deposit() -> LedgerCommand {
    LedgerCommand::Deposit {
        client: 1,
        amount: dec!(1000),
        date: date!(2026 - 03 - 02),
    }
}

#[test]
fn test_role_capabilities() {
    assert!(Role::Admin.permits(Capability::Setup));
    assert!(!Role::Supervisor.permits(Capability::Setup));
    assert!(Role::Supervisor.permits(Capability::Supervision));
    assert!(!Role::Cashier.permits(Capability::Supervision));
    assert!(Role::Cashier.permits(Capability::Counter));
    assert!(Role::Cashier.permits(Capability::Inquiry));
}

#[test]
fn test_command_capabilities() {
    assert_eq!(LedgerCommand::Init.capability(), Capability::Setup);
    assert_eq!(register_agency().capability(), Capability::Setup);
    assert_eq!(LedgerCommand::Audit.capability(), Capability::Supervision);
    assert_eq!(deposit().capability(), Capability::Counter);
    assert_eq!(deposit().action(), "deposit");
    assert_eq!(
        LedgerCommand::CloseJournal { journal: 3 }.action(),
        "close-journal"
    );
}

#[test]
fn test_cashier_is_refused_setup() {
    let mut authorizer: Authorizer = create_test_authorizer();

    let err: AuthorizationError = authorizer
        .authorize("caissier-01", Role::Cashier, &register_agency())
        .unwrap_err();

    assert_eq!(
        err,
        AuthorizationError::Unauthorized {
            action: String::from("register-agency"),
            role: Role::Cashier,
        }
    );
    assert_eq!(
        err.to_string(),
        "Role 'cashier' is not authorized to run 'register-agency'"
    );
}

#[test]
fn test_admin_may_run_everything() {
    let mut authorizer: Authorizer = create_test_authorizer();

    assert!(authorizer.authorize("admin-01", Role::Admin, &LedgerCommand::Init).is_ok());
    assert!(authorizer.authorize("admin-01", Role::Admin, &register_agency()).is_ok());
    assert!(authorizer.authorize("admin-01", Role::Admin, &deposit()).is_ok());
}

#[test]
fn test_decisions_are_cached_per_actor_and_action() {
    let cache: Arc<PermissionCache> = Arc::new(PermissionCache::new(Duration::from_secs(60)));
    let mut authorizer: Authorizer = Authorizer::new(Arc::clone(&cache));

    authorizer.authorize("caissier-01", Role::Cashier, &deposit()).unwrap();
    authorizer
        .authorize("caissier-01", Role::Cashier, &register_agency())
        .unwrap_err();

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("caissier-01", "deposit"), Some(true));
    assert_eq!(cache.get("caissier-01", "register-agency"), Some(false));
}

#[test]
fn test_role_change_drops_cached_refusal() {
    let cache: Arc<PermissionCache> = Arc::new(PermissionCache::new(Duration::from_secs(60)));
    let mut authorizer: Authorizer = Authorizer::new(Arc::clone(&cache));

    assert!(authorizer
        .authorize("ngono", Role::Cashier, &register_agency())
        .is_err());
    assert_eq!(cache.get("ngono", "register-agency"), Some(false));

    assert!(authorizer
        .authorize("ngono", Role::Admin, &register_agency())
        .is_ok());
    assert_eq!(cache.get("ngono", "register-agency"), Some(true));
}

#[test]
fn test_role_change_leaves_other_actors_cached() {
    let cache: Arc<PermissionCache> = Arc::new(PermissionCache::new(Duration::from_secs(60)));
    let mut authorizer: Authorizer = Authorizer::new(Arc::clone(&cache));

    authorizer.authorize("ngono", Role::Cashier, &deposit()).unwrap();
    authorizer.authorize("essomba", Role::Cashier, &deposit()).unwrap();
    authorizer.authorize("ngono", Role::Supervisor, &LedgerCommand::Audit).unwrap();

    assert_eq!(cache.get("essomba", "deposit"), Some(true));
    assert_eq!(cache.get("ngono", "deposit"), None);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn test_eviction_task_sweeps_expired_decisions() {
    let cache: Arc<PermissionCache> = Arc::new(PermissionCache::new(Duration::from_millis(10)));
    cache.insert("caissier-01", "deposit", true);
    assert_eq!(cache.len(), 1);

    let handle: tokio::task::JoinHandle<()> =
        spawn_eviction(Arc::clone(&cache), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(cache.is_empty());
    handle.abort();
}
