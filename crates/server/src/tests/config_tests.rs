// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use collecte_domain::{
    CollectorId, DomainError, RemunerationPlan, RemunerationPolicy, Rubrique, RubriqueKind,
    plan_remuneration,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::{Date, Month};

use crate::cli::{Args, DatabaseArgs, PolicyArgs};
use crate::config::{ConfigError, DatabaseTarget, PermissionSettings, remuneration_policy};

#[test]
fn test_database_target_defaults_to_memory() {
    assert_eq!(
        DatabaseTarget::from_args(&DatabaseArgs::default()),
        DatabaseTarget::InMemory
    );
}

#[test]
fn test_database_target_selects_backend() {
    let sqlite: DatabaseArgs = DatabaseArgs {
        database: Some(PathBuf::from("/var/lib/collecte/ledger.db")),
        mysql_url: None,
    };
    let mysql: DatabaseArgs = DatabaseArgs {
        database: None,
        mysql_url: Some(String::from("mysql://collecte:secret@db/collecte")),
    };

    assert_eq!(
        DatabaseTarget::from_args(&sqlite),
        DatabaseTarget::Sqlite(PathBuf::from("/var/lib/collecte/ledger.db"))
    );
    assert_eq!(
        DatabaseTarget::from_args(&mysql),
        DatabaseTarget::Mysql(String::from("mysql://collecte:secret@db/collecte"))
    );
}

#[test]
fn test_mysql_target_display_hides_credentials() {
    let target: DatabaseTarget =
        DatabaseTarget::Mysql(String::from("mysql://collecte:secret@db/collecte"));

    assert_eq!(target.to_string(), "mysql");
    assert_eq!(DatabaseTarget::InMemory.to_string(), "sqlite (in-memory)");
}

#[test]
fn test_in_memory_target_opens() {
    assert!(DatabaseTarget::InMemory.open().is_ok());
}

#[test]
fn test_policy_without_overrides_is_default() {
    let policy: RemunerationPolicy = remuneration_policy(&PolicyArgs::default()).unwrap();
    assert_eq!(policy, RemunerationPolicy::default());
}

#[test]
fn test_policy_overrides_are_applied() {
    let args: PolicyArgs = PolicyArgs {
        collector_rate: Some(dec!(0.65)),
        emf_rate: Some(dec!(0.35)),
        new_collector_months: Some(6),
        large_withdrawal_threshold: Some(dec!(250000)),
        ..PolicyArgs::default()
    };

    let policy: RemunerationPolicy = remuneration_policy(&args).unwrap();

    assert_eq!(policy.collector_rate, dec!(0.65));
    assert_eq!(policy.emf_rate, dec!(0.35));
    assert_eq!(policy.new_collector_months, 6);
    assert_eq!(policy.large_withdrawal_threshold, dec!(250000));
    assert_eq!(policy.vat_rate, RemunerationPolicy::default().vat_rate);
}

#[test]
fn test_emf_rate_override_changes_the_institution_share() {
    let args: PolicyArgs = PolicyArgs {
        collector_rate: Some(dec!(0.65)),
        emf_rate: Some(dec!(0.35)),
        ..PolicyArgs::default()
    };
    let policy: RemunerationPolicy = remuneration_policy(&args).unwrap();
    // Withholding the whole salary leaves the EMF share uncapped.
    let advance: Rubrique = Rubrique {
        rubrique_id: 1,
        name: String::from("Avance sur salaire"),
        kind: RubriqueKind::Constant(dec!(2000)),
        collectors: vec![CollectorId::new(1)],
        application_date: Date::from_calendar_date(2026, Month::January, 1).unwrap(),
        validity_days: None,
        active: true,
    };
    let commission: Decimal = dec!(2000);
    let net_pool: Decimal = dec!(1615);

    let default_plan: RemunerationPlan = plan_remuneration(
        &RemunerationPolicy::default(),
        commission,
        net_pool,
        6,
        std::slice::from_ref(&advance),
    )
    .unwrap();
    let plan: RemunerationPlan =
        plan_remuneration(&policy, commission, net_pool, 6, std::slice::from_ref(&advance))
            .unwrap();

    assert_eq!(default_plan.emf_share, dec!(600));
    assert_eq!(default_plan.retained, dec!(1015));
    assert_eq!(plan.emf_share, dec!(700));
    assert_eq!(plan.retained, dec!(915));
}

#[test]
fn test_policy_shares_must_add_up() {
    let args: PolicyArgs = PolicyArgs {
        emf_rate: Some(dec!(0.40)),
        ..PolicyArgs::default()
    };

    let err: ConfigError = remuneration_policy(&args).unwrap_err();

    assert!(matches!(
        err,
        ConfigError::InvalidPolicy(DomainError::InvalidPolicy { .. })
    ));
}

#[test]
fn test_policy_rejects_rate_above_one() {
    let args: PolicyArgs = PolicyArgs {
        vat_rate: Some(dec!(1.5)),
        ..PolicyArgs::default()
    };

    assert!(matches!(
        remuneration_policy(&args),
        Err(ConfigError::InvalidPolicy(DomainError::InvalidRate { .. }))
    ));
}

#[test]
fn test_permission_settings_from_args() {
    let args: Args = Args::try_parse_from([
        "collecte-server",
        "--permission-ttl-secs",
        "120",
        "--eviction-interval-secs",
        "15",
        "audit",
    ])
    .unwrap();

    let settings: PermissionSettings = PermissionSettings::from_args(&args).unwrap();

    assert_eq!(settings.ttl, Duration::from_secs(120));
    assert_eq!(settings.eviction_interval, Duration::from_secs(15));
}

#[test]
fn test_zero_permission_ttl_is_rejected() {
    let args: Args =
        Args::try_parse_from(["collecte-server", "--permission-ttl-secs", "0", "audit"]).unwrap();

    let err: ConfigError = PermissionSettings::from_args(&args).unwrap_err();

    assert!(matches!(err, ConfigError::ZeroDuration("permission-ttl-secs")));
    assert_eq!(err.to_string(), "permission-ttl-secs must be greater than zero");
}
