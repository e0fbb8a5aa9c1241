// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{Fixture, march};
use crate::{CollectorCommission, CoreError, LedgerStore};
use collecte_domain::{
    AccountKind, AgencyId, CollectorId, CommissionHistory, CommissionRule, HistoryStatus, NewRubrique,
    Remuneration, Rubrique, RubriqueKind,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::date;

/// Deposits 100 000 and calculates 2% on March: commission 2000, tax 385,
/// net pool 1615 in the waiting account.
fn calculated(seniority_months: u32) -> (Fixture, CollectorCommission) {
    let mut fixture: Fixture = Fixture::with_collector(seniority_months, dec!(1000000));
    fixture.set_agency_rule(CommissionRule::Percentage(dec!(2)));
    fixture.deposit(dec!(100000));
    let run: CollectorCommission = fixture
        .ledger
        .calculate_commissions_for_collector(&fixture.ctx, fixture.collector.collector_id, &march())
        .unwrap();
    (fixture, run)
}

#[test]
fn test_established_collector_takes_the_collector_rate_of_the_gross_commission() {
    let (mut fixture, run) = calculated(6);
    assert_eq!(run.history.net_pool(), dec!(1615));

    let remuneration: Remuneration = fixture
        .ledger
        .repartir_commissions(&fixture.ctx, fixture.collector.collector_id, &march())
        .unwrap();

    let agency: AgencyId = fixture.agency.agency_id;
    let collector: CollectorId = fixture.collector.collector_id;
    assert_eq!(remuneration.base, dec!(1615));
    // 0.70 * 2000
    assert_eq!(remuneration.gross_salary, dec!(1400));
    assert_eq!(remuneration.salary_paid, dec!(1400));
    assert_eq!(remuneration.top_up, Decimal::ZERO);
    // 0.30 * 2000 capped by the 215 left after salary
    assert_eq!(remuneration.emf_share, dec!(215));
    assert_eq!(remuneration.emf_tax, dec!(41.39));
    assert_eq!(remuneration.emf_product, dec!(173.61));
    assert_eq!(remuneration.retained, Decimal::ZERO);
    assert_eq!(fixture.balance(AccountKind::CollectorWaiting(collector)), Decimal::ZERO);
    assert_eq!(fixture.balance(AccountKind::CollectorSalary(collector)), dec!(1400));
    assert_eq!(fixture.balance(AccountKind::Product(agency)), dec!(173.61));
    assert_eq!(
        fixture.balance(AccountKind::PassageTax(agency)),
        dec!(385) + dec!(41.39)
    );
}

#[test]
fn test_withheld_salary_is_retained_by_the_agency() {
    let (mut fixture, _) = calculated(6);
    let collector: CollectorId = fixture.collector.collector_id;
    fixture
        .ledger
        .add_rubrique(
            &fixture.ctx,
            &NewRubrique {
                name: String::from("Remboursement avance"),
                kind: RubriqueKind::Constant(dec!(1400)),
                collectors: vec![collector],
                application_date: date!(2026 - 01 - 01),
                validity_days: None,
                active: true,
            },
        )
        .unwrap();

    let remuneration: Remuneration = fixture
        .ledger
        .repartir_commissions(&fixture.ctx, collector, &march())
        .unwrap();

    let agency: AgencyId = fixture.agency.agency_id;
    assert_eq!(remuneration.salary_paid, Decimal::ZERO);
    assert_eq!(remuneration.emf_share, dec!(600));
    assert_eq!(remuneration.emf_tax, dec!(115.50));
    assert_eq!(remuneration.emf_product, dec!(484.50));
    assert_eq!(remuneration.retained, dec!(1015));
    assert_eq!(fixture.balance(AccountKind::CollectorWaiting(collector)), Decimal::ZERO);
    assert_eq!(fixture.balance(AccountKind::CollectorSalary(collector)), Decimal::ZERO);
    assert_eq!(
        fixture.balance(AccountKind::Product(agency)),
        dec!(484.50) + dec!(1015)
    );
}

#[test]
fn test_repartition_legs_stay_within_the_agency() {
    let (mut fixture, _) = calculated(6);
    let agency: AgencyId = fixture.agency.agency_id;
    let liaison_before: Decimal = fixture.balance(AccountKind::AgencyLiaison(agency));

    fixture
        .ledger
        .repartir_commissions(&fixture.ctx, fixture.collector.collector_id, &march())
        .unwrap();

    assert_eq!(
        fixture.balance(AccountKind::AgencyLiaison(agency)),
        liaison_before
    );
}

#[test]
fn test_new_collector_gets_the_fixed_salary_topped_up_from_charges() {
    let (mut fixture, _) = calculated(2);

    let remuneration: Remuneration = fixture
        .ledger
        .repartir_commissions(&fixture.ctx, fixture.collector.collector_id, &march())
        .unwrap();

    let agency: AgencyId = fixture.agency.agency_id;
    let collector: CollectorId = fixture.collector.collector_id;
    assert_eq!(remuneration.salary_paid, dec!(40000));
    assert_eq!(remuneration.top_up, dec!(38385));
    assert_eq!(remuneration.emf_share, Decimal::ZERO);
    assert_eq!(fixture.balance(AccountKind::CollectorSalary(collector)), dec!(40000));
    assert_eq!(fixture.balance(AccountKind::Charge(agency)), dec!(-38385));
    assert_eq!(fixture.balance(AccountKind::CollectorWaiting(collector)), Decimal::ZERO);
    assert_eq!(fixture.balance(AccountKind::Product(agency)), Decimal::ZERO);
}

#[test]
fn test_repartition_marks_history_remunerated() {
    let (mut fixture, run) = calculated(6);
    let remuneration: Remuneration = fixture
        .ledger
        .repartir_commissions(&fixture.ctx, fixture.collector.collector_id, &march())
        .unwrap();

    let history: CommissionHistory = fixture
        .ledger
        .store_mut()
        .find_commission_history(fixture.collector.collector_id, &march())
        .unwrap()
        .unwrap();
    assert_eq!(history.history_id, run.history.history_id);
    assert_eq!(history.status, HistoryStatus::Remunere);
    assert_eq!(history.remuneration_id, Some(remuneration.remuneration_id));
    assert!(history.remunerated_at.is_some());
}

#[test]
fn test_repartition_runs_once_per_period() {
    let (mut fixture, _) = calculated(6);
    let collector: CollectorId = fixture.collector.collector_id;
    fixture
        .ledger
        .repartir_commissions(&fixture.ctx, collector, &march())
        .unwrap();
    let salary_before: Decimal = fixture.balance(AccountKind::CollectorSalary(collector));

    let again: Result<Remuneration, CoreError> =
        fixture
            .ledger
            .repartir_commissions(&fixture.ctx, collector, &march());

    assert!(matches!(again, Err(CoreError::Duplicate { .. })));
    assert_eq!(fixture.balance(AccountKind::CollectorSalary(collector)), salary_before);
}

#[test]
fn test_repartition_without_calculation_is_not_found() {
    let mut fixture: Fixture = Fixture::new();
    let result: Result<Remuneration, CoreError> = fixture.ledger.repartir_commissions(
        &fixture.ctx,
        fixture.collector.collector_id,
        &march(),
    );
    assert!(matches!(result, Err(CoreError::ResourceNotFound { .. })));
}

#[test]
fn test_process_repartition_uses_the_global_result() {
    let (mut fixture, run) = calculated(6);

    let remuneration: Remuneration = fixture
        .ledger
        .process_repartition(&fixture.ctx, &run.global)
        .unwrap();

    assert_eq!(remuneration.collector_id, fixture.collector.collector_id);
    assert_eq!(remuneration.period, march());
    assert_eq!(remuneration.base, dec!(1615));
}

#[test]
fn test_rubriques_reduce_the_salary_paid() {
    let (mut fixture, _) = calculated(6);
    let collector: CollectorId = fixture.collector.collector_id;
    for (name, kind) in [
        ("Cotisation", RubriqueKind::Constant(dec!(100))),
        ("Avance", RubriqueKind::Percentage(dec!(10))),
    ] {
        fixture
            .ledger
            .add_rubrique(
                &fixture.ctx,
                &NewRubrique {
                    name: name.to_string(),
                    kind,
                    collectors: vec![collector],
                    application_date: date!(2026 - 01 - 01),
                    validity_days: None,
                    active: true,
                },
            )
            .unwrap();
    }

    let remuneration: Remuneration = fixture
        .ledger
        .repartir_commissions(&fixture.ctx, collector, &march())
        .unwrap();

    // 1400 - 100 - 140
    assert_eq!(remuneration.deductions, dec!(240));
    assert_eq!(remuneration.salary_paid, dec!(1160));
    assert_eq!(remuneration.emf_share, dec!(455));
    assert_eq!(remuneration.emf_tax, dec!(87.59));
    assert_eq!(
        fixture.balance(AccountKind::CollectorSalary(collector)),
        dec!(1160)
    );
    assert_eq!(
        remuneration.emf_tax
            + remuneration.emf_product
            + remuneration.retained
            + remuneration.salary_paid,
        remuneration.base
    );
}

#[test]
fn test_rubriques_for_other_collectors_are_ignored() {
    let (mut fixture, _) = calculated(6);
    fixture
        .ledger
        .add_rubrique(
            &fixture.ctx,
            &NewRubrique {
                name: String::from("Cotisation"),
                kind: RubriqueKind::Constant(dec!(100)),
                collectors: vec![CollectorId::new(9999)],
                application_date: date!(2026 - 01 - 01),
                validity_days: None,
                active: true,
            },
        )
        .unwrap();

    let remuneration: Remuneration = fixture
        .ledger
        .repartir_commissions(&fixture.ctx, fixture.collector.collector_id, &march())
        .unwrap();

    assert_eq!(remuneration.deductions, Decimal::ZERO);
    assert_eq!(remuneration.salary_paid, dec!(1400));
}

#[test]
fn test_negative_rubrique_is_rejected() {
    let mut fixture: Fixture = Fixture::new();
    let result: Result<Rubrique, CoreError> = fixture.ledger.add_rubrique(
        &fixture.ctx,
        &NewRubrique {
            name: String::from("Bonus"),
            kind: RubriqueKind::Constant(dec!(-5)),
            collectors: Vec::new(),
            application_date: date!(2026 - 01 - 01),
            validity_days: Some(30),
            active: true,
        },
    );
    assert!(matches!(result, Err(CoreError::DomainViolation(_))));
}
