// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CollectorId, DomainError, Period, RemunerationPlan, RemunerationPolicy, Rubrique,
    RubriqueKind, SeniorityTier, plan_remuneration,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::date;

fn rubrique(id: i64, kind: RubriqueKind) -> Rubrique {
    Rubrique {
        rubrique_id: id,
        name: format!("rubrique {id}"),
        kind,
        collectors: vec![CollectorId::new(1)],
        application_date: date!(2026 - 01 - 01),
        validity_days: None,
        active: true,
    }
}

fn january() -> Period {
    Period::new(date!(2026 - 01 - 01), date!(2026 - 01 - 31)).unwrap()
}

fn assert_legs_balance(plan: &RemunerationPlan) {
    assert_eq!(
        plan.from_waiting + plan.emf_tax + plan.emf_product + plan.retained,
        plan.base
    );
    assert_eq!(plan.from_waiting + plan.top_up, plan.salary_paid);
    assert_eq!(plan.salary_paid + plan.total_deductions, plan.gross_salary);
    assert_eq!(plan.emf_tax + plan.emf_product, plan.emf_share);
}

/// Commission 10 000 taxed at 19.25% leaves 8075 in the waiting account.
const COMMISSION: Decimal = dec!(10000);
const NET_POOL: Decimal = dec!(8075);

#[test]
fn test_default_policy_is_valid() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    assert!(policy.validate().is_ok());
    assert_eq!(policy.vat_rate, dec!(0.1925));
    assert_eq!(policy.new_collector_salary, dec!(40000));
    assert_eq!(policy.large_withdrawal_threshold, dec!(500000));
}

#[test]
fn test_policy_rates_must_add_up_to_one() {
    let policy: RemunerationPolicy = RemunerationPolicy {
        emf_rate: dec!(0.25),
        ..RemunerationPolicy::default()
    };
    assert!(matches!(
        policy.validate(),
        Err(DomainError::InvalidPolicy { .. })
    ));
}

#[test]
fn test_seniority_threshold() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    assert_eq!(policy.seniority_tier(2), SeniorityTier::New);
    assert_eq!(policy.seniority_tier(3), SeniorityTier::Established);
}

#[test]
fn test_new_collector_gets_fixed_salary_with_top_up() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    let plan: RemunerationPlan =
        plan_remuneration(&policy, COMMISSION, NET_POOL, 2, &[]).unwrap();
    assert_eq!(plan.seniority, SeniorityTier::New);
    assert_eq!(plan.gross_salary, dec!(40000));
    assert_eq!(plan.salary_paid, dec!(40000));
    assert_eq!(plan.from_waiting, dec!(8075));
    assert_eq!(plan.top_up, dec!(31925));
    assert_eq!(plan.emf_share, Decimal::ZERO);
    assert_eq!(plan.emf_tax, Decimal::ZERO);
    assert_eq!(plan.emf_product, Decimal::ZERO);
    assert_eq!(plan.retained, Decimal::ZERO);
    assert_legs_balance(&plan);
}

#[test]
fn test_established_collector_gets_rate_of_gross_commission() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    let plan: RemunerationPlan =
        plan_remuneration(&policy, COMMISSION, NET_POOL, 6, &[]).unwrap();
    assert_eq!(plan.commission, COMMISSION);
    assert_eq!(plan.base, NET_POOL);
    assert_eq!(plan.gross_salary, dec!(7000));
    assert_eq!(plan.salary_paid, dec!(7000));
    assert_eq!(plan.from_waiting, dec!(7000));
    assert_eq!(plan.top_up, Decimal::ZERO);
    // 30% of the commission is 3000 but only 1075 is left in the pool.
    assert_eq!(plan.emf_share, dec!(1075));
    assert_eq!(plan.emf_tax, dec!(206.94));
    assert_eq!(plan.emf_product, dec!(868.06));
    assert_eq!(plan.retained, Decimal::ZERO);
    assert_legs_balance(&plan);
}

#[test]
fn test_salary_above_pool_is_topped_up() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    // Pool drained by earlier withdrawals from the waiting account.
    let plan: RemunerationPlan =
        plan_remuneration(&policy, COMMISSION, dec!(5000), 6, &[]).unwrap();
    assert_eq!(plan.gross_salary, dec!(7000));
    assert_eq!(plan.from_waiting, dec!(5000));
    assert_eq!(plan.top_up, dec!(2000));
    assert_eq!(plan.emf_share, Decimal::ZERO);
    assert_legs_balance(&plan);
}

#[test]
fn test_rubriques_apply_in_id_order() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    let rubriques: Vec<Rubrique> = vec![
        rubrique(2, RubriqueKind::Percentage(dec!(10))),
        rubrique(1, RubriqueKind::Constant(dec!(500))),
    ];
    let plan: RemunerationPlan =
        plan_remuneration(&policy, COMMISSION, NET_POOL, 6, &rubriques).unwrap();
    assert_eq!(plan.deductions[0].rubrique_id, 1);
    assert_eq!(plan.deductions[0].amount, dec!(500));
    assert_eq!(plan.deductions[1].amount, dec!(700));
    assert_eq!(plan.total_deductions, dec!(1200));
    assert_eq!(plan.salary_paid, dec!(5800));
    assert_eq!(plan.emf_share, dec!(2275));
    assert_eq!(plan.emf_tax, dec!(437.94));
    assert_eq!(plan.emf_product, dec!(1837.06));
    assert_eq!(plan.retained, Decimal::ZERO);
    assert_legs_balance(&plan);
}

#[test]
fn test_deductions_never_make_salary_negative() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    let rubriques: Vec<Rubrique> = vec![
        rubrique(1, RubriqueKind::Constant(dec!(10000))),
        rubrique(2, RubriqueKind::Constant(dec!(50))),
    ];
    let plan: RemunerationPlan =
        plan_remuneration(&policy, COMMISSION, NET_POOL, 6, &rubriques).unwrap();
    assert_eq!(plan.deductions[0].amount, dec!(7000));
    assert_eq!(plan.deductions[1].amount, Decimal::ZERO);
    assert_eq!(plan.salary_paid, Decimal::ZERO);
    assert_eq!(plan.emf_share, dec!(3000));
    assert_eq!(plan.emf_tax, dec!(577.50));
    assert_eq!(plan.emf_product, dec!(2422.50));
    assert_eq!(plan.retained, dec!(5075));
    assert_legs_balance(&plan);
}

#[test]
fn test_emf_rate_sets_the_institution_share() {
    let rubriques: Vec<Rubrique> = vec![rubrique(1, RubriqueKind::Constant(dec!(10000)))];
    let policy: RemunerationPolicy = RemunerationPolicy {
        collector_rate: dec!(0.50),
        emf_rate: dec!(0.50),
        ..RemunerationPolicy::default()
    };
    let plan: RemunerationPlan =
        plan_remuneration(&policy, COMMISSION, NET_POOL, 6, &rubriques).unwrap();
    assert_eq!(plan.gross_salary, dec!(5000));
    assert_eq!(plan.emf_share, dec!(5000));
    assert_eq!(plan.emf_tax, dec!(962.50));
    assert_eq!(plan.emf_product, dec!(4037.50));
    assert_eq!(plan.retained, dec!(3075));
    assert_legs_balance(&plan);
}

#[test]
fn test_negative_amounts_are_rejected() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    assert!(matches!(
        plan_remuneration(&policy, COMMISSION, dec!(-1), 6, &[]),
        Err(DomainError::NegativeAmount { .. })
    ));
    assert!(matches!(
        plan_remuneration(&policy, dec!(-1), NET_POOL, 6, &[]),
        Err(DomainError::NegativeAmount { .. })
    ));
}

#[test]
fn test_percentage_rubrique_beyond_decimal_range_is_rejected() {
    let policy: RemunerationPolicy = RemunerationPolicy::default();
    let rubriques: Vec<Rubrique> = vec![rubrique(1, RubriqueKind::Percentage(dec!(50)))];
    assert!(matches!(
        plan_remuneration(&policy, Decimal::MAX, Decimal::MAX, 6, &rubriques),
        Err(DomainError::AmountOutOfRange { .. })
    ));
}

#[test]
fn test_rubrique_applicability_window() {
    let mut bounded: Rubrique = rubrique(1, RubriqueKind::Constant(dec!(500)));
    bounded.validity_days = Some(30);
    assert!(bounded.applies_to(CollectorId::new(1), &january()).unwrap());

    let february: Period = Period::new(date!(2026 - 02 - 01), date!(2026 - 02 - 01)).unwrap();
    assert!(!bounded.applies_to(CollectorId::new(1), &february).unwrap());

    let mut future: Rubrique = rubrique(2, RubriqueKind::Constant(dec!(500)));
    future.application_date = date!(2026 - 02 - 01);
    assert!(!future.applies_to(CollectorId::new(1), &january()).unwrap());
}

#[test]
fn test_rubrique_scope_and_activity() {
    let scoped: Rubrique = rubrique(1, RubriqueKind::Constant(dec!(500)));
    assert!(!scoped.applies_to(CollectorId::new(2), &january()).unwrap());

    let mut inactive: Rubrique = rubrique(2, RubriqueKind::Constant(dec!(500)));
    inactive.active = false;
    assert!(!inactive.applies_to(CollectorId::new(1), &january()).unwrap());
}
