// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AgencyId, CalculationType, ClientId, CollectorId, CommissionAmounts, CommissionParameter,
    CommissionResult, CommissionRule, CommissionTier, DomainError, ParameterScope, Period,
    compute_commission, resolve_parameter, select_tier, validate_rule, validate_tiers,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::OffsetDateTime;
use time::macros::{date, datetime};

fn vat() -> Decimal {
    dec!(0.1925)
}

fn standard_tiers() -> Vec<CommissionTier> {
    vec![
        CommissionTier::new(dec!(0), Some(dec!(1000)), dec!(3)),
        CommissionTier::new(dec!(1000), Some(dec!(5000)), dec!(2)),
        CommissionTier::new(dec!(5000), None, dec!(1)),
    ]
}

fn parameter(id: i64, scope: ParameterScope, rule: CommissionRule) -> CommissionParameter {
    CommissionParameter {
        parameter_id: id,
        scope,
        rule,
        active: true,
    }
}

#[test]
fn test_fixed_commission() {
    let amounts: CommissionAmounts =
        compute_commission(&CommissionRule::Fixed(dec!(50)), dec!(12000), vat()).unwrap();
    assert_eq!(amounts.commission, dec!(50));
    assert_eq!(amounts.tva, dec!(9.625));
    assert_eq!(amounts.net, dec!(40.375));
}

#[test]
fn test_fixed_commission_posted_legs_round_half_up() {
    let amounts: CommissionAmounts =
        compute_commission(&CommissionRule::Fixed(dec!(50)), dec!(12000), vat()).unwrap();
    assert_eq!(amounts.posted_tax(), dec!(9.63));
    assert_eq!(amounts.posted_net(), dec!(40.37));
    assert_eq!(amounts.posted_tax() + amounts.posted_net(), dec!(50));
}

#[test]
fn test_percentage_commission() {
    let amounts: CommissionAmounts =
        compute_commission(&CommissionRule::Percentage(dec!(2)), dec!(1000), vat()).unwrap();
    assert_eq!(amounts.commission, dec!(20));
    assert_eq!(amounts.tva, dec!(3.85));
    assert_eq!(amounts.net, dec!(16.15));
}

#[test]
fn test_tier_commission_uses_containing_bracket() {
    let amounts: CommissionAmounts =
        compute_commission(&CommissionRule::Tier(standard_tiers()), dec!(3000), vat()).unwrap();
    assert_eq!(amounts.commission, dec!(60));
    assert_eq!(amounts.tva, dec!(11.55));
}

#[test]
fn test_tier_bounds_are_half_open() {
    let tiers: Vec<CommissionTier> = standard_tiers();
    assert_eq!(select_tier(&tiers, dec!(999.99)).unwrap().rate, dec!(3));
    assert_eq!(select_tier(&tiers, dec!(1000)).unwrap().rate, dec!(2));
    assert_eq!(select_tier(&tiers, dec!(5000)).unwrap().rate, dec!(1));
    assert_eq!(select_tier(&tiers, dec!(1000000)).unwrap().rate, dec!(1));
}

#[test]
fn test_zero_total_yields_zero_for_every_rule() {
    for rule in [
        CommissionRule::Fixed(dec!(50)),
        CommissionRule::Percentage(dec!(2)),
        CommissionRule::Tier(standard_tiers()),
    ] {
        assert_eq!(
            compute_commission(&rule, Decimal::ZERO, vat()).unwrap(),
            CommissionAmounts::ZERO
        );
    }
}

#[test]
fn test_negative_total_is_rejected() {
    let result: Result<CommissionAmounts, DomainError> =
        compute_commission(&CommissionRule::Fixed(dec!(50)), dec!(-1), vat());
    assert!(matches!(result, Err(DomainError::NegativeAmount { .. })));
}

#[test]
fn test_commission_beyond_decimal_range_is_rejected() {
    let result: Result<CommissionAmounts, DomainError> =
        compute_commission(&CommissionRule::Percentage(dec!(50)), Decimal::MAX, vat());
    assert!(matches!(result, Err(DomainError::AmountOutOfRange { .. })));
}

#[test]
fn test_tiers_with_gap_fail_closed() {
    let tiers: Vec<CommissionTier> = vec![
        CommissionTier::new(dec!(0), Some(dec!(1000)), dec!(3)),
        CommissionTier::new(dec!(1500), None, dec!(1)),
    ];
    assert!(matches!(
        validate_tiers(&tiers),
        Err(DomainError::InvalidTierConfiguration { .. })
    ));
    assert!(compute_commission(&CommissionRule::Tier(tiers), dec!(200), vat()).is_err());
}

#[test]
fn test_tiers_must_start_at_zero_and_end_unbounded() {
    let not_from_zero: Vec<CommissionTier> =
        vec![CommissionTier::new(dec!(10), None, dec!(1))];
    assert!(validate_tiers(&not_from_zero).is_err());

    let bounded_end: Vec<CommissionTier> =
        vec![CommissionTier::new(dec!(0), Some(dec!(1000)), dec!(1))];
    assert!(validate_tiers(&bounded_end).is_err());

    let unbounded_middle: Vec<CommissionTier> = vec![
        CommissionTier::new(dec!(0), None, dec!(1)),
        CommissionTier::new(dec!(1000), None, dec!(1)),
    ];
    assert!(validate_tiers(&unbounded_middle).is_err());

    assert!(validate_tiers(&[]).is_err());
}

#[test]
fn test_overlapping_tiers_are_rejected() {
    let tiers: Vec<CommissionTier> = vec![
        CommissionTier::new(dec!(0), Some(dec!(1000)), dec!(3)),
        CommissionTier::new(dec!(900), None, dec!(1)),
    ];
    assert!(validate_tiers(&tiers).is_err());
}

#[test]
fn test_rates_outside_percent_range_are_rejected() {
    assert!(matches!(
        validate_rule(&CommissionRule::Percentage(dec!(100.5))),
        Err(DomainError::InvalidRate { .. })
    ));
    assert!(validate_rule(&CommissionRule::Percentage(dec!(-1))).is_err());
    assert!(validate_rule(&CommissionRule::Fixed(dec!(-1))).is_err());
    assert!(validate_rule(&CommissionRule::Percentage(dec!(100))).is_ok());
}

#[test]
fn test_parameter_priority_client_beats_collector_beats_agency() {
    let client: ClientId = ClientId::new(1);
    let collector: CollectorId = CollectorId::new(2);
    let agency: AgencyId = AgencyId::new(3);

    let mut candidates: Vec<CommissionParameter> = vec![
        parameter(10, ParameterScope::Agency(agency), CommissionRule::Fixed(dec!(10))),
        parameter(11, ParameterScope::Collector(collector), CommissionRule::Fixed(dec!(20))),
        parameter(12, ParameterScope::Client(client), CommissionRule::Fixed(dec!(30))),
    ];
    assert_eq!(
        resolve_parameter(&candidates, client, collector, agency)
            .unwrap()
            .parameter_id,
        12
    );

    candidates.retain(|p| p.parameter_id != 12);
    assert_eq!(
        resolve_parameter(&candidates, client, collector, agency)
            .unwrap()
            .parameter_id,
        11
    );

    candidates.retain(|p| p.parameter_id != 11);
    assert_eq!(
        resolve_parameter(&candidates, client, collector, agency)
            .unwrap()
            .parameter_id,
        10
    );

    candidates.clear();
    assert!(resolve_parameter(&candidates, client, collector, agency).is_none());
}

#[test]
fn test_inactive_parameters_are_skipped() {
    let client: ClientId = ClientId::new(1);
    let collector: CollectorId = CollectorId::new(2);
    let agency: AgencyId = AgencyId::new(3);
    let mut inactive: CommissionParameter =
        parameter(12, ParameterScope::Client(client), CommissionRule::Fixed(dec!(30)));
    inactive.active = false;
    let candidates: Vec<CommissionParameter> = vec![
        inactive,
        parameter(10, ParameterScope::Agency(agency), CommissionRule::Fixed(dec!(10))),
    ];
    assert_eq!(
        resolve_parameter(&candidates, client, collector, agency)
            .unwrap()
            .parameter_id,
        10
    );
}

#[test]
fn test_scope_from_parts() {
    assert_eq!(
        ParameterScope::from_parts("COLLECTOR", 4).unwrap(),
        ParameterScope::Collector(CollectorId::new(4))
    );
    assert!(matches!(
        ParameterScope::from_parts("REGION", 4),
        Err(DomainError::InvalidParameterScope(_))
    ));
}

#[test]
fn test_aggregate_sums_client_results() {
    let period: Period = Period::new(date!(2026 - 01 - 01), date!(2026 - 01 - 31)).unwrap();
    let at: OffsetDateTime = datetime!(2026-02-01 08:00 UTC);
    let collector: CollectorId = CollectorId::new(2);
    let result = |client: i64, total: Decimal, commission: Decimal| -> CommissionResult {
        let amounts: CommissionAmounts =
            CommissionAmounts::from_commission(commission, vat()).unwrap();
        CommissionResult {
            montant_commission: amounts.commission,
            montant_tva: amounts.tva,
            montant_net: amounts.net,
            calculation_type: CalculationType::Percentage,
            client_id: Some(ClientId::new(client)),
            collector_id: collector,
            period,
            montant_total: total,
            calculated_at: at,
        }
    };

    let aggregate: CommissionResult = CommissionResult::aggregate(
        collector,
        period,
        &[result(1, dec!(1000), dec!(20)), result(2, dec!(3000), dec!(60))],
        at,
    )
    .unwrap();
    assert_eq!(aggregate.calculation_type, CalculationType::CollecteurGlobal);
    assert_eq!(aggregate.client_id, None);
    assert_eq!(aggregate.montant_total, dec!(4000));
    assert_eq!(aggregate.montant_commission, dec!(80));
    assert_eq!(aggregate.montant_tva, dec!(15.40));
    assert_eq!(aggregate.montant_net, dec!(64.60));
}
