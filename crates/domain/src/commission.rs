// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission parameters and commission arithmetic.
//!
//! A commission parameter is scoped to a client, a collector, or an agency.
//! The most specific active parameter wins. Amounts produced here are exact;
//! callers round them only when they are posted to the ledger.

use crate::error::DomainError;
use crate::money::{checked_amount, percent_of, round_money};
use crate::types::{AgencyId, ClientId, CollectorId, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The owner a commission parameter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterScope {
    /// Applies to a single client.
    Client(ClientId),
    /// Applies to every client of a collector.
    Collector(CollectorId),
    /// Applies to every client of an agency.
    Agency(AgencyId),
}

impl ParameterScope {
    /// Returns the stored scope discriminator.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Client(_) => "CLIENT",
            Self::Collector(_) => "COLLECTOR",
            Self::Agency(_) => "AGENCY",
        }
    }

    /// Returns the raw owner identifier.
    #[must_use]
    pub const fn owner_id(&self) -> i64 {
        match self {
            Self::Client(id) => id.value(),
            Self::Collector(id) => id.value(),
            Self::Agency(id) => id.value(),
        }
    }

    /// Rebuilds a scope from its stored discriminator and owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the discriminator is unknown.
    pub fn from_parts(kind: &str, owner_id: i64) -> Result<Self, DomainError> {
        match kind {
            "CLIENT" => Ok(Self::Client(ClientId::new(owner_id))),
            "COLLECTOR" => Ok(Self::Collector(CollectorId::new(owner_id))),
            "AGENCY" => Ok(Self::Agency(AgencyId::new(owner_id))),
            _ => Err(DomainError::InvalidParameterScope(kind.to_string())),
        }
    }
}

impl std::fmt::Display for ParameterScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind_str(), self.owner_id())
    }
}

/// A bracket `[min, max)` of a tiered commission; `max = None` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTier {
    /// Inclusive lower bound.
    pub min: Decimal,
    /// Exclusive upper bound, `None` for the last bracket.
    pub max: Option<Decimal>,
    /// Rate in percent applied to the whole amount.
    pub rate: Decimal,
}

impl CommissionTier {
    /// Creates a new tier.
    #[must_use]
    pub const fn new(min: Decimal, max: Option<Decimal>, rate: Decimal) -> Self {
        Self { min, max, rate }
    }

    /// Checks whether the bracket contains the amount.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        amount >= self.min && self.max.is_none_or(|max| amount < max)
    }
}

/// How a commission is computed from a collected total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionRule {
    /// A flat amount regardless of the total.
    Fixed(Decimal),
    /// A percentage of the total.
    Percentage(Decimal),
    /// A percentage chosen by the bracket the total falls into.
    Tier(Vec<CommissionTier>),
}

impl CommissionRule {
    /// Returns the calculation type this rule produces.
    #[must_use]
    pub const fn calculation_type(&self) -> CalculationType {
        match self {
            Self::Fixed(_) => CalculationType::Fixed,
            Self::Percentage(_) => CalculationType::Percentage,
            Self::Tier(_) => CalculationType::Tier,
        }
    }
}

/// Origin of a commission result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CalculationType {
    /// A fixed-amount rule.
    Fixed,
    /// A percentage rule.
    Percentage,
    /// A tiered rule.
    Tier,
    /// The aggregate of every client of a collector.
    CollecteurGlobal,
}

impl CalculationType {
    /// Converts this calculation type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Percentage => "PERCENTAGE",
            Self::Tier => "TIER",
            Self::CollecteurGlobal => "COLLECTEUR_GLOBAL",
        }
    }
}

impl FromStr for CalculationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIXED" => Ok(Self::Fixed),
            "PERCENTAGE" => Ok(Self::Percentage),
            "TIER" => Ok(Self::Tier),
            "COLLECTEUR_GLOBAL" => Ok(Self::CollecteurGlobal),
            _ => Err(DomainError::InvalidCalculationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for CalculationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored commission parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionParameter {
    /// The canonical identifier.
    pub parameter_id: i64,
    /// Who the parameter applies to.
    pub scope: ParameterScope,
    /// How the commission is computed.
    pub rule: CommissionRule,
    /// Inactive parameters are ignored by resolution.
    pub active: bool,
}

/// Input for creating a commission parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommissionParameter {
    /// Who the parameter applies to.
    pub scope: ParameterScope,
    /// How the commission is computed.
    pub rule: CommissionRule,
    /// Whether the parameter takes part in resolution.
    pub active: bool,
}

/// Picks the parameter that applies to a client.
///
/// Priority is client, then collector, then agency. Inactive parameters are
/// skipped.
///
/// # Arguments
///
/// * `candidates` - Parameters fetched for any of the three scopes
/// * `client_id` - The client being charged
/// * `collector_id` - The client's collector
/// * `agency_id` - The client's agency
#[must_use]
pub fn resolve_parameter(
    candidates: &[CommissionParameter],
    client_id: ClientId,
    collector_id: CollectorId,
    agency_id: AgencyId,
) -> Option<&CommissionParameter> {
    let order: [ParameterScope; 3] = [
        ParameterScope::Client(client_id),
        ParameterScope::Collector(collector_id),
        ParameterScope::Agency(agency_id),
    ];
    order.iter().find_map(|scope| {
        candidates
            .iter()
            .find(|parameter| parameter.active && parameter.scope == *scope)
    })
}

fn validate_percentage(name: &str, rate: Decimal) -> Result<(), DomainError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(DomainError::InvalidRate {
            name: name.to_string(),
            rate,
        });
    }
    Ok(())
}

/// Validates that a tier list partitions `[0, +inf)`.
///
/// # Errors
///
/// Returns an error if:
/// - The list is empty
/// - The first bracket does not start at zero
/// - A bracket is empty or inverted
/// - Two consecutive brackets leave a gap or overlap
/// - A bracket other than the last is unbounded, or the last is bounded
/// - A rate lies outside `[0, 100]`
pub fn validate_tiers(tiers: &[CommissionTier]) -> Result<(), DomainError> {
    let Some(first) = tiers.first() else {
        return Err(DomainError::InvalidTierConfiguration {
            reason: String::from("at least one tier is required"),
        });
    };
    if first.min != Decimal::ZERO {
        return Err(DomainError::InvalidTierConfiguration {
            reason: format!("first tier must start at 0, starts at {}", first.min),
        });
    }

    let last_index: usize = tiers.len() - 1;
    for (index, tier) in tiers.iter().enumerate() {
        validate_percentage("tier rate", tier.rate)?;
        match (tier.max, index == last_index) {
            (None, true) => {}
            (None, false) => {
                return Err(DomainError::InvalidTierConfiguration {
                    reason: format!("tier starting at {} is unbounded but not last", tier.min),
                });
            }
            (Some(max), true) => {
                return Err(DomainError::InvalidTierConfiguration {
                    reason: format!("last tier must be unbounded, ends at {max}"),
                });
            }
            (Some(max), false) => {
                if max <= tier.min {
                    return Err(DomainError::InvalidTierConfiguration {
                        reason: format!("tier [{}, {max}) is empty", tier.min),
                    });
                }
                let next_min: Decimal = tiers[index + 1].min;
                if next_min != max {
                    return Err(DomainError::InvalidTierConfiguration {
                        reason: format!("tier ending at {max} is followed by one starting at {next_min}"),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Validates a commission rule.
///
/// # Errors
///
/// Returns an error if a fixed amount is negative, a rate lies outside
/// `[0, 100]`, or a tier list is malformed.
pub fn validate_rule(rule: &CommissionRule) -> Result<(), DomainError> {
    match rule {
        CommissionRule::Fixed(amount) => {
            if *amount < Decimal::ZERO {
                return Err(DomainError::NegativeAmount {
                    field: String::from("fixed commission"),
                    amount: *amount,
                });
            }
            Ok(())
        }
        CommissionRule::Percentage(rate) => validate_percentage("commission rate", *rate),
        CommissionRule::Tier(tiers) => validate_tiers(tiers),
    }
}

/// Finds the bracket containing `amount`.
///
/// The tier list is validated first; a malformed list is rejected rather
/// than searched.
///
/// # Errors
///
/// Returns an error if the tiers are invalid or no bracket matches.
pub fn select_tier(tiers: &[CommissionTier], amount: Decimal) -> Result<&CommissionTier, DomainError> {
    validate_tiers(tiers)?;
    tiers
        .iter()
        .find(|tier| tier.contains(amount))
        .ok_or(DomainError::NoMatchingTier { amount })
}

/// Exact commission, tax and net amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionAmounts {
    /// Gross commission.
    pub commission: Decimal,
    /// Tax on the commission.
    pub tva: Decimal,
    /// Commission net of tax.
    pub net: Decimal,
}

impl CommissionAmounts {
    /// All-zero amounts.
    pub const ZERO: Self = Self {
        commission: Decimal::ZERO,
        tva: Decimal::ZERO,
        net: Decimal::ZERO,
    };

    /// Derives tax and net from a gross commission.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` if the tax does not fit in a `Decimal`.
    pub fn from_commission(commission: Decimal, vat_rate: Decimal) -> Result<Self, DomainError> {
        let tva: Decimal = checked_amount(
            &format!("taxing commission {commission}"),
            commission.checked_mul(vat_rate),
        )?;
        let net: Decimal = checked_amount(
            &format!("netting commission {commission}"),
            commission.checked_sub(tva),
        )?;
        Ok(Self {
            commission,
            tva,
            net,
        })
    }

    /// Amount posted to the tax passage account.
    #[must_use]
    pub fn posted_tax(&self) -> Decimal {
        round_money(self.tva)
    }

    /// Amount posted to the collector waiting account.
    ///
    /// Computed from the rounded legs so that the two postings add up to the
    /// rounded commission.
    #[must_use]
    pub fn posted_net(&self) -> Decimal {
        round_money(self.commission) - self.posted_tax()
    }
}

/// Computes the commission due on a collected total.
///
/// A zero total yields zero amounts for every rule.
///
/// # Arguments
///
/// * `rule` - The resolved commission rule
/// * `total` - The collected amount the commission is based on
/// * `vat_rate` - Tax rate as a fraction (e.g. `0.1925`)
///
/// # Errors
///
/// Returns an error if:
/// - The total is negative or the rule is invalid
/// - No tier bracket matches
/// - The commission leaves the representable range
pub fn compute_commission(
    rule: &CommissionRule,
    total: Decimal,
    vat_rate: Decimal,
) -> Result<CommissionAmounts, DomainError> {
    if total < Decimal::ZERO {
        return Err(DomainError::NegativeAmount {
            field: String::from("montant_total"),
            amount: total,
        });
    }
    validate_rule(rule)?;
    if total.is_zero() {
        return Ok(CommissionAmounts::ZERO);
    }

    let commission: Decimal = match rule {
        CommissionRule::Fixed(amount) => *amount,
        CommissionRule::Percentage(rate) => percent_of(total, *rate)?,
        CommissionRule::Tier(tiers) => percent_of(total, select_tier(tiers, total)?.rate)?,
    };
    CommissionAmounts::from_commission(commission, vat_rate)
}

/// Outcome of a commission calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionResult {
    /// Gross commission (exact).
    pub montant_commission: Decimal,
    /// Tax on the commission (exact).
    pub montant_tva: Decimal,
    /// Commission net of tax (exact).
    pub montant_net: Decimal,
    /// The rule type, or `CollecteurGlobal` for a collector aggregate.
    pub calculation_type: CalculationType,
    /// The client charged; `None` for a collector aggregate.
    pub client_id: Option<ClientId>,
    /// The collector the commission is attributed to.
    pub collector_id: CollectorId,
    /// The period the commission covers.
    pub period: Period,
    /// The collected amount the commission is based on.
    pub montant_total: Decimal,
    /// When the calculation ran.
    pub calculated_at: OffsetDateTime,
}

impl CommissionResult {
    /// Returns the exact amounts carried by this result.
    #[must_use]
    pub const fn amounts(&self) -> CommissionAmounts {
        CommissionAmounts {
            commission: self.montant_commission,
            tva: self.montant_tva,
            net: self.montant_net,
        }
    }

    /// Sums per-client results into a collector aggregate.
    ///
    /// # Errors
    ///
    /// Returns `AmountOutOfRange` if a sum does not fit in a `Decimal`.
    pub fn aggregate(
        collector_id: CollectorId,
        period: Period,
        results: &[Self],
        calculated_at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let sum = |name: &str, field: fn(&Self) -> Decimal| -> Result<Decimal, DomainError> {
            results.iter().map(field).try_fold(Decimal::ZERO, |total, amount| {
                checked_amount(
                    &format!("summing {name} for collector {collector_id}"),
                    total.checked_add(amount),
                )
            })
        };
        Ok(Self {
            montant_commission: sum("commissions", |r| r.montant_commission)?,
            montant_tva: sum("taxes", |r| r.montant_tva)?,
            montant_net: sum("net commissions", |r| r.montant_net)?,
            calculation_type: CalculationType::CollecteurGlobal,
            client_id: None,
            collector_id,
            period,
            montant_total: sum("collected totals", |r| r.montant_total)?,
            calculated_at,
        })
    }
}
