// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Commission repartition between the collector and the institution.
//!
//! The net commission pool of a collector for a period is split into a
//! salary (subject to rubrique deductions) and an EMF share, itself split
//! into tax and product.

use crate::error::DomainError;
use crate::money::{checked_amount, percent_of, round_money};
use crate::types::{CollectorId, Period};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Duration, OffsetDateTime};

/// Lifecycle of a commission history record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryStatus {
    /// Commissions calculated, not yet distributed.
    Calcule,
    /// Commissions distributed. Terminal.
    Remunere,
}

impl HistoryStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calcule => "CALCULE",
            Self::Remunere => "REMUNERE",
        }
    }
}

impl FromStr for HistoryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CALCULE" => Ok(Self::Calcule),
            "REMUNERE" => Ok(Self::Remunere),
            _ => Err(DomainError::InvalidHistoryStatus(s.to_string())),
        }
    }
}

/// A collector's calculated commissions for a period.
///
/// Totals are the sums of the amounts actually posted to the ledger, so the
/// net pool equals what the calculation credited to the waiting account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionHistory {
    /// The canonical identifier.
    pub history_id: i64,
    /// The collector.
    pub collector_id: CollectorId,
    /// The period covered.
    pub period: Period,
    /// Sum of posted gross commissions.
    pub total_commission: Decimal,
    /// Sum of posted taxes.
    pub total_tax: Decimal,
    /// Number of clients charged a non-zero commission.
    pub client_count: u32,
    /// Current status.
    pub status: HistoryStatus,
    /// The remuneration that consumed this history.
    pub remuneration_id: Option<i64>,
    /// When the history was remunerated.
    pub remunerated_at: Option<OffsetDateTime>,
    /// When the calculation ran.
    pub calculated_at: OffsetDateTime,
}

impl CommissionHistory {
    /// The net commission pool `total_commission - total_tax`.
    #[must_use]
    pub fn net_pool(&self) -> Decimal {
        self.total_commission - self.total_tax
    }
}

/// Input for recording a commission history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommissionHistory {
    /// The collector.
    pub collector_id: CollectorId,
    /// The period covered.
    pub period: Period,
    /// Sum of posted gross commissions.
    pub total_commission: Decimal,
    /// Sum of posted taxes.
    pub total_tax: Decimal,
    /// Number of clients charged a non-zero commission.
    pub client_count: u32,
    /// When the calculation ran.
    pub calculated_at: OffsetDateTime,
}

/// A completed repartition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remuneration {
    /// The canonical identifier.
    pub remuneration_id: i64,
    /// The collector remunerated.
    pub collector_id: CollectorId,
    /// The period covered.
    pub period: Period,
    /// Net commission pool.
    pub base: Decimal,
    /// Salary before deductions.
    pub gross_salary: Decimal,
    /// Sum of rubrique deductions.
    pub deductions: Decimal,
    /// Salary credited.
    pub salary_paid: Decimal,
    /// Part of the salary funded by the charge account.
    pub top_up: Decimal,
    /// EMF share of the commission.
    pub emf_share: Decimal,
    /// Tax on the EMF share.
    pub emf_tax: Decimal,
    /// EMF share net of tax.
    pub emf_product: Decimal,
    /// Pool left over after salary and EMF share.
    pub retained: Decimal,
    /// When the remuneration was recorded.
    pub created_at: OffsetDateTime,
}

/// Input for recording a remuneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRemuneration {
    /// The collector remunerated.
    pub collector_id: CollectorId,
    /// The period covered.
    pub period: Period,
    /// The computed split.
    pub plan: RemunerationPlan,
    /// When the remuneration was recorded.
    pub created_at: OffsetDateTime,
}

/// Deduction rule applied to a collector's salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RubriqueKind {
    /// Deducts a fixed amount.
    Constant(Decimal),
    /// Deducts a percentage of the gross salary.
    Percentage(Decimal),
}

impl RubriqueKind {
    /// Returns the stored discriminator.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Constant(_) => "CONSTANT",
            Self::Percentage(_) => "PERCENTAGE",
        }
    }

    /// Returns the amount or rate carried by the rubrique.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        match self {
            Self::Constant(value) | Self::Percentage(value) => *value,
        }
    }

    /// Rebuilds a kind from its stored discriminator and value.
    ///
    /// # Errors
    ///
    /// Returns an error if the discriminator is unknown.
    pub fn from_parts(kind: &str, value: Decimal) -> Result<Self, DomainError> {
        match kind {
            "CONSTANT" => Ok(Self::Constant(value)),
            "PERCENTAGE" => Ok(Self::Percentage(value)),
            _ => Err(DomainError::InvalidRubriqueKind(kind.to_string())),
        }
    }

    /// The uncapped deduction for a gross salary.
    ///
    /// # Errors
    ///
    /// Returns an error if a percentage deduction leaves the representable
    /// range.
    pub fn deduction_on(&self, gross_salary: Decimal) -> Result<Decimal, DomainError> {
        match self {
            Self::Constant(amount) => Ok(round_money(*amount)),
            Self::Percentage(rate) => Ok(round_money(percent_of(gross_salary, *rate)?)),
        }
    }
}

/// A remuneration rubrique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rubrique {
    /// The canonical identifier; also the evaluation order.
    pub rubrique_id: i64,
    /// Display name.
    pub name: String,
    /// Deduction rule.
    pub kind: RubriqueKind,
    /// Collectors the rubrique is scoped to.
    pub collectors: Vec<CollectorId>,
    /// First day the rubrique applies.
    pub application_date: Date,
    /// Number of days the rubrique stays valid, `None` for open-ended.
    pub validity_days: Option<u32>,
    /// Inactive rubriques never apply.
    pub active: bool,
}

impl Rubrique {
    /// Checks whether the rubrique applies to a collector for a period.
    ///
    /// A rubrique applies when it is active, scoped to the collector, starts
    /// on or before the period end, and (if bounded) is still valid at the
    /// period end.
    ///
    /// # Errors
    ///
    /// Returns an error if the validity end date overflows the calendar.
    pub fn applies_to(&self, collector_id: CollectorId, period: &Period) -> Result<bool, DomainError> {
        if !self.active || !self.collectors.contains(&collector_id) {
            return Ok(false);
        }
        if self.application_date > period.end() {
            return Ok(false);
        }
        let Some(days) = self.validity_days else {
            return Ok(true);
        };
        let valid_until: Date = self
            .application_date
            .checked_add(Duration::days(i64::from(days)))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: format!("adding {days} validity days to {}", self.application_date),
            })?;
        Ok(valid_until >= period.end())
    }
}

/// Input for creating a rubrique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRubrique {
    /// Display name.
    pub name: String,
    /// Deduction rule.
    pub kind: RubriqueKind,
    /// Collectors the rubrique is scoped to.
    pub collectors: Vec<CollectorId>,
    /// First day the rubrique applies.
    pub application_date: Date,
    /// Number of days the rubrique stays valid.
    pub validity_days: Option<u32>,
    /// Whether the rubrique takes part in repartition.
    pub active: bool,
}

/// One rubrique's effect on a salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubriqueDeduction {
    /// The rubrique applied.
    pub rubrique_id: i64,
    /// Its name.
    pub name: String,
    /// The amount actually deducted after capping.
    pub amount: Decimal,
}

/// Seniority band of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeniorityTier {
    /// Below the seniority threshold; paid the fixed starting salary.
    New,
    /// At or above the threshold; paid a share of the period's commission.
    Established,
}

/// Rates and thresholds governing commission and remuneration.
///
/// This is the single place these numbers live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemunerationPolicy {
    /// Tax rate as a fraction.
    pub vat_rate: Decimal,
    /// Collector share of the gross commission as a fraction.
    pub collector_rate: Decimal,
    /// EMF share of the gross commission as a fraction.
    pub emf_rate: Decimal,
    /// Gross salary for collectors below the seniority threshold.
    pub new_collector_salary: Decimal,
    /// Seniority threshold in months.
    pub new_collector_months: u32,
    /// Withdrawals at or above this amount raise a notification.
    pub large_withdrawal_threshold: Decimal,
}

impl Default for RemunerationPolicy {
    fn default() -> Self {
        Self {
            vat_rate: Decimal::new(1925, 4),
            collector_rate: Decimal::new(70, 2),
            emf_rate: Decimal::new(30, 2),
            new_collector_salary: Decimal::new(40_000, 0),
            new_collector_months: 3,
            large_withdrawal_threshold: Decimal::new(500_000, 0),
        }
    }
}

impl RemunerationPolicy {
    /// Validates the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A rate lies outside `[0, 1]`
    /// - The collector and EMF rates do not add up to one
    /// - The starting salary is negative
    /// - The large-withdrawal threshold is not positive
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, rate) in [
            ("vat_rate", self.vat_rate),
            ("collector_rate", self.collector_rate),
            ("emf_rate", self.emf_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(DomainError::InvalidRate {
                    name: name.to_string(),
                    rate,
                });
            }
        }
        if self.collector_rate + self.emf_rate != Decimal::ONE {
            return Err(DomainError::InvalidPolicy {
                reason: format!(
                    "collector rate {} and EMF rate {} must add up to 1",
                    self.collector_rate, self.emf_rate
                ),
            });
        }
        if self.new_collector_salary < Decimal::ZERO {
            return Err(DomainError::NegativeAmount {
                field: String::from("new_collector_salary"),
                amount: self.new_collector_salary,
            });
        }
        if self.large_withdrawal_threshold <= Decimal::ZERO {
            return Err(DomainError::NonPositiveAmount {
                field: String::from("large_withdrawal_threshold"),
                amount: self.large_withdrawal_threshold,
            });
        }
        Ok(())
    }

    /// Classifies a collector by tenure.
    #[must_use]
    pub const fn seniority_tier(&self, seniority_months: u32) -> SeniorityTier {
        if seniority_months < self.new_collector_months {
            SeniorityTier::New
        } else {
            SeniorityTier::Established
        }
    }

    /// Whether a withdrawal amount must raise a notification.
    #[must_use]
    pub fn is_large_withdrawal(&self, amount: Decimal) -> bool {
        amount >= self.large_withdrawal_threshold
    }
}

/// The computed split of a collector's commissions for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemunerationPlan {
    /// Gross commission of the period; the rates apply to it.
    pub commission: Decimal,
    /// Net commission pool held by the waiting account.
    pub base: Decimal,
    /// Seniority band used.
    pub seniority: SeniorityTier,
    /// Salary before deductions.
    pub gross_salary: Decimal,
    /// Deductions applied, in evaluation order.
    pub deductions: Vec<RubriqueDeduction>,
    /// Sum of deductions.
    pub total_deductions: Decimal,
    /// Salary credited.
    pub salary_paid: Decimal,
    /// Part of the salary taken from the waiting account.
    pub from_waiting: Decimal,
    /// Part of the salary taken from the charge account.
    pub top_up: Decimal,
    /// EMF rate applied to the commission, capped by what salary leaves in
    /// the pool.
    pub emf_share: Decimal,
    /// Tax on the EMF share.
    pub emf_tax: Decimal,
    /// EMF share net of tax.
    pub emf_product: Decimal,
    /// Pool left over after salary and EMF share, withheld deductions
    /// included. Credited to the product account untaxed.
    pub retained: Decimal,
}

/// Splits a collector's commissions for a period.
///
/// The salary and the EMF share are rates of the gross commission. Both are
/// paid out of the net pool in the waiting account: salary first, topped up
/// from the charge account when the pool falls short, then the EMF share
/// up to what the pool still holds. Whatever remains is retained.
///
/// Rubriques must already be filtered to those applicable; they are applied
/// in identifier order. Every amount in the plan is rounded to two decimals
/// and the waiting account is drained exactly:
/// `from_waiting + emf_tax + emf_product + retained = base`.
///
/// # Arguments
///
/// * `policy` - Rates and thresholds
/// * `commission` - Gross commission of the period
/// * `base` - The net commission pool
/// * `seniority_months` - The collector's tenure
/// * `rubriques` - Applicable rubriques
///
/// # Errors
///
/// Returns an error if:
/// - The policy is invalid
/// - The commission or the base is negative
/// - An amount leaves the representable range
pub fn plan_remuneration(
    policy: &RemunerationPolicy,
    commission: Decimal,
    base: Decimal,
    seniority_months: u32,
    rubriques: &[Rubrique],
) -> Result<RemunerationPlan, DomainError> {
    policy.validate()?;
    let commission: Decimal = round_money(commission);
    let base: Decimal = round_money(base);
    for (field, amount) in [("commission", commission), ("base", base)] {
        if amount < Decimal::ZERO {
            return Err(DomainError::NegativeAmount {
                field: field.to_string(),
                amount,
            });
        }
    }

    let seniority: SeniorityTier = policy.seniority_tier(seniority_months);
    let gross_salary: Decimal = match seniority {
        SeniorityTier::New => round_money(policy.new_collector_salary),
        SeniorityTier::Established => {
            round_money(share_of(commission, policy.collector_rate)?)
        }
    };

    let mut ordered: Vec<&Rubrique> = rubriques.iter().collect();
    ordered.sort_by_key(|rubrique| rubrique.rubrique_id);

    let mut remaining: Decimal = gross_salary;
    let mut deductions: Vec<RubriqueDeduction> = Vec::with_capacity(ordered.len());
    for rubrique in ordered {
        let amount: Decimal = rubrique
            .kind
            .deduction_on(gross_salary)?
            .max(Decimal::ZERO)
            .min(remaining);
        remaining -= amount;
        deductions.push(RubriqueDeduction {
            rubrique_id: rubrique.rubrique_id,
            name: rubrique.name.clone(),
            amount,
        });
    }

    let total_deductions: Decimal = gross_salary - remaining;
    let salary_paid: Decimal = remaining;
    let from_waiting: Decimal = base.min(salary_paid);
    let top_up: Decimal = salary_paid - from_waiting;
    let left_in_pool: Decimal = base - from_waiting;
    let emf_share: Decimal =
        round_money(share_of(commission, policy.emf_rate)?).min(left_in_pool);
    let emf_tax: Decimal = round_money(share_of(emf_share, policy.vat_rate)?);
    let emf_product: Decimal = emf_share - emf_tax;
    let retained: Decimal = left_in_pool - emf_share;

    Ok(RemunerationPlan {
        commission,
        base,
        seniority,
        gross_salary,
        deductions,
        total_deductions,
        salary_paid,
        from_waiting,
        top_up,
        emf_share,
        emf_tax,
        emf_product,
        retained,
    })
}

/// Multiplies an amount by a fractional rate.
fn share_of(amount: Decimal, rate: Decimal) -> Result<Decimal, DomainError> {
    checked_amount(
        &format!("applying rate {rate} to {amount}"),
        amount.checked_mul(rate),
    )
}
