// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Ledger accounts.
//!
//! Every account is bound to exactly one owner through [`AccountKind`], a closed
//! set of variants. The flat [`AccountType`] discriminator is what the store
//! persists alongside the owner identifier.

use crate::error::DomainError;
use crate::types::{AccountId, AgencyId, ClientId, CollectorId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Flat account discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Collector service account (cash handled during collection).
    Service,
    /// Collector waiting account holding net commissions until repartition.
    Waiting,
    /// Collector salary account.
    Salary,
    /// Agency liaison account used as inter-agency intermediary.
    Liaison,
    /// Agency tax passage account.
    PassageTax,
    /// Agency commission passage account.
    PassageCommission,
    /// Agency (EMF) product account.
    Product,
    /// Agency charge account.
    Charge,
    /// Client savings account.
    Client,
    /// Agency own account.
    Agency,
    /// Process-wide system account.
    System,
}

impl AccountType {
    /// All account types, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Service,
        Self::Waiting,
        Self::Salary,
        Self::Liaison,
        Self::PassageTax,
        Self::PassageCommission,
        Self::Product,
        Self::Charge,
        Self::Client,
        Self::Agency,
        Self::System,
    ];

    /// Converts this account type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "SERVICE",
            Self::Waiting => "WAITING",
            Self::Salary => "SALARY",
            Self::Liaison => "LIAISON",
            Self::PassageTax => "PASSAGE_TAX",
            Self::PassageCommission => "PASSAGE_COMMISSION",
            Self::Product => "PRODUCT",
            Self::Charge => "CHARGE",
            Self::Client => "CLIENT",
            Self::Agency => "AGENCY",
            Self::System => "SYSTEM",
        }
    }

    /// Three-letter prefix used in account numbers.
    #[must_use]
    pub const fn number_prefix(&self) -> &'static str {
        match self {
            Self::Service => "SRV",
            Self::Waiting => "ATT",
            Self::Salary => "SAL",
            Self::Liaison => "LIA",
            Self::PassageTax => "TAX",
            Self::PassageCommission => "COM",
            Self::Product => "PRD",
            Self::Charge => "CHG",
            Self::Client => "CLI",
            Self::Agency => "AGC",
            Self::System => "SYS",
        }
    }

    /// Bounded accounts may never hold a negative balance.
    ///
    /// Liaison, passage, product, charge, agency and system accounts carry
    /// institutional float and may go negative.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        matches!(self, Self::Client | Self::Service)
    }
}

impl FromStr for AccountType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::InvalidAccountType(s.to_string()))
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account kind together with its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    /// A client's savings account.
    Client(ClientId),
    /// A collector's service account.
    CollectorService(CollectorId),
    /// A collector's waiting (holding) account.
    CollectorWaiting(CollectorId),
    /// A collector's salary account.
    CollectorSalary(CollectorId),
    /// An agency's liaison account.
    AgencyLiaison(AgencyId),
    /// An agency's tax passage account.
    PassageTax(AgencyId),
    /// An agency's commission passage account.
    PassageCommission(AgencyId),
    /// An agency's product account.
    Product(AgencyId),
    /// An agency's charge account.
    Charge(AgencyId),
    /// An agency's own account.
    Agency(AgencyId),
    /// The system account.
    System,
}

impl AccountKind {
    /// Returns the flat discriminator for this kind.
    #[must_use]
    pub const fn account_type(&self) -> AccountType {
        match self {
            Self::Client(_) => AccountType::Client,
            Self::CollectorService(_) => AccountType::Service,
            Self::CollectorWaiting(_) => AccountType::Waiting,
            Self::CollectorSalary(_) => AccountType::Salary,
            Self::AgencyLiaison(_) => AccountType::Liaison,
            Self::PassageTax(_) => AccountType::PassageTax,
            Self::PassageCommission(_) => AccountType::PassageCommission,
            Self::Product(_) => AccountType::Product,
            Self::Charge(_) => AccountType::Charge,
            Self::Agency(_) => AccountType::Agency,
            Self::System => AccountType::System,
        }
    }

    /// Returns the raw owner identifier, `None` for the system account.
    #[must_use]
    pub const fn owner_id(&self) -> Option<i64> {
        match self {
            Self::Client(id) => Some(id.value()),
            Self::CollectorService(id) | Self::CollectorWaiting(id) | Self::CollectorSalary(id) => {
                Some(id.value())
            }
            Self::AgencyLiaison(id)
            | Self::PassageTax(id)
            | Self::PassageCommission(id)
            | Self::Product(id)
            | Self::Charge(id)
            | Self::Agency(id) => Some(id.value()),
            Self::System => None,
        }
    }

    /// Rebuilds a kind from its stored discriminator and owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner presence does not match the account type.
    pub fn from_parts(account_type: AccountType, owner_id: Option<i64>) -> Result<Self, DomainError> {
        let kind: Self = match (account_type, owner_id) {
            (AccountType::System, None) => Self::System,
            (AccountType::Client, Some(id)) => Self::Client(ClientId::new(id)),
            (AccountType::Service, Some(id)) => Self::CollectorService(CollectorId::new(id)),
            (AccountType::Waiting, Some(id)) => Self::CollectorWaiting(CollectorId::new(id)),
            (AccountType::Salary, Some(id)) => Self::CollectorSalary(CollectorId::new(id)),
            (AccountType::Liaison, Some(id)) => Self::AgencyLiaison(AgencyId::new(id)),
            (AccountType::PassageTax, Some(id)) => Self::PassageTax(AgencyId::new(id)),
            (AccountType::PassageCommission, Some(id)) => {
                Self::PassageCommission(AgencyId::new(id))
            }
            (AccountType::Product, Some(id)) => Self::Product(AgencyId::new(id)),
            (AccountType::Charge, Some(id)) => Self::Charge(AgencyId::new(id)),
            (AccountType::Agency, Some(id)) => Self::Agency(AgencyId::new(id)),
            (account_type, owner_id) => {
                return Err(DomainError::InvalidAccountOwner {
                    account_type: account_type.to_string(),
                    owner_id,
                });
            }
        };
        Ok(kind)
    }

    /// Whether accounts of this kind must never go negative.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.account_type().is_bounded()
    }

    /// The per-agency accounts provisioned when an agency is registered.
    #[must_use]
    pub const fn agency_accounts(agency_id: AgencyId) -> [Self; 6] {
        [
            Self::AgencyLiaison(agency_id),
            Self::PassageTax(agency_id),
            Self::PassageCommission(agency_id),
            Self::Product(agency_id),
            Self::Charge(agency_id),
            Self::Agency(agency_id),
        ]
    }

    /// The accounts provisioned when a collector is registered.
    #[must_use]
    pub const fn collector_accounts(collector_id: CollectorId) -> [Self; 3] {
        [
            Self::CollectorService(collector_id),
            Self::CollectorWaiting(collector_id),
            Self::CollectorSalary(collector_id),
        ]
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.owner_id() {
            Some(owner) => write!(f, "{}({owner})", self.account_type()),
            None => write!(f, "{}", self.account_type()),
        }
    }
}

/// Builds the deterministic account number `<PREFIX>-<agency:04>-<owner:08>`.
#[must_use]
pub fn account_number(kind: &AccountKind, agency_id: Option<AgencyId>) -> String {
    format!(
        "{}-{:04}-{:08}",
        kind.account_type().number_prefix(),
        agency_id.map_or(0, AgencyId::value),
        kind.owner_id().unwrap_or(0)
    )
}

/// A ledger account as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The canonical identifier.
    pub account_id: AccountId,
    /// Globally unique account number.
    pub account_number: String,
    /// Display name.
    pub name: String,
    /// Kind and owner.
    pub kind: AccountKind,
    /// Agency the account belongs to, `None` for the system account.
    pub agency_id: Option<AgencyId>,
    /// Signed balance.
    pub balance: Decimal,
    /// Optimistic lock version, incremented on every balance change.
    pub version: i64,
}

impl Account {
    /// Checks whether `amount` may be taken from this account.
    ///
    /// Unbounded accounts always accept.
    #[must_use]
    pub fn can_debit(&self, amount: Decimal) -> bool {
        !self.kind.is_bounded() || self.balance >= amount
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Globally unique account number.
    pub account_number: String,
    /// Display name.
    pub name: String,
    /// Kind and owner.
    pub kind: AccountKind,
    /// Agency the account belongs to.
    pub agency_id: Option<AgencyId>,
}

impl NewAccount {
    /// Builds the account input for a kind with a generated number and name.
    ///
    /// # Arguments
    ///
    /// * `kind` - The account kind and owner
    /// * `agency_id` - The owning agency (`None` only for the system account)
    /// * `owner_name` - Human name of the owner, used in the account name
    #[must_use]
    pub fn for_kind(kind: AccountKind, agency_id: Option<AgencyId>, owner_name: &str) -> Self {
        Self {
            account_number: account_number(&kind, agency_id),
            name: format!("{} {}", kind.account_type().as_str(), owner_name),
            kind,
            agency_id,
        }
    }
}
