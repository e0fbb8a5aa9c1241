// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command-line and request definitions.
//!
//! [`LedgerCommand`] is parsed two ways: from the process arguments by
//! clap, and from JSON lines by serde in session mode. Both spellings use
//! kebab-case command names (`register-agency`, `close-journal`, ...).

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use collecte_domain::{AccountType, CommissionTier, DomainError, parse_date};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use time::Date;

use crate::authorization::Role;

/// Collecte - operator command line for the daily collection ledger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub operator: OperatorArgs,

    /// Seconds a cached authorization decision stays valid
    #[arg(long, env = "COLLECTE_PERMISSION_TTL_SECS", default_value_t = 300)]
    pub permission_ttl_secs: u64,

    /// Seconds between sweeps of expired authorization decisions
    #[arg(long, env = "COLLECTE_EVICTION_INTERVAL_SECS", default_value_t = 60)]
    pub eviction_interval_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Where the ledger lives.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DatabaseArgs {
    /// Path to the `SQLite` database file. Without this or `--mysql-url`, uses an in-memory database.
    #[arg(short, long, env = "COLLECTE_DATABASE", conflicts_with = "mysql_url")]
    pub database: Option<PathBuf>,

    /// `MySQL`/`MariaDB` connection URL
    #[arg(long, env = "COLLECTE_MYSQL_URL")]
    pub mysql_url: Option<String>,
}

/// Overrides for the remuneration policy defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Tax rate as a fraction (default 0.1925)
    #[arg(long, env = "COLLECTE_VAT_RATE")]
    pub vat_rate: Option<Decimal>,

    /// Collector share of the commission pool (default 0.70)
    #[arg(long, env = "COLLECTE_COLLECTOR_RATE")]
    pub collector_rate: Option<Decimal>,

    /// Institution share of the commission pool (default 0.30)
    #[arg(long, env = "COLLECTE_EMF_RATE")]
    pub emf_rate: Option<Decimal>,

    /// Fixed gross salary of collectors below the seniority threshold (default 40000)
    #[arg(long, env = "COLLECTE_NEW_COLLECTOR_SALARY")]
    pub new_collector_salary: Option<Decimal>,

    /// Seniority threshold in months (default 3)
    #[arg(long, env = "COLLECTE_NEW_COLLECTOR_MONTHS")]
    pub new_collector_months: Option<u32>,

    /// Withdrawals at or above this amount raise a notification (default 500000)
    #[arg(long, env = "COLLECTE_LARGE_WITHDRAWAL_THRESHOLD")]
    pub large_withdrawal_threshold: Option<Decimal>,
}

/// Who runs a one-shot command, and why.
#[derive(clap::Args, Debug, Clone)]
pub struct OperatorArgs {
    /// Operator login recorded in the audit trail
    #[arg(long, env = "COLLECTE_OPERATOR", default_value = "operator")]
    pub operator: String,

    /// Operator role used for authorization
    #[arg(long, env = "COLLECTE_ROLE", value_enum, default_value_t = Role::Cashier)]
    pub role: Role,

    /// Cause identifier recorded in the audit trail
    #[arg(long, env = "COLLECTE_CAUSE_ID")]
    pub cause_id: Option<String>,

    /// Free-text reason recorded in the audit trail
    #[arg(long, default_value = "Operator command")]
    pub reason: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reads JSON requests from standard input, one per line, and answers each on standard output
    Session,

    #[command(flatten)]
    Ledger(LedgerCommand),
}

/// Owner kind of a commission parameter.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeArg {
    Client,
    Collector,
    Agency,
}

/// Kind of a payroll rubrique.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RubriqueKindArg {
    Constant,
    Percentage,
}

/// An operation on the ledger.
#[derive(Subcommand, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum LedgerCommand {
    /// Creates the system account
    Init,

    /// Registers an agency and opens its accounts
    RegisterAgency {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
    },

    /// Registers a collector and opens their accounts
    RegisterCollector {
        #[arg(long)]
        agency: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        #[serde(default)]
        seniority_months: u32,
        #[arg(long)]
        max_withdrawal: Decimal,
    },

    /// Registers a client of a collector and opens their savings account
    RegisterClient {
        #[arg(long)]
        collector: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        cni: String,
    },

    /// Sets the commission rule of a client, collector or agency
    SetParameter {
        #[arg(long, value_enum)]
        scope: ScopeArg,
        #[arg(long)]
        owner: i64,
        /// Flat commission amount
        #[arg(long)]
        #[serde(default)]
        fixed: Option<Decimal>,
        /// Commission percentage
        #[arg(long)]
        #[serde(default)]
        rate: Option<Decimal>,
        /// Tier as `min:max:rate`, with an empty max for the open-ended tier
        #[arg(long = "tier", value_parser = parse_tier)]
        #[serde(default)]
        tiers: Vec<CommissionTier>,
    },

    /// Adds a payroll deduction
    AddRubrique {
        #[arg(long)]
        name: String,
        #[arg(long, value_enum)]
        kind: RubriqueKindArg,
        #[arg(long)]
        value: Decimal,
        /// Collector the rubrique applies to (repeatable)
        #[arg(long = "collector")]
        #[serde(default)]
        collectors: Vec<i64>,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        application_date: Date,
        #[arg(long)]
        #[serde(default)]
        validity_days: Option<u32>,
    },

    /// Records a client deposit
    Deposit {
        #[arg(long)]
        client: i64,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        date: Date,
    },

    /// Pays out a client withdrawal
    Withdraw {
        #[arg(long)]
        client: i64,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        date: Date,
    },

    /// Moves money between two accounts, through liaison accounts across agencies
    Transfer {
        #[arg(long)]
        #[serde(deserialize_with = "deserialize_from_str")]
        from_type: AccountType,
        #[arg(long)]
        #[serde(default)]
        from_owner: Option<i64>,
        #[arg(long)]
        #[serde(deserialize_with = "deserialize_from_str")]
        to_type: AccountType,
        #[arg(long)]
        #[serde(default)]
        to_owner: Option<i64>,
        #[arg(long)]
        amount: Decimal,
        #[arg(long, default_value = "Transfer")]
        #[serde(default = "default_transfer_label")]
        label: String,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        date: Date,
    },

    /// Opens a collector's journal for a day
    OpenJournal {
        #[arg(long)]
        collector: i64,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        date: Date,
    },

    /// Closes a journal and prints its summary
    CloseJournal {
        #[arg(long)]
        journal: i64,
    },

    /// Calculates commissions for a collector, or for one of their clients
    Calculate {
        #[arg(long)]
        collector: i64,
        /// Restrict the calculation to one client
        #[arg(long)]
        #[serde(default)]
        client: Option<i64>,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        from: Date,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        to: Date,
    },

    /// Distributes a collector's calculated commissions for a period
    Repartition {
        #[arg(long)]
        collector: i64,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        from: Date,
        #[arg(long, value_parser = parse_date)]
        #[serde(deserialize_with = "deserialize_date")]
        to: Date,
    },

    /// Prints an account and its movements
    Statement {
        #[arg(long)]
        #[serde(deserialize_with = "deserialize_from_str")]
        account_type: AccountType,
        #[arg(long)]
        #[serde(default)]
        owner: Option<i64>,
    },

    /// Prints the audit trail
    Audit,
}

fn default_transfer_label() -> String {
    String::from("Transfer")
}

/// Parses a commission tier written as `min:max:rate`.
///
/// # Errors
///
/// Returns an error if the text does not have three fields or a field is
/// not a decimal.
pub fn parse_tier(value: &str) -> Result<CommissionTier, String> {
    let fields: Vec<&str> = value.split(':').collect();
    let [min, max, rate] = fields.as_slice() else {
        return Err(format!("tier '{value}' must be written min:max:rate"));
    };
    let decimal = |field: &str| -> Result<Decimal, String> {
        Decimal::from_str(field.trim()).map_err(|e| format!("tier '{value}': {e}"))
    };
    let max: Option<Decimal> = if max.trim().is_empty() {
        None
    } else {
        Some(decimal(max)?)
    };
    Ok(CommissionTier::new(decimal(min)?, max, decimal(rate)?))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let text: String = String::deserialize(deserializer)?;
    parse_date(&text).map_err(serde::de::Error::custom)
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = DomainError>,
{
    let text: String = String::deserialize(deserializer)?;
    text.parse::<T>().map_err(serde::de::Error::custom)
}
