// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runtime configuration derived from the command line.

use std::path::PathBuf;
use std::time::Duration;

use collecte_domain::{DomainError, RemunerationPolicy};
use collecte_persistence::{Persistence, PersistenceError};
use tracing::info;

use crate::cli::{Args, DatabaseArgs, PolicyArgs};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The policy overrides produce an invalid policy.
    #[error("Invalid remuneration policy: {0}")]
    InvalidPolicy(#[from] DomainError),
    /// A duration setting is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// The database the ledger is stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// A fresh in-memory `SQLite` database, lost on exit.
    InMemory,
    /// A `SQLite` database file.
    Sqlite(PathBuf),
    /// A `MySQL`/`MariaDB` connection URL.
    Mysql(String),
}

impl DatabaseTarget {
    /// Selects the target from the database arguments.
    #[must_use]
    pub fn from_args(args: &DatabaseArgs) -> Self {
        match (&args.database, &args.mysql_url) {
            (Some(path), _) => Self::Sqlite(path.clone()),
            (None, Some(url)) => Self::Mysql(url.clone()),
            (None, None) => Self::InMemory,
        }
    }

    /// Opens the store, running pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(&self) -> Result<Persistence, PersistenceError> {
        match self {
            Self::InMemory => {
                info!("Using in-memory database");
                Persistence::new_in_memory()
            }
            Self::Sqlite(path) => {
                info!(path = %path.display(), "Using file-based database");
                Persistence::new_with_file(path)
            }
            Self::Mysql(url) => {
                info!("Using MySQL database");
                Persistence::new_with_mysql(url)
            }
        }
    }
}

// The MySQL URL may carry a password, so only the backend is shown.
impl std::fmt::Display for DatabaseTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory => write!(f, "sqlite (in-memory)"),
            Self::Sqlite(path) => write!(f, "sqlite ({})", path.display()),
            Self::Mysql(_) => write!(f, "mysql"),
        }
    }
}

/// Applies the command-line overrides to the default policy.
///
/// # Errors
///
/// Returns an error if the resulting policy is invalid.
pub fn remuneration_policy(args: &PolicyArgs) -> Result<RemunerationPolicy, ConfigError> {
    let mut policy: RemunerationPolicy = RemunerationPolicy::default();
    if let Some(rate) = args.vat_rate {
        policy.vat_rate = rate;
    }
    if let Some(rate) = args.collector_rate {
        policy.collector_rate = rate;
    }
    if let Some(rate) = args.emf_rate {
        policy.emf_rate = rate;
    }
    if let Some(salary) = args.new_collector_salary {
        policy.new_collector_salary = salary;
    }
    if let Some(months) = args.new_collector_months {
        policy.new_collector_months = months;
    }
    if let Some(threshold) = args.large_withdrawal_threshold {
        policy.large_withdrawal_threshold = threshold;
    }
    policy.validate()?;
    Ok(policy)
}

/// Permission cache timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSettings {
    /// How long a decision stays cached.
    pub ttl: Duration,
    /// How often expired decisions are swept.
    pub eviction_interval: Duration,
}

impl PermissionSettings {
    /// Reads the permission settings.
    ///
    /// # Errors
    ///
    /// Returns an error if either duration is zero.
    pub const fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.permission_ttl_secs == 0 {
            return Err(ConfigError::ZeroDuration("permission-ttl-secs"));
        }
        if args.eviction_interval_secs == 0 {
            return Err(ConfigError::ZeroDuration("eviction-interval-secs"));
        }
        Ok(Self {
            ttl: Duration::from_secs(args.permission_ttl_secs),
            eviction_interval: Duration::from_secs(args.eviction_interval_secs),
        })
    }
}
