// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role-based authorization in front of the ledger.
//!
//! Decisions are cached per actor and command in a [`PermissionCache`].
//! A decision depends on the actor's role, so seeing an actor under a new
//! role drops everything cached for them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use collecte::PermissionCache;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cli::LedgerCommand;

/// Operator roles.
#[derive(ValueEnum, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Sets up agencies and may do anything else.
    Admin,
    /// Manages collectors, commission rules and payroll.
    Supervisor,
    /// Works the counter: clients, deposits, withdrawals and journals.
    Cashier,
}

impl Role {
    /// Converts this role to its display string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Supervisor => "supervisor",
            Self::Cashier => "cashier",
        }
    }

    /// Whether this role may use a capability.
    #[must_use]
    pub const fn permits(self, capability: Capability) -> bool {
        match capability {
            Capability::Setup => matches!(self, Self::Admin),
            Capability::Supervision => matches!(self, Self::Admin | Self::Supervisor),
            Capability::Counter | Capability::Inquiry => true,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Groups of ledger commands sharing an authorization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Bootstrapping the institution.
    Setup,
    /// Commission, payroll and back-office moves.
    Supervision,
    /// Day-to-day collection.
    Counter,
    /// Read-only lookups.
    Inquiry,
}

impl LedgerCommand {
    /// The command's kebab-case name, used as the cached resource.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::RegisterAgency { .. } => "register-agency",
            Self::RegisterCollector { .. } => "register-collector",
            Self::RegisterClient { .. } => "register-client",
            Self::SetParameter { .. } => "set-parameter",
            Self::AddRubrique { .. } => "add-rubrique",
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
            Self::OpenJournal { .. } => "open-journal",
            Self::CloseJournal { .. } => "close-journal",
            Self::Calculate { .. } => "calculate",
            Self::Repartition { .. } => "repartition",
            Self::Statement { .. } => "statement",
            Self::Audit => "audit",
        }
    }

    /// The capability the command requires.
    #[must_use]
    pub const fn capability(&self) -> Capability {
        match self {
            Self::Init | Self::RegisterAgency { .. } => Capability::Setup,
            Self::RegisterCollector { .. }
            | Self::SetParameter { .. }
            | Self::AddRubrique { .. }
            | Self::Transfer { .. }
            | Self::Calculate { .. }
            | Self::Repartition { .. }
            | Self::Audit => Capability::Supervision,
            Self::RegisterClient { .. }
            | Self::Deposit { .. }
            | Self::Withdraw { .. }
            | Self::OpenJournal { .. }
            | Self::CloseJournal { .. } => Capability::Counter,
            Self::Statement { .. } => Capability::Inquiry,
        }
    }
}

/// Authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// The role may not run the command.
    #[error("Role '{role}' is not authorized to run '{action}'")]
    Unauthorized { action: String, role: Role },
}

/// Checks commands against roles, caching the decisions.
#[derive(Debug)]
pub struct Authorizer {
    cache: Arc<PermissionCache>,
    roles: HashMap<String, Role>,
}

impl Authorizer {
    /// Creates an authorizer over a shared cache.
    #[must_use]
    pub fn new(cache: Arc<PermissionCache>) -> Self {
        Self {
            cache,
            roles: HashMap::new(),
        }
    }

    /// Checks that `actor`, acting as `role`, may run `command`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The operator login
    /// * `role` - The role the operator presents
    /// * `command` - The command to run
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the role does not permit the command.
    pub fn authorize(
        &mut self,
        actor: &str,
        role: Role,
        command: &LedgerCommand,
    ) -> Result<(), AuthorizationError> {
        if let Some(previous) = self.roles.insert(actor.to_string(), role)
            && previous != role
        {
            let dropped: usize = self.cache.invalidate_actor(actor);
            info!(actor, from = %previous, to = %role, dropped, "Operator role changed");
        }

        let allowed: bool = self
            .cache
            .check_or_insert_with(actor, command.action(), || role.permits(command.capability()));
        if allowed {
            Ok(())
        } else {
            warn!(actor, role = %role, action = command.action(), "Command refused");
            Err(AuthorizationError::Unauthorized {
                action: command.action().to_string(),
                role,
            })
        }
    }
}

/// Starts a task that drops expired decisions every `every`.
///
/// The task runs until aborted.
#[must_use]
pub fn spawn_eviction(cache: Arc<PermissionCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker: tokio::time::Interval = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted: usize = cache.evict_expired();
            if evicted > 0 {
                debug!(evicted, remaining = cache.len(), "Evicted expired permission decisions");
            }
        }
    })
}
