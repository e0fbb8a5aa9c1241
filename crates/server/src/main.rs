// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator binary for the daily collection ledger.
//!
//! Runs a single command from the arguments, or a `session` reading JSON
//! requests from standard input. Results go to standard output as JSON;
//! logs go to standard error.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod authorization;
mod cli;
mod commands;
mod config;
mod notifier;
mod session;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::Parser;
use collecte::{Ledger, LoggingNotificationSink, OperationContext, PermissionCache};
use collecte_audit::{Actor, Cause};
use collecte_domain::RemunerationPolicy;
use collecte_persistence::Persistence;
use color_eyre::eyre::Result;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::io::BufReader;
use tokio::task::JoinHandle;
use tracing::info;

use crate::authorization::{Authorizer, spawn_eviction};
use crate::cli::{Args, Command, OperatorArgs};
use crate::config::{DatabaseTarget, PermissionSettings, remuneration_policy};
use crate::notifier::{ChannelNotificationSink, NotificationDispatcher, notification_channel};
use crate::session::Session;

impl OperatorArgs {
    /// Audit context for a one-shot command.
    fn context(&self) -> OperationContext {
        let cause_id: String = self
            .cause_id
            .clone()
            .unwrap_or_else(|| format!("cli-{}", OffsetDateTime::now_utc().unix_timestamp()));
        OperationContext::new(
            Actor::operator(&self.operator),
            Cause::new(cause_id, self.reason.clone()),
        )
    }
}

/// Runs the selected command. The ledger is consumed so its notification
/// sender is dropped when this returns.
async fn run(
    command: Command,
    mut ledger: Ledger<Persistence>,
    mut authorizer: Authorizer,
    operator: &OperatorArgs,
) -> Result<()> {
    match command {
        Command::Session => {
            let mut session: Session<Persistence> = Session::new(ledger, authorizer);
            let handled: u64 = session::run(
                &mut session,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
            )
            .await?;
            info!(handled, "Session finished");
        }
        Command::Ledger(command) => {
            authorizer.authorize(&operator.operator, operator.role, &command)?;
            let context: OperationContext = operator.context();
            let result: Value = commands::execute(&mut ledger, &context, &command)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing on stderr; stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Initializing collection ledger");

    let policy: RemunerationPolicy = remuneration_policy(&args.policy)?;
    let permissions: PermissionSettings = PermissionSettings::from_args(&args)?;
    let target: DatabaseTarget = DatabaseTarget::from_args(&args.database);
    info!(database = %target, "Opening ledger store");
    let persistence: Persistence = target.open()?;

    let cache: Arc<PermissionCache> = Arc::new(PermissionCache::new(permissions.ttl));
    let eviction: JoinHandle<()> = spawn_eviction(Arc::clone(&cache), permissions.eviction_interval);

    let (sink, dispatcher): (ChannelNotificationSink, NotificationDispatcher) =
        notification_channel(Arc::new(LoggingNotificationSink));
    let dispatching: JoinHandle<usize> = dispatcher.spawn();

    let ledger: Ledger<Persistence> = Ledger::new(persistence, policy)?.with_notifier(Arc::new(sink));
    let outcome: Result<()> = run(
        args.command,
        ledger,
        Authorizer::new(Arc::clone(&cache)),
        &args.operator,
    )
    .await;

    eviction.abort();
    let delivered: usize = dispatching.await?;
    info!(delivered, "Notifications drained");

    outcome
}
