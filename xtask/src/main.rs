// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project automation for the collection ledger
//!
//! `cargo test` runs every test against `SQLite` and needs no services.
//! The `MariaDB` tasks are opt-in and need Docker:
//!
//! - `cargo xtask test-mariadb` starts a `MariaDB` 11 container and runs the
//!   ignored `backend_validation_tests` of `collecte-persistence` against it
//! - `cargo xtask verify-migrations` applies `migrations/` to `SQLite` and
//!   `migrations_mysql/` to `MariaDB` and fails on any schema difference
//!
//! Containers are removed when a task ends, whether it passed or not.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

mod container;
mod schema;

use std::{io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use diesel::{Connection, MysqlConnection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

use crate::container::{MariadbContainer, RunningContainer};
use crate::schema::Schema;

const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");
const MYSQL_MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("../crates/persistence/migrations_mysql");

/// Package holding the backend validation tests.
const PERSISTENCE_PACKAGE: &str = "collecte-persistence";

/// Tells the backend validation tests which backend they are pointed at.
const TEST_BACKEND_VAR: &str = "COLLECTE_TEST_BACKEND";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    if let Err(err) = args.command.run() {
        tracing::error!("{err}");
        std::process::exit(1);
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test)
    Ci {
        /// Also run the Docker-backed `MariaDB` tasks
        #[arg(long)]
        with_mariadb: bool,
    },

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run lib and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Run `MariaDB` backend validation tests
    #[command(visible_alias = "tm")]
    TestMariadb,

    /// Verify schema parity between `SQLite` and `MySQL` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::Ci { with_mariadb } => ci(with_mariadb),
            Self::Build => run_cargo(&["build", "--all-targets", "--all-features"]),
            Self::Check => run_cargo(&["check", "--all-targets", "--all-features"]),
            Self::Deny => run_cargo(&["deny", "check"]),
            Self::Machete => {
                cmd!("cargo-machete").run_with_trace()?;
                Ok(())
            }
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => run_cargo_nightly(&["fmt", "--all", "--check"]),
            Self::LintTypos => {
                cmd!("typos").run_with_trace()?;
                Ok(())
            }
            Self::FixClippy => run_cargo(&[
                "clippy",
                "--all-targets",
                "--all-features",
                "--fix",
                "--allow-dirty",
                "--allow-staged",
                "--",
                "-D",
                "warnings",
            ]),
            Self::FixFormatting => run_cargo_nightly(&["fmt", "--all"]),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::TestMariadb => test_mariadb(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks; the `MariaDB` tasks only when asked, as they need Docker
fn ci(with_mariadb: bool) -> Result<()> {
    lint()?;
    run_cargo(&["deny", "check"])?;
    run_cargo(&["build", "--all-targets", "--all-features"])?;
    test()?;
    if with_mariadb {
        test_mariadb()?;
        verify_migrations()?;
    } else {
        tracing::info!("Skipping MariaDB tasks; pass --with-mariadb to run them");
    }
    Ok(())
}

/// Lint clippy, docs, formatting and typos
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    run_cargo_nightly(&["fmt", "--all", "--check"])?;
    cmd!("typos").run_with_trace()?;
    Ok(())
}

fn lint_clippy() -> Result<()> {
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without warnings using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta: cargo_metadata::Metadata = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd!(
            "cargo",
            "doc",
            "--no-deps",
            "--all-features",
            "--package",
            &*package.name
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }
    Ok(())
}

fn test() -> Result<()> {
    test_libs()?;
    test_docs()
}

fn test_docs() -> Result<()> {
    run_cargo(&["test", "--doc", "--all-features"])
}

fn test_libs() -> Result<()> {
    run_cargo(&["test", "--all-targets", "--all-features"])
}

/// Run the ignored backend validation tests against a fresh `MariaDB`
///
/// Only the `backend_validation_tests` module is selected, one test at a
/// time, since the tests share the database.
fn test_mariadb() -> Result<()> {
    tracing::info!("Starting MariaDB backend validation");
    let container: RunningContainer = MariadbContainer::BACKEND_TESTS.start()?;

    cmd!(
        "cargo",
        "test",
        "--package",
        PERSISTENCE_PACKAGE,
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.url())
    .env(TEST_BACKEND_VAR, "mariadb")
    .run_with_trace()
    .wrap_err("MariaDB backend validation tests failed")?;

    tracing::info!("MariaDB backend validation completed successfully");
    Ok(())
}

/// Apply both migration sets and compare the resulting schemas
///
/// Every difference is listed before failing, not just the first.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting schema parity verification");
    let container: RunningContainer = MariadbContainer::MIGRATION_PARITY.start()?;

    tracing::info!("Applying SQLite migrations");
    let mut sqlite: SqliteConnection = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut sqlite)
        .wrap_err("Failed to enable foreign keys on SQLite")?;
    sqlite
        .run_pending_migrations(SQLITE_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {e}"))?;

    tracing::info!("Applying MySQL migrations");
    let mut mysql: MysqlConnection =
        MysqlConnection::establish(&container.url()).wrap_err("Failed to connect to MariaDB")?;
    mysql
        .run_pending_migrations(MYSQL_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply MySQL migrations: {e}"))?;

    tracing::info!("Comparing schemas");
    let expected: Schema = Schema::from_sqlite(&mut sqlite)?;
    let actual: Schema = Schema::from_mysql(&mut mysql, container.database())?;
    let differences: Vec<String> = expected.differences(&actual);
    if !differences.is_empty() {
        return Err(eyre!(
            "Schema parity check failed with {} difference(s):\n  - {}",
            differences.len(),
            differences.join("\n  - ")
        ));
    }

    tracing::info!("Schema parity verification passed");
    Ok(())
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: &[&str]) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: &[&str]) -> Result<()> {
    cmd("cargo", args)
        // CARGO is set because xtask itself runs under cargo
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Logs a `duct::Expression` before running it.
trait ExpressionExt {
    /// Run the command, logging it first and again on failure
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command may have scrolled off the screen by now
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
