// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Throwaway `MariaDB` containers for backend validation.
//!
//! A [`RunningContainer`] removes its container when dropped, so every exit
//! path of a task (including `?` and panics) cleans up.

use std::thread::sleep;
use std::time::Duration;

use color_eyre::{Result, eyre::Context, eyre::eyre};
use duct::cmd;

use crate::ExpressionExt;

/// Seconds to wait for the server to accept connections.
const READY_ATTEMPTS: u32 = 30;

/// How to provision one container.
#[derive(Debug, Clone, Copy)]
pub struct MariadbContainer {
    pub name: &'static str,
    pub database: &'static str,
    pub user: &'static str,
    pub password: &'static str,
    /// Host port mapped to 3306; distinct per task so they can run side by side.
    pub port: u16,
}

impl MariadbContainer {
    /// Database used by the ignored backend validation tests.
    pub const BACKEND_TESTS: Self = Self {
        name: "collecte-test-mariadb",
        database: "collecte_test",
        user: "collecte",
        password: "test_password",
        port: 3307,
    };

    /// Database used to compare migration schemas.
    pub const MIGRATION_PARITY: Self = Self {
        name: "collecte-verify-migrations",
        database: "collecte_verify",
        user: "collecte",
        password: "verify_password",
        port: 3308,
    };

    /// Starts the container and waits until it accepts connections.
    ///
    /// # Errors
    ///
    /// Returns an error if Docker is missing, the container cannot start,
    /// or the server does not come up in time.
    pub fn start(self) -> Result<RunningContainer> {
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        // A container left behind by an interrupted run holds the name and port.
        remove(self.name);

        tracing::info!(container = self.name, port = self.port, "Starting MariaDB container");
        cmd!(
            "docker",
            "run",
            "--name",
            self.name,
            "-e",
            format!("MARIADB_DATABASE={}", self.database),
            "-e",
            format!("MARIADB_USER={}", self.user),
            "-e",
            format!("MARIADB_PASSWORD={}", self.password),
            "-e",
            "MARIADB_ROOT_PASSWORD=root_password",
            "-p",
            format!("{}:3306", self.port),
            "-d",
            "mariadb:11"
        )
        .run_with_trace()
        .wrap_err("Failed to start MariaDB container")?;

        let running: RunningContainer = RunningContainer { spec: self };
        running.wait_until_ready()?;
        Ok(running)
    }
}

/// A started container, removed on drop.
#[derive(Debug)]
pub struct RunningContainer {
    spec: MariadbContainer,
}

impl RunningContainer {
    /// Connection URL reachable from the host.
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@127.0.0.1:{}/{}",
            self.spec.user, self.spec.password, self.spec.port, self.spec.database
        )
    }

    /// Name of the provisioned database.
    pub const fn database(&self) -> &'static str {
        self.spec.database
    }

    fn wait_until_ready(&self) -> Result<()> {
        tracing::info!("Waiting for MariaDB to be ready...");
        for attempt in 1..=READY_ATTEMPTS {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {attempt}/{READY_ATTEMPTS}");
            let probe: std::io::Result<std::process::Output> = cmd!(
                "docker",
                "exec",
                self.spec.name,
                "mariadb",
                "-u",
                self.spec.user,
                format!("-p{}", self.spec.password),
                "-e",
                "SELECT 1"
            )
            .stdout_null()
            .stderr_null()
            .run();
            if probe.is_ok() {
                tracing::info!("MariaDB is ready");
                return Ok(());
            }
        }
        Err(eyre!(
            "MariaDB did not become ready within {READY_ATTEMPTS} seconds"
        ))
    }
}

impl Drop for RunningContainer {
    fn drop(&mut self) {
        tracing::info!(container = self.spec.name, "Removing MariaDB container");
        remove(self.spec.name);
    }
}

/// Force-removes a container; a missing container is not an error.
fn remove(name: &str) {
    let _ = cmd!("docker", "rm", "--force", name)
        .stdout_null()
        .stderr_null()
        .unchecked()
        .run();
}
