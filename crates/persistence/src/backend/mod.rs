// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! Connection setup, migrations and the few statements Diesel has no DSL
//! for live here. Ledger queries and mutations live in `queries/` and
//! `mutations/` and must work on every supported backend.
//!
//! - `sqlite`: `SQLite` backend (default for development and testing)
//! - `mysql`: MySQL/MariaDB backend (validated via opt-in tests)

pub mod mysql;
pub mod sqlite;

use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::{Connection, MysqlConnection, SqliteConnection};

use crate::error::PersistenceError;

/// Operations that differ per backend or sit outside the Diesel DSL.
///
/// Ledger transactions are driven manually through the connection's
/// transaction manager so that a store operation can span many query
/// functions while the caller keeps `&mut` access to the adapter.
pub trait PersistenceBackend: Connection {
    /// Retrieves the identifier of the last inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError>;

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError>;

    /// Starts a transaction, or a savepoint when one is already open.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the backend refuses.
    fn begin_ledger_transaction(&mut self) -> Result<(), PersistenceError>;

    /// Commits the innermost transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the commit fails.
    fn commit_ledger_transaction(&mut self) -> Result<(), PersistenceError>;

    /// Rolls back the innermost transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionFailed` if the rollback fails.
    fn rollback_ledger_transaction(&mut self) -> Result<(), PersistenceError>;
}

fn transaction_failed(stage: &str) -> impl FnOnce(diesel::result::Error) -> PersistenceError {
    let stage: String = stage.to_string();
    move |err| PersistenceError::TransactionFailed(format!("{stage}: {err}"))
}

impl PersistenceBackend for SqliteConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        sqlite::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(self)
    }

    fn begin_ledger_transaction(&mut self) -> Result<(), PersistenceError> {
        AnsiTransactionManager::begin_transaction(self).map_err(transaction_failed("begin"))
    }

    fn commit_ledger_transaction(&mut self) -> Result<(), PersistenceError> {
        AnsiTransactionManager::commit_transaction(self).map_err(transaction_failed("commit"))
    }

    fn rollback_ledger_transaction(&mut self) -> Result<(), PersistenceError> {
        AnsiTransactionManager::rollback_transaction(self).map_err(transaction_failed("rollback"))
    }
}

impl PersistenceBackend for MysqlConnection {
    fn get_last_insert_rowid(&mut self) -> Result<i64, PersistenceError> {
        mysql::get_last_insert_rowid(self)
    }

    fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        mysql::verify_foreign_key_enforcement(self)
    }

    fn begin_ledger_transaction(&mut self) -> Result<(), PersistenceError> {
        AnsiTransactionManager::begin_transaction(self).map_err(transaction_failed("begin"))
    }

    fn commit_ledger_transaction(&mut self) -> Result<(), PersistenceError> {
        AnsiTransactionManager::commit_transaction(self).map_err(transaction_failed("commit"))
    }

    fn rollback_ledger_transaction(&mut self) -> Result<(), PersistenceError> {
        AnsiTransactionManager::rollback_transaction(self).map_err(transaction_failed("rollback"))
    }
}
