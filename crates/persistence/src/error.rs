// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use collecte::StoreError;
use diesel::result::DatabaseErrorKind;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// A unique business key is already taken.
    Duplicate { resource: String, key: String },
    /// An account row was updated with a stale version.
    VersionConflict {
        account_id: i64,
        expected_version: i64,
    },
    /// A stored value could not be decoded into its domain type.
    CorruptRow { table: String, message: String },
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// A transaction could not be started, committed or rolled back.
    TransactionFailed(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested resource was not found.
    NotFound(String),
}

impl PersistenceError {
    /// Builds a `CorruptRow` error.
    pub(crate) fn corrupt(table: &str, message: impl ToString) -> Self {
        Self::CorruptRow {
            table: table.to_string(),
            message: message.to_string(),
        }
    }

    /// Maps a unique-constraint failure to `Duplicate`, leaving other
    /// database errors untouched.
    pub(crate) fn unique_violation(
        resource: &str,
        key: impl ToString,
    ) -> impl FnOnce(diesel::result::Error) -> Self {
        let resource: String = resource.to_string();
        let key: String = key.to_string();
        move |err| match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Self::Duplicate { resource, key }
            }
            other => Self::from(other),
        }
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::Duplicate { resource, key } => write!(f, "{resource} already exists: {key}"),
            Self::VersionConflict {
                account_id,
                expected_version,
            } => write!(
                f,
                "Account {account_id} changed since version {expected_version}"
            ),
            Self::CorruptRow { table, message } => {
                write!(f, "Corrupt row in {table}: {message}")
            }
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::TransactionFailed(msg) => write!(f, "Transaction failed: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Duplicate { resource, key } => Self::Duplicate { resource, key },
            PersistenceError::VersionConflict {
                account_id,
                expected_version,
            } => Self::VersionConflict {
                account_id,
                expected_version,
            },
            PersistenceError::NotFound(key) => Self::NotFound {
                resource: String::from("record"),
                key,
            },
            other => Self::Backend(other.to_string()),
        }
    }
}
