// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::create_test_persistence;
use crate::Persistence;
use collecte::LedgerStore;
use collecte_domain::{Agency, NewAgency};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_database_path() -> PathBuf {
    let id: u64 = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "collecte_ledger_test_{}_{id}.db",
        std::process::id()
    ))
}

fn remove_database_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file: std::ffi::OsString = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

fn agency(code: &str) -> NewAgency {
    NewAgency {
        code: code.to_string(),
        name: String::from("Garoua Plateau"),
    }
}

#[test]
fn test_in_memory_database_initializes_with_foreign_keys() {
    let mut persistence: Persistence = create_test_persistence();
    assert_eq!(persistence.backend_name(), "sqlite");
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first: Persistence = create_test_persistence();
    let mut second: Persistence = create_test_persistence();

    first.insert_agency(&agency("GAR01")).unwrap();

    assert!(second.insert_agency(&agency("GAR01")).is_ok());
    assert!(first.insert_agency(&agency("GAR01")).is_err());
}

#[test]
fn test_file_database_keeps_rows_across_reopen() {
    let path: PathBuf = temp_database_path();
    let stored: Agency = {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        persistence.insert_agency(&agency("GAR01")).unwrap()
    };

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    let loaded: Option<Agency> = reopened.get_agency(stored.agency_id).unwrap();
    drop(reopened);
    remove_database_files(&path);

    assert_eq!(loaded, Some(stored));
}
