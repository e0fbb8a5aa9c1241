// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations of the ledger store.
//!
//! - `actors`: Agency, collector and client registration
//! - `accounts`: Account creation and versioned balance updates
//! - `movements`: Movement appends
//! - `journals`: Journal opening and closing
//! - `commission`: Parameters and commission history
//! - `remuneration`: Remunerations and rubriques
//! - `audit`: Audit event appends
//!
//! Inserts read the generated identifier back through
//! `PersistenceBackend::get_last_insert_rowid` and map unique-constraint
//! failures to `PersistenceError::Duplicate`.

pub mod accounts;
pub mod actors;
pub mod audit;
pub mod commission;
pub mod journals;
pub mod movements;
pub mod remuneration;
