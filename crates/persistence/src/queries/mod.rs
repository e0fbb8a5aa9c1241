// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries of the ledger store.
//!
//! - `actors`: Agencies, collectors and clients
//! - `accounts`: Accounts by identifier or kind
//! - `movements`: Account statements, journal contents and credited sums
//! - `journals`: Daily collection journals
//! - `commission`: Commission parameters and history
//! - `remuneration`: Remunerations and rubriques
//! - `audit`: Audit events
//!
//! Every function is generated in a `_sqlite` and a `_mysql` variant; the
//! `Persistence` adapter dispatches on the active connection.

pub mod accounts;
pub mod actors;
pub mod audit;
pub mod commission;
pub mod journals;
pub mod movements;
pub mod remuneration;
