// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Line-oriented request session.
//!
//! Each input line is a JSON object naming the operator, their role, an
//! optional cause, and a command tagged by `"command"`:
//!
//! ```text
//! {"actor":"caissier-01","role":"cashier","command":"deposit","client":1,"amount":"1000","date":"2026-03-02"}
//! ```
//!
//! Each request is answered by one JSON line carrying either `result` or
//! `error`. A malformed or refused request does not end the session.

use collecte::{Ledger, LedgerStore, OperationContext};
use collecte_audit::{Actor, Cause};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::authorization::{Authorizer, Role};
use crate::cli::LedgerCommand;
use crate::commands::{CommandError, execute};

/// One request line.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionRequest {
    /// Operator login.
    pub actor: String,
    /// Role the operator acts under.
    pub role: Role,
    /// Cause identifier; generated when absent.
    #[serde(default)]
    pub cause_id: Option<String>,
    /// Free-text reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// The command to run.
    #[serde(flatten)]
    pub command: LedgerCommand,
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResponse {
    /// Whether the command succeeded.
    pub ok: bool,
    /// The rendered result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionResponse {
    const fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(error: &impl std::fmt::Display) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// A ledger serving requests from one input stream.
pub struct Session<S: LedgerStore> {
    ledger: Ledger<S>,
    authorizer: Authorizer,
    handled: u64,
}

impl<S: LedgerStore> Session<S> {
    /// Creates a session.
    #[must_use]
    pub const fn new(ledger: Ledger<S>, authorizer: Authorizer) -> Self {
        Self {
            ledger,
            authorizer,
            handled: 0,
        }
    }

    /// Number of requests answered so far.
    #[must_use]
    pub const fn handled(&self) -> u64 {
        self.handled
    }

    /// Parses, authorizes and runs one request line.
    pub fn handle_line(&mut self, line: &str) -> SessionResponse {
        self.handled += 1;
        let request: SessionRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(err) => {
                warn!(line = self.handled, error = %err, "Malformed request");
                return SessionResponse::failure(&CommandError::InvalidInput(err.to_string()));
            }
        };
        match self.run(&request) {
            Ok(result) => SessionResponse::success(result),
            Err(err) => {
                warn!(
                    line = self.handled,
                    action = request.command.action(),
                    error = %err,
                    "Request failed"
                );
                SessionResponse::failure(&err)
            }
        }
    }

    fn run(&mut self, request: &SessionRequest) -> Result<Value, CommandError> {
        self.authorizer
            .authorize(&request.actor, request.role, &request.command)?;
        let cause_id: String = request
            .cause_id
            .clone()
            .unwrap_or_else(|| format!("session-{}", self.handled));
        let reason: String = request
            .reason
            .clone()
            .unwrap_or_else(|| String::from("Session request"));
        let context: OperationContext =
            OperationContext::new(Actor::operator(&request.actor), Cause::new(cause_id, reason));
        execute(&mut self.ledger, &context, &request.command)
    }
}

/// Answers every line of `input` on `output` until end of input.
///
/// Blank lines are skipped. Returns the number of requests handled.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub async fn run<S, R, W>(
    session: &mut Session<S>,
    input: R,
    mut output: W,
) -> Result<u64, std::io::Error>
where
    S: LedgerStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines: tokio::io::Lines<R> = input.lines();
    let start: u64 = session.handled();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response: SessionResponse = session.handle_line(&line);
        let mut text: String = serde_json::to_string(&response)?;
        text.push('\n');
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
    let handled: u64 = session.handled() - start;
    info!(handled, "Session input closed");
    Ok(handled)
}
