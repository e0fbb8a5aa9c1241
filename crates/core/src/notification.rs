// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use collecte_audit::NotificationEvent;
use tracing::warn;

/// Receives events published after a ledger transaction commits.
///
/// Implementations must not block; delivery happens elsewhere.
pub trait NotificationSink: Send + Sync {
    /// Publishes an event.
    fn publish(&self, event: NotificationEvent);
}

/// A sink that writes events to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationSink;

impl NotificationSink for LoggingNotificationSink {
    fn publish(&self, event: NotificationEvent) {
        warn!(kind = event.kind(), "{event}");
    }
}
