// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Asynchronous delivery of ledger notifications.
//!
//! The ledger publishes synchronously after a commit. [`ChannelNotificationSink`]
//! hands each event to a bounded channel and a dispatcher task forwards it
//! to the downstream sink, so a slow consumer never holds up a posting.
//! Dropping every sender ends the dispatcher once the channel is drained.

use std::sync::Arc;

use collecte::NotificationSink;
use collecte_audit::NotificationEvent;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Maximum number of events waiting for the dispatcher.
/// When the dispatcher falls behind, new events are dropped.
pub const NOTIFICATION_BUFFER_SIZE: usize = 100;

/// Publishing half: a [`NotificationSink`] for the ledger.
#[derive(Debug, Clone)]
pub struct ChannelNotificationSink {
    sender: mpsc::Sender<NotificationEvent>,
}

impl NotificationSink for ChannelNotificationSink {
    fn publish(&self, event: NotificationEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(kind = event.kind(), "Notification buffer full, event dropped");
            }
            Err(TrySendError::Closed(event)) => {
                warn!(kind = event.kind(), "Notification dispatcher stopped, event dropped");
            }
        }
    }
}

/// Receiving half, forwarding to a downstream sink.
pub struct NotificationDispatcher {
    receiver: mpsc::Receiver<NotificationEvent>,
    downstream: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    /// Starts forwarding. The task ends when every sender is dropped and
    /// returns how many events it delivered.
    #[must_use]
    pub fn spawn(mut self) -> JoinHandle<usize> {
        tokio::spawn(async move {
            let mut delivered: usize = 0;
            while let Some(event) = self.receiver.recv().await {
                debug!(kind = event.kind(), "Dispatching notification");
                self.downstream.publish(event);
                delivered += 1;
            }
            delivered
        })
    }
}

/// Creates a connected sink and dispatcher.
#[must_use]
pub fn notification_channel(
    downstream: Arc<dyn NotificationSink>,
) -> (ChannelNotificationSink, NotificationDispatcher) {
    let (sender, receiver) = mpsc::channel(NOTIFICATION_BUFFER_SIZE);
    (
        ChannelNotificationSink { sender },
        NotificationDispatcher {
            receiver,
            downstream,
        },
    )
}
