// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use collecte::NotificationSink;
use collecte_audit::NotificationEvent;
use collecte_domain::{AgencyId, ClientId, CollectorId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::date;

use super::RecordingSink;
use crate::notifier::{
    ChannelNotificationSink, NOTIFICATION_BUFFER_SIZE, NotificationDispatcher,
    notification_channel,
};

fn large_withdrawal(amount: Decimal) -> NotificationEvent {
    NotificationEvent::LargeWithdrawal {
        client_id: ClientId::new(4),
        collector_id: CollectorId::new(2),
        agency_id: AgencyId::new(1),
        amount,
        threshold: dec!(500000),
        occurred_on: date!(2026 - 03 - 02),
    }
}

#[tokio::test]
async fn test_dispatcher_forwards_in_order() {
    let recorder: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let (sink, dispatcher): (ChannelNotificationSink, NotificationDispatcher) =
        notification_channel(Arc::clone(&recorder) as Arc<dyn NotificationSink>);
    let handle: tokio::task::JoinHandle<usize> = dispatcher.spawn();

    sink.publish(large_withdrawal(dec!(500000)));
    sink.publish(large_withdrawal(dec!(750000)));
    drop(sink);

    assert_eq!(handle.await.unwrap(), 2);
    assert_eq!(
        recorder.events(),
        vec![
            large_withdrawal(dec!(500000)),
            large_withdrawal(dec!(750000))
        ]
    );
}

#[tokio::test]
async fn test_dispatcher_ends_when_every_sender_is_dropped() {
    let recorder: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let (sink, dispatcher): (ChannelNotificationSink, NotificationDispatcher) =
        notification_channel(Arc::clone(&recorder) as Arc<dyn NotificationSink>);
    let handle: tokio::task::JoinHandle<usize> = dispatcher.spawn();

    let clone: ChannelNotificationSink = sink.clone();
    drop(sink);
    clone.publish(large_withdrawal(dec!(600000)));
    drop(clone);

    assert_eq!(handle.await.unwrap(), 1);
}

#[tokio::test]
async fn test_full_buffer_drops_new_events() {
    let recorder: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let (sink, dispatcher): (ChannelNotificationSink, NotificationDispatcher) =
        notification_channel(Arc::clone(&recorder) as Arc<dyn NotificationSink>);

    // Nothing drains the channel until the dispatcher is spawned.
    for _ in 0..NOTIFICATION_BUFFER_SIZE + 5 {
        sink.publish(large_withdrawal(dec!(500000)));
    }
    let handle: tokio::task::JoinHandle<usize> = dispatcher.spawn();
    drop(sink);

    assert_eq!(handle.await.unwrap(), NOTIFICATION_BUFFER_SIZE);
    assert_eq!(recorder.events().len(), NOTIFICATION_BUFFER_SIZE);
}

#[tokio::test]
async fn test_publish_after_dispatcher_stops_is_dropped() {
    let recorder: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let (sink, dispatcher): (ChannelNotificationSink, NotificationDispatcher) =
        notification_channel(Arc::clone(&recorder) as Arc<dyn NotificationSink>);
    drop(dispatcher);

    sink.publish(large_withdrawal(dec!(900000)));

    assert!(recorder.events().is_empty());
}
