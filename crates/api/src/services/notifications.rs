//! In-process publish/subscribe relay for membership and event changes.
//!
//! One broadcast channel per topic. Publishing never waits on subscribers;
//! a subscriber that falls more than [`CHANNEL_CAPACITY`] messages behind
//! skips the ones it missed. Nothing is persisted or replayed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::gql::types::{Event, Membership};

pub const CHANNEL_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    ClubMembershipChanged,
    EventCreated,
    EventUpdated,
    EventDeleted,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::ClubMembershipChanged,
        Channel::EventCreated,
        Channel::EventUpdated,
        Channel::EventDeleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::ClubMembershipChanged => "CLUB_MEMBERSHIP_CHANGED",
            Channel::EventCreated => "EVENT_CREATED",
            Channel::EventUpdated => "EVENT_UPDATED",
            Channel::EventDeleted => "EVENT_DELETED",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Notification {
    MembershipChanged(Membership),
    EventCreated(Event),
    EventUpdated(Event),
    EventDeleted { event_id: Uuid, club_id: Uuid },
}

impl Notification {
    pub fn channel(&self) -> Channel {
        match self {
            Notification::MembershipChanged(_) => Channel::ClubMembershipChanged,
            Notification::EventCreated(_) => Channel::EventCreated,
            Notification::EventUpdated(_) => Channel::EventUpdated,
            Notification::EventDeleted { .. } => Channel::EventDeleted,
        }
    }

    pub fn club_id(&self) -> Uuid {
        match self {
            Notification::MembershipChanged(m) => m.club.id,
            Notification::EventCreated(e) | Notification::EventUpdated(e) => e.club.id,
            Notification::EventDeleted { club_id, .. } => *club_id,
        }
    }

    pub fn event_id(&self) -> Option<Uuid> {
        match self {
            Notification::MembershipChanged(_) => None,
            Notification::EventCreated(e) | Notification::EventUpdated(e) => Some(e.id),
            Notification::EventDeleted { event_id, .. } => Some(*event_id),
        }
    }
}

/// Process-wide relay. Cheap to clone; clones share the channels.
#[derive(Clone)]
pub struct NotificationBus {
    senders: Arc<HashMap<Channel, broadcast::Sender<Notification>>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let senders = Channel::ALL
            .into_iter()
            .map(|channel| (channel, broadcast::channel(capacity).0))
            .collect();
        Self {
            senders: Arc::new(senders),
        }
    }

    fn sender(&self, channel: Channel) -> &broadcast::Sender<Notification> {
        // Every channel is created in `with_capacity`.
        &self.senders[&channel]
    }

    /// Fan the notification out on its channel. Returns how many subscribers
    /// it was handed to; zero is not an error.
    pub fn publish(&self, notification: Notification) -> usize {
        let channel = notification.channel();
        let delivered = self.sender(channel).send(notification).unwrap_or(0);
        tracing::debug!(%channel, delivered, "published notification");
        delivered
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.sender(channel).receiver_count()
    }

    /// Receive every later notification on `channel` for which `filter`
    /// returns true.
    pub fn subscribe<F>(&self, channel: Channel, mut filter: F) -> impl Stream<Item = Notification>
    where
        F: FnMut(&Notification) -> bool + Send + 'static,
    {
        BroadcastStream::new(self.sender(channel).subscribe()).filter_map(move |received| {
            match received {
                Ok(notification) if filter(&notification) => Some(notification),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(%channel, skipped, "subscriber lagged, dropping notifications");
                    None
                }
            }
        })
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
