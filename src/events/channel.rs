//! Crossbeam-backed event channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Handle the scanner publishes through. Clones share one channel.
#[derive(Clone, Default)]
pub struct EventSender {
    /// `None` when nobody subscribed
    inner: Option<Sender<Event>>,
}

impl EventSender {
    /// Publish an event. A listener that went away is not an error.
    pub fn send(&self, event: Event) {
        if let Some(sender) = &self.inner {
            let _ = sender.send(event);
        }
    }

    /// Whether anything could still receive what is sent
    pub fn is_connected(&self) -> bool {
        self.inner.is_some()
    }
}

/// Listening end of an [`EventChannel`]
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Next event, or `None` once every sender is gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Blocks until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; the scanner never waits on a slow listener
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender {
                inner: Some(sender),
            },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender that discards everything
pub fn null_sender() -> EventSender {
    EventSender::default()
}
