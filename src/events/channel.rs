//! Event channel implementation over crossbeam-channel.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core engine.
///
/// Cloneable and thread-safe; sending to a dropped receiver is a silent
/// no-op so progress reporting stays optional.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from the core engine.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or None once all senders are gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Receive without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate events until all senders are dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for event channels between the engine and a front end.
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; events are small, this is the common case
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender { inner: sender }, EventReceiver { inner: receiver })
    }

    /// Bounded channel for a front end that needs backpressure
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (EventSender { inner: sender }, EventReceiver { inner: receiver })
    }
}

/// An event sender with nobody listening, for callers that don't want
/// progress reporting.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, ScanEvent};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Scan(ScanEvent::FileFound {
                path: PathBuf::from("/pics/a.png"),
            }));
        });
        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Scan(ScanEvent::FileFound { path }) => {
                assert_eq!(path, PathBuf::from("/pics/a.png"));
            }
            _ => panic!("wrong event type"),
        }
    }

    #[test]
    fn null_sender_discards_silently() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started));
    }

    #[test]
    fn receiver_drains_after_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.send(Event::Pipeline(PipelineEvent::Cancelled));
        drop(sender);

        let events: Vec<_> = receiver.iter().collect();
        assert_eq!(events.len(), 2);
    }
}
