use std::fmt::Debug;

use log::trace;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::Tracked;

pub type Subscriber<F> = Box<dyn FnMut(F) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Sink<F> {
    Callback(Subscriber<F>),
    Channel(UnboundedSender<F>),
}

impl<F> Sink<F> {
    /// Delivers `field`, returning `false` once the sink can no longer receive.
    fn deliver(&mut self, field: F) -> bool {
        match self {
            Self::Callback(subscriber) => {
                subscriber(field);
                true
            }
            Self::Channel(tx) => tx.send(field).is_ok(),
        }
    }
}

/// Fan-out of "field changed" events to registered subscribers.
///
/// Channel subscribers are dropped on the first notification after their receiver is gone.
pub struct Notifier<F> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Sink<F>)>,
}

impl<F> Default for Notifier<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }
}

impl<F> Notifier<F> {
    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl<F> Debug for Notifier<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl<F: Copy + Debug + Send + 'static> Notifier<F> {
    pub fn subscribe(&mut self, subscriber: impl FnMut(F) + Send + 'static) -> SubscriptionId {
        self.add(Sink::Callback(Box::new(subscriber)))
    }

    fn add(&mut self, sink: Sink<F>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, sink));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(other, _)| *other != id);
        self.subscribers.len() != before
    }

    /// Subscribes a channel that receives every changed field.
    pub fn channel(&mut self) -> (SubscriptionId, UnboundedReceiver<F>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.add(Sink::Channel(tx)), rx)
    }

    pub fn notify(&mut self, field: F) {
        trace!("{:?} changed", field);
        self.subscribers.retain_mut(|(id, sink)| {
            let open = sink.deliver(field);
            if !open {
                trace!("dropping closed subscription {:?}", id);
            }
            open
        });
    }

    /// Assigns `value` to `slot`, notifying `field` iff the value changed.
    pub fn publish<T: PartialEq>(&mut self, field: F, slot: &mut Tracked<T>, value: T) -> bool {
        let changed = slot.set(value);
        if changed {
            self.notify(field);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn subscribers_receive_changes() {
        let mut notifier: Notifier<&str> = Notifier::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        notifier.subscribe(move |field| sink.lock().unwrap().push(field));

        let mut slot = Tracked::new(0);
        assert!(notifier.publish("count", &mut slot, 1));
        assert!(!notifier.publish("count", &mut slot, 1));

        assert_eq!(*seen.lock().unwrap(), vec!["count"]);
    }

    #[test]
    fn unsubscribed_callbacks_are_not_called() {
        let mut notifier: Notifier<u8> = Notifier::default();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let id = notifier.subscribe(move |_| *counter.lock().unwrap() += 1);

        notifier.notify(1);
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify(2);

        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn channel_receives_changes() {
        let mut notifier: Notifier<char> = Notifier::default();
        let (_, mut rx) = notifier.channel();

        notifier.notify('a');
        notifier.notify('b');

        assert_eq!(rx.try_recv().unwrap(), 'a');
        assert_eq!(rx.try_recv().unwrap(), 'b');
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_channel_is_removed() {
        let mut notifier: Notifier<u8> = Notifier::default();
        let (_, rx) = notifier.channel();
        let (_, mut kept) = notifier.channel();
        notifier.subscribe(|_| ());
        drop(rx);
        assert_eq!(notifier.len(), 3);

        notifier.notify(1);

        assert_eq!(notifier.len(), 2);
        assert_eq!(kept.try_recv().unwrap(), 1);
    }

    #[test]
    fn resubscribing_channels_does_not_accumulate() {
        let mut notifier: Notifier<u8> = Notifier::default();
        for n in 0..10 {
            let (_, mut rx) = notifier.channel();
            notifier.notify(n);
            assert_eq!(rx.try_recv().unwrap(), n);
        }
        notifier.notify(10);

        assert!(notifier.is_empty());
    }
}
