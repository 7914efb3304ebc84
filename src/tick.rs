//! Typed publish/subscribe for simulation steps.

/// Published once per simulated step, before the clock moves on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tick;

/// Identifies a subscription for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Tick) + Send>;

/// Synchronous, ordered fan-out of [`Tick`] events
#[derive(Default)]
pub struct TickEmitter {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl TickEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. Subscribers run in registration order.
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Tick) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Deliver one tick to every subscriber, in order, before returning
    pub fn emit(&mut self) {
        let tick = Tick;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&tick);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
