//! Explicit listener registration.
//!
//! Engines and the collection coordinator announce changes by emitting an
//! event to every registered listener. Nothing is observed implicitly.

/// Handle returned by [`Signal::subscribe`].
pub type ListenerId = u64;

/// Listeners for one event type, notified in registration order.
pub struct Signal<E> {
    listeners: Vec<(ListenerId, Box<dyn Fn(&E)>)>,
    next_id: ListenerId,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> core::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a callback. Ids are never reused.
    pub fn subscribe<F>(&mut self, callback: F) -> ListenerId
    where
        F: Fn(&E) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(callback)));
        id
    }

    /// Returns false if no listener has this id.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    pub fn emit(&self, event: &E) {
        for (_, callback) in &self.listeners {
            callback(event);
        }
    }
}
