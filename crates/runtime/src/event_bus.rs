use std::collections::VecDeque;

/// Events retained by [`EventBus::new`].
pub const DEFAULT_HISTORY: usize = 256;

/// What part of the viewer state changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Layers,
    Selection,
    Weather,
    Hover,
    Runout,
    Viewer,
}

/// A single state change, numbered in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub revision: u64,
    pub kind: ChangeKind,
    pub message: String,
}

type Subscriber = Box<dyn Fn(&Event) + Send + Sync>;

/// Records state changes and fans them out to subscribers.
///
/// Mutations happen through each component's own contract; the bus only
/// tells observers (the renderer) that a fresh projection is due. Only the
/// most recent `history` events are kept; older ones are dropped on emit.
pub struct EventBus {
    revision: u64,
    history: usize,
    events: VecDeque<Event>,
    subscribers: Vec<Subscriber>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_history(DEFAULT_HISTORY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: usize) -> Self {
        Self {
            revision: 0,
            history,
            events: VecDeque::with_capacity(history.min(DEFAULT_HISTORY)),
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&Event) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn emit(&mut self, kind: ChangeKind, message: impl Into<String>) -> u64 {
        self.revision += 1;
        let event = Event {
            revision: self.revision,
            kind,
            message: message.into(),
        };
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
        if self.history == 0 {
            return self.revision;
        }
        if self.events.len() == self.history {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self.revision
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> &VecDeque<Event> {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("revision", &self.revision)
            .field("history", &self.history)
            .field("events", &self.events)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
