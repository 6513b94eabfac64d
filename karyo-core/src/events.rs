//! Typed publish/subscribe channel for widget events.

use serde::{Deserialize, Serialize};

/// Events broadcast by a [`crate::widget::Chromosome`].
///
/// Serialized with the names consumers of the widget already know
/// (`modelLoaded`, `bandSelection` with `bandID`, `selectionChange`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ChromosomeEvent {
    ModelLoaded {
        id: String,
    },
    BandSelection {
        segment: String,
        #[serde(rename = "bandID")]
        band_id: String,
        start: f64,
        end: f64,
    },
    SelectionChange {
        segment: String,
        start: f64,
        end: f64,
    },
    Error {
        segment: String,
        message: String,
    },
}

impl ChromosomeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ChromosomeEvent::ModelLoaded { .. } => EventKind::ModelLoaded,
            ChromosomeEvent::BandSelection { .. } => EventKind::BandSelection,
            ChromosomeEvent::SelectionChange { .. } => EventKind::SelectionChange,
            ChromosomeEvent::Error { .. } => EventKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ModelLoaded,
    BandSelection,
    SelectionChange,
    Error,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::ModelLoaded => "modelLoaded",
            EventKind::BandSelection => "bandSelection",
            EventKind::SelectionChange => "selectionChange",
            EventKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ChromosomeEvent)>;

struct Subscriber {
    id: SubscriptionId,
    kind: Option<EventKind>,
    callback: Callback,
}

/// Subscribers are notified in registration order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event.
    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChromosomeEvent) + 'static,
    {
        self.register(Some(kind), Box::new(callback))
    }

    /// Subscribe to every event.
    pub fn on_any<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChromosomeEvent) + 'static,
    {
        self.register(None, Box::new(callback))
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn trigger(&mut self, event: &ChromosomeEvent) {
        let kind = event.kind();
        log::debug!("trigger {}", kind.name());
        for subscriber in self.subscribers.iter_mut() {
            if subscriber.kind.map_or(true, |k| k == kind) {
                (subscriber.callback)(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    fn register(&mut self, kind: Option<EventKind>, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, kind, callback });
        id
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
