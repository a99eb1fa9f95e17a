//! Notifications a table publishes to its host
//!
//! Handlers are keyed by the concrete event type. Publishing snapshots the
//! handler list before calling it, so a handler may itself publish or
//! subscribe without deadlocking the bus.

use std::any::{Any, TypeId};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

/// Implemented by every event type the bus carries
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Receives events of the type it was subscribed for
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &dyn Event);
}

type HandlerList = Vec<Arc<dyn EventHandler>>;

/// Event bus shared between a table and its observers
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<RwLock<AHashMap<TypeId, HandlerList>>>,
}

/// Table notifications
pub mod events {
    use super::Event;

    /// The bound data was replaced wholesale
    #[derive(Debug, Clone)]
    pub struct DataReplaced {
        pub row_count: usize,
        pub selection_reset: bool,
    }

    /// Search, filter, sort or page state changed and the view was recomputed
    #[derive(Debug, Clone)]
    pub struct ViewChanged {
        pub total_count: usize,
        pub page_index: usize,
        pub visible_rows: usize,
    }

    /// The set of selected rows changed
    #[derive(Debug, Clone)]
    pub struct SelectionChanged {
        pub selected_count: usize,
    }

    /// A row action handler returned an error
    #[derive(Debug, Clone)]
    pub struct ActionFailed {
        pub action_label: String,
        pub raw_index: usize,
        pub error: String,
    }

    macro_rules! table_events {
        ($($t:ty),* $(,)?) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        };
    }

    table_events!(DataReplaced, ViewChanged, SelectionChanged, ActionFailed);
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events of type `E`
    pub fn subscribe<E: Event>(&self, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(handler);
    }

    /// Register a closure receiving the concrete event type
    pub fn subscribe_fn<E, F>(&self, f: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe::<E>(Arc::new(TypedHandler {
            f,
            _event: std::marker::PhantomData::<fn(&E)>,
        }));
    }

    /// Deliver an event to every handler subscribed to its type
    pub fn publish<E: Event>(&self, event: E) {
        let handlers: HandlerList = match self.handlers.read().get(&TypeId::of::<E>()) {
            Some(list) => list.clone(),
            None => return,
        };
        for handler in &handlers {
            handler.handle(&event);
        }
    }

    /// Number of handlers subscribed to `E`
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .read()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }
}

/// Adapts a closure over `E` to [`EventHandler`]
struct TypedHandler<E, F> {
    f: F,
    _event: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> EventHandler for TypedHandler<E, F>
where
    E: Event,
    F: Fn(&E) + Send + Sync,
{
    fn handle(&self, event: &dyn Event) {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            (self.f)(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::events::{DataReplaced, SelectionChanged};
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_typed_subscription() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        bus.subscribe_fn(move |event: &SelectionChanged| {
            counter.store(event.selected_count, Ordering::SeqCst);
        });
        assert_eq!(bus.subscriber_count::<SelectionChanged>(), 1);
        assert_eq!(bus.subscriber_count::<DataReplaced>(), 0);

        bus.publish(DataReplaced { row_count: 3, selection_reset: false });
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        bus.publish(SelectionChanged { selected_count: 4 });
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_handler_may_publish() {
        let bus = EventBus::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let inner = bus.clone();
        bus.subscribe_fn(move |event: &DataReplaced| {
            inner.publish(SelectionChanged { selected_count: event.row_count });
        });
        let counter = seen.clone();
        bus.subscribe_fn(move |event: &SelectionChanged| {
            counter.fetch_add(event.selected_count, Ordering::SeqCst);
        });

        bus.publish(DataReplaced { row_count: 2, selection_reset: true });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
