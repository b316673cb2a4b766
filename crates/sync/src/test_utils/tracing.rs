//! A `tracing-subscriber` layer that collects emitted events with their levels, so tests can
//! assert on log output.

use alloc::{format, string::String, sync::Arc, vec::Vec};
use spin::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{layer::Context, Layer};

/// Shared storage for collected events.
#[derive(Debug, Default, Clone)]
pub struct TraceStorage(pub Arc<Mutex<Vec<(Level, String)>>>);

impl TraceStorage {
    /// Returns the collected messages emitted at `level`, in emission order.
    pub fn get_by_level(&self, level: Level) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Returns `true` if any collected message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.0.lock().iter().any(|(l, message)| *l == level && message.contains(needle))
    }

    /// Returns `true` if nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A layer pushing every event into a [TraceStorage].
#[derive(Debug, Default)]
pub struct CollectingLayer {
    /// Where events are collected.
    pub storage: TraceStorage,
}

impl CollectingLayer {
    /// Creates a layer collecting into `storage`.
    pub const fn new(storage: TraceStorage) -> Self {
        Self { storage }
    }
}

impl<S: Subscriber> Layer<S> for CollectingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = *event.metadata().level();
        let message = format!("{event:?}");
        self.storage.0.lock().push((level, message));
    }
}
