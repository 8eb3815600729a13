use std::sync::{Arc, Mutex, MutexGuard};

use futures::{Stream, StreamExt};

use crate::common::happypump::logs_data::EventRecord;
use crate::common::happypump::logs_events::{decode_event, EventKind, HappyPumpEvent};
use crate::common::happypump::logs_parser::parse_logs;
use crate::error::ClientResult;

/// A typed event together with where it was observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventEnvelope {
    pub event: HappyPumpEvent,
    pub slot: u64,
    pub signature: String,
}

pub type EventHandler = Arc<dyn Fn(EventEnvelope) + Send + Sync>;

/// Returned by [`EventDispatcher::subscribe`]; pass it back to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    pub kind: EventKind,
    id: u64,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, EventKind, EventHandler)>,
}

/// Routes events to listeners registered per event kind.
///
/// Listeners for a kind are called in registration order, each with its own clone of the
/// event. The registry lock is released before any handler runs.
#[derive(Default)]
pub struct EventDispatcher {
    registry: Mutex<Registry>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // handlers never run under the lock, so a poisoned registry is still consistent
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> ListenerHandle
    where
        F: Fn(EventEnvelope) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, kind, Arc::new(handler)));
        ListenerHandle { kind, id }
    }

    /// Removes a listener. Returns false if it was already removed.
    pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
        let mut registry = self.registry();
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _, _)| *id != handle.id);
        registry.listeners.len() != before
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry().listeners.iter().filter(|(_, k, _)| *k == kind).count()
    }

    /// Decodes a record and delivers it. Returns the number of listeners reached.
    pub fn dispatch(&self, record: &EventRecord) -> ClientResult<usize> {
        let event = decode_event(&record.tag, &record.fields)?;
        Ok(self.dispatch_event(event, record.slot, record.signature.clone()))
    }

    /// Delivers an already decoded event. Returns the number of listeners reached.
    pub fn dispatch_event(&self, event: HappyPumpEvent, slot: u64, signature: String) -> usize {
        let kind = event.kind();
        let handlers: Vec<EventHandler> = self
            .registry()
            .listeners
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| Arc::clone(handler))
            .collect();

        let envelope = EventEnvelope { event, slot, signature };
        for handler in &handlers {
            handler(envelope.clone());
        }
        handlers.len()
    }

    /// Parses one transaction's log lines and delivers every recognised event.
    ///
    /// Returns the number of events delivered; payloads that cannot be decoded are logged by
    /// [`parse_logs`] and skipped without affecting the rest of the batch.
    pub fn dispatch_logs(&self, logs: &[String], slot: u64, signature: &str) -> usize {
        let events = parse_logs(logs);
        let delivered = events.len();
        for event in events {
            self.dispatch_event(event, slot, signature.to_string());
        }
        delivered
    }

    /// Drains a record stream, skipping records that fail to decode.
    pub async fn run<S>(&self, stream: S)
    where
        S: Stream<Item = EventRecord>,
    {
        futures::pin_mut!(stream);
        while let Some(record) = stream.next().await {
            if let Err(e) = self.dispatch(&record) {
                log::warn!("dropping event record `{}` ({}): {}", record.tag, record.signature, e);
            }
        }
    }
}
