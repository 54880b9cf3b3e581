use crate::device::DeviceId;
use crate::event::{InputEvent, InputKind};
use std::collections::HashMap;

/// Trait for reacting to edge events from any device.
pub trait InputListener: Send {
    fn on_input(&mut self, event: &InputEvent);
}

impl<F> InputListener for F
where
    F: FnMut(&InputEvent) + Send,
{
    fn on_input(&mut self, event: &InputEvent) {
        self(event)
    }
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    All,
    /// `KeyDown` / `KeyUp` only.
    KeysOnly,
    /// Mouse movement, buttons and wheel.
    MouseOnly,
    Custom(fn(&InputEvent) -> bool),
}

impl EventFilter {
    pub fn accepts(&self, event: &InputEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::KeysOnly => event.kind.is_key(),
            EventFilter::MouseOnly => event.kind.is_mouse(),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Handle returned by [`InputEventBus::add_listener`].
pub type ListenerId = u64;

struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
    device: Option<DeviceId>,
}

/// Fan-out of edge events to registered listeners.
#[derive(Default)]
pub struct InputEventBus {
    next_id: ListenerId,
    listeners: HashMap<ListenerId, ListenerEntry>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener; `device` restricts it to one device's events.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
        device: Option<DeviceId>,
    ) -> ListenerId {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                device,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: ListenerId) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Mutes a listener without removing it.
    pub fn disable(&mut self, id: ListenerId) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener. Returns whether it existed.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Emits one event to all active and matching listeners.
    pub fn emit(&mut self, event: &InputEvent) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }
            if entry.device.is_some_and(|wanted| wanted != event.device) {
                continue;
            }
            if entry.filter.accepts(event) {
                entry.listener.on_input(event);
            }
        }
    }

    /// Emits a batch of events to matching listeners.
    pub fn emit_all(&mut self, events: &[InputEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, Modifiers};
    use crate::platform::RawHandle;
    use std::sync::{Arc, Mutex};

    fn key_down(device: DeviceId) -> InputEvent {
        InputEvent::now(
            device,
            InputKind::KeyDown {
                key: Key::A,
                scan_code: 0x1E,
                modifiers: Modifiers::empty(),
            },
        )
    }

    fn recorder() -> (Arc<Mutex<Vec<InputKind>>>, impl InputListener + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |e: &InputEvent| sink.lock().unwrap().push(e.kind.clone()))
    }

    #[test]
    fn device_tag_filters_other_devices() {
        let a = DeviceId::Raw(RawHandle(1));
        let b = DeviceId::Raw(RawHandle(2));
        let mut bus = InputEventBus::new();
        let (seen, listener) = recorder();
        bus.add_listener(listener, EventFilter::All, Some(a));

        bus.emit_all(&[key_down(a), key_down(b)]);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn disabled_listeners_are_skipped() {
        let a = DeviceId::Raw(RawHandle(1));
        let mut bus = InputEventBus::new();
        let (seen, listener) = recorder();
        let id = bus.add_listener(listener, EventFilter::KeysOnly, None);

        bus.disable(id);
        bus.emit(&key_down(a));
        bus.enable(id);
        bus.emit(&InputEvent::now(a, InputKind::MouseWheel { delta: 1, wheel: 1 }));
        assert!(seen.lock().unwrap().is_empty());

        bus.emit(&key_down(a));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(bus.remove_listener(id));
        assert!(bus.is_empty());
    }
}
