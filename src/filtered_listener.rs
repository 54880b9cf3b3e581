use crate::event::{InputEvent, InputKind};
use crate::eventbus::InputListener;
use crate::keys::Key;

/// Wraps a listener and forwards only events matching a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&InputEvent) -> bool + Send + Sync>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&InputEvent) -> bool + Send + Sync + 'static,
        inner: impl InputListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }

    /// Forward only edges of `key` (down and up).
    pub fn for_key(key: Key, inner: impl InputListener + 'static) -> Self {
        Self::new(
            move |e| {
                matches!(
                    e.kind,
                    InputKind::KeyDown { key: k, .. }
                        | InputKind::KeyUp { key: k, .. } if k == key
                )
            },
            inner,
        )
    }
}

impl InputListener for FilteredListener {
    fn on_input(&mut self, event: &InputEvent) {
        if (self.predicate)(event) {
            self.inner.on_input(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceId;
    use crate::keys::Modifiers;
    use std::sync::{Arc, Mutex};

    #[test]
    fn for_key_forwards_only_that_key() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut filtered = FilteredListener::for_key(Key::LControlKey, move |e: &InputEvent| {
            sink.lock().unwrap().push(e.kind.clone())
        });
        let ev = |key| {
            InputEvent::now(
                DeviceId::Joystick(0),
                InputKind::KeyUp {
                    key,
                    scan_code: 0,
                    modifiers: Modifiers::empty(),
                },
            )
        };
        filtered.on_input(&ev(Key::LControlKey));
        filtered.on_input(&ev(Key::A));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(seen[0], InputKind::KeyUp { key: Key::LControlKey, .. }));
    }
}
