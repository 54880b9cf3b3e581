use crate::event::InputEvent;
use crate::eventbus::InputListener;

/// Listener that forwards every event to `tracing` at `info`.
#[derive(Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl InputListener for Logger {
    fn on_input(&mut self, event: &InputEvent) {
        tracing::info!(device = %event.device, kind = ?event.kind, "input");
    }
}
