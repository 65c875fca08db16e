//! Event bus — broadcast-style event dispatch with pluggable sinks.
//!
//! The bus uses `std::sync::mpsc` so producers never block on sink
//! work; sinks are registered once and drain the channel on `flush`.

use std::sync::mpsc;

use crate::events::SimulationEvent;
use crate::sinks::EventSink;

/// Broadcast event bus for simulation telemetry.
///
/// The producer side (`emit`) sends events into a channel; `flush`
/// drains the channel into every registered sink. The bus starts
/// disabled — an instrumented engine with no observers pays only a
/// branch per emit.
pub struct EventBus {
    sender: mpsc::Sender<SimulationEvent>,
    receiver: mpsc::Receiver<SimulationEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    enabled: bool,
}

impl EventBus {
    /// Creates a new, disabled bus with no sinks.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            sinks: Vec::new(),
            enabled: false,
        }
    }

    /// Registers a sink and enables the bus.
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
        self.enabled = true;
    }

    /// Enables or disables the bus. A disabled bus drops events.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Returns true if the bus is forwarding events.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Emit an event. No-op when the bus is disabled.
    pub fn emit(&self, event: SimulationEvent) {
        if !self.enabled {
            return;
        }
        // The receiver lives in the same struct; send cannot fail
        // unless the bus is being dropped anyway.
        let _ = self.sender.send(event);
    }

    /// Flush all pending events to the registered sinks. Call at the
    /// end of each step (the engine does this automatically).
    pub fn flush(&mut self) {
        while let Ok(event) = self.receiver.try_recv() {
            for sink in &mut self.sinks {
                sink.handle(&event);
            }
        }
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
