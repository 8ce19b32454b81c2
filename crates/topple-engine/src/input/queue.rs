/// Lifecycle stage of a continuous gesture, as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Input event types the engine understands.
/// Generic, with no game-specific semantics. Coordinates are screen points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A discrete tap at screen point (x, y).
    Tap { x: f32, y: f32 },
    /// A pan/drag gesture update at screen point (x, y).
    Pan { phase: GesturePhase, x: f32, y: f32 },
    /// A command from the UI layer (menu buttons etc.).
    /// `kind` identifies the command; `a`, `b` carry arbitrary data.
    Custom { kind: u32, a: f32, b: f32 },
}

/// A queue of input events.
/// The platform layer pushes events; the game reads them once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Iterate over pending events without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::Tap { x: 10.0, y: 20.0 });
        q.push(InputEvent::Pan { phase: GesturePhase::Ended, x: 0.0, y: 0.0 });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events[1], InputEvent::Pan { phase: GesturePhase::Ended, x: 0.0, y: 0.0 });
        assert!(q.is_empty());
    }
}
