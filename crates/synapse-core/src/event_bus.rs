//! Event queue between the engine and the view.
//!
//! Single-threaded, shared through `Rc<RefCell<_>>`. The view drains it once
//! per frame, so the queue only ever holds what happened since the last
//! frame. A view that stops draining must not grow it without bound.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use synapse_types::event::SimulationEvent;

/// Pending events kept when nobody drains
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

struct Queue {
    events: VecDeque<SimulationEvent>,
    capacity: usize,
    dropped: u64,
}

/// Shared event bus, clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<Queue>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Queue {
                events: VecDeque::new(),
                capacity: capacity.max(1),
                dropped: 0,
            })),
        }
    }

    /// Publish an event.
    ///
    /// A `Tick` replaces a `Tick` still pending at the back of the queue; the
    /// view only needs the latest elapsed value. When full, the oldest event
    /// is dropped.
    pub fn emit(&self, event: SimulationEvent) {
        let mut queue = self.inner.borrow_mut();
        let coalesce = matches!(event, SimulationEvent::Tick { .. })
            && matches!(queue.events.back(), Some(SimulationEvent::Tick { .. }));
        if coalesce {
            if let Some(last) = queue.events.back_mut() {
                *last = event;
            }
            return;
        }
        if queue.events.len() >= queue.capacity {
            queue.events.pop_front();
            queue.dropped += 1;
            if queue.dropped == 1 {
                log::warn!("Event queue full ({}), dropping oldest events", queue.capacity);
            }
        }
        queue.events.push_back(event);
    }

    /// Drain all pending events. Called by the view layer each frame.
    pub fn drain(&self) -> Vec<SimulationEvent> {
        self.inner.borrow_mut().events.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().events.is_empty()
    }

    /// Events lost to the capacity bound since creation
    pub fn dropped(&self) -> u64 {
        self.inner.borrow().dropped
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
