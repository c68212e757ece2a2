use std::collections::VecDeque;

/// Default capacity of an [`InputQueue`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Tab,
    Enter,
    Escape,
    Char(char),
}

/// One key-press or key-release from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub pressed: bool,
}

impl KeyEvent {
    pub fn press(key: Key) -> Self {
        Self { key, pressed: true }
    }

    pub fn release(key: Key) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("input queue full ({capacity} events), dropped {event:?}")]
    QueueFull { event: KeyEvent, capacity: usize },
}

/// Bounded FIFO between the host's event callback and the tick path.
///
/// When full, the newest event is dropped.
#[derive(Debug, Clone)]
pub struct InputQueue {
    events: VecDeque<KeyEvent>,
    capacity: usize,
    dropped: u64,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: KeyEvent) -> Result<(), InputError> {
        if self.events.len() >= self.capacity {
            self.dropped += 1;
            tracing::warn!(?event, capacity = self.capacity, "input queue full, dropping event");
            return Err(InputError::QueueFull {
                event,
                capacity: self.capacity,
            });
        }
        self.events.push_back(event);
        Ok(())
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
