//! Typed game events
//!
//! Requests (from timers or the frontend) are queued and handled at the start
//! of the next running tick. Outbound events describe what happened during a
//! tick so audio/menus can react without polling state.

use std::collections::VecDeque;

/// Something the world is asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameRequest {
    /// Spawn one demon on the off-screen ring
    SpawnDemon,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A demon's health reached zero and it was removed
    DemonKilled { id: u32 },
    /// The player took a hit
    PlayerHit { health: i32 },
    /// The player died; the session has ended
    PlayerDied { score: u64 },
    /// A new obstacle was placed ahead of the scroll direction
    ObstacleSpawned { id: u32 },
}

/// FIFO of events or requests
#[derive(Debug, Clone)]
pub struct EventQueue<E = GameEvent> {
    events: VecDeque<E>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: E) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<E> {
        self.events.pop_front()
    }

    /// Take every queued item in arrival order
    pub fn drain(&mut self) -> impl Iterator<Item = E> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Frame-counted periodic timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnTimer {
    pub interval_ticks: u32,
    elapsed: u32,
}

impl SpawnTimer {
    pub fn new(interval_ticks: u32) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            elapsed: 0,
        }
    }

    /// Advance one tick; true when the interval has elapsed
    pub fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval_ticks {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
    }
}
