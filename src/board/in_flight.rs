//! Tracks which entities have a request in flight
//!
//! At most one request per entity can be pending. Each request gets a generation number, and a response is only
//! applied if its generation is still the pending one: cancelled requests get their responses ignored.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::error::BoardError;
use crate::task::TaskId;

/// The entity a request mutates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Task(TaskId),
    /// The "new task" form. There is only one, hence at most one creation at a time
    NewTask,
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Slot::Task(id) => write!(f, "task {}", id),
            Slot::NewTask => write!(f, "the new task form"),
        }
    }
}

/// What a pending request is about to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Toggle { completed: bool },
    Edit,
    Create,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    generation: u64,
    request: Request,
}

#[derive(Debug, Default)]
pub struct InFlight {
    next_generation: u64,
    pending: HashMap<Slot, Pending>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `slot`, and return its generation
    pub fn begin(&mut self, slot: Slot, request: Request) -> Result<u64, BoardError> {
        if self.pending.contains_key(&slot) {
            return Err(BoardError::AlreadyInFlight(slot.to_string()));
        }
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending.insert(slot, Pending { generation, request });
        log::debug!("Request #{} for {} is now in flight", generation, slot);
        Ok(generation)
    }

    /// Release the slot if `generation` is still the pending request.
    ///
    /// Returns `false` for a stale response, which must then be ignored.
    pub fn finish(&mut self, slot: Slot, generation: u64) -> bool {
        match self.pending.get(&slot) {
            Some(pending) if pending.generation == generation => {
                self.pending.remove(&slot);
                true
            },
            _ => false,
        }
    }

    /// Forget the pending request of a slot. Returns whether there was one
    pub fn cancel(&mut self, slot: Slot) -> bool {
        self.pending.remove(&slot).is_some()
    }

    pub fn is_pending(&self, slot: Slot) -> bool {
        self.pending.contains_key(&slot)
    }

    pub fn request(&self, slot: Slot) -> Option<Request> {
        self.pending.get(&slot).map(|p| p.request)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
