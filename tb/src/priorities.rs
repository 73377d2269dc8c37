//! Fixed-capacity top-priorities list
//!
//! Owns slot order and slot identity. Every reordering moves whole
//! `PrioritySlot` values, never just their contents.

use tracing::debug;

use crate::domain::{PrioritySlot, SlotId, TaskId};

/// Reference capacity of the list
pub const DEFAULT_SLOT_COUNT: usize = 3;

/// Ordered, fixed-length sequence of priority slots
#[derive(Debug, Clone)]
pub struct PrioritySlots {
    slots: Vec<PrioritySlot>,
}

impl Default for PrioritySlots {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}

impl PrioritySlots {
    /// Build `capacity` empty slots with IDs `tp-1 .. tp-N`
    pub fn new(capacity: usize) -> Self {
        debug!(%capacity, "PrioritySlots::new: called");
        Self {
            slots: (0..capacity).map(|i| PrioritySlot::new(SlotId::for_index(i))).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&PrioritySlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrioritySlot> {
        self.slots.iter()
    }

    pub fn as_slice(&self) -> &[PrioritySlot] {
        &self.slots
    }

    /// Current position of a slot
    pub fn position_of(&self, slot_id: &SlotId) -> Option<usize> {
        self.slots.iter().position(|s| &s.id == slot_id)
    }

    pub fn by_id(&self, slot_id: &SlotId) -> Option<&PrioritySlot> {
        self.slots.iter().find(|s| &s.id == slot_id)
    }

    pub(crate) fn by_id_mut(&mut self, slot_id: &SlotId) -> Option<&mut PrioritySlot> {
        self.slots.iter_mut().find(|s| &s.id == slot_id)
    }

    /// Position of the first slot that is empty (no text, no source task)
    pub fn first_empty_index(&self) -> Option<usize> {
        self.slots.iter().position(|s| s.is_empty())
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut PrioritySlot> {
        self.slots.get_mut(index)
    }

    /// The slot linked to a task, if any
    pub fn find_linked(&self, task_id: &TaskId) -> Option<&PrioritySlot> {
        self.slots.iter().find(|s| s.is_linked_to(task_id))
    }

    pub(crate) fn find_linked_mut(&mut self, task_id: &TaskId) -> Option<&mut PrioritySlot> {
        self.slots.iter_mut().find(|s| s.is_linked_to(task_id))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PrioritySlot> {
        self.slots.iter_mut()
    }

    /// True when no slot is empty
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }

    /// Move the slot at `from` to `to`, shifting the slots in between
    ///
    /// Out-of-range indices and `from == to` leave the list untouched.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        debug!(%from, %to, "reorder: called");
        let len = self.slots.len();
        if from == to || from >= len || to >= len {
            debug!("reorder: no-op");
            return false;
        }
        let slot = self.slots.remove(from);
        self.slots.insert(to, slot);
        true
    }

    /// Swap a slot with its upper neighbour; no-op at the top
    pub fn move_up(&mut self, slot_id: &SlotId) -> bool {
        match self.position_of(slot_id) {
            Some(index) if index > 0 => {
                self.slots.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap a slot with its lower neighbour; no-op at the bottom
    pub fn move_down(&mut self, slot_id: &SlotId) -> bool {
        match self.position_of(slot_id) {
            Some(index) if index + 1 < self.slots.len() => {
                self.slots.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }
}
