//! Planner core: the cascade rules between tasks and slots

use tracing::{debug, info, warn};

use super::Refusal;
use crate::backlog::Backlog;
use crate::domain::{PrioritySlot, SlotId, Task, TaskId};
use crate::priorities::PrioritySlots;

/// Single writer of both the backlog and the priority slots
#[derive(Debug, Clone, Default)]
pub struct Planner {
    backlog: Backlog,
    slots: PrioritySlots,
}

impl Planner {
    /// Planner with `slot_count` empty priority slots
    pub fn new(slot_count: usize) -> Self {
        Self {
            backlog: Backlog::new(),
            slots: PrioritySlots::new(slot_count),
        }
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    pub fn slots(&self) -> &PrioritySlots {
        &self.slots
    }

    pub fn tasks(&self) -> &[Task] {
        self.backlog.as_slice()
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.backlog.get(id)
    }

    pub fn slot(&self, id: &SlotId) -> Option<&PrioritySlot> {
        self.slots.by_id(id)
    }

    // === Backlog operations ===

    /// Add a task to the front of the backlog; blank text is ignored
    pub fn add_task(&mut self, text: &str) -> Option<TaskId> {
        let id = self.backlog.add(text)?;
        info!(%id, "Added task");
        Some(id)
    }

    /// Flip a task's completed flag
    ///
    /// Completing a linked task demotes it first, so a completed task is
    /// never a current priority.
    pub fn toggle_complete(&mut self, id: &TaskId) -> bool {
        debug!(%id, "toggle_complete: called");
        let Some(task) = self.backlog.get(id) else {
            debug!(%id, "toggle_complete: unknown task");
            return false;
        };

        let completing = !task.completed;
        if completing && task.is_priority {
            debug!(%id, "toggle_complete: demoting before completion");
            self.unlink(id);
        }

        if let Some(task) = self.backlog.get_mut(id) {
            task.completed = completing;
        }
        info!(%id, completed = completing, "Toggled task");
        true
    }

    /// Replace a task's text and mirror it into the linked slot
    ///
    /// Blank input is rejected and the prior text kept.
    pub fn edit_task(&mut self, id: &TaskId, new_text: &str) -> bool {
        debug!(%id, "edit_task: called");
        let text = new_text.trim();
        if text.is_empty() {
            debug!(%id, "edit_task: blank text, keeping previous");
            return false;
        }

        let Some(task) = self.backlog.get_mut(id) else {
            debug!(%id, "edit_task: unknown task");
            return false;
        };
        task.text = text.to_string();
        let linked = task.is_priority;

        if linked && let Some(slot) = self.slots.find_linked_mut(id) {
            debug!(slot = %slot.id, "edit_task: syncing linked slot");
            slot.text = text.to_string();
        }
        info!(%id, "Edited task");
        true
    }

    /// Delete a task and clear any slot that referenced it
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        debug!(%id, "delete_task: called");
        let Some(task) = self.backlog.remove(id) else {
            debug!(%id, "delete_task: unknown task");
            return false;
        };

        if let Some(slot) = self.slots.find_linked_mut(id) {
            debug!(slot = %slot.id, "delete_task: clearing linked slot");
            slot.clear();
        } else if task.is_priority {
            warn!(%id, "delete_task: task flagged as priority but no slot referenced it");
        }
        info!(%id, "Deleted task");
        true
    }

    /// Swap in a whole new task list (the enhancement commit point)
    ///
    /// Afterwards the relation is reconciled against the slots: slots whose
    /// source task is gone or completed are cleared, every `is_priority`
    /// flag is recomputed, and linked slots take their task's current text.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        debug!(count = tasks.len(), "replace_all: called");
        self.backlog.replace_all(tasks);
        self.reconcile();
    }

    fn reconcile(&mut self) {
        for slot in self.slots.iter_mut() {
            let Some(source) = slot.source_task_id.clone() else {
                continue;
            };
            match self.backlog.get(&source) {
                Some(task) if !task.completed => {
                    if slot.text != task.text {
                        debug!(slot = %slot.id, task = %source, "reconcile: syncing slot text");
                        slot.text = task.text.clone();
                    }
                }
                Some(_) => {
                    debug!(slot = %slot.id, task = %source, "reconcile: source completed, clearing slot");
                    slot.clear();
                }
                None => {
                    debug!(slot = %slot.id, task = %source, "reconcile: source missing, clearing slot");
                    slot.clear();
                }
            }
        }

        let slots = &self.slots;
        for task in self.backlog.iter_mut() {
            task.is_priority = slots.find_linked(&task.id).is_some();
        }
    }

    // === Slot operations ===

    /// Type text directly into an empty or manual slot
    ///
    /// Linked slots only ever show their task's text, so a manual edit on
    /// one is ignored. Blank text turns a manual slot back into an empty one.
    pub fn set_slot_text(&mut self, slot_id: &SlotId, value: &str) -> bool {
        debug!(%slot_id, "set_slot_text: called");
        let Some(slot) = self.slots.by_id_mut(slot_id) else {
            debug!(%slot_id, "set_slot_text: unknown slot");
            return false;
        };
        if slot.is_linked() {
            debug!(%slot_id, "set_slot_text: slot is linked, ignoring manual edit");
            return false;
        }

        let text = value.trim();
        if slot.text == text {
            return false;
        }
        slot.text = text.to_string();
        true
    }

    /// Empty a slot, releasing its source task if it had one
    pub fn clear_slot(&mut self, slot_id: &SlotId) -> bool {
        debug!(%slot_id, "clear_slot: called");
        let Some(slot) = self.slots.by_id_mut(slot_id) else {
            debug!(%slot_id, "clear_slot: unknown slot");
            return false;
        };
        if slot.is_empty() {
            return false;
        }

        if let Some(task_id) = slot.clear() {
            debug!(%slot_id, task = %task_id, "clear_slot: releasing source task");
            self.backlog.set_priority_flag(&task_id, false);
        }
        info!(%slot_id, "Cleared slot");
        true
    }

    /// Link a task into the first empty slot
    pub fn promote(&mut self, task_id: &TaskId) -> Result<SlotId, Refusal> {
        debug!(%task_id, "promote: called");
        if let Some(refusal) = self.promote_refusal(task_id) {
            debug!(%task_id, %refusal, "promote: refused");
            return Err(refusal);
        }

        let text = self
            .backlog
            .get(task_id)
            .map(|t| t.text.clone())
            .ok_or_else(|| Refusal::UnknownTask(task_id.clone()))?;
        let capacity = self.slots.capacity();
        let index = self
            .slots
            .first_empty_index()
            .ok_or(Refusal::SlotsFull { capacity })?;
        let slot = self.slots.get_mut(index).ok_or(Refusal::SlotsFull { capacity })?;

        slot.link(task_id.clone(), &text);
        let slot_id = slot.id.clone();
        self.backlog.set_priority_flag(task_id, true);

        info!(%task_id, %slot_id, "Promoted task");
        Ok(slot_id)
    }

    /// Unlink a task from its slot; no-op if it is not a priority
    pub fn demote(&mut self, task_id: &TaskId) -> bool {
        debug!(%task_id, "demote: called");
        let changed = self.unlink(task_id);
        if changed {
            info!(%task_id, "Demoted task");
        }
        changed
    }

    fn unlink(&mut self, task_id: &TaskId) -> bool {
        let cleared = match self.slots.find_linked_mut(task_id) {
            Some(slot) => {
                slot.clear();
                true
            }
            None => false,
        };
        let was_flagged = self.backlog.get(task_id).is_some_and(|t| t.is_priority);
        self.backlog.set_priority_flag(task_id, false);
        cleared || was_flagged
    }

    /// Drag-relocate the slot at `from` to `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.slots.reorder(from, to)
    }

    pub fn move_up(&mut self, slot_id: &SlotId) -> bool {
        self.slots.move_up(slot_id)
    }

    pub fn move_down(&mut self, slot_id: &SlotId) -> bool {
        self.slots.move_down(slot_id)
    }

    // === Queries ===

    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    /// Whether the promote action should be offered for a task
    pub fn can_promote(&self, task_id: &TaskId) -> bool {
        self.promote_refusal(task_id).is_none()
    }

    /// The reason a promotion would be refused, if any
    pub fn promote_refusal(&self, task_id: &TaskId) -> Option<Refusal> {
        let Some(task) = self.backlog.get(task_id) else {
            return Some(Refusal::UnknownTask(task_id.clone()));
        };
        if task.completed {
            Some(Refusal::TaskCompleted)
        } else if task.is_priority {
            Some(Refusal::AlreadyPriority)
        } else if self.slots.is_full() {
            Some(Refusal::SlotsFull {
                capacity: self.slots.capacity(),
            })
        } else {
            None
        }
    }

    /// Verify the task/slot relation
    ///
    /// Checks: a task is flagged iff exactly one slot links it, no two slots
    /// share a source, every link resolves to an existing task with equal
    /// text, and no completed task is flagged.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut seen: Vec<&TaskId> = Vec::new();
        for slot in self.slots.iter() {
            let Some(source) = &slot.source_task_id else {
                continue;
            };
            if seen.contains(&source) {
                return Err(format!("task {} is linked from more than one slot", source));
            }
            seen.push(source);

            let Some(task) = self.backlog.get(source) else {
                return Err(format!("slot {} references missing task {}", slot.id, source));
            };
            if slot.text != task.text {
                return Err(format!(
                    "slot {} text '{}' drifted from task text '{}'",
                    slot.id, slot.text, task.text
                ));
            }
        }

        for task in self.backlog.iter() {
            let linked = seen.contains(&&task.id);
            if task.is_priority != linked {
                return Err(format!(
                    "task {} has is_priority={} but linked={}",
                    task.id, task.is_priority, linked
                ));
            }
            if task.completed && task.is_priority {
                return Err(format!("completed task {} is still a priority", task.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SlotState;

    fn planner_with(texts: &[&str]) -> (Planner, Vec<TaskId>) {
        let mut planner = Planner::new(3);
        let ids = texts.iter().map(|t| planner.add_task(t).unwrap()).collect();
        (planner, ids)
    }

    #[test]
    fn test_scenario_promote_edit_complete() {
        let (mut planner, ids) = planner_with(&["buy milk"]);
        let t1 = &ids[0];

        let slot_id = planner.promote(t1).unwrap();
        assert_eq!(slot_id.as_str(), "tp-1");
        let slot = planner.slots().get(0).unwrap();
        assert_eq!(slot.text, "buy milk");
        assert_eq!(slot.source_task_id.as_ref(), Some(t1));
        assert!(planner.task(t1).unwrap().is_priority);

        assert!(planner.edit_task(t1, "buy oat milk"));
        assert_eq!(planner.slots().get(0).unwrap().text, "buy oat milk");

        assert!(planner.toggle_complete(t1));
        let slot = planner.slots().get(0).unwrap();
        assert!(slot.is_empty());
        let task = planner.task(t1).unwrap();
        assert!(!task.is_priority);
        assert!(task.completed);
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_capacity_bound() {
        let (mut planner, ids) = planner_with(&["a", "b", "c", "d"]);
        for id in &ids[..3] {
            planner.promote(id).unwrap();
        }
        assert!(planner.is_full());
        assert!(!planner.can_promote(&ids[3]));

        let before = planner.slots().as_slice().to_vec();
        assert_eq!(planner.promote(&ids[3]), Err(Refusal::SlotsFull { capacity: 3 }));
        assert_eq!(planner.slots().as_slice(), before.as_slice());
        assert!(!planner.task(&ids[3]).unwrap().is_priority);
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_manual_slot_counts_toward_full() {
        let (mut planner, ids) = planner_with(&["a"]);
        for i in 0..3 {
            planner.set_slot_text(&SlotId::for_index(i), "typed");
        }
        assert!(planner.is_full());
        assert!(matches!(planner.promote(&ids[0]), Err(Refusal::SlotsFull { .. })));
    }

    #[test]
    fn test_promote_skips_manual_slots() {
        let (mut planner, ids) = planner_with(&["a"]);
        planner.set_slot_text(&SlotId::for_index(0), "typed by hand");

        let slot_id = planner.promote(&ids[0]).unwrap();
        assert_eq!(slot_id, SlotId::for_index(1));
        assert_eq!(planner.slots().get(0).unwrap().state(), SlotState::Manual);
    }

    #[test]
    fn test_promote_refusals() {
        let (mut planner, ids) = planner_with(&["a", "b"]);
        planner.promote(&ids[0]).unwrap();
        assert_eq!(planner.promote(&ids[0]), Err(Refusal::AlreadyPriority));

        planner.toggle_complete(&ids[1]);
        assert_eq!(planner.promote(&ids[1]), Err(Refusal::TaskCompleted));

        let missing = TaskId::from("missing");
        assert_eq!(planner.promote(&missing), Err(Refusal::UnknownTask(missing.clone())));
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_cascade() {
        let (mut planner, ids) = planner_with(&["a", "b"]);
        planner.promote(&ids[1]).unwrap();

        assert!(planner.delete_task(&ids[1]));
        let slot = planner.slots().get(0).unwrap();
        assert_eq!(slot.text, "");
        assert_eq!(slot.source_task_id, None);
        assert!(planner.task(&ids[1]).is_none());
        assert!(!planner.delete_task(&ids[1]));
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_edit_blank_keeps_previous_text() {
        let (mut planner, ids) = planner_with(&["walk dog"]);
        planner.promote(&ids[0]).unwrap();

        assert!(!planner.edit_task(&ids[0], "   "));
        assert_eq!(planner.task(&ids[0]).unwrap().text, "walk dog");
        assert_eq!(planner.slots().get(0).unwrap().text, "walk dog");
    }

    #[test]
    fn test_edit_trims_text() {
        let (mut planner, ids) = planner_with(&["walk dog"]);
        assert!(planner.edit_task(&ids[0], "  walk the dog  "));
        assert_eq!(planner.task(&ids[0]).unwrap().text, "walk the dog");
    }

    #[test]
    fn test_uncomplete_does_not_repromote() {
        let (mut planner, ids) = planner_with(&["a"]);
        planner.promote(&ids[0]).unwrap();
        planner.toggle_complete(&ids[0]);
        planner.toggle_complete(&ids[0]);

        let task = planner.task(&ids[0]).unwrap();
        assert!(!task.completed);
        assert!(!task.is_priority);
        assert!(planner.slots().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn test_clear_slot_releases_task() {
        let (mut planner, ids) = planner_with(&["a"]);
        let slot_id = planner.promote(&ids[0]).unwrap();

        assert!(planner.clear_slot(&slot_id));
        assert!(!planner.task(&ids[0]).unwrap().is_priority);
        assert!(!planner.clear_slot(&slot_id));
        assert!(!planner.clear_slot(&SlotId::from("tp-42")));
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_demote_without_slot_is_noop() {
        let (mut planner, ids) = planner_with(&["a"]);
        assert!(!planner.demote(&ids[0]));
        assert!(!planner.demote(&TaskId::from("missing")));

        planner.promote(&ids[0]).unwrap();
        assert!(planner.demote(&ids[0]));
        assert!(planner.slots().iter().all(|s| s.is_empty()));
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_manual_edit_on_linked_slot_is_ignored() {
        let (mut planner, ids) = planner_with(&["buy milk"]);
        let slot_id = planner.promote(&ids[0]).unwrap();

        assert!(!planner.set_slot_text(&slot_id, "something else"));
        let slot = planner.slot(&slot_id).unwrap();
        assert_eq!(slot.text, "buy milk");
        assert_eq!(slot.source_task_id.as_ref(), Some(&ids[0]));
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_manual_slot_cleared_by_blank_text() {
        let mut planner = Planner::new(3);
        let slot_id = SlotId::for_index(1);

        assert!(planner.set_slot_text(&slot_id, "call bank"));
        assert_eq!(planner.slot(&slot_id).unwrap().state(), SlotState::Manual);
        assert!(planner.set_slot_text(&slot_id, "  "));
        assert_eq!(planner.slot(&slot_id).unwrap().state(), SlotState::Empty);
    }

    #[test]
    fn test_reorder_keeps_links() {
        let (mut planner, ids) = planner_with(&["a", "b"]);
        planner.promote(&ids[0]).unwrap();
        planner.promote(&ids[1]).unwrap();

        assert!(planner.reorder(0, 2));
        assert!(planner.edit_task(&ids[0], "a2"));
        assert_eq!(planner.slots().get(2).unwrap().text, "a2");
        assert_eq!(planner.slots().get(2).unwrap().id.as_str(), "tp-1");
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_replace_all_syncs_enhanced_text() {
        let (mut planner, ids) = planner_with(&["by milk", "gym"]);
        planner.promote(&ids[0]).unwrap();

        let mut tasks = planner.tasks().to_vec();
        for task in tasks.iter_mut() {
            if task.id == ids[0] {
                task.text = "🥛 Buy milk".to_string();
                task.ai_enhanced = true;
            }
        }
        planner.replace_all(tasks);

        assert_eq!(planner.slots().get(0).unwrap().text, "🥛 Buy milk");
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_replace_all_clears_dangling_links() {
        let (mut planner, ids) = planner_with(&["a", "b"]);
        planner.promote(&ids[0]).unwrap();
        planner.promote(&ids[1]).unwrap();

        let kept: Vec<Task> = planner.tasks().iter().filter(|t| t.id != ids[0]).cloned().collect();
        planner.replace_all(kept);

        let linked: Vec<_> = planner.slots().iter().filter(|s| s.is_linked()).collect();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].source_task_id.as_ref(), Some(&ids[1]));
        planner.check_invariants().unwrap();
    }

    #[test]
    fn test_replace_all_recomputes_flags() {
        let (mut planner, _) = planner_with(&["a"]);
        let mut stray = Task::new("flagged but unlinked");
        stray.is_priority = true;
        let mut tasks = planner.tasks().to_vec();
        tasks.push(stray.clone());

        planner.replace_all(tasks);
        assert!(!planner.task(&stray.id).unwrap().is_priority);
        planner.check_invariants().unwrap();
    }
}
