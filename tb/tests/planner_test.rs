//! Integration tests for the planner and AI Magic
//!
//! These drive the public API end to end: task/slot cascades, slot
//! identity under reorder, and batch enhancement against scripted clients.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use proptest::prelude::*;
use timebox::{
    CompletionRequest, CompletionResponse, EnhanceBlocked, EnhanceRequest, Enhancer, LlmClient, LlmError, Planner,
    PromptTemplate, Provider, Refusal, SlotId, TaskId,
};

// =============================================================================
// Scripted client
// =============================================================================

/// Prefixes every task with a pencil, failing any task containing `fail_on`
struct ScriptedClient {
    fail_on: Option<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(fail_on: Option<&'static str>) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let task = request
            .user_prompt
            .strip_prefix("Refine: ")
            .unwrap_or(&request.user_prompt)
            .to_string();
        if let Some(needle) = self.fail_on
            && task.contains(needle)
        {
            return Err(LlmError::ApiError {
                status: 500,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(CompletionResponse::text(format!("✏️ {}", task)))
    }
}

fn magic_request() -> EnhanceRequest {
    EnhanceRequest {
        enabled: true,
        provider: Provider::Gemini,
        credential: Some("test-key".to_string()),
        prompt: PromptTemplate::new("Refine: {TASK_TEXT}"),
    }
}

// =============================================================================
// Synchronization scenarios
// =============================================================================

#[test]
fn test_promote_edit_complete_scenario() {
    let mut planner = Planner::new(3);
    let t1 = planner.add_task("buy milk").unwrap();

    planner.promote(&t1).unwrap();
    let slot = planner.slots().get(0).unwrap();
    assert_eq!(slot.text, "buy milk");
    assert_eq!(slot.source_task_id.as_ref(), Some(&t1));
    assert!(planner.task(&t1).unwrap().is_priority);

    planner.edit_task(&t1, "buy oat milk");
    assert_eq!(planner.slots().get(0).unwrap().text, "buy oat milk");

    planner.toggle_complete(&t1);
    let slot = planner.slots().get(0).unwrap();
    assert_eq!(slot.text, "");
    assert_eq!(slot.source_task_id, None);
    let task = planner.task(&t1).unwrap();
    assert!(!task.is_priority);
    assert!(task.completed);
}

#[test]
fn test_capacity_bound() {
    let mut planner = Planner::new(3);
    let ids: Vec<TaskId> = (0..4).map(|i| planner.add_task(&format!("task {}", i)).unwrap()).collect();

    for id in &ids[..3] {
        planner.promote(id).unwrap();
    }
    assert!(planner.is_full());
    assert_eq!(planner.promote(&ids[3]), Err(Refusal::SlotsFull { capacity: 3 }));
    assert!(planner.is_full());
    assert!(!planner.task(&ids[3]).unwrap().is_priority);
}

#[test]
fn test_delete_cascade() {
    let mut planner = Planner::new(3);
    let id = planner.add_task("file taxes").unwrap();
    let slot_id = planner.promote(&id).unwrap();

    planner.delete_task(&id);
    let slot = planner.slot(&slot_id).unwrap();
    assert_eq!(slot.text, "");
    assert_eq!(slot.source_task_id, None);
}

#[test]
fn test_reorder_preserves_slot_identity() {
    let mut planner = Planner::new(3);
    let original = planner.slots().get(0).unwrap().id.clone();

    assert!(planner.reorder(0, 2));
    assert_eq!(planner.slots().get(2).unwrap().id, original);
    assert!(planner.reorder(2, 0));
    assert_eq!(planner.slots().get(0).unwrap().id, original);
    assert_eq!(original, SlotId::for_index(0));
}

// =============================================================================
// AI Magic
// =============================================================================

#[tokio::test]
async fn test_enhancement_is_idempotent() {
    let enhancer = Enhancer::default();
    let mut planner = Planner::new(3);
    let a = planner.add_task("email landlord").unwrap();
    let b = planner.add_task("water plants").unwrap();
    let client = Arc::new(ScriptedClient::new(None));

    let report = enhancer
        .run(&mut planner, &magic_request(), client.clone())
        .await
        .unwrap();
    assert_eq!(report.enhanced, 2);

    let after_first: Vec<String> = planner.tasks().iter().map(|t| t.text.clone()).collect();
    let second = enhancer.run(&mut planner, &magic_request(), client.clone()).await;

    assert_eq!(second, Err(EnhanceBlocked::NothingEligible));
    assert_eq!(client.calls(), 2);
    let after_second: Vec<String> = planner.tasks().iter().map(|t| t.text.clone()).collect();
    assert_eq!(after_first, after_second);
    assert_eq!(planner.task(&a).unwrap().text, "✏️ email landlord");
    assert!(planner.task(&b).unwrap().ai_enhanced);
}

#[tokio::test]
async fn test_partial_failure_isolation() {
    let enhancer = Enhancer::default();
    let mut planner = Planner::new(3);
    let ok1 = planner.add_task("pay rent").unwrap();
    let bad = planner.add_task("renew passport").unwrap();
    let ok2 = planner.add_task("book dentist").unwrap();
    let client = Arc::new(ScriptedClient::new(Some("passport")));

    let report = enhancer.run(&mut planner, &magic_request(), client).await.unwrap();
    assert_eq!((report.enhanced, report.failed), (2, 1));

    for id in [&ok1, &ok2] {
        let task = planner.task(id).unwrap();
        assert!(task.ai_enhanced);
        assert!(task.text.starts_with("✏️ "));
    }
    let task = planner.task(&bad).unwrap();
    assert_eq!(task.text, "renew passport");
    assert!(!task.ai_enhanced);
}

#[tokio::test]
async fn test_enhancement_updates_linked_slot() {
    let enhancer = Enhancer::default();
    let mut planner = Planner::new(3);
    let id = planner.add_task("call mom").unwrap();
    let slot_id = planner.promote(&id).unwrap();

    enhancer
        .run(&mut planner, &magic_request(), Arc::new(ScriptedClient::new(None)))
        .await
        .unwrap();

    assert_eq!(planner.slot(&slot_id).unwrap().text, "✏️ call mom");
    planner.check_invariants().unwrap();
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Add,
    Promote(usize),
    Demote(usize),
    Delete(usize),
    Toggle(usize),
    Edit(usize),
    ClearSlot(usize),
    SlotText(usize),
    Reorder(usize, usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Add),
        (0usize..8).prop_map(Op::Promote),
        (0usize..8).prop_map(Op::Demote),
        (0usize..8).prop_map(Op::Delete),
        (0usize..8).prop_map(Op::Toggle),
        (0usize..8).prop_map(Op::Edit),
        (0usize..4).prop_map(Op::ClearSlot),
        (0usize..4).prop_map(Op::SlotText),
        (0usize..4, 0usize..4).prop_map(|(a, b)| Op::Reorder(a, b)),
    ]
}

fn task_at(planner: &Planner, index: usize) -> Option<TaskId> {
    planner.tasks().get(index).map(|t| t.id.clone())
}

fn slot_at(planner: &Planner, index: usize) -> Option<SlotId> {
    planner.slots().get(index).map(|s| s.id.clone())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn priority_flag_mirrors_slot_links(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut planner = Planner::new(3);
        let mut counter = 0;

        for op in ops {
            match op {
                Op::Add => {
                    counter += 1;
                    planner.add_task(&format!("task {}", counter));
                }
                Op::Promote(i) => {
                    if let Some(id) = task_at(&planner, i) {
                        let _ = planner.promote(&id);
                    }
                }
                Op::Demote(i) => {
                    if let Some(id) = task_at(&planner, i) {
                        planner.demote(&id);
                    }
                }
                Op::Delete(i) => {
                    if let Some(id) = task_at(&planner, i) {
                        planner.delete_task(&id);
                    }
                }
                Op::Toggle(i) => {
                    if let Some(id) = task_at(&planner, i) {
                        planner.toggle_complete(&id);
                    }
                }
                Op::Edit(i) => {
                    if let Some(id) = task_at(&planner, i) {
                        counter += 1;
                        planner.edit_task(&id, &format!("edited {}", counter));
                    }
                }
                Op::ClearSlot(i) => {
                    if let Some(id) = slot_at(&planner, i) {
                        planner.clear_slot(&id);
                    }
                }
                Op::SlotText(i) => {
                    if let Some(id) = slot_at(&planner, i) {
                        planner.set_slot_text(&id, "typed");
                    }
                }
                Op::Reorder(from, to) => {
                    planner.reorder(from, to);
                }
            }

            for task in planner.tasks() {
                let linked = planner.slots().iter().any(|s| s.is_linked_to(&task.id));
                prop_assert_eq!(task.is_priority, linked);
            }
            prop_assert!(planner.check_invariants().is_ok(), "{:?}", planner.check_invariants());
        }
    }
}
