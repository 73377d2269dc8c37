//! Enhancement pipeline: admission, fan-out, join, single commit

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::prompt::{PromptTemplate, build_request};
use crate::config::EnhanceConfig;
use crate::domain::Task;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Provider};
use crate::planner::Planner;

/// Inputs for one enhancement run, read from settings at trigger time
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceRequest {
    pub enabled: bool,
    pub provider: Provider,
    pub credential: Option<String>,
    pub prompt: PromptTemplate,
}

impl EnhanceRequest {
    fn has_credential(&self) -> bool {
        self.credential.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Why a run was not started; nothing was sent and no state changed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnhanceBlocked {
    #[error("AI Magic is already running.")]
    Busy,

    #[error("AI features are disabled in settings.")]
    Disabled,

    #[error("{} API Key not set in settings. Please add it to use AI Magic.", .0.display_name())]
    MissingCredential(Provider),

    #[error("Add at least one task to use AI Magic.")]
    NoTasks,

    #[error("All eligible tasks have been enhanced by AI.")]
    NothingEligible,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhanceReport {
    /// Tasks whose refinement call succeeded
    pub enhanced: usize,
    /// Eligible tasks left unchanged because their call failed
    pub failed: usize,
    /// Tasks not sent (completed or already enhanced)
    pub skipped: usize,
    /// User-facing notice when the batch hit an unexpected failure
    pub warning: Option<String>,
}

/// Releases the busy flag when dropped
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        debug!("BusyGuard::drop: released");
    }
}

enum CallOutcome {
    Refined(String),
    Failed(LlmError),
    Panicked,
}

/// Runs AI Magic batches; at most one at a time per instance
#[derive(Debug)]
pub struct Enhancer {
    busy: AtomicBool,
    call_timeout: Duration,
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::from_config(&EnhanceConfig::default())
    }
}

impl Enhancer {
    pub fn new(call_timeout: Duration) -> Self {
        Self {
            busy: AtomicBool::new(false),
            call_timeout,
        }
    }

    pub fn from_config(config: &EnhanceConfig) -> Self {
        Self::new(Duration::from_millis(config.call_timeout_ms))
    }

    /// Whether a run is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Check whether a run would start, in the order the user sees the reasons
    pub fn admit(&self, planner: &Planner, request: &EnhanceRequest) -> Result<(), EnhanceBlocked> {
        debug!(provider = %request.provider, "admit: called");
        if self.is_busy() {
            return Err(EnhanceBlocked::Busy);
        }
        if !request.enabled {
            return Err(EnhanceBlocked::Disabled);
        }
        if !request.has_credential() {
            return Err(EnhanceBlocked::MissingCredential(request.provider));
        }
        if planner.backlog().is_empty() {
            return Err(EnhanceBlocked::NoTasks);
        }
        if !planner.backlog().has_eligible() {
            return Err(EnhanceBlocked::NothingEligible);
        }
        Ok(())
    }

    /// Refine every eligible task and commit the batch in one step
    ///
    /// Calls run concurrently against a snapshot of the backlog; the commit
    /// happens only after every call has settled. A failed call leaves its
    /// task untouched and still eligible for the next run.
    pub async fn run(
        &self,
        planner: &mut Planner,
        request: &EnhanceRequest,
        client: Arc<dyn LlmClient>,
    ) -> Result<EnhanceReport, EnhanceBlocked> {
        self.admit(planner, request)?;
        let _guard = BusyGuard::acquire(&self.busy).ok_or(EnhanceBlocked::Busy)?;

        let snapshot: Vec<Task> = planner.tasks().to_vec();
        let eligible: Vec<(usize, CallInput)> = snapshot
            .iter()
            .enumerate()
            .filter(|(_, task)| task.is_eligible_for_enhancement())
            .map(|(idx, task)| {
                let input = CallInput {
                    task_id: task.id.to_string(),
                    request: build_request(request.provider, &request.prompt, &task.text),
                };
                (idx, input)
            })
            .collect();
        let skipped = snapshot.len() - eligible.len();
        info!(
            provider = %request.provider,
            eligible = eligible.len(),
            skipped,
            "Starting AI Magic"
        );

        let call_timeout = self.call_timeout;
        let calls = eligible.into_iter().map(|(idx, input)| {
            let client = Arc::clone(&client);
            async move {
                let outcome = call_one(client, input, call_timeout).await;
                (idx, outcome)
            }
        });
        let outcomes = join_all(calls).await;

        let mut tasks = snapshot;
        let mut report = EnhanceReport {
            skipped,
            ..Default::default()
        };
        let mut systemic = false;

        for (idx, outcome) in outcomes {
            let Some(task) = tasks.get_mut(idx) else {
                continue;
            };
            match outcome {
                CallOutcome::Refined(text) => {
                    if !text.is_empty() {
                        task.text = text;
                    }
                    task.ai_enhanced = true;
                    report.enhanced += 1;
                }
                CallOutcome::Failed(e) => {
                    warn!(task = %task.id, provider = %request.provider, error = %e, "Refinement failed, keeping task");
                    report.failed += 1;
                }
                CallOutcome::Panicked => {
                    error!(task = %task.id, provider = %request.provider, "Refinement call panicked, keeping task");
                    report.failed += 1;
                    systemic = true;
                }
            }
        }

        if systemic {
            report.warning = Some(format!(
                "An error occurred while using {} AI Magic. Some tasks may not have been processed. \
                 Please check the log for details or try again.",
                request.provider.display_name()
            ));
        }

        planner.replace_all(tasks);
        info!(
            enhanced = report.enhanced,
            failed = report.failed,
            skipped = report.skipped,
            "AI Magic complete"
        );
        Ok(report)
    }
}

struct CallInput {
    task_id: String,
    request: CompletionRequest,
}

async fn call_one(client: Arc<dyn LlmClient>, input: CallInput, call_timeout: Duration) -> CallOutcome {
    debug!(task = %input.task_id, "call_one: called");
    let call = tokio::time::timeout(call_timeout, client.complete(input.request));

    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(Ok(response))) => {
            let text = response.content.map(|c| c.trim().to_string()).unwrap_or_default();
            debug!(task = %input.task_id, empty = text.is_empty(), "call_one: refined");
            CallOutcome::Refined(text)
        }
        Ok(Ok(Err(e))) => CallOutcome::Failed(e),
        Ok(Err(_)) => CallOutcome::Failed(LlmError::Timeout(call_timeout)),
        Err(_) => CallOutcome::Panicked,
    }
}
