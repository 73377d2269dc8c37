//! REPL session management

use std::sync::Arc;

use chrono::Local;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use settingstore::KvStore;
use tracing::{debug, warn};

use super::ShellCommand;
use crate::config::Config;
use crate::domain::{SlotId, SlotState, TaskId};
use crate::enhance::Enhancer;
use crate::llm::{self, LlmClient};
use crate::planner::Planner;
use crate::settings::Settings;

/// Interactive planner session
pub struct ReplSession<S: KvStore> {
    config: Config,
    settings: Settings<S>,
    planner: Planner,
    enhancer: Enhancer,
    llm_override: Option<Arc<dyn LlmClient>>,
}

impl<S: KvStore> ReplSession<S> {
    /// Create a new session with an empty backlog
    pub fn new(config: Config, settings: Settings<S>) -> Self {
        let planner = Planner::new(config.planner.slots);
        let enhancer = Enhancer::from_config(&config.enhance);
        Self {
            config,
            settings,
            planner,
            enhancer,
            llm_override: None,
        }
    }

    /// Use `client` for AI Magic instead of building one from settings
    pub fn with_llm_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm_override = Some(client);
        self
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        self.render();

        // Create readline editor for proper line editing
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    match ShellCommand::parse(input) {
                        Ok(command) => match self.execute(command).await {
                            ShellResult::Continue => continue,
                            ShellResult::Quit => break,
                        },
                        Err(message) => {
                            println!("{} {}", "?".yellow(), message);
                            println!("Type {} for available commands", "help".yellow());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - just show new prompt
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D - exit
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Apply one command and print the result
    pub async fn execute(&mut self, command: ShellCommand) -> ShellResult {
        debug!(?command, "execute: called");
        let changed = match command {
            ShellCommand::Add(text) => self.planner.add_task(&text).is_some(),
            ShellCommand::Done(n) => self.with_task(n, |p, id| p.toggle_complete(id)),
            ShellCommand::Edit(n, text) => {
                let edited = self.with_task(n, |p, id| p.edit_task(id, &text));
                if !edited && text.trim().is_empty() {
                    println!("{}", "Task text cannot be empty; kept the previous text.".dimmed());
                }
                edited
            }
            ShellCommand::Remove(n) => self.with_task(n, |p, id| p.delete_task(id)),
            ShellCommand::Promote(n) => {
                let Some(id) = self.task_id(n) else {
                    return ShellResult::Continue;
                };
                match self.planner.promote(&id) {
                    Ok(_) => true,
                    Err(refusal) => {
                        println!("{} {}", "!".yellow(), refusal);
                        false
                    }
                }
            }
            ShellCommand::Demote(n) => self.with_task(n, |p, id| p.demote(id)),
            ShellCommand::Slot(n, text) => {
                let Some(id) = self.slot_id(n) else {
                    return ShellResult::Continue;
                };
                let linked = self.planner.slot(&id).is_some_and(|s| s.is_linked());
                if linked {
                    println!(
                        "{}",
                        "That slot shows a task; edit the task instead, or clear the slot first.".dimmed()
                    );
                    false
                } else {
                    self.planner.set_slot_text(&id, &text)
                }
            }
            ShellCommand::Clear(n) => match self.slot_id(n) {
                Some(id) => self.planner.clear_slot(&id),
                None => false,
            },
            ShellCommand::Move(from, to) => {
                let capacity = self.planner.slots().capacity();
                match (from.checked_sub(1), to.checked_sub(1)) {
                    (Some(from), Some(to)) if from < capacity && to < capacity => self.planner.reorder(from, to),
                    _ => {
                        println!("{} Slots are numbered 1-{}", "!".yellow(), capacity);
                        false
                    }
                }
            }
            ShellCommand::Up(n) => self.slot_id(n).is_some_and(|id| self.planner.move_up(&id)),
            ShellCommand::Down(n) => self.slot_id(n).is_some_and(|id| self.planner.move_down(&id)),
            ShellCommand::Magic => self.run_magic().await,
            ShellCommand::List => {
                self.render();
                false
            }
            ShellCommand::Help => {
                self.print_help();
                false
            }
            ShellCommand::Quit => return ShellResult::Quit,
        };

        if changed {
            self.render();
        }
        ShellResult::Continue
    }

    async fn run_magic(&mut self) -> bool {
        let request = self.settings.enhance_request(&self.config.llm);
        if let Err(blocked) = self.enhancer.admit(&self.planner, &request) {
            println!("{} {}", "!".yellow(), blocked);
            return false;
        }

        let client = match &self.llm_override {
            Some(client) => Arc::clone(client),
            None => match llm::create_client(request.provider, request.credential.as_deref(), &self.config.llm) {
                Ok(client) => client,
                Err(e) => {
                    warn!(error = %e, "Failed to create LLM client");
                    println!("{} {}", "Error:".red(), e);
                    return false;
                }
            },
        };

        let eligible = self.planner.backlog().eligible_for_enhancement().count();
        println!(
            "{}",
            format!(
                "✨ Refining {} task(s) with {}...",
                eligible,
                request.provider.display_name()
            )
            .bright_magenta()
        );

        match self.enhancer.run(&mut self.planner, &request, client).await {
            Ok(report) => {
                let mut summary = format!("Enhanced {} task(s)", report.enhanced);
                if report.failed > 0 {
                    summary.push_str(&format!(", {} left unchanged after errors", report.failed));
                }
                println!("{}", summary.green());
                if let Some(warning) = report.warning {
                    println!("{} {}", "!".yellow(), warning);
                }
                true
            }
            Err(blocked) => {
                println!("{} {}", "!".yellow(), blocked);
                false
            }
        }
    }

    fn task_id(&self, n: usize) -> Option<TaskId> {
        let id = n
            .checked_sub(1)
            .and_then(|i| self.planner.backlog().at(i))
            .map(|t| t.id.clone());
        if id.is_none() {
            println!("{} No task #{}", "!".yellow(), n);
        }
        id
    }

    fn slot_id(&self, n: usize) -> Option<SlotId> {
        let id = n
            .checked_sub(1)
            .and_then(|i| self.planner.slots().get(i))
            .map(|s| s.id.clone());
        if id.is_none() {
            println!("{} No slot #{}", "!".yellow(), n);
        }
        id
    }

    fn with_task(&mut self, n: usize, op: impl FnOnce(&mut Planner, &TaskId) -> bool) -> bool {
        match self.task_id(n) {
            Some(id) => op(&mut self.planner, &id),
            None => false,
        }
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "Timebox".bright_cyan().bold());
        println!("{}", Local::now().format("%A, %B %-d").to_string().dimmed());
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
    }

    /// Print the priorities and the backlog
    fn render(&self) {
        println!();
        println!("{}", "Top Priorities".bright_cyan().bold());
        for (i, slot) in self.planner.slots().iter().enumerate() {
            let label = format!("{:>2}.", i + 1);
            match slot.state() {
                SlotState::Empty => println!("  {} {}", label, "(empty)".dimmed()),
                SlotState::Manual => println!("  {} {}", label, slot.text),
                SlotState::Linked(_) => {
                    println!("  {} {} {}", label, slot.text.bright_white().bold(), "(task)".dimmed())
                }
            }
        }

        println!();
        println!("{}", "Brain Dump".bright_cyan().bold());
        if self.planner.backlog().is_empty() {
            println!("  {}", "No tasks yet. Add one with `add <text>`.".dimmed());
        }
        for (i, task) in self.planner.backlog().iter().enumerate() {
            let label = format!("{:>2}.", i + 1);
            let check = if task.completed {
                "[x]".green()
            } else {
                "[ ]".normal()
            };
            let text = if task.completed {
                task.text.dimmed().strikethrough()
            } else {
                task.text.normal()
            };
            let mut marks = String::new();
            if task.is_priority {
                marks.push_str(&format!(" {}", "★".yellow()));
            }
            if task.ai_enhanced {
                marks.push_str(&format!(" {}", "AI".magenta()));
            }
            println!("  {} {} {}{}", label, check, text, marks);
        }

        let request = self.settings.enhance_request(&self.config.llm);
        match self.enhancer.admit(&self.planner, &request) {
            Ok(()) => {
                let eligible = self.planner.backlog().eligible_for_enhancement().count();
                println!(
                    "  {}",
                    format!("{} task(s) ready for AI Magic (`magic`)", eligible).dimmed()
                );
            }
            Err(blocked) if !self.planner.backlog().is_empty() => {
                println!("  {}", blocked.to_string().dimmed());
            }
            Err(_) => {}
        }
        println!();
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Brain Dump:".bright_cyan());
        println!("  {:22} Add a task", "add <text>".yellow());
        println!("  {:22} Toggle completed", "done <task#>".yellow());
        println!("  {:22} Replace a task's text", "edit <task#> <text>".yellow());
        println!("  {:22} Delete a task", "rm <task#>".yellow());
        println!("  {:22} Refine open tasks with AI", "magic".yellow());
        println!();
        println!("{}", "Top Priorities:".bright_cyan());
        println!("  {:22} Send a task to the first empty slot", "promote <task#>".yellow());
        println!("  {:22} Take a task off the priorities", "demote <task#>".yellow());
        println!("  {:22} Type into an unlinked slot", "slot <slot#> [text]".yellow());
        println!("  {:22} Empty a slot", "clear <slot#>".yellow());
        println!("  {:22} Move a slot to a new position", "mv <from> <to>".yellow());
        println!("  {:22} Nudge a slot up or down", "up|down <slot#>".yellow());
        println!();
        println!("  {:22} Show everything", "list".yellow());
        println!("  {:22} Show this help", "help".yellow());
        println!("  {:22} Exit", "quit".yellow());
        println!();
    }
}

/// Result of handling a shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellResult {
    Continue,
    Quit,
}
