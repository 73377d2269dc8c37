//! Shell command parsing

/// One line typed at the shell prompt
///
/// Task and slot numbers are 1-based positions as printed by `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add(String),
    Done(usize),
    Edit(usize, String),
    Remove(usize),
    Promote(usize),
    Demote(usize),
    Slot(usize, String),
    Clear(usize),
    Move(usize, usize),
    Up(usize),
    Down(usize),
    Magic,
    List,
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse an input line; a leading `/` is accepted and ignored
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        let input = input.strip_prefix('/').unwrap_or(input);
        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };

        match cmd.to_ascii_lowercase().as_str() {
            "add" | "a" => {
                if rest.is_empty() {
                    Err("Usage: add <text>".to_string())
                } else {
                    Ok(ShellCommand::Add(rest.to_string()))
                }
            }
            "done" | "x" => Ok(ShellCommand::Done(number(rest, "done <task#>")?)),
            "edit" | "e" => {
                let (n, text) = number_and_text(rest, "edit <task#> <text>")?;
                Ok(ShellCommand::Edit(n, text))
            }
            "rm" | "del" => Ok(ShellCommand::Remove(number(rest, "rm <task#>")?)),
            "promote" | "p" => Ok(ShellCommand::Promote(number(rest, "promote <task#>")?)),
            "demote" => Ok(ShellCommand::Demote(number(rest, "demote <task#>")?)),
            "slot" | "s" => {
                let (n, text) = number_and_text(rest, "slot <slot#> [text]")?;
                Ok(ShellCommand::Slot(n, text))
            }
            "clear" => Ok(ShellCommand::Clear(number(rest, "clear <slot#>")?)),
            "mv" | "move" => {
                let mut parts = rest.split_whitespace();
                let usage = "mv <from-slot#> <to-slot#>";
                let from = number(parts.next().unwrap_or(""), usage)?;
                let to = number(parts.next().unwrap_or(""), usage)?;
                Ok(ShellCommand::Move(from, to))
            }
            "up" => Ok(ShellCommand::Up(number(rest, "up <slot#>")?)),
            "down" => Ok(ShellCommand::Down(number(rest, "down <slot#>")?)),
            "magic" | "m" => Ok(ShellCommand::Magic),
            "list" | "ls" | "l" => Ok(ShellCommand::List),
            "help" | "h" | "?" => Ok(ShellCommand::Help),
            "quit" | "q" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

fn number(arg: &str, usage: &str) -> Result<usize, String> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Usage: {}", usage)),
    }
}

fn number_and_text(rest: &str, usage: &str) -> Result<(usize, String), String> {
    let (n, text) = match rest.split_once(char::is_whitespace) {
        Some((n, text)) => (n, text.trim()),
        None => (rest, ""),
    };
    Ok((number(n, usage)?, text.to_string()))
}
