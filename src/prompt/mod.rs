//! Interactive elicitation of a scenario's arguments.
//!
//! The session is strictly linear: flags, then choices, then values, then a
//! confirmation. Every read can observe an interrupt, which unwinds the whole
//! session as [`SessionOutcome::Interrupted`].
mod input;

pub use input::{stdin_keys, KeySource};

use crate::assemble::{assemble, render_command, AnswerEntry};
use crate::descriptor::{
    ArgumentDescriptor, ArgumentKind, DescriptorSet, LOGLEVEL_CHOICES, LOGLEVEL_DEFAULT,
};
use anyhow::{anyhow, Result};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use input::Key;
use std::io::Write;

const BANNER: &str = r"
     _             ____  _                        _ _
    / \    ____   / ___|| | ___   ___      ____ _| | | _____ _ __
   / _ \  |_  /___\___ \| |/ / | | \ \ /\ / / _` | | |/ / _ \ '__|
  / ___ \  / /_____|__) |   <| |_| |\ V  V / (_| | |   <  __/ |
 /_/   \_\/___|   |____/|_|\_\\__, | \_/\_/ \__,_|_|_|\_\___|_|
                              |___/
";

/// How an elicitation session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Operator confirmed; launch with this vector.
    Dispatch(Vec<String>),
    /// Operator declined the confirmation.
    Cancelled,
    /// Nothing was selected, so there was nothing to confirm.
    NoArguments,
    /// Ctrl-C or end of input at some prompt.
    Interrupted,
}

/// One operator, one terminal, one pass through the prompts.
pub struct Session<'a> {
    keys: &'a mut dyn KeySource,
    out: &'a mut dyn Write,
}

impl<'a> Session<'a> {
    pub fn new(keys: &'a mut dyn KeySource, out: &'a mut dyn Write) -> Self {
        Self { keys, out }
    }

    pub fn banner(&mut self) -> Result<()> {
        writeln!(self.out, "{BANNER}")?;
        writeln!(self.out, "=== Skywalker Recon CLI ===")?;
        Ok(())
    }

    /// Ask which scenario to run. `None` means the operator interrupted.
    pub fn select_scenario(&mut self, names: &[String]) -> Result<Option<String>> {
        let picked = self.select("Select a recon scenario:", names, None)?;
        Ok(picked.map(|index| names[index].clone()))
    }

    /// Drive the prompts for one scenario through to confirmation.
    pub fn run(&mut self, scenario: &str, set: &DescriptorSet) -> Result<SessionOutcome> {
        let Some(entries) = self.elicit(set)? else {
            return Ok(SessionOutcome::Interrupted);
        };
        if entries.is_empty() {
            writeln!(self.out, "\n[INFO] No arguments selected. Exiting.")?;
            return Ok(SessionOutcome::NoArguments);
        }

        let argv = assemble(&entries);
        let prompt = format!(
            "Execute {scenario} with arguments: {}?",
            render_command(&argv)
        );
        match self.confirm(&prompt)? {
            Some(true) => Ok(SessionOutcome::Dispatch(argv)),
            Some(false) => {
                writeln!(self.out, "\nExecution cancelled.")?;
                Ok(SessionOutcome::Cancelled)
            }
            None => Ok(SessionOutcome::Interrupted),
        }
    }

    /// Collect answers in partition order. `None` means the operator interrupted.
    pub fn elicit(&mut self, set: &DescriptorSet) -> Result<Option<Vec<AnswerEntry>>> {
        let mut entries = Vec::new();
        for descriptor in set.iter() {
            let answer = match &descriptor.kind {
                ArgumentKind::Flag => self.ask_flag(descriptor)?,
                ArgumentKind::Choice { choices } => self.ask_choice(descriptor, choices)?,
                ArgumentKind::Value => self.ask_value(descriptor)?,
            };
            match answer {
                Answer::Accepted(entry) => entries.push(entry),
                Answer::Skipped => {}
                Answer::Interrupted => return Ok(None),
            }
        }
        tracing::debug!(answers = entries.len(), "elicitation finished");
        Ok(Some(entries))
    }

    fn ask_flag(&mut self, descriptor: &ArgumentDescriptor) -> Result<Answer> {
        let prompt = format!("Do you want to set {}?", descriptor.name);
        Ok(match self.yes_no_key(&prompt)? {
            Some(true) => Answer::Accepted(AnswerEntry::flag(&descriptor.name)),
            Some(false) => Answer::Skipped,
            None => Answer::Interrupted,
        })
    }

    fn ask_choice(&mut self, descriptor: &ArgumentDescriptor, choices: &[String]) -> Result<Answer> {
        let prompt = format!("{} - {}", descriptor.name, descriptor.help);
        let default = descriptor
            .effective_default()
            .and_then(|value| choices.iter().position(|c| c == value));
        Ok(match self.select(&prompt, choices, default)? {
            Some(index) => Answer::Accepted(AnswerEntry::with_value(
                &descriptor.name,
                &choices[index],
            )),
            None => Answer::Interrupted,
        })
    }

    fn ask_value(&mut self, descriptor: &ArgumentDescriptor) -> Result<Answer> {
        if descriptor.is_loglevel() {
            let choices: Vec<String> = LOGLEVEL_CHOICES.iter().map(|c| c.to_string()).collect();
            let default = choices.iter().position(|c| c == LOGLEVEL_DEFAULT);
            let prompt = format!("{} - {}", descriptor.name, descriptor.help);
            return Ok(match self.select(&prompt, &choices, default)? {
                Some(index) => {
                    Answer::Accepted(AnswerEntry::with_value(&descriptor.name, &choices[index]))
                }
                None => Answer::Interrupted,
            });
        }

        let prompt = format!("Enter value for {} ({}):", descriptor.name, descriptor.help);
        let prefill = descriptor.effective_default().unwrap_or_default();
        Ok(match self.read_line(&prompt, prefill)? {
            Some(text) if text.is_empty() => Answer::Skipped,
            Some(text) => Answer::Accepted(AnswerEntry::with_value(&descriptor.name, text)),
            None => Answer::Interrupted,
        })
    }

    /// Instant y/n. Enter counts as no; anything else is ignored.
    fn yes_no_key(&mut self, prompt: &str) -> Result<Option<bool>> {
        write!(self.out, "{prompt} (Y/N) ")?;
        self.out.flush()?;
        loop {
            match self.keys.read_key()? {
                Key::Char(ch) if ch.eq_ignore_ascii_case(&'y') => {
                    writeln!(self.out, "Y")?;
                    return Ok(Some(true));
                }
                Key::Char(ch) if ch.eq_ignore_ascii_case(&'n') => {
                    writeln!(self.out, "N")?;
                    return Ok(Some(false));
                }
                Key::Enter => {
                    writeln!(self.out, "Skipping")?;
                    return Ok(Some(false));
                }
                Key::Interrupt => {
                    writeln!(self.out)?;
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Single-select list. Arrows move, a digit picks directly, Enter accepts.
    ///
    /// Without a `default` the cursor starts on the first option. That is only
    /// a cursor position; nothing is chosen until a key is pressed.
    fn select(
        &mut self,
        prompt: &str,
        options: &[String],
        default: Option<usize>,
    ) -> Result<Option<usize>> {
        if options.is_empty() {
            return Err(anyhow!("nothing to select for {prompt:?}"));
        }
        writeln!(self.out, "? {prompt}")?;
        for (idx, option) in options.iter().enumerate() {
            writeln!(self.out, "  {}) {option}", idx + 1)?;
        }

        let mut index = default.filter(|&idx| idx < options.len()).unwrap_or(0);
        loop {
            self.render_highlight(&options[index])?;
            match self.keys.read_key()? {
                Key::Up => index = index.checked_sub(1).unwrap_or(options.len() - 1),
                Key::Down => index = (index + 1) % options.len(),
                Key::Char(ch) => {
                    let picked = ch.to_digit(10).map(|d| d as usize);
                    if let Some(n) = picked.filter(|n| (1..=options.len()).contains(n)) {
                        index = n - 1;
                        self.render_highlight(&options[index])?;
                        writeln!(self.out)?;
                        return Ok(Some(index));
                    }
                }
                Key::Enter => {
                    writeln!(self.out)?;
                    return Ok(Some(index));
                }
                Key::Interrupt => {
                    writeln!(self.out)?;
                    return Ok(None);
                }
                Key::Backspace | Key::Other => {}
            }
        }
    }

    fn render_highlight(&mut self, option: &str) -> Result<()> {
        write!(self.out, "\r")?;
        self.out.queue(Clear(ClearType::CurrentLine))?;
        write!(self.out, "» {option}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Line-based yes/no; an empty answer means yes.
    fn confirm(&mut self, prompt: &str) -> Result<Option<bool>> {
        let question = format!("{prompt} (Y/n)");
        loop {
            let Some(line) = self.read_line(&question, "")? else {
                return Ok(None);
            };
            match line.trim().to_ascii_lowercase().as_str() {
                "" | "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => writeln!(self.out, "Please answer y or n.")?,
            }
        }
    }

    /// Read one line of text, echoing as it is typed.
    ///
    /// `prefill` starts out in the buffer, so Enter accepts it and Backspace
    /// can erase it.
    fn read_line(&mut self, prompt: &str, prefill: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt} {prefill}")?;
        self.out.flush()?;
        let mut line = prefill.to_string();
        loop {
            match self.keys.read_key()? {
                Key::Char(ch) => {
                    line.push(ch);
                    write!(self.out, "{ch}")?;
                }
                Key::Backspace => {
                    if line.pop().is_some() {
                        write!(self.out, "\u{8} \u{8}")?;
                    }
                }
                Key::Enter => {
                    writeln!(self.out)?;
                    return Ok(Some(line));
                }
                Key::Interrupt => {
                    writeln!(self.out)?;
                    return Ok(None);
                }
                Key::Up | Key::Down | Key::Other => continue,
            }
            self.out.flush()?;
        }
    }
}

enum Answer {
    Accepted(AnswerEntry),
    Skipped,
    Interrupted,
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
