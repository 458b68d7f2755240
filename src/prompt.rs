// Input sources for the interactive shell. `DialoguerPrompter` is the
// keyboard-driven terminal UI; `LinePrompter` reads plain lines from any
// reader, which covers piped stdin and tests.

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, Select};
use std::io::{BufRead, Write};
use thiserror::Error;

/// Raised when the input source has no more lines.
#[derive(Debug, Error)]
#[error("input closed")]
pub struct InputClosed;

pub trait Prompter {
    /// Read one line of free text. May be empty.
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Read a value that should not be echoed.
    fn secret(&mut self, prompt: &str) -> Result<String>;

    /// Pick one of `items`. `None` means the answer matched nothing.
    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<Option<usize>>;

    /// Yes/no question, defaulting to no.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Terminal prompts via `dialoguer`.
#[derive(Default)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn input(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn secret(&mut self, prompt: &str) -> Result<String> {
        let value = Password::new().with_prompt(prompt).interact()?;
        Ok(value)
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<Option<usize>> {
        // `Select::interact()` is keyboard-driven: arrow keys and Enter.
        let selection = Select::new()
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()?;
        Ok(Some(selection))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = Confirm::new().with_prompt(prompt).default(false).interact()?;
        Ok(answer)
    }
}

/// Line-oriented prompts: write the prompt, read one line.
pub struct LinePrompter<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        LinePrompter { reader, writer }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{prompt}: ")?;
        self.writer.flush()?;
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Err(InputClosed.into());
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn input(&mut self, prompt: &str) -> Result<String> {
        self.ask(prompt)
    }

    fn secret(&mut self, prompt: &str) -> Result<String> {
        self.ask(prompt)
    }

    fn select(&mut self, prompt: &str, items: &[&str]) -> Result<Option<usize>> {
        writeln!(self.writer, "\n--- {prompt} ---")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.writer, "{}. {}", i + 1, item)?;
        }
        let answer = self.ask(&format!("Choose an operation (1-{})", items.len()))?;
        Ok(answer
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=items.len()).contains(n))
            .map(|n| n - 1))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let answer = self.ask(&format!("{prompt} (y/N)"))?;
        let answer = answer.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}
