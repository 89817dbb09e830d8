//! Numbered single-choice prompts on the terminal.

use crate::record::{FieldValue, Source};
use crate::reduce::Chooser;
use std::cell::RefCell;
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Line-oriented prompt over a reader and a writer.
///
/// Both sources share one console so their prompts interleave on the same
/// input stream.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr so stdout only carries the report.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line, `None` at end of input.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask for one of `options` by number.
    ///
    /// An empty answer or end of input keeps every option (`None`). Invalid
    /// answers are asked again.
    pub fn ask<T: Display>(&mut self, title: &str, options: &[T]) -> io::Result<Option<usize>> {
        writeln!(self.output, "{}", title)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }

        let prompt = format!("Choice [1-{}, Enter to keep all]: ", options.len());
        loop {
            let Some(answer) = self.read_line(&prompt)? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number between 1 and {}", options.len())?,
            }
        }
    }
}

/// [`Chooser`] for one source, backed by a shared [`Console`].
pub struct StdinChooser<'a, R, W> {
    console: &'a RefCell<Console<R, W>>,
    source: Source,
}

impl<'a, R: BufRead, W: Write> StdinChooser<'a, R, W> {
    pub fn new(console: &'a RefCell<Console<R, W>>, source: Source) -> Self {
        Self { console, source }
    }
}

impl<R: BufRead, W: Write> Chooser for StdinChooser<'_, R, W> {
    fn choose(&mut self, dimension: &str, options: &[FieldValue]) -> Option<usize> {
        let title = format!(
            "{} candidates differ on '{}':",
            self.source, dimension
        );
        match self.console.borrow_mut().ask(&title, options) {
            Ok(choice) => choice,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, keeping all candidates");
                None
            }
        }
    }
}
