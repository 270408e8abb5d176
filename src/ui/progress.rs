//! Progress reporting
//!
//! Console lines are the program's user interface, so they go to stdout as
//! plain text: one `discovered` line per enumerated entry, one
//! `<index>: <path>` line per copied file, an `error:` line for a terminal
//! error and a summary after a successful run.

use crate::executor::{CopyStats, PipelineEvent};
use crate::types::DircatError;
use console::Style;
use indicatif::HumanBytes;
use std::ffi::OsStr;
use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::Mutex;

/// Line-oriented reporter shared by the enumerator and copier threads
pub struct ConsoleReporter<W: Write> {
    out: Mutex<W>,
    quiet: bool,
    color: bool,
}

impl ConsoleReporter<Stdout> {
    /// Reporter writing to stdout, colored when stdout is a terminal
    pub fn stdout(quiet: bool) -> Self {
        let mut reporter = Self::new(io::stdout(), quiet);
        reporter.color = console::colors_enabled();
        reporter
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Create a plain (uncolored) reporter over any writer
    pub fn new(out: W, quiet: bool) -> Self {
        Self {
            out: Mutex::new(out),
            quiet,
            color: false,
        }
    }

    /// Route a pipeline event to the matching line
    pub fn handle(&self, event: &PipelineEvent<'_>) {
        match event {
            PipelineEvent::Discovered { name, .. } => self.discovered(name),
            PipelineEvent::Copied { index, path, .. } => self.progress(*index, path),
            // Printed as it happens so it follows the last progress line; the
            // driver does not print copy errors a second time.
            PipelineEvent::Failed { error, .. } => self.error(error),
            // The summary needs the output path, so the driver prints it.
            PipelineEvent::Complete { .. } => {}
        }
    }

    /// An entry was handed to the copier
    pub fn discovered(&self, name: &OsStr) {
        if !self.quiet {
            self.line(format_args!("discovered {}", name.to_string_lossy()));
        }
    }

    /// A file was fully copied (1-based index)
    pub fn progress(&self, index: usize, path: &Path) {
        self.line(format_args!("{}: {}", index, path.display()));
    }

    /// The run ended with an error
    pub fn error(&self, err: &DircatError) {
        let label = Style::new().red().bold().force_styling(self.color);
        self.line(format_args!("{} {}", label.apply_to("error:"), err));
    }

    /// Final summary after a successful run
    pub fn summary(&self, stats: &CopyStats, output: &Path) {
        if self.quiet {
            return;
        }
        let label = Style::new().green().force_styling(self.color);
        self.line(format_args!(
            "{} {} file(s) into {} | {} in {:.2?}",
            label.apply_to("Concatenated"),
            stats.files_copied,
            output.display(),
            HumanBytes(stats.bytes_copied),
            stats.elapsed
        ));
    }

    /// Consume the reporter and return the underlying writer
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn line(&self, args: std::fmt::Arguments<'_>) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A closed stdout must not abort the copy.
        let _ = writeln!(out, "{}", args);
        let _ = out.flush();
    }
}
