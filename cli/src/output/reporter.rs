//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Application services report progress through the port; this type turns
//! those events into terminal lines. It stays silent in quiet and JSON modes
//! so stdout remains a single parseable document.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
}

impl<'a> TerminalReporter<'a> {
    /// Reporter printing through `ctx`, muted when `silent` or `ctx.quiet`.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, silent: bool) -> Self {
        Self {
            ctx,
            silent: silent || ctx.quiet,
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.silent {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        if !self.silent {
            println!("  {} {message}", "✓".style(self.ctx.styles.success));
        }
    }

    fn warn(&self, message: &str) {
        if !self.silent {
            println!("  {} {message}", "!".style(self.ctx.styles.warning));
        }
    }
}
