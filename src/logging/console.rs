//! Human-facing console output
//!
//! One line per submission (`<glyph> <instance id>`) and a closing summary line.
//! Everything printed here is also emitted as a `tracing` event by the caller, so
//! quiet mode loses nothing from the logs.

use crate::domain::{InstanceId, Outcome, TransferStats};
use std::io::Write;

/// Placeholder shown for submissions without a readable instance id
const UNKNOWN_INSTANCE: &str = "<no instance id>";

/// Writes status lines to stdout unless quiet
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Prints the status line of one submission
    pub fn outcome(&self, instance_id: Option<&InstanceId>, outcome: Outcome) {
        if self.quiet {
            return;
        }
        println!("{}", outcome_line(instance_id, outcome));
        let _ = std::io::stdout().flush();
    }

    /// Prints the end-of-run summary line
    pub fn summary(&self, stats: &TransferStats) {
        if self.quiet {
            return;
        }
        println!("{stats}");
    }

    /// Prints a free-form message
    pub fn message(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

fn outcome_line(instance_id: Option<&InstanceId>, outcome: Outcome) -> String {
    let id = instance_id.map_or(UNKNOWN_INSTANCE, InstanceId::as_str);
    format!("{} {id}", outcome.glyph())
}
