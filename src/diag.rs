//! Diagnostics accumulator — batch reporting with severity counters.
//!
//! Every failure path in the pipeline goes through here instead of
//! propagating an error upward: messages are printed to stderr as they
//! occur, counters decide the process exit code. Fatal-class diagnostics
//! never abort mid-batch; the pipeline checks `has_fatal()` at phase
//! boundaries so all failures in a pass are reported together.

#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: usize,
    errors: usize,
    fatals: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-fatal, informational. Does not affect the exit code.
    pub fn warning(&mut self, msg: impl AsRef<str>) {
        self.warnings += 1;
        eprintln!("warning: {}", msg.as_ref());
    }

    /// Recoverable error: the offending item is skipped, the run continues
    /// and can still exit zero.
    pub fn error(&mut self, msg: impl AsRef<str>) {
        self.errors += 1;
        eprintln!("error: {}", msg.as_ref());
    }

    /// Fatal-class error: the run is marked failed but keeps accumulating
    /// further diagnostics until the current phase completes.
    pub fn fatal(&mut self, msg: impl AsRef<str>) {
        self.fatals += 1;
        eprintln!("fatal: {}", msg.as_ref());
    }

    pub fn has_fatal(&self) -> bool {
        self.fatals > 0
    }

    #[allow(dead_code)]
    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    #[allow(dead_code)]
    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn fatal_count(&self) -> usize {
        self.fatals
    }
}
