//! The top-level interpreter mode gating byte interpretation.

/// Interpreter mode.
///
/// The run loop only executes while the mode is not [`Mode::Halt`]; it is
/// the caller's transition from `Halt` to `Normal` that starts a run. The
/// string sub-modes reroute fetched bytes onto the stack instead of the
/// dispatcher, and [`Mode::Freed`] marks an interpreter whose memory has
/// been released, on which further runs fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Not executing. The initial and terminal state.
    #[default]
    Halt,
    /// Executing opcodes through the dispatcher.
    Normal,
    /// Pushing fetched bytes verbatim until the closing `"`.
    String,
    /// One byte of escape lookup inside string mode.
    StringEscape,
    /// Memory released; the interpreter can no longer run.
    Freed,
}

impl Mode {
    /// Whether the run loop should keep executing.
    #[must_use]
    pub fn is_running(self) -> bool {
        self != Self::Halt
    }
}
