//! Per-tick execution trace records.
//!
//! The run loop snapshots one [`TraceEntry`] per tick and emits it through
//! `log::trace!`, so `RUST_LOG=trace` on a host with a logger installed
//! yields a step-by-step account of a run without touching the program's
//! own output streams.

use crate::mode::Mode;
use crate::Word;

/// Snapshot of the interpreter state at the top of one tick.
#[derive(Debug, Clone)]
pub struct TraceEntry {
    /// Tick counter value before this tick executes.
    pub tick: u64,
    /// Current program index.
    pub program: Word,
    /// IP row.
    pub row: Word,
    /// IP column.
    pub col: Word,
    /// Byte under the IP.
    pub opcode: Word,
    /// Mnemonic for the byte under the IP.
    pub mnemonic: &'static str,
    /// Mode the byte will be evaluated in.
    pub mode: Mode,
    /// Current frame index.
    pub frame: Word,
    /// Depth of the current frame.
    pub depth: usize,
}

impl TraceEntry {
    /// Format the entry as one fixed-width line.
    ///
    /// Format: `TICK  PP:RR,CC  OP MNEM  mode frame:FF depth:N`
    #[must_use]
    pub fn format(&self) -> String {
        let mode = format!("{:?}", self.mode);
        format!(
            "{:>8}  {:02x}:{:02x},{:02x}  {:02x} {:<4}  {mode:<12} frame:{:02x} depth:{}",
            self.tick, self.program, self.row, self.col, self.opcode, self.mnemonic, self.frame,
            self.depth
        )
    }
}
