//! Execution engine for Beflux, a two-dimensional stack language in the
//! Befunge family.
//!
//! A program is a 256×256 grid of single-byte opcodes. The instruction
//! pointer travels the grid in one of four cardinal directions, executing
//! the byte under it each tick; most operations push to or pop from a
//! bounded stack of 8-bit words. This crate provides:
//!
//! - The program bank: 256 grids with text loading and saving
//! - The frame bank: 256 stacks plus the call-path coordinate stacks
//! - The mode-switched fetch/decode/dispatch loop with string sub-modes
//! - Every printable-ASCII operation, host-overridable per instance
//! - `F`/`M` host function tables, pre/post tick hooks, and BAM trig
//!   built-ins
//! - Stream bindings with a diagnostic channel in the fixed record format
//!
//! # Architecture
//!
//! [`Beflux`] owns all interpreter state. The run loop fetches the byte
//! under the IP, routes it through the mode controller (normal bytes hit
//! the operation table, string-mode bytes land on the stack), advances the
//! IP under the wrap policy, and repeats until the mode returns to
//! [`Mode::Halt`]. Program faults never unwind: they emit a diagnostic,
//! set status 0xFF, and halt, so `run` always returns a status word.
//!
//! # Example
//!
//! ```
//! use beflux_core::Beflux;
//!
//! let mut bfx = Beflux::new();
//! // Push 0x41 and 0x01, add, print the sum as two hex digits, quit.
//! bfx.load_program(0, &b"41012+.Q"[..]).unwrap();
//! let status = bfx.run();
//! assert_eq!(status, 0);
//! ```

#![warn(missing_docs)]

mod grid;
mod interpreter;
mod ip;
mod mode;
mod opcodes;
mod ops;
mod stack;
mod trace;
pub mod trig;

pub use grid::{Grid, ProgramBank};
pub use interpreter::{Beflux, RngFn};
pub use ip::{Direction, Ip};
pub use mode::Mode;
pub use opcodes::{lookup, Op, OpFn, OpInfo, OPCODE_TABLE};
pub use stack::Stack;
pub use trace::TraceEntry;

/// The interpreter's word: every stack value, grid cell, register, and
/// coordinate is an unsigned byte, and arithmetic wraps modulo 256.
pub type Word = u8;

/// Largest word value.
pub const WORD_MAX: Word = 0xFF;

/// Entries in every bank: programs, frames, registers, bindings.
pub const BANK_SIZE: usize = 256;

/// Columns in a program grid.
pub const GRID_WIDTH: usize = 256;

/// Rows in a program grid.
pub const GRID_HEIGHT: usize = 256;

/// Cells in a program grid.
pub const GRID_CELLS: usize = GRID_WIDTH * GRID_HEIGHT;

/// Maximum words on one stack frame.
pub const STACK_DEPTH: usize = 256;

/// Interpreter error types for the host-facing API.
///
/// In-language faults (zero divisors, undefined opcodes, ...) are not Rust
/// errors; they emit a diagnostic record and halt the program with status
/// 0xFF.
#[derive(Debug, thiserror::Error)]
pub enum BefluxError {
    /// A program file could not be opened or read.
    #[error("Failed to load program from \"{path}\"")]
    Load {
        /// Path of the `.bfx` file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A program file could not be created or written.
    #[error("Failed to write program to \"{path}\"")]
    Save {
        /// Path of the `.bfx` file.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Program text could not be read or written.
    #[error("Program I/O failed")]
    Io(#[from] std::io::Error),

    /// The interpreter's memory has been released.
    #[error("Interpreter memory has been freed")]
    Freed,
}

/// Result type for interpreter operations.
pub type Result<T> = std::result::Result<T, BefluxError>;
