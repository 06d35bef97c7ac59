//! Reference command-line host for the Beflux interpreter.
//!
//! Loads `<program>.bfx` into program 0, runs it to completion, and exits
//! with the program's status: 0 for a clean quit, the popped status for
//! `q`, and 0xFF for a fatal fault. `RUST_LOG=trace` enables the per-tick
//! execution trace.

use std::path::PathBuf;
use std::process::ExitCode;

use beflux_core::Beflux;
use clap::Parser;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "beflux", version, about = "Beflux interpreter")]
struct Args {
    /// Path to the program, without the .bfx extension.
    program: PathBuf,

    /// Abort the run after this many seconds of wall-clock time.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let mut bfx = Beflux::new();
    if let Err(err) = bfx.load_program_file(0, &args.program) {
        eprintln!("beflux: {err}");
        return ExitCode::from(0xFF);
    }
    if let Some(seconds) = args.timeout {
        bfx.set_timeout(seconds);
    }

    log::info!("running {}", args.program.display());
    let status = bfx.run();
    log::info!("halted with status {status:02x} after {} ticks", bfx.tick());

    ExitCode::from(status)
}
