//! End-to-end program scenarios.
//!
//! Each test stages a small program grid, runs it against captured streams,
//! and checks the produced stdout, stderr, and exit status.

use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use beflux_core::{Beflux, Direction, Mode, Word};

/// Write end that mirrors everything into a shared buffer, so tests can
/// hand the interpreter an owned stream and still read it afterwards.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Run {
    status: Word,
    stdout: String,
    stderr: String,
    bfx: Beflux,
}

/// Build an interpreter with captured streams and the given program rows.
fn stage(rows: &[&str], input: &[u8]) -> (Beflux, SharedBuf, SharedBuf) {
    let mut bfx = Beflux::new();
    let out = SharedBuf::default();
    let err = SharedBuf::default();
    bfx.set_input(Some(Box::new(Cursor::new(input.to_vec()))));
    bfx.set_output(Some(Box::new(out.clone())));
    bfx.set_error_output(Box::new(err.clone()));
    bfx.load_program(0, rows.join("\n").as_bytes()).unwrap();
    (bfx, out, err)
}

/// Run program rows to completion against the given input bytes.
fn run_with_input(rows: &[&str], input: &[u8]) -> Run {
    let (mut bfx, out, err) = stage(rows, input);
    let status = bfx.run();
    Run {
        status,
        stdout: out.text(),
        stderr: err.text(),
        bfx,
    }
}

fn run(rows: &[&str]) -> Run {
    run_with_input(rows, b"")
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("beflux-test-{}-{name}", std::process::id()));
    path
}

// ============================================================================
// Reference scenarios
// ============================================================================

#[test]
fn test_hello_world() {
    let run = run(&["\"Hello, world!\"o Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "Hello, world!");
    assert_eq!(run.stderr, "");
}

#[test]
fn test_hex_literals_add_and_print() {
    let run = run(&["41012+.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "42");
}

#[test]
fn test_exit_with_nonzero_status_warns() {
    let run = run(&["01q"]);
    assert_eq!(run.status, 1);
    assert_eq!(run.stdout, "");
    assert!(
        run.stderr.contains("Exited with status 01."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_exit_with_zero_status_is_silent() {
    let run = run(&["00q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stderr, "");
}

#[test]
fn test_divide_by_zero_is_fatal() {
    let run = run(&["10/Q"]);
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("Zero denominator"),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_zero_modulus_is_fatal() {
    let run = run(&["05%Q"]);
    assert_eq!(run.status, 0xFF);
    assert!(run.stderr.contains("Zero modulus"), "stderr: {}", run.stderr);
}

#[test]
fn test_navigation_loop_terminates() {
    let run = run(&[">   v", "^  Q<"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "");
    assert_eq!(run.stderr, "");
}

#[test]
fn test_string_reverse_then_putc() {
    let run = run(&["\"ABC\"r,,,Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "ABC");
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_hop_skips_one_cell() {
    let run = run(&["#vQ"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.bfx.ip().dir, Direction::East);
}

#[test]
fn test_block_skips_to_matching_close_across_nesting() {
    let run = run(&["00{01.{02.}03.}04.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "04");
}

#[test]
fn test_block_executes_body_on_nonzero() {
    let run = run(&["01{02.}03.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "0203");
}

#[test]
fn test_unterminated_block_is_fatal() {
    let run = run(&["00{"]);
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("Infinite block loop detected."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_comment_skips_dangerous_code() {
    let run = run(&[";//;01.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "01");
}

#[test]
fn test_unterminated_comment_is_fatal() {
    let run = run(&[";"]);
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("Infinite comment loop detected."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_all_space_grid_is_fatal() {
    let run = run(&[""]);
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("Infinite empty loop detected."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_call_and_return() {
    let run = run(&["020aC01.Q", "", "          R"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "01");
}

#[test]
fn test_relative_jump_preserves_heading() {
    let run = run(&["0203j", "", "       Q"]);
    assert_eq!(run.status, 0);
    assert!(run.bfx.tick() < 16, "ticks: {}", run.bfx.tick());
}

#[test]
fn test_iterate_repeats_next_cell() {
    let run = run(&["03k5Q"]);
    assert_eq!(run.status, 0);
    // Three evaluations of '5': one full word plus a pending nibble.
    let mut bfx = run.bfx;
    assert_eq!(bfx.top(), 0x55);
    assert_eq!(bfx.pop(), 0x55);
    assert_eq!(bfx.depth(), 0);
}

#[test]
fn test_south_conditional_taken_and_fallthrough() {
    let taken = run(&["01w", "  Q"]);
    assert_eq!(taken.status, 0);

    let fallthrough = run(&["00wQ"]);
    assert_eq!(fallthrough.status, 0);
    assert_eq!(fallthrough.bfx.ip().dir, Direction::East);
}

#[test]
fn test_north_south_conditional() {
    let south = run(&["00|", "  Q"]);
    assert_eq!(south.status, 0);
}

#[test]
fn test_direction_ops_by_eval() {
    let (mut bfx, _out, _err) = stage(&["Q"], b"");

    bfx.eval(b'<');
    assert_eq!(bfx.ip().dir, Direction::West);
    bfx.eval(b'>');
    assert_eq!(bfx.ip().dir, Direction::East);
    bfx.eval(b'^');
    assert_eq!(bfx.ip().dir, Direction::North);
    bfx.eval(b'v');
    assert_eq!(bfx.ip().dir, Direction::South);

    bfx.eval(b'[');
    assert_eq!(bfx.ip().dir, Direction::East);
    bfx.eval(b']');
    assert_eq!(bfx.ip().dir, Direction::South);
    bfx.eval(b'B');
    assert_eq!(bfx.ip().dir, Direction::North);

    bfx.push(1);
    bfx.eval(b'_');
    assert_eq!(bfx.ip().dir, Direction::West);
    bfx.push(0);
    bfx.eval(b'_');
    assert_eq!(bfx.ip().dir, Direction::East);
    bfx.push(1);
    bfx.eval(b'|');
    assert_eq!(bfx.ip().dir, Direction::North);
    bfx.push(1);
    bfx.eval(b'm');
    assert_eq!(bfx.ip().dir, Direction::North);
}

#[test]
fn test_bump_ops_move_row_with_wait() {
    let (mut bfx, _out, _err) = stage(&["Q"], b"");
    bfx.eval(b'h');
    assert_eq!(bfx.ip().row, 255);
    assert_eq!(bfx.ip().wait, 1);
    bfx.eval(b'y');
    bfx.eval(b'y');
    assert_eq!(bfx.ip().row, 1);
}

#[test]
fn test_rep_restarts_and_counts_passes() {
    let run = run(&["tw@", " Q"]);
    assert_eq!(run.status, 0);
    // Q clears the minor timer and bumps the major timer.
    assert_eq!(run.bfx.t_minor(), 0);
    assert_eq!(run.bfx.t_major(), 1);
}

// ============================================================================
// Stack and value operations
// ============================================================================

#[test]
fn test_over_copies_under_top() {
    let run = run(&["0102'..Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "0102");
}

#[test]
fn test_swap_exchanges_top_two() {
    let run = run(&["0102\\..Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "0102");
}

#[test]
fn test_greater_than_compares_first_pop() {
    let run = run(&["0203`.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "01");
}

#[test]
fn test_equality() {
    let run = run(&["0202=.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "01");
}

#[test]
fn test_not_and_pop() {
    let run = run(&["05!$00!.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "01");
}

#[test]
fn test_frame_duplicate_keeps_source_frame() {
    let run = run(&["0102K..)..Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "02010201");
}

#[test]
fn test_clear_frame() {
    let run = run(&["0102N.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "00");
}

#[test]
fn test_join_splices_out_inner_sentinel() {
    let run = run(&["\"AB\"\"CD\"uoQ"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "ABCD");
}

#[test]
fn test_loop_counter() {
    let run = run(&["Ll$l$l.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "02");
}

#[test]
fn test_registers_store_fetch_swap() {
    let store = run(&["2a00s00g.Q"]);
    assert_eq!(store.status, 0);
    assert_eq!(store.stdout, "2a");

    let swap = run(&["1101p$01g.Q"]);
    assert_eq!(swap.status, 0);
    assert_eq!(swap.stdout, "11");

    let clear = run(&["2a00sY00g.Q"]);
    assert_eq!(clear.status, 0);
    assert_eq!(clear.stdout, "00");
}

// ============================================================================
// Program bank
// ============================================================================

#[test]
fn test_set_and_get_cells_across_programs() {
    let run = run(&["2a010000S010000G.Q"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "2a");
}

#[test]
fn test_next_program_switches_fetch_source() {
    let mut bfx = Beflux::new();
    let out = SharedBuf::default();
    bfx.set_input(None);
    bfx.set_output(Some(Box::new(out.clone())));
    bfx.set_error_output(Box::new(SharedBuf::default()));
    bfx.load_program(0, &b"V"[..]).unwrap();
    bfx.load_program(1, &b" U.Q"[..]).unwrap();
    assert_eq!(bfx.run(), 0);
    assert_eq!(out.text(), "01");
}

#[test]
fn test_exec_program_jumps_into_target() {
    let mut bfx = Beflux::new();
    let out = SharedBuf::default();
    bfx.set_input(None);
    bfx.set_output(Some(Box::new(out.clone())));
    bfx.set_error_output(Box::new(SharedBuf::default()));
    bfx.load_program(0, &b"010005X"[..]).unwrap();
    bfx.load_program(1, &b"     U.Q"[..]).unwrap();
    assert_eq!(bfx.run(), 0);
    assert_eq!(out.text(), "01");
    assert_eq!(bfx.current_program(), 1);
}

#[test]
fn test_wrap_offset_opcode() {
    let run = run(&["03WQ"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.bfx.wrap_offset(), 3);
}

#[test]
fn test_save_then_load_program_file_roundtrip() {
    let path = temp_path("roundtrip");
    let (bfx, _out, _err) = stage(&["\"Hello\"o Q", "#@#"], b"");
    bfx.save_program_file(0, &path).unwrap();

    let mut reloaded = Beflux::new();
    reloaded.load_program_file(2, &path).unwrap();

    let mut original_text = Vec::new();
    bfx.write_program(0, &mut original_text).unwrap();
    let mut reloaded_text = Vec::new();
    reloaded.write_program(2, &mut reloaded_text).unwrap();
    assert_eq!(original_text, reloaded_text);

    std::fs::remove_file(path.with_extension("bfx")).unwrap();
}

#[test]
fn test_load_opcode_reads_file_into_bank() {
    let path = temp_path("load-op");
    std::fs::write(path.with_extension("bfx"), b"Z\n").unwrap();

    let program = format!("\"{}\"01P010000G.Q", path.display());
    let run = run(&[&program]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "5a");

    std::fs::remove_file(path.with_extension("bfx")).unwrap();
}

#[test]
fn test_load_opcode_missing_file_is_fatal() {
    let run = run(&["\"no-such-beflux-program\"01PQ"]);
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("Failed to load program"),
        "stderr: {}",
        run.stderr
    );
}

// ============================================================================
// Input and output
// ============================================================================

#[test]
fn test_getc_copies_input_to_output() {
    let run = run_with_input(&["~,~,Q"], b"AB");
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "AB");
}

#[test]
fn test_getc_at_eof_pushes_ff() {
    let run = run_with_input(&["~.Q"], b"");
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "ff");
}

#[test]
fn test_getc_without_input_is_fatal() {
    let mut bfx = Beflux::new();
    let err = SharedBuf::default();
    bfx.set_input(None);
    bfx.set_output(None);
    bfx.set_error_output(Box::new(err.clone()));
    bfx.load_program(0, &b"~Q"[..]).unwrap();
    assert_eq!(bfx.run(), 0xFF);
    assert!(err.text().contains("No input stream."), "stderr: {}", err.text());
}

#[test]
fn test_putc_without_output_is_fatal() {
    let mut bfx = Beflux::new();
    let err = SharedBuf::default();
    bfx.set_input(None);
    bfx.set_output(None);
    bfx.set_error_output(Box::new(err.clone()));
    bfx.load_program(0, &b"41,Q"[..]).unwrap();
    assert_eq!(bfx.run(), 0xFF);
    assert!(
        err.text().contains("No output stream."),
        "stderr: {}",
        err.text()
    );
}

#[test]
fn test_eof_flag_progression() {
    let run = run_with_input(&["~$E.~$E.Q"], b"A");
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "0001");
}

#[test]
fn test_eof_with_no_input_pushes_ff() {
    let mut bfx = Beflux::new();
    let out = SharedBuf::default();
    bfx.set_input(None);
    bfx.set_output(Some(Box::new(out.clone())));
    bfx.set_error_output(Box::new(SharedBuf::default()));
    bfx.load_program(0, &b"E.Q"[..]).unwrap();
    assert_eq!(bfx.run(), 0);
    assert_eq!(out.text(), "ff");
}

#[test]
fn test_hex_input_assembles_words() {
    let run = run_with_input(&["&&.Q"], b"4a");
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "4a");
}

#[test]
fn test_hex_input_ignores_non_hex_with_warning() {
    let run = run_with_input(&["&&&.Q"], b"z4a");
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "4a");
    assert!(
        run.stderr.contains("Empty hex input."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_hex_input_at_eof_is_fatal() {
    let run = run_with_input(&["&Q"], b"");
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("End of input stream."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_read_line_stops_at_newline() {
    let run = run_with_input(&["iQ"], b"hi\nrest");
    assert_eq!(run.status, 0);
    let mut bfx = run.bfx;
    assert_eq!(bfx.pop(), b'\n');
    assert_eq!(bfx.pop(), b'i');
    assert_eq!(bfx.pop(), b'h');
    assert_eq!(bfx.depth(), 0);
}

#[test]
fn test_newline_op() {
    let run = run(&["nQ"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "\n");
}

#[test]
fn test_string_escapes_reach_output() {
    let run = run(&["\"ib\\ta\"oQ"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "a\tbi");
}

#[test]
fn test_output_rebind_to_file() {
    let path = temp_path("fout");
    let program = format!("\"{}\"O41,Q", path.display());
    let run = run(&[&program]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "");
    assert_eq!(std::fs::read(&path).unwrap(), b"A");

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_input_rebind_to_file() {
    let path = temp_path("fin");
    std::fs::write(&path, b"B").unwrap();

    let program = format!("\"{}\"I~,Q", path.display());
    let run = run(&[&program]);
    assert_eq!(run.status, 0);
    assert_eq!(run.stdout, "B");

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_input_detach_makes_reads_fatal() {
    let run = run_with_input(&["00I~Q"], b"unused");
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("No input stream."),
        "stderr: {}",
        run.stderr
    );
}

// ============================================================================
// Randomness, math, pacing
// ============================================================================

#[test]
fn test_dice_respects_range() {
    let (mut bfx, out, _err) = stage(&["0005D.Q"], b"");
    bfx.seed_rng(0x1234_5678);
    assert_eq!(bfx.run(), 0);
    let value = Word::from_str_radix(&out.text(), 16).unwrap();
    assert!(value < 5, "value: {value}");
}

#[test]
fn test_dice_empty_range_is_fatal() {
    let run = run(&["0101DQ"]);
    assert_eq!(run.status, 0xFF);
    assert!(
        run.stderr.contains("Empty dice range."),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn test_away_uses_rng_binding() {
    let (mut bfx, _out, _err) = stage(&["?Q"], b"");
    bfx.bind_rng(Some(|_| Direction::East.bits()));
    assert_eq!(bfx.run(), 0);
}

#[test]
fn test_math_sin_pair_on_stack() {
    let run = run(&["c001M..Q"]);
    assert_eq!(run.status, 0);
    // sin(0xC0) is -1: zero positive part, full negative part.
    assert_eq!(run.stdout, "ff00");
}

#[test]
fn test_sleep_zero_is_immediate() {
    let run = run(&["00zQ"]);
    assert_eq!(run.status, 0);
}

#[test]
fn test_timeout_aborts_spinning_program() {
    let (mut bfx, _out, err) = stage(&["><"], b"");
    bfx.set_timeout(1);
    assert_eq!(bfx.run(), 0xFF);
    assert!(
        err.text().contains("Program timeout."),
        "stderr: {}",
        err.text()
    );
}

#[test]
fn test_mode_is_halt_after_run() {
    let run = run(&["Q"]);
    assert_eq!(run.bfx.mode(), Mode::Halt);
    assert_eq!(run.bfx.status(), 0);
}
