//! Implementations of the printable-range operations.
//!
//! Each operation is a free function that mutates the interpreter;
//! [`execute`] is the single tagged dispatcher the mode controller routes
//! normal-mode bytes through. Stack contracts are noted as `(pops:pushes)`
//! on the current frame.

use std::fs::File;
use std::io::{self, BufReader};

use crate::interpreter::{Beflux, InputByte};
use crate::ip::Direction;
use crate::mode::Mode;
use crate::opcodes::Op;
use crate::stack::Stack;
use crate::{Word, GRID_CELLS, GRID_WIDTH, STACK_DEPTH};

/// Dispatch one resolved operation.
pub(crate) fn execute(bfx: &mut Beflux, op: Op) {
    match op {
        Op::Undefined => bfx.error("Undefined opcode."),
        Op::Skip => skip(bfx),
        Op::Not => not(bfx),
        Op::Str => string(bfx),
        Op::Hop => hop(bfx),
        Op::Pop => pop(bfx),
        Op::Mod => modulo(bfx),
        Op::GetHex => get_hex(bfx),
        Op::Over => over(bfx),
        Op::PushFrame => push_frame(bfx),
        Op::PopFrame => pop_frame(bfx),
        Op::Mul => mul(bfx),
        Op::Add => add(bfx),
        Op::PutChar => put_char(bfx),
        Op::Sub => sub(bfx),
        Op::PutHex => put_hex(bfx),
        Op::Div => div(bfx),
        Op::Digit(nibble) => bfx.digit(nibble),
        Op::Dup => dup(bfx),
        Op::Comment => comment(bfx),
        Op::MoveWest => bfx.ip.dir = Direction::West,
        Op::Eq => eq(bfx),
        Op::MoveEast => bfx.ip.dir = Direction::East,
        Op::Away => away(bfx),
        Op::Rep => rep(bfx),
        Op::PrevProgram => bfx.current_program = bfx.current_program.wrapping_sub(1),
        Op::Reverse => bfx.ip.dir = bfx.ip.dir.reversed(),
        Op::Call => call(bfx),
        Op::Dice => dice(bfx),
        Op::Eof => eof(bfx),
        Op::Func => func(bfx),
        Op::GetCell => get_cell(bfx),
        Op::Home => bfx.current_program = 0,
        Op::BindInput => bind_input(bfx),
        Op::Jump => jump(bfx),
        Op::DupFrame => dup_frame(bfx),
        Op::LoopReset => bfx.loop_count = 0,
        Op::Math => math(bfx),
        Op::ClearFrame => bfx.clear(),
        Op::BindOutput => bind_output(bfx),
        Op::LoadProgram => load_program(bfx),
        Op::Quit => quit(bfx),
        Op::Ret => ret(bfx),
        Op::SetCell => set_cell(bfx),
        Op::TimeMajor => {
            let value = bfx.t_major;
            bfx.push(value);
        }
        Op::CurProgram => {
            let value = bfx.current_program;
            bfx.push(value);
        }
        Op::NextProgram => bfx.current_program = bfx.current_program.wrapping_add(1),
        Op::Wrap => bfx.wrap_offset = bfx.pop(),
        Op::ExecProgram => exec_program(bfx),
        Op::ClearRegisters => bfx.registers = [0; crate::BANK_SIZE],
        Op::Rand => {
            let value = bfx.rand_word();
            bfx.push(value);
        }
        Op::TurnLeft => bfx.ip.dir = bfx.ip.dir.turned_left(),
        Op::Swap => swap(bfx),
        Op::TurnRight => bfx.ip.dir = bfx.ip.dir.turned_right(),
        Op::MoveNorth => bfx.ip.dir = Direction::North,
        Op::IfWestEast => if_west_east(bfx),
        Op::Gt => gt(bfx),
        Op::GetRegister => get_register(bfx),
        Op::BumpNorth => bump_north(bfx),
        Op::ReadLine => read_line(bfx),
        Op::JumpRel => jump_rel(bfx),
        Op::Iterate => iterate(bfx),
        Op::LoopCount => loop_count(bfx),
        Op::IfNorth => if_north(bfx),
        Op::Newline => newline(bfx),
        Op::PutString => put_string(bfx),
        Op::SwapRegister => swap_register(bfx),
        Op::Exit => exit(bfx),
        Op::ReverseString => reverse_string(bfx),
        Op::SetRegister => set_register(bfx),
        Op::TimeMinor => {
            let value = bfx.t_minor;
            bfx.push(value);
        }
        Op::Join => join(bfx),
        Op::MoveSouth => bfx.ip.dir = Direction::South,
        Op::IfSouth => if_south(bfx),
        Op::Exec => exec(bfx),
        Op::BumpSouth => bump_south(bfx),
        Op::Sleep => sleep(bfx),
        Op::BlockOpen => block_open(bfx),
        Op::IfNorthSouth => if_north_south(bfx),
        Op::BlockClose | Op::Nop => {}
        Op::GetChar => get_char(bfx),
        Op::Ext(host_fn) => host_fn(bfx),
    }
}

/// Search budget for scans that must find a terminator.
fn scan_limit(bfx: &Beflux) -> usize {
    if bfx.wrap_offset == 0 {
        GRID_WIDTH
    } else {
        GRID_CELLS
    }
}

/// ' ' SKIP (0:0): advance past a run of spaces.
fn skip(bfx: &mut Beflux) {
    let limit = scan_limit(bfx);
    let mut steps = 0;
    while bfx.current_op() == b' ' {
        bfx.ip_advance();
        steps += 1;
        if steps > limit {
            bfx.error("Infinite empty loop detected.");
            return;
        }
    }
    bfx.ip.wait = 1;
}

/// '!' NOT (1:1): boolean negation.
fn not(bfx: &mut Beflux) {
    let value = bfx.pop();
    bfx.push(Word::from(value == 0));
}

/// '"' STR (0:1): push a NUL sentinel and enter string mode.
fn string(bfx: &mut Beflux) {
    bfx.push(0);
    bfx.mode = Mode::String;
}

/// '#' HOP (0:0): skip the next cell.
fn hop(bfx: &mut Beflux) {
    bfx.ip_advance();
}

/// '$' POP (1:0): discard the top of the stack.
fn pop(bfx: &mut Beflux) {
    bfx.pop();
}

/// '%' MOD (2:1): remainder of the first pop by the second. A zero modulus
/// is fatal.
fn modulo(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    if b == 0 {
        bfx.error("Zero modulus.");
        return;
    }
    bfx.push(a % b);
}

/// '&' GETX (0:?): read one hex digit from input into the accumulator.
fn get_hex(bfx: &mut Beflux) {
    match bfx.read_input() {
        InputByte::Unbound => bfx.error("No input stream."),
        InputByte::Eof => bfx.error("End of input stream."),
        InputByte::Byte(byte) => match byte {
            b'0'..=b'9' => bfx.digit(byte - b'0'),
            b'A'..=b'F' => bfx.digit(byte - b'A' + 10),
            b'a'..=b'f' => bfx.digit(byte - b'a' + 10),
            _ => bfx.warning("Empty hex input."),
        },
    }
}

/// '\'' OVER (2:3): copy the word under the top.
fn over(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.top();
    bfx.push(a);
    bfx.push(b);
}

/// '(' PSHF (0:0): push a stack frame.
fn push_frame(bfx: &mut Beflux) {
    bfx.current_frame = bfx.current_frame.wrapping_add(1);
}

/// ')' POPF (0:0): pop the current stack frame.
fn pop_frame(bfx: &mut Beflux) {
    bfx.current_frame = bfx.current_frame.wrapping_sub(1);
}

/// '*' MUL (2:1): product.
fn mul(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    bfx.push(a.wrapping_mul(b));
}

/// '+' ADD (2:1): sum.
fn add(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    bfx.push(a.wrapping_add(b));
}

/// ',' PUTC (1:0): write one byte to output.
fn put_char(bfx: &mut Beflux) {
    let byte = bfx.pop();
    bfx.write_out(&[byte]);
}

/// '-' SUB (2:1): difference; the subtrahend is popped first.
fn sub(bfx: &mut Beflux) {
    let b = bfx.pop();
    let a = bfx.pop();
    bfx.push(a.wrapping_sub(b));
}

/// '.' PUTX (1:0): write the popped word as two hex digits.
fn put_hex(bfx: &mut Beflux) {
    let value = bfx.pop();
    let text = format!("{value:02x}");
    bfx.write_out(text.as_bytes());
}

/// '/' DIV (2:1): quotient of the first pop by the second. A zero
/// denominator is fatal.
fn div(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    if b == 0 {
        bfx.error("Zero denominator.");
        return;
    }
    bfx.push(a / b);
}

/// ':' DUP (1:2): duplicate the top of the stack.
fn dup(bfx: &mut Beflux) {
    let value = bfx.top();
    bfx.push(value);
}

/// ';' COM (0:0): skip to the closing comment marker.
fn comment(bfx: &mut Beflux) {
    let limit = scan_limit(bfx);
    let mut steps = 0;
    bfx.ip_advance();
    while bfx.current_op() != b';' {
        bfx.ip_advance();
        steps += 1;
        if steps > limit {
            bfx.error("Infinite comment loop detected.");
            return;
        }
    }
}

/// '=' EQ (2:1): equality test.
fn eq(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    bfx.push(Word::from(a == b));
}

/// '?' AWAY (0:0): head in a random cardinal direction.
fn away(bfx: &mut Beflux) {
    let bits = bfx.rand_word();
    bfx.ip.dir = Direction::from_bits(bits);
}

/// '@' REP (0:0): reset the IP and bump the minor timer.
fn rep(bfx: &mut Beflux) {
    bfx.ip.reset();
    bfx.ip.wait = 1;
    bfx.t_minor = bfx.t_minor.wrapping_add(1);
}

/// 'C' CALL (2:0): record the current position and jump.
fn call(bfx: &mut Beflux) {
    let row = bfx.ip.row;
    let col = bfx.ip.col;
    if !bfx.calls_row.push(row) || !bfx.calls_col.push(col) {
        bfx.error("Stack overflow.");
        return;
    }
    jump(bfx);
}

/// 'D' DICE (2:1): uniform random word in `[min, max)`. An empty range is
/// fatal.
fn dice(bfx: &mut Beflux) {
    let max = bfx.pop();
    let min = bfx.pop();
    let span = max.wrapping_sub(min);
    if span == 0 {
        bfx.error("Empty dice range.");
        return;
    }
    let roll = bfx.rand_word() % span;
    bfx.push(min.wrapping_add(roll));
}

/// 'E' EOF (0:1): push the end-of-input flag, or 0xFF with no input bound.
fn eof(bfx: &mut Beflux) {
    let value = if bfx.input.is_none() {
        0xFF
    } else {
        Word::from(bfx.input_eof)
    };
    bfx.push(value);
}

/// 'F' FUNC (1:?): invoke the bound user function at a popped index.
fn func(bfx: &mut Beflux) {
    let index = bfx.pop();
    match bfx.f_bindings[usize::from(index)] {
        Some(host_fn) => host_fn(bfx),
        None => bfx.error("Unbound user function."),
    }
}

/// 'G' GETP (3:1): read a cell from any program.
fn get_cell(bfx: &mut Beflux) {
    let col = bfx.pop();
    let row = bfx.pop();
    let prog = bfx.pop();
    let value = bfx.program_get(prog, row, col);
    bfx.push(value);
}

/// 'I' FIN (str:0): rebind input. NUL detaches, 0xFF binds stdin, anything
/// else names a file to open.
fn bind_input(bfx: &mut Beflux) {
    match bfx.top() {
        0x00 => {
            bfx.pop();
            bfx.set_input(None);
        }
        0xFF => {
            bfx.pop();
            bfx.set_input(Some(Box::new(io::stdin())));
        }
        _ => {
            let name = bfx.take_string();
            match File::open(&name) {
                Ok(file) => bfx.set_input(Some(Box::new(BufReader::new(file)))),
                Err(_) => bfx.error(&format!("Failed to open input file {name}.")),
            }
        }
    }
}

/// 'J' JMP (2:0): absolute jump; the column is popped first.
fn jump(bfx: &mut Beflux) {
    bfx.ip.col = bfx.pop();
    bfx.ip.row = bfx.pop();
    bfx.ip.wait = 1;
}

/// 'K' DUPF (0:0): push a copy of the current frame.
fn dup_frame(bfx: &mut Beflux) {
    let src = usize::from(bfx.current_frame);
    bfx.current_frame = bfx.current_frame.wrapping_add(1);
    let dst = usize::from(bfx.current_frame);
    bfx.frames[dst] = bfx.frames[src];
}

/// 'M' MATH (1:?): invoke the bound math function at a popped index.
fn math(bfx: &mut Beflux) {
    let index = bfx.pop();
    match bfx.m_bindings[usize::from(index)] {
        Some(host_fn) => host_fn(bfx),
        None => bfx.error("Unbound math function."),
    }
}

/// 'O' FOUT (str:0): rebind output. NUL detaches, 0xFF binds stdout,
/// anything else names a file to create.
fn bind_output(bfx: &mut Beflux) {
    match bfx.top() {
        0x00 => {
            bfx.pop();
            bfx.set_output(None);
        }
        0xFF => {
            bfx.pop();
            bfx.set_output(Some(Box::new(io::stdout())));
        }
        _ => {
            let name = bfx.take_string();
            match File::create(&name) {
                Ok(file) => bfx.set_output(Some(Box::new(file))),
                Err(_) => bfx.error(&format!("Failed to open output file {name}.")),
            }
        }
    }
}

/// 'P' LOAD (1,str:0): load a program file into a popped index.
fn load_program(bfx: &mut Beflux) {
    let prog = bfx.pop();
    let name = bfx.take_string();
    if let Err(err) = bfx.load_program_file(prog, &name) {
        bfx.error(&err.to_string());
    }
}

/// 'Q' QUIT (0:0): halt with status 0 and bump the major timer.
fn quit(bfx: &mut Beflux) {
    bfx.ip.reset();
    bfx.ip.wait = 1;
    bfx.status = 0;
    bfx.t_minor = 0;
    bfx.t_major = bfx.t_major.wrapping_add(1);
    bfx.mode = Mode::Halt;
}

/// 'R' RET (0:0): jump back to a recorded call position, then step past it.
fn ret(bfx: &mut Beflux) {
    bfx.ip.row = bfx.calls_row.pop();
    bfx.ip.col = bfx.calls_col.pop();
    bfx.ip.wait = 1;
    bfx.ip_advance();
}

/// 'S' SETP (4:0): write a cell in any program.
fn set_cell(bfx: &mut Beflux) {
    let col = bfx.pop();
    let row = bfx.pop();
    let prog = bfx.pop();
    let value = bfx.pop();
    bfx.program_set(prog, row, col, value);
}

/// 'X' EXEP (3:0): jump to a popped position in a popped program.
fn exec_program(bfx: &mut Beflux) {
    jump(bfx);
    bfx.current_program = bfx.pop();
}

/// '\\' SWP (2:2): swap the top two words.
fn swap(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    bfx.push(a);
    bfx.push(b);
}

/// '_' WEIF (1:0): pop; head west if non-zero, east otherwise.
fn if_west_east(bfx: &mut Beflux) {
    bfx.ip.dir = if bfx.pop() != 0 {
        Direction::West
    } else {
        Direction::East
    };
}

/// '`' GT (2:1): greater-than test on the first pop.
fn gt(bfx: &mut Beflux) {
    let a = bfx.pop();
    let b = bfx.pop();
    bfx.push(Word::from(a > b));
}

/// 'g' GETR (1:1): read a register.
fn get_register(bfx: &mut Beflux) {
    let index = bfx.pop();
    let value = bfx.registers[usize::from(index)];
    bfx.push(value);
}

/// 'h' BMPN (0:0): bump one row north regardless of heading.
fn bump_north(bfx: &mut Beflux) {
    bfx.ip.row = bfx.ip.row.wrapping_sub(1);
    bfx.ip.wait = 1;
}

/// 'i' GETS (0:str): read input onto the stack until NUL, newline, or EOF.
fn read_line(bfx: &mut Beflux) {
    loop {
        get_char(bfx);
        if !bfx.mode.is_running() || bfx.input_eof {
            break;
        }
        let top = bfx.top();
        if top == 0 || top == b'\n' {
            break;
        }
    }
}

/// 'j' JREL (2:0): relative jump; pops dx then dy, preserving the heading.
fn jump_rel(bfx: &mut Beflux) {
    let dx = bfx.pop();
    let dy = bfx.pop();
    let heading = bfx.ip.dir;

    bfx.ip.dir = Direction::East;
    for _ in 0..dx {
        bfx.ip_advance();
    }
    bfx.ip.dir = Direction::South;
    for _ in 0..dy {
        bfx.ip_advance();
    }

    bfx.ip.dir = heading;
    bfx.ip.wait = 1;
}

/// 'k' ITER (1:0): step once, then wait through the popped count of cells.
fn iterate(bfx: &mut Beflux) {
    bfx.ip_advance();
    bfx.ip.wait = bfx.pop();
}

/// 'l' LOOP (0:1): push and increment the loop counter.
fn loop_count(bfx: &mut Beflux) {
    let count = bfx.loop_count;
    bfx.push(count);
    bfx.loop_count = count.wrapping_add(1);
}

/// 'm' NIF (1:0): pop; head north if non-zero, keep heading otherwise.
fn if_north(bfx: &mut Beflux) {
    if bfx.pop() != 0 {
        bfx.ip.dir = Direction::North;
    }
}

/// 'n' ENDL (0:0): write a newline to output.
fn newline(bfx: &mut Beflux) {
    bfx.push(b'\n');
    put_char(bfx);
}

/// 'o' PUTS (str:0): write the string on the stack, reversing it first.
fn put_string(bfx: &mut Beflux) {
    reverse_string(bfx);
    while bfx.top() != 0 {
        put_char(bfx);
        if !bfx.mode.is_running() {
            return;
        }
    }
}

/// 'p' SWPR (2:1): swap the next popped word with a register.
fn swap_register(bfx: &mut Beflux) {
    let index = usize::from(bfx.pop());
    let held = bfx.registers[index];
    bfx.registers[index] = bfx.pop();
    bfx.push(held);
}

/// 'q' EXIT (1:0): halt with a popped status; non-zero statuses warn.
fn exit(bfx: &mut Beflux) {
    let status = bfx.pop();
    bfx.status = status;
    if status != 0 {
        bfx.warning(&format!("Exited with status {status:02x}."));
    }
    bfx.ip.reset();
    bfx.ip.wait = 1;
    bfx.t_minor = 0;
    bfx.t_major = bfx.t_major.wrapping_add(1);
    bfx.mode = Mode::Halt;
}

/// 'r' REVS (str:str): reverse the string on the stack behind a fresh
/// sentinel.
pub(crate) fn reverse_string(bfx: &mut Beflux) {
    let mut buffer = [0 as Word; STACK_DEPTH + 1];
    let mut count = 1; // buffer[0] stays NUL and becomes the new sentinel
    while bfx.top() != 0 {
        buffer[count] = bfx.pop();
        count += 1;
    }
    for &byte in &buffer[..count] {
        if !bfx.mode.is_running() {
            break;
        }
        bfx.push(byte);
    }
}

/// 's' SETR (2:0): pop an index, then store the next pop in that register.
fn set_register(bfx: &mut Beflux) {
    let index = usize::from(bfx.pop());
    bfx.registers[index] = bfx.pop();
}

/// 'u' JOIN (str,str:str): splice out the sentinel between two strings.
fn join(bfx: &mut Beflux) {
    let mut spliced = Stack::new();
    while bfx.top() != 0 {
        let _ = spliced.push(bfx.pop());
    }
    bfx.pop(); // the inner sentinel
    while !spliced.is_empty() {
        let byte = spliced.pop();
        bfx.push(byte);
    }
}

/// 'w' SIF (1:0): pop; head south if non-zero, keep heading otherwise.
fn if_south(bfx: &mut Beflux) {
    if bfx.pop() != 0 {
        bfx.ip.dir = Direction::South;
    }
}

/// 'x' EXEC (1:?): evaluate a popped byte through the mode controller.
fn exec(bfx: &mut Beflux) {
    let byte = bfx.pop();
    bfx.eval(byte);
}

/// 'y' BMPS (0:0): bump one row south regardless of heading.
fn bump_south(bfx: &mut Beflux) {
    bfx.ip.row = bfx.ip.row.wrapping_add(1);
    bfx.ip.wait = 1;
}

/// 'z' WAIT (1:0): ask the host to sleep for the popped number of seconds.
fn sleep(bfx: &mut Beflux) {
    bfx.sleep_request = bfx.pop();
    bfx.flush_streams();
}

/// '{' BLK (1:0): pop; on zero, skip to the matching close brace, honoring
/// nesting.
fn block_open(bfx: &mut Beflux) {
    if bfx.pop() != 0 {
        return;
    }
    let limit = scan_limit(bfx);
    let mut depth: usize = 1;
    let mut steps = 0;
    while depth > 0 {
        bfx.ip_advance();
        match bfx.current_op() {
            b'}' => depth -= 1,
            b'{' => depth += 1,
            _ => {}
        }
        steps += 1;
        if steps > limit {
            bfx.error("Infinite block loop detected.");
            return;
        }
    }
}

/// '|' NSIF (1:0): pop; head north if non-zero, south otherwise.
fn if_north_south(bfx: &mut Beflux) {
    bfx.ip.dir = if bfx.pop() != 0 {
        Direction::North
    } else {
        Direction::South
    };
}

/// '~' GETC (0:1): read one byte from input; EOF pushes 0xFF.
fn get_char(bfx: &mut Beflux) {
    match bfx.read_input() {
        InputByte::Unbound => bfx.error("No input stream."),
        InputByte::Eof => bfx.push(0xFF),
        InputByte::Byte(byte) => bfx.push(byte),
    }
}
