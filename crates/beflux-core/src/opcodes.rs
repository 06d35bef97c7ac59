//! Operation definitions and the 256-entry dispatch table.
//!
//! Every byte maps to an [`Op`]. The printable ASCII range 0x20..=0x7F is
//! fully defined; control bytes and the extended range default to
//! [`Op::Undefined`], which faults when dispatched. Each interpreter
//! instance starts from [`OPCODE_TABLE`] and may rebind individual entries,
//! including to a host function via [`Op::Ext`].

use crate::interpreter::Beflux;
use crate::Word;

/// Host operation function type.
pub type OpFn = fn(&mut Beflux);

/// A dispatchable operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// No binding; dispatching this faults the program.
    Undefined,
    /// `' '` skip past a run of spaces.
    Skip,
    /// `!` boolean negation.
    Not,
    /// `"` enter string mode behind a NUL sentinel.
    Str,
    /// `#` hop over the next cell.
    Hop,
    /// `$` discard the top of the stack.
    Pop,
    /// `%` remainder.
    Mod,
    /// `&` read one hex digit from input.
    GetHex,
    /// `'` copy the word under the top.
    Over,
    /// `(` push a stack frame.
    PushFrame,
    /// `)` pop a stack frame.
    PopFrame,
    /// `*` product.
    Mul,
    /// `+` sum.
    Add,
    /// `,` write one byte to output.
    PutChar,
    /// `-` difference.
    Sub,
    /// `.` write two hex digits to output.
    PutHex,
    /// `/` quotient.
    Div,
    /// `0`..`9`, `a`..`f` feed one nibble to the accumulator.
    Digit(Word),
    /// `:` duplicate the top of the stack.
    Dup,
    /// `;` skip to the closing comment marker.
    Comment,
    /// `<` head west.
    MoveWest,
    /// `=` equality test.
    Eq,
    /// `>` head east.
    MoveEast,
    /// `?` head in a random cardinal direction.
    Away,
    /// `@` reset the IP and bump the minor timer.
    Rep,
    /// `A` decrement the current program index.
    PrevProgram,
    /// `B` reverse heading.
    Reverse,
    /// `C` jump, recording the return position.
    Call,
    /// `D` random word in a popped range.
    Dice,
    /// `E` push the end-of-input flag.
    Eof,
    /// `F` invoke a bound user function.
    Func,
    /// `G` read a cell from any program.
    GetCell,
    /// `H` select program 0.
    Home,
    /// `I` rebind the input stream.
    BindInput,
    /// `J` absolute jump.
    Jump,
    /// `K` push a copy of the current frame.
    DupFrame,
    /// `L` reset the loop counter.
    LoopReset,
    /// `M` invoke a bound math function.
    Math,
    /// `N` clear the current frame.
    ClearFrame,
    /// `O` rebind the output stream.
    BindOutput,
    /// `P` load a program file into a popped index.
    LoadProgram,
    /// `Q` halt with status 0.
    Quit,
    /// `R` return to a recorded call position.
    Ret,
    /// `S` write a cell in any program.
    SetCell,
    /// `T` push the major timer.
    TimeMajor,
    /// `U` push the current program index.
    CurProgram,
    /// `V` increment the current program index.
    NextProgram,
    /// `W` set the wrap offset.
    Wrap,
    /// `X` jump into another program.
    ExecProgram,
    /// `Y` zero every register.
    ClearRegisters,
    /// `Z` push a random word.
    Rand,
    /// `[` quarter turn counterclockwise.
    TurnLeft,
    /// `\` swap the top two words.
    Swap,
    /// `]` quarter turn clockwise.
    TurnRight,
    /// `^` head north.
    MoveNorth,
    /// `_` pop: west if non-zero, east otherwise.
    IfWestEast,
    /// `` ` `` greater-than test.
    Gt,
    /// `g` read a register.
    GetRegister,
    /// `h` bump one row north.
    BumpNorth,
    /// `i` read a line from input onto the stack.
    ReadLine,
    /// `j` relative jump.
    JumpRel,
    /// `k` wait through the popped number of cells.
    Iterate,
    /// `l` push and increment the loop counter.
    LoopCount,
    /// `m` pop: north if non-zero, fall through otherwise.
    IfNorth,
    /// `n` write a newline to output.
    Newline,
    /// `o` write the string on the stack to output.
    PutString,
    /// `p` swap the top of the stack with a register.
    SwapRegister,
    /// `q` halt with a popped status.
    Exit,
    /// `r` reverse the string on the stack.
    ReverseString,
    /// `s` store into a register.
    SetRegister,
    /// `t` push the minor timer.
    TimeMinor,
    /// `u` join the two strings on the stack.
    Join,
    /// `v` head south.
    MoveSouth,
    /// `w` pop: south if non-zero, fall through otherwise.
    IfSouth,
    /// `x` evaluate a popped byte as an opcode.
    Exec,
    /// `y` bump one row south.
    BumpSouth,
    /// `z` request a host sleep.
    Sleep,
    /// `{` pop: skip to the matching `}` when zero.
    BlockOpen,
    /// `|` pop: north if non-zero, south otherwise.
    IfNorthSouth,
    /// `}` block terminator, a no-op.
    BlockClose,
    /// `~` read one byte from input.
    GetChar,
    /// DEL, a no-op.
    Nop,
    /// A host-bound operation.
    Ext(OpFn),
}

/// Operation table entry.
#[derive(Debug, Clone, Copy)]
pub struct OpInfo {
    /// Mnemonic used by diagnostics.
    pub mnemonic: &'static str,
    /// Default operation binding.
    pub op: Op,
}

impl OpInfo {
    const fn new(mnemonic: &'static str, op: Op) -> Self {
        Self { mnemonic, op }
    }
}

/// Look up the table entry for a byte.
#[inline]
#[must_use]
pub fn lookup(byte: Word) -> &'static OpInfo {
    &OPCODE_TABLE[usize::from(byte)]
}

/// Complete 256-entry operation table.
///
/// Indexed by opcode byte. Control bytes (0x00-0x1F) and the extended range
/// (0x80-0xFF) are undefined; they keep numbered mnemonics so diagnostics
/// can still name them.
pub const OPCODE_TABLE: [OpInfo; 256] = [
    // 0x00-0x0F (control, undefined)
    OpInfo::new("OP00", Op::Undefined),
    OpInfo::new("OP01", Op::Undefined),
    OpInfo::new("OP02", Op::Undefined),
    OpInfo::new("OP03", Op::Undefined),
    OpInfo::new("OP04", Op::Undefined),
    OpInfo::new("OP05", Op::Undefined),
    OpInfo::new("OP06", Op::Undefined),
    OpInfo::new("OP07", Op::Undefined),
    OpInfo::new("OP08", Op::Undefined),
    OpInfo::new("OP09", Op::Undefined),
    OpInfo::new("OP0A", Op::Undefined),
    OpInfo::new("OP0B", Op::Undefined),
    OpInfo::new("OP0C", Op::Undefined),
    OpInfo::new("OP0D", Op::Undefined),
    OpInfo::new("OP0E", Op::Undefined),
    OpInfo::new("OP0F", Op::Undefined),
    // 0x10-0x1F (control, undefined)
    OpInfo::new("OP10", Op::Undefined),
    OpInfo::new("OP11", Op::Undefined),
    OpInfo::new("OP12", Op::Undefined),
    OpInfo::new("OP13", Op::Undefined),
    OpInfo::new("OP14", Op::Undefined),
    OpInfo::new("OP15", Op::Undefined),
    OpInfo::new("OP16", Op::Undefined),
    OpInfo::new("OP17", Op::Undefined),
    OpInfo::new("OP18", Op::Undefined),
    OpInfo::new("OP19", Op::Undefined),
    OpInfo::new("OP1A", Op::Undefined),
    OpInfo::new("OP1B", Op::Undefined),
    OpInfo::new("OP1C", Op::Undefined),
    OpInfo::new("OP1D", Op::Undefined),
    OpInfo::new("OP1E", Op::Undefined),
    OpInfo::new("OP1F", Op::Undefined),
    // 0x20-0x2F
    OpInfo::new("SKIP", Op::Skip),        // ' '
    OpInfo::new("NOT", Op::Not),          // '!'
    OpInfo::new("STR", Op::Str),          // '"'
    OpInfo::new("HOP", Op::Hop),          // '#'
    OpInfo::new("POP", Op::Pop),          // '$'
    OpInfo::new("MOD", Op::Mod),          // '%'
    OpInfo::new("GETX", Op::GetHex),      // '&'
    OpInfo::new("OVER", Op::Over),        // '\''
    OpInfo::new("PSHF", Op::PushFrame),   // '('
    OpInfo::new("POPF", Op::PopFrame),    // ')'
    OpInfo::new("MUL", Op::Mul),          // '*'
    OpInfo::new("ADD", Op::Add),          // '+'
    OpInfo::new("PUTC", Op::PutChar),     // ','
    OpInfo::new("SUB", Op::Sub),          // '-'
    OpInfo::new("PUTX", Op::PutHex),      // '.'
    OpInfo::new("DIV", Op::Div),          // '/'
    // 0x30-0x3F
    OpInfo::new("V0", Op::Digit(0x0)),    // '0'
    OpInfo::new("V1", Op::Digit(0x1)),    // '1'
    OpInfo::new("V2", Op::Digit(0x2)),    // '2'
    OpInfo::new("V3", Op::Digit(0x3)),    // '3'
    OpInfo::new("V4", Op::Digit(0x4)),    // '4'
    OpInfo::new("V5", Op::Digit(0x5)),    // '5'
    OpInfo::new("V6", Op::Digit(0x6)),    // '6'
    OpInfo::new("V7", Op::Digit(0x7)),    // '7'
    OpInfo::new("V8", Op::Digit(0x8)),    // '8'
    OpInfo::new("V9", Op::Digit(0x9)),    // '9'
    OpInfo::new("DUP", Op::Dup),          // ':'
    OpInfo::new("COM", Op::Comment),      // ';'
    OpInfo::new("MVW", Op::MoveWest),     // '<'
    OpInfo::new("EQ", Op::Eq),            // '='
    OpInfo::new("MVE", Op::MoveEast),     // '>'
    OpInfo::new("AWAY", Op::Away),        // '?'
    // 0x40-0x4F
    OpInfo::new("REP", Op::Rep),          // '@'
    OpInfo::new("PRVP", Op::PrevProgram), // 'A'
    OpInfo::new("REV", Op::Reverse),      // 'B'
    OpInfo::new("CALL", Op::Call),        // 'C'
    OpInfo::new("DICE", Op::Dice),        // 'D'
    OpInfo::new("EOF", Op::Eof),          // 'E'
    OpInfo::new("FUNC", Op::Func),        // 'F'
    OpInfo::new("GETP", Op::GetCell),     // 'G'
    OpInfo::new("HOME", Op::Home),        // 'H'
    OpInfo::new("FIN", Op::BindInput),    // 'I'
    OpInfo::new("JMP", Op::Jump),         // 'J'
    OpInfo::new("DUPF", Op::DupFrame),    // 'K'
    OpInfo::new("LEND", Op::LoopReset),   // 'L'
    OpInfo::new("MATH", Op::Math),        // 'M'
    OpInfo::new("CLRF", Op::ClearFrame),  // 'N'
    OpInfo::new("FOUT", Op::BindOutput),  // 'O'
    // 0x50-0x5F
    OpInfo::new("LOAD", Op::LoadProgram), // 'P'
    OpInfo::new("QUIT", Op::Quit),        // 'Q'
    OpInfo::new("RET", Op::Ret),          // 'R'
    OpInfo::new("SETP", Op::SetCell),     // 'S'
    OpInfo::new("TMAJ", Op::TimeMajor),   // 'T'
    OpInfo::new("CURP", Op::CurProgram),  // 'U'
    OpInfo::new("NXTP", Op::NextProgram), // 'V'
    OpInfo::new("WRAP", Op::Wrap),        // 'W'
    OpInfo::new("EXEP", Op::ExecProgram), // 'X'
    OpInfo::new("CLRR", Op::ClearRegisters), // 'Y'
    OpInfo::new("RAND", Op::Rand),        // 'Z'
    OpInfo::new("TRNL", Op::TurnLeft),    // '['
    OpInfo::new("SWP", Op::Swap),         // '\\'
    OpInfo::new("TRNR", Op::TurnRight),   // ']'
    OpInfo::new("MVN", Op::MoveNorth),    // '^'
    OpInfo::new("WEIF", Op::IfWestEast),  // '_'
    // 0x60-0x6F
    OpInfo::new("GT", Op::Gt),            // '`'
    OpInfo::new("VA", Op::Digit(0xA)),    // 'a'
    OpInfo::new("VB", Op::Digit(0xB)),    // 'b'
    OpInfo::new("VC", Op::Digit(0xC)),    // 'c'
    OpInfo::new("VD", Op::Digit(0xD)),    // 'd'
    OpInfo::new("VE", Op::Digit(0xE)),    // 'e'
    OpInfo::new("VF", Op::Digit(0xF)),    // 'f'
    OpInfo::new("GETR", Op::GetRegister), // 'g'
    OpInfo::new("BMPN", Op::BumpNorth),   // 'h'
    OpInfo::new("GETS", Op::ReadLine),    // 'i'
    OpInfo::new("JREL", Op::JumpRel),     // 'j'
    OpInfo::new("ITER", Op::Iterate),     // 'k'
    OpInfo::new("LOOP", Op::LoopCount),   // 'l'
    OpInfo::new("NIF", Op::IfNorth),      // 'm'
    OpInfo::new("ENDL", Op::Newline),     // 'n'
    OpInfo::new("PUTS", Op::PutString),   // 'o'
    // 0x70-0x7F
    OpInfo::new("SWPR", Op::SwapRegister), // 'p'
    OpInfo::new("EXIT", Op::Exit),        // 'q'
    OpInfo::new("REVS", Op::ReverseString), // 'r'
    OpInfo::new("SETR", Op::SetRegister), // 's'
    OpInfo::new("TMIN", Op::TimeMinor),   // 't'
    OpInfo::new("JOIN", Op::Join),        // 'u'
    OpInfo::new("MVS", Op::MoveSouth),    // 'v'
    OpInfo::new("SIF", Op::IfSouth),      // 'w'
    OpInfo::new("EXEC", Op::Exec),        // 'x'
    OpInfo::new("BMPS", Op::BumpSouth),   // 'y'
    OpInfo::new("WAIT", Op::Sleep),       // 'z'
    OpInfo::new("BLK", Op::BlockOpen),    // '{'
    OpInfo::new("NSIF", Op::IfNorthSouth), // '|'
    OpInfo::new("BEND", Op::BlockClose),  // '}'
    OpInfo::new("GETC", Op::GetChar),     // '~'
    OpInfo::new("NOP", Op::Nop),          // DEL
    // 0x80-0x8F (extended, undefined)
    OpInfo::new("OP80", Op::Undefined),
    OpInfo::new("OP81", Op::Undefined),
    OpInfo::new("OP82", Op::Undefined),
    OpInfo::new("OP83", Op::Undefined),
    OpInfo::new("OP84", Op::Undefined),
    OpInfo::new("OP85", Op::Undefined),
    OpInfo::new("OP86", Op::Undefined),
    OpInfo::new("OP87", Op::Undefined),
    OpInfo::new("OP88", Op::Undefined),
    OpInfo::new("OP89", Op::Undefined),
    OpInfo::new("OP8A", Op::Undefined),
    OpInfo::new("OP8B", Op::Undefined),
    OpInfo::new("OP8C", Op::Undefined),
    OpInfo::new("OP8D", Op::Undefined),
    OpInfo::new("OP8E", Op::Undefined),
    OpInfo::new("OP8F", Op::Undefined),
    // 0x90-0x9F (extended, undefined)
    OpInfo::new("OP90", Op::Undefined),
    OpInfo::new("OP91", Op::Undefined),
    OpInfo::new("OP92", Op::Undefined),
    OpInfo::new("OP93", Op::Undefined),
    OpInfo::new("OP94", Op::Undefined),
    OpInfo::new("OP95", Op::Undefined),
    OpInfo::new("OP96", Op::Undefined),
    OpInfo::new("OP97", Op::Undefined),
    OpInfo::new("OP98", Op::Undefined),
    OpInfo::new("OP99", Op::Undefined),
    OpInfo::new("OP9A", Op::Undefined),
    OpInfo::new("OP9B", Op::Undefined),
    OpInfo::new("OP9C", Op::Undefined),
    OpInfo::new("OP9D", Op::Undefined),
    OpInfo::new("OP9E", Op::Undefined),
    OpInfo::new("OP9F", Op::Undefined),
    // 0xA0-0xAF (extended, undefined)
    OpInfo::new("OPA0", Op::Undefined),
    OpInfo::new("OPA1", Op::Undefined),
    OpInfo::new("OPA2", Op::Undefined),
    OpInfo::new("OPA3", Op::Undefined),
    OpInfo::new("OPA4", Op::Undefined),
    OpInfo::new("OPA5", Op::Undefined),
    OpInfo::new("OPA6", Op::Undefined),
    OpInfo::new("OPA7", Op::Undefined),
    OpInfo::new("OPA8", Op::Undefined),
    OpInfo::new("OPA9", Op::Undefined),
    OpInfo::new("OPAA", Op::Undefined),
    OpInfo::new("OPAB", Op::Undefined),
    OpInfo::new("OPAC", Op::Undefined),
    OpInfo::new("OPAD", Op::Undefined),
    OpInfo::new("OPAE", Op::Undefined),
    OpInfo::new("OPAF", Op::Undefined),
    // 0xB0-0xBF (extended, undefined)
    OpInfo::new("OPB0", Op::Undefined),
    OpInfo::new("OPB1", Op::Undefined),
    OpInfo::new("OPB2", Op::Undefined),
    OpInfo::new("OPB3", Op::Undefined),
    OpInfo::new("OPB4", Op::Undefined),
    OpInfo::new("OPB5", Op::Undefined),
    OpInfo::new("OPB6", Op::Undefined),
    OpInfo::new("OPB7", Op::Undefined),
    OpInfo::new("OPB8", Op::Undefined),
    OpInfo::new("OPB9", Op::Undefined),
    OpInfo::new("OPBA", Op::Undefined),
    OpInfo::new("OPBB", Op::Undefined),
    OpInfo::new("OPBC", Op::Undefined),
    OpInfo::new("OPBD", Op::Undefined),
    OpInfo::new("OPBE", Op::Undefined),
    OpInfo::new("OPBF", Op::Undefined),
    // 0xC0-0xCF (extended, undefined)
    OpInfo::new("OPC0", Op::Undefined),
    OpInfo::new("OPC1", Op::Undefined),
    OpInfo::new("OPC2", Op::Undefined),
    OpInfo::new("OPC3", Op::Undefined),
    OpInfo::new("OPC4", Op::Undefined),
    OpInfo::new("OPC5", Op::Undefined),
    OpInfo::new("OPC6", Op::Undefined),
    OpInfo::new("OPC7", Op::Undefined),
    OpInfo::new("OPC8", Op::Undefined),
    OpInfo::new("OPC9", Op::Undefined),
    OpInfo::new("OPCA", Op::Undefined),
    OpInfo::new("OPCB", Op::Undefined),
    OpInfo::new("OPCC", Op::Undefined),
    OpInfo::new("OPCD", Op::Undefined),
    OpInfo::new("OPCE", Op::Undefined),
    OpInfo::new("OPCF", Op::Undefined),
    // 0xD0-0xDF (extended, undefined)
    OpInfo::new("OPD0", Op::Undefined),
    OpInfo::new("OPD1", Op::Undefined),
    OpInfo::new("OPD2", Op::Undefined),
    OpInfo::new("OPD3", Op::Undefined),
    OpInfo::new("OPD4", Op::Undefined),
    OpInfo::new("OPD5", Op::Undefined),
    OpInfo::new("OPD6", Op::Undefined),
    OpInfo::new("OPD7", Op::Undefined),
    OpInfo::new("OPD8", Op::Undefined),
    OpInfo::new("OPD9", Op::Undefined),
    OpInfo::new("OPDA", Op::Undefined),
    OpInfo::new("OPDB", Op::Undefined),
    OpInfo::new("OPDC", Op::Undefined),
    OpInfo::new("OPDD", Op::Undefined),
    OpInfo::new("OPDE", Op::Undefined),
    OpInfo::new("OPDF", Op::Undefined),
    // 0xE0-0xEF (extended, undefined)
    OpInfo::new("OPE0", Op::Undefined),
    OpInfo::new("OPE1", Op::Undefined),
    OpInfo::new("OPE2", Op::Undefined),
    OpInfo::new("OPE3", Op::Undefined),
    OpInfo::new("OPE4", Op::Undefined),
    OpInfo::new("OPE5", Op::Undefined),
    OpInfo::new("OPE6", Op::Undefined),
    OpInfo::new("OPE7", Op::Undefined),
    OpInfo::new("OPE8", Op::Undefined),
    OpInfo::new("OPE9", Op::Undefined),
    OpInfo::new("OPEA", Op::Undefined),
    OpInfo::new("OPEB", Op::Undefined),
    OpInfo::new("OPEC", Op::Undefined),
    OpInfo::new("OPED", Op::Undefined),
    OpInfo::new("OPEE", Op::Undefined),
    OpInfo::new("OPEF", Op::Undefined),
    // 0xF0-0xFF (extended, undefined)
    OpInfo::new("OPF0", Op::Undefined),
    OpInfo::new("OPF1", Op::Undefined),
    OpInfo::new("OPF2", Op::Undefined),
    OpInfo::new("OPF3", Op::Undefined),
    OpInfo::new("OPF4", Op::Undefined),
    OpInfo::new("OPF5", Op::Undefined),
    OpInfo::new("OPF6", Op::Undefined),
    OpInfo::new("OPF7", Op::Undefined),
    OpInfo::new("OPF8", Op::Undefined),
    OpInfo::new("OPF9", Op::Undefined),
    OpInfo::new("OPFA", Op::Undefined),
    OpInfo::new("OPFB", Op::Undefined),
    OpInfo::new("OPFC", Op::Undefined),
    OpInfo::new("OPFD", Op::Undefined),
    OpInfo::new("OPFE", Op::Undefined),
    OpInfo::new("OPFF", Op::Undefined),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_printable_byte_is_defined() {
        for byte in 0x20..=0x7Fu8 {
            assert_ne!(
                lookup(byte).op,
                Op::Undefined,
                "byte 0x{byte:02x} should be defined"
            );
        }
    }

    #[test]
    fn test_bytes_outside_printable_range_are_undefined() {
        for byte in (0x00..0x20u8).chain(0x80..=0xFFu8) {
            assert_eq!(
                lookup(byte).op,
                Op::Undefined,
                "byte 0x{byte:02x} should be undefined"
            );
        }
    }

    #[test]
    fn test_digit_entries_carry_their_nibble() {
        for (byte, nibble) in (b'0'..=b'9').zip(0x0..=0x9) {
            assert_eq!(lookup(byte).op, Op::Digit(nibble));
        }
        for (byte, nibble) in (b'a'..=b'f').zip(0xA..=0xF) {
            assert_eq!(lookup(byte).op, Op::Digit(nibble));
        }
    }

    #[test]
    fn test_mnemonics_match_bytes() {
        assert_eq!(lookup(b' ').mnemonic, "SKIP");
        assert_eq!(lookup(b'Q').mnemonic, "QUIT");
        assert_eq!(lookup(b'q').mnemonic, "EXIT");
        assert_eq!(lookup(b'~').mnemonic, "GETC");
        assert_eq!(lookup(0x7F).mnemonic, "NOP");
        assert_eq!(lookup(0x80).mnemonic, "OP80");
    }
}
