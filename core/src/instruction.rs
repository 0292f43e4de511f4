use crate::opcode::Opcode;
use crate::operations::*;

/// Operations selected by the most significant nibble alone.
/// Families 0, 8, E and F are resolved by a second table.
const FAMILIES: [Option<Operation>; 16] = [
    None,        // 0 -> SYSTEM
    Some(jump),  // 1nnn
    Some(call),  // 2nnn
    Some(ske),   // 3xkk
    Some(skne),  // 4xkk
    Some(skre),  // 5xy0
    Some(load),  // 6xkk
    Some(add),   // 7xkk
    None,        // 8 -> ALU
    Some(skrne), // 9xy0
    Some(loadi), // Annn
    Some(jumpi), // Bnnn
    Some(rand),  // Cxkk
    Some(draw),  // Dxyn
    None,        // E -> KEYS
    None,        // F -> MISC
];

/// 8xyn, indexed by n
const ALU: [Option<Operation>; 16] = [
    Some(mv),   // 8xy0
    Some(or),   // 8xy1
    Some(and),  // 8xy2
    Some(xor),  // 8xy3
    Some(addr), // 8xy4
    Some(sub),  // 8xy5
    Some(shr),  // 8xy6
    Some(subn), // 8xy7
    None,
    None,
    None,
    None,
    None,
    None,
    Some(shl), // 8xyE
    None,
];

/// 0_kk
const SYSTEM: [(u8, Operation); 2] = [(0xE0, clr), (0xEE, rts)];

/// Ex_kk
const KEYS: [(u8, Operation); 2] = [(0x9E, skpr), (0xA1, skup)];

/// Fx_kk
const MISC: [(u8, Operation); 9] = [
    (0x07, moved),
    (0x0A, keyd),
    (0x15, loads),
    (0x18, ld),
    (0x1E, addi),
    (0x29, ldspr),
    (0x33, bcd),
    (0x55, stor),
    (0x65, read),
];

fn by_low_byte(table: &[(u8, Operation)], kk: u8) -> Option<Operation> {
    table
        .iter()
        .find(|(code, _)| *code == kk)
        .map(|&(_, operation)| operation)
}

/// Selects the Operation for a given Opcode.
///
/// `None` for unrecognised sub-codes (including `0nnn` machine code calls);
/// those are skipped rather than treated as errors.
pub fn from_op(op: &dyn Opcode) -> Option<Operation> {
    match op.family() {
        0x0 => by_low_byte(&SYSTEM, op.kk()),
        0x8 => ALU[op.n() as usize],
        0xE => by_low_byte(&KEYS, op.kk()),
        0xF => by_low_byte(&MISC, op.kk()),
        family => FAMILIES[family as usize],
    }
}
