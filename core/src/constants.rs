/// Addressable memory in bytes
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded (and the program counter starts) here
pub const PROGRAM_START: u16 = 0x200;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Number of return addresses the call stack can hold
pub const STACK_DEPTH: usize = 16;

pub const REGISTER_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Delay and sound timers count down this many times per second
pub const TIMER_HZ: u32 = 60;

/// Bytes per glyph in the built-in font
pub const GLYPH_BYTES: u16 = 5;

/// # Sprite sheet
/// Hexadecimal digits 0..F, each a 4px wide by 5px tall sprite.
///
/// Only the high nibble of each byte is drawn:
/// ```text
/// 0xF0 -> ████
/// 0x90 -> █  █
/// 0x90 -> █  █
/// 0x90 -> █  █
/// 0xF0 -> ████
/// ```
/// The sheet occupies `0x000..0x050`.
#[rustfmt::skip]
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
