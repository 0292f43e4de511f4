use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that stops the interpreter.
///
/// Unrecognised opcodes are not in here: they are skipped, not reported.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("stack overflow: CALL at {pc:#06X} with all 16 return addresses in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: RET at {pc:#06X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("input closed while waiting for a key press")]
    InputClosed,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
