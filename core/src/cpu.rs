use crate::constants::{PROGRAM_START, REGISTER_COUNT, STACK_DEPTH};
use crate::error::{Error, Result};

/// # CPU
///
/// ## Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) doubles as the carry/borrow/collision flag
/// - (i) a 16-bit memory address register
///
/// ## Counter
/// - (pc) a 16-bit program counter, starting at `0x200`
///
/// ## Stack
/// - 16 return addresses and a pointer to the next free slot
///
/// The delay and sound timers are not in here; see [`Timers`](crate::Timers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    sp: usize,
    stack: [u16; STACK_DEPTH],
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
        }
    }

    /// Moves the program counter past the current instruction
    pub fn advance(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Skips the next instruction. Called after `advance`, so the program
    /// counter ends up 4 bytes past the skipping instruction.
    pub fn skip(&mut self) {
        self.advance();
    }

    /// VF = 1 if `set` else 0
    pub fn set_flag(&mut self, set: bool) {
        self.v[0xF] = u8::from(set);
    }

    /// Pushes the program counter onto the call stack
    pub fn push(&mut self) -> Result<()> {
        if self.sp == STACK_DEPTH {
            return Err(Error::StackOverflow {
                pc: self.pc.wrapping_sub(2),
            });
        }
        self.stack[self.sp] = self.pc;
        self.sp += 1;
        Ok(())
    }

    /// Pops the most recent return address off the call stack
    pub fn pop(&mut self) -> Result<u16> {
        if self.sp == 0 {
            return Err(Error::StackUnderflow {
                pc: self.pc.wrapping_sub(2),
            });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }

    /// Number of return addresses currently on the stack
    pub fn stack_depth(&self) -> usize {
        self.sp
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_program() {
        let cpu = Cpu::new();
        assert_eq!(cpu.pc, 0x200);
        assert_eq!(cpu.stack_depth(), 0);
    }

    #[test]
    fn test_push_pop() -> Result<()> {
        let mut cpu = Cpu::new();
        cpu.pc = 0x0ABC;
        cpu.push()?;
        cpu.pc = 0x0300;
        assert_eq!(cpu.stack_depth(), 1);
        assert_eq!(cpu.pop()?, 0x0ABC);
        assert_eq!(cpu.stack_depth(), 0);
        Ok(())
    }

    #[test]
    fn test_push_overflows() {
        let mut cpu = Cpu::new();
        for _ in 0..STACK_DEPTH {
            cpu.push().unwrap();
        }
        assert!(matches!(
            cpu.push(),
            Err(Error::StackOverflow { pc: 0x01FE })
        ));
        assert_eq!(cpu.stack_depth(), STACK_DEPTH);
    }

    #[test]
    fn test_pop_underflows() {
        let mut cpu = Cpu::new();
        cpu.pc = 0x0206;
        assert!(matches!(cpu.pop(), Err(Error::StackUnderflow { pc: 0x0204 })));
    }

    #[test]
    fn test_set_flag() {
        let mut cpu = Cpu::new();
        cpu.set_flag(true);
        assert_eq!(cpu.v[0xF], 1);
        cpu.set_flag(false);
        assert_eq!(cpu.v[0xF], 0);
    }
}
