use std::fmt::Write as _;
use std::io::Read;
use std::ops::Range;

use log::info;

use crate::constants::{MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET};
use crate::error::{Error, Result};

/// # Memory
/// 4096 bytes of flat, byte addressable RAM.
///
/// ```text
/// 0x000-0x04F  sprite sheet (hex digit font)
/// 0x050-0x1FF  unused
/// 0x200-0xFFF  program and data
/// ```
///
/// Every access is bounds checked; touching anything past `0xFFF` is an
/// [`Error::MemoryOutOfBounds`].
pub struct Memory {
    bytes: Box<[u8; MEMORY_SIZE]>,
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = Box::new([0; MEMORY_SIZE]);
        bytes[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        Memory { bytes }
    }

    pub fn read_byte(&self, addr: u16) -> Result<u8> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Error::MemoryOutOfBounds {
                address: addr as usize,
            })
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<()> {
        match self.bytes.get_mut(addr as usize) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(Error::MemoryOutOfBounds {
                address: addr as usize,
            }),
        }
    }

    /// Reads the big-endian word at `addr..=addr + 1`.
    /// Instructions are two bytes wide, so this is what the fetch uses.
    pub fn read_word(&self, addr: u16) -> Result<u16> {
        let high = self.read_byte(addr)?;
        let low = self.read_byte(addr.wrapping_add(1))?;
        Ok(u16::from_be_bytes([high, low]))
    }

    /// Copies `program` into memory starting at `0x200`.
    ///
    /// Nothing is written if the program would run past the end of memory.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        let start = PROGRAM_START as usize;
        let end = start + program.len();
        if end > MEMORY_SIZE {
            return Err(Error::MemoryOutOfBounds {
                address: MEMORY_SIZE,
            });
        }
        self.bytes[start..end].copy_from_slice(program);
        info!("loaded program [size: {} bytes]", program.len());
        Ok(())
    }

    /// Reads `reader` to the end and loads the bytes as a program.
    /// Returns the program size.
    pub fn load_from(&mut self, reader: &mut dyn Read) -> Result<usize> {
        let mut program = Vec::new();
        reader.read_to_end(&mut program)?;
        self.load_program(&program)?;
        Ok(program.len())
    }

    /// A read-only view of `range`, clamped to the end of memory
    pub fn slice(&self, range: Range<usize>) -> &[u8] {
        let end = range.end.min(MEMORY_SIZE);
        let start = range.start.min(end);
        &self.bytes[start..end]
    }

    /// Hex dump of `range`, 16 bytes (8 words) per line:
    /// ```text
    /// 00000200: 00e0 a22a 600c 6108 d01f 7009 a239 d01f
    /// ```
    pub fn dump(&self, range: Range<usize>) -> String {
        let end = range.end.min(MEMORY_SIZE);
        let mut out = String::new();
        let mut line = range.start - range.start % 16;
        while line < end {
            let _ = write!(out, "{:08x}:", line);
            for word in self.bytes[line..(line + 16).min(MEMORY_SIZE)].chunks(2) {
                out.push(' ');
                for byte in word {
                    let _ = write!(out, "{:02x}", byte);
                }
            }
            out.push('\n');
            line += 16;
        }
        out
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_seeds_font() {
        let m = Memory::new();
        assert_eq!(m.slice(0..80), &SPRITE_SHEET[..]);
    }

    #[test]
    fn test_memory_zeroed_past_font() {
        let m = Memory::new();
        assert!(m.slice(80..MEMORY_SIZE).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_word_is_big_endian() -> Result<()> {
        let mut m = Memory::new();
        m.write_byte(0x300, 0xAB)?;
        m.write_byte(0x301, 0xCD)?;
        assert_eq!(m.read_word(0x300)?, 0xABCD);
        Ok(())
    }

    #[test]
    fn test_read_out_of_bounds() {
        let m = Memory::new();
        assert!(matches!(
            m.read_byte(0x1000),
            Err(Error::MemoryOutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_read_word_straddling_end() {
        let m = Memory::new();
        assert!(matches!(
            m.read_word(0x0FFF),
            Err(Error::MemoryOutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_write_out_of_bounds() {
        let mut m = Memory::new();
        assert!(m.write_byte(0xFFFF, 0x1).is_err());
    }

    #[test]
    fn test_program_load_ok() -> Result<()> {
        let mut m = Memory::new();
        m.load_program(&[0x00, 0xE0, 0x12, 0x02])?;
        assert_eq!(m.slice(0x200..0x204), &[0x00, 0xE0, 0x12, 0x02]);
        Ok(())
    }

    #[test]
    fn test_program_load_fills_memory() -> Result<()> {
        let mut m = Memory::new();
        m.load_program(&[0xFF; MEMORY_SIZE - 0x200])?;
        assert_eq!(m.read_byte(0xFFF)?, 0xFF);
        Ok(())
    }

    #[test]
    fn test_program_load_too_large() {
        let mut m = Memory::new();
        assert!(m.load_program(&[0xFF; MEMORY_SIZE - 0x1FF]).is_err());
        // nothing was written
        assert_eq!(m.read_byte(0x200).unwrap(), 0x00);
    }

    #[test]
    fn test_load_from_reader() -> Result<()> {
        let mut m = Memory::new();
        let mut src: &[u8] = &[0x60, 0x01, 0x70, 0x02];
        assert_eq!(m.load_from(&mut src)?, 4);
        assert_eq!(m.read_word(0x202)?, 0x7002);
        Ok(())
    }

    #[test]
    fn test_dump() -> Result<()> {
        let mut m = Memory::new();
        m.load_program(&[0x00, 0xE0, 0xA2, 0x2A])?;
        let dump = m.dump(0x200..0x210);
        assert_eq!(
            dump,
            "00000200: 00e0 a22a 0000 0000 0000 0000 0000 0000\n"
        );
        Ok(())
    }

    #[test]
    fn test_dump_aligns_to_lines() {
        let m = Memory::new();
        let dump = m.dump(0x4C..0x52);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000040: "));
        assert!(lines[1].starts_with("00000050: "));
    }
}
