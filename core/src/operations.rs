use rand::rngs::StdRng;
use rand::Rng;

use crate::constants::GLYPH_BYTES;
use crate::cpu::Cpu;
use crate::display::Display;
use crate::error::Result;
use crate::keypad::Keyboard;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::timer::Timers;

/// Everything an operation may read or change.
///
/// The program counter has already been moved past the executing instruction.
pub struct Machine<'a> {
    pub cpu: &'a mut Cpu,
    pub memory: &'a mut Memory,
    pub timers: &'a Timers,
    pub display: &'a mut dyn Display,
    pub keyboard: &'a mut dyn Keyboard,
    pub rng: &'a mut StdRng,
}

pub type Operation = fn(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()>;

/// clear
pub fn clr(_op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.display.clear();
    Ok(())
}

/// PC = STACK.pop()
pub fn rts(_op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.pc = m.cpu.pop()?;
    Ok(())
}

/// PC = addr
pub fn jump(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.pc = op.addr();
    Ok(())
}

/// STACK.push(PC); PC = addr
pub fn call(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.push()?;
    m.cpu.pc = op.addr();
    Ok(())
}

/// if Vx == kk then pc += 2
pub fn ske(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    if m.cpu.v[op.x()] == op.kk() {
        m.cpu.skip();
    }
    Ok(())
}

/// if Vx != kk then pc += 2
pub fn skne(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    if m.cpu.v[op.x()] != op.kk() {
        m.cpu.skip();
    }
    Ok(())
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    if m.cpu.v[op.x()] == m.cpu.v[op.y()] {
        m.cpu.skip();
    }
    Ok(())
}

/// Vx = kk
pub fn load(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.v[op.x()] = op.kk();
    Ok(())
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it
pub fn add(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let v = &mut m.cpu.v;
    v[op.x()] = v[op.x()].wrapping_add(op.kk());
    Ok(())
}

/// Vx = Vy
pub fn mv(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let v = &mut m.cpu.v;
    v[op.x()] = v[op.y()];
    Ok(())
}

/// Vx |= Vy
pub fn or(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let v = &mut m.cpu.v;
    v[op.x()] |= v[op.y()];
    Ok(())
}

/// Vx &= Vy
pub fn and(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let v = &mut m.cpu.v;
    v[op.x()] &= v[op.y()];
    Ok(())
}

/// Vx ^= Vy
pub fn xor(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let v = &mut m.cpu.v;
    v[op.x()] ^= v[op.y()];
    Ok(())
}

// The flag setting operations below write VF last, so with x = F the flag
// wins over the result.

/// Vx += Vy; VF = overflow
pub fn addr(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let (res, over) = m.cpu.v[op.x()].overflowing_add(m.cpu.v[op.y()]);
    m.cpu.v[op.x()] = res;
    m.cpu.set_flag(over);
    Ok(())
}

/// Vx -= Vy; VF = Vx > Vy
pub fn sub(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let (vx, vy) = (m.cpu.v[op.x()], m.cpu.v[op.y()]);
    m.cpu.v[op.x()] = vx.wrapping_sub(vy);
    m.cpu.set_flag(vx > vy);
    Ok(())
}

/// Vx >>= 1; VF = lsb
pub fn shr(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let vx = m.cpu.v[op.x()];
    m.cpu.v[op.x()] = vx >> 1;
    m.cpu.set_flag(vx & 0x1 == 0x1);
    Ok(())
}

/// Vx = Vy - Vx; VF = Vy > Vx
pub fn subn(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let (vx, vy) = (m.cpu.v[op.x()], m.cpu.v[op.y()]);
    m.cpu.v[op.x()] = vy.wrapping_sub(vx);
    m.cpu.set_flag(vy > vx);
    Ok(())
}

/// Vx <<= 1; VF = msb
pub fn shl(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let vx = m.cpu.v[op.x()];
    m.cpu.v[op.x()] = vx << 1;
    m.cpu.set_flag((vx >> 7) & 0x1 == 0x1);
    Ok(())
}

/// if Vx != Vy then pc +=2
pub fn skrne(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    if m.cpu.v[op.x()] != m.cpu.v[op.y()] {
        m.cpu.skip();
    }
    Ok(())
}

/// I = addr
pub fn loadi(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.i = op.addr();
    Ok(())
}

/// PC = V0 + addr
pub fn jumpi(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.pc = u16::from(m.cpu.v[0x0]) + op.addr();
    Ok(())
}

/// Vx = rand_byte & kk
pub fn rand(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let rand_byte: u8 = m.rng.gen();
    m.cpu.v[op.x()] = rand_byte & op.kk();
    Ok(())
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite at memory I..I+n onto the display at Vx, Vy with wrapping.
/// Sets VF if any pixels were erased
pub fn draw(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let x = m.cpu.v[op.x()] as usize;
    let y = m.cpu.v[op.y()] as usize;
    let mut collision = false;

    for row in 0..op.n() {
        let line = m.memory.read_byte(m.cpu.i.wrapping_add(u16::from(row)))?;
        for bit in 0..8 {
            if line & (0x80 >> bit) != 0 && m.display.set_pixel(x + bit, y + row as usize) {
                collision = true;
            }
        }
    }

    m.cpu.set_flag(collision);
    Ok(())
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    if m.keyboard.is_key_pressed(m.cpu.v[op.x()]) {
        m.cpu.skip();
    }
    Ok(())
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    if !m.keyboard.is_key_pressed(m.cpu.v[op.x()]) {
        m.cpu.skip();
    }
    Ok(())
}

/// Vx = DT
pub fn moved(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.v[op.x()] = m.timers.snapshot().delay;
    Ok(())
}

/// await keypress for Vx
pub fn keyd(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.v[op.x()] = m.keyboard.wait_for_key()?;
    Ok(())
}

/// DT = Vx
pub fn loads(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.timers.set_delay(m.cpu.v[op.x()]);
    Ok(())
}

/// ST = Vx
pub fn ld(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.timers.set_sound(m.cpu.v[op.x()]);
    Ok(())
}

/// I += Vx
pub fn addi(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.i = m.cpu.i.wrapping_add(u16::from(m.cpu.v[op.x()]));
    Ok(())
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    m.cpu.i = u16::from(m.cpu.v[op.x()]) * GLYPH_BYTES;
    Ok(())
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    let vx = m.cpu.v[op.x()];
    let digits = [vx / 100 % 10, vx / 10 % 10, vx % 10];
    for (offset, digit) in (0u16..).zip(digits.iter()) {
        m.memory.write_byte(m.cpu.i.wrapping_add(offset), *digit)?;
    }
    Ok(())
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    for (offset, value) in (0u16..).zip(m.cpu.v[..=op.x()].iter()) {
        m.memory.write_byte(m.cpu.i.wrapping_add(offset), *value)?;
    }
    Ok(())
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: &dyn Opcode, m: &mut Machine<'_>) -> Result<()> {
    for r in 0..=op.x() {
        m.cpu.v[r] = m.memory.read_byte(m.cpu.i.wrapping_add(r as u16))?;
    }
    Ok(())
}
