use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::cpu::Cpu;
use crate::display::Display;
use crate::error::Result;
use crate::instruction::from_op;
use crate::keypad::Keyboard;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::operations::Machine;
use crate::timer::Timers;

/// Outcome of a single [`Interpreter::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The program is spinning on a jump to itself
    Halted,
}

/// # Interpreter
/// Fetches, decodes and executes one instruction at a time.
///
/// Tracks:
///  - the `cpu` registers and call stack
///  - `memory`
///  - the `previous` instruction, for idle loop detection
///
/// Drives, but doesn't own the state of:
///  - a [`Display`] and a [`Keyboard`]
///  - the shared [`Timers`], which something else ticks at 60Hz
pub struct Interpreter<D, K> {
    cpu: Cpu,
    memory: Memory,
    timers: Arc<Timers>,
    display: D,
    keyboard: K,
    rng: StdRng,
    config: Config,
    previous: Option<u16>,
}

impl<D: Display, K: Keyboard> Interpreter<D, K> {
    pub fn new(display: D, keyboard: K, config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Interpreter {
            cpu: Cpu::new(),
            memory: Memory::new(),
            timers: Arc::new(Timers::new()),
            display,
            keyboard,
            rng,
            config,
            previous: None,
        }
    }

    /// Load a program at `0x200`
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load_program(program)
    }

    /// Load a program from a source file
    ///
    /// # Arguments
    /// * `reader` a reader over the program bytes
    pub fn load_from(&mut self, reader: &mut dyn Read) -> Result<usize> {
        self.memory.load_from(reader)
    }

    /// The timers, for handing to a [`TimerScheduler`](crate::TimerScheduler)
    pub fn timers(&self) -> Arc<Timers> {
        Arc::clone(&self.timers)
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    /// Runs a single fetch/decode/execute cycle
    /// - fetches the opcode at the pc
    /// - halts if it repeats a jump to the same address (when enabled)
    /// - moves the pc past it
    /// - executes it; unrecognised opcodes do nothing
    pub fn step(&mut self) -> Result<Step> {
        let pc = self.cpu.pc;
        let op = self.memory.read_word(pc)?;

        if self.config.halt_on_idle_loop && is_idle_loop(self.previous, op) {
            debug!("halting on idle loop at {:04X}: {:04X}", pc, op);
            return Ok(Step::Halted);
        }

        self.cpu.advance();
        trace!("{:04X}: {:04X} [family {:X}]", pc, op, op.family());

        match from_op(&op) {
            Some(operation) => {
                let mut machine = Machine {
                    cpu: &mut self.cpu,
                    memory: &mut self.memory,
                    timers: &self.timers,
                    display: &mut self.display,
                    keyboard: &mut self.keyboard,
                    rng: &mut self.rng,
                };
                operation(&op, &mut machine)?;
            }
            None => debug!("ignoring unrecognised opcode {:04X} at {:04X}", op, pc),
        }

        self.previous = Some(op);
        Ok(Step::Continue)
    }

    /// Runs until the program halts or fails
    pub fn run(&mut self) -> Result<()> {
        self.run_until(&AtomicBool::new(false))
    }

    /// Runs until the program halts or fails, or `stop` is set
    pub fn run_until(&mut self, stop: &AtomicBool) -> Result<()> {
        let cycle_time = self
            .config
            .instructions_per_second
            .filter(|&ips| ips > 0)
            .map(|ips| Duration::from_nanos(1_000_000_000 / u64::from(ips)));
        let mut last_cycle = Instant::now();

        while !stop.load(Ordering::Relaxed) {
            if self.step()? == Step::Halted {
                break;
            }

            if let Some(cycle_time) = cycle_time {
                let elapsed_cycle_time = last_cycle.elapsed();
                if cycle_time > elapsed_cycle_time {
                    thread::sleep(cycle_time - elapsed_cycle_time);
                }
                last_cycle = Instant::now();
            }
        }
        Ok(())
    }

    /// Runs at most `steps` cycles
    pub fn run_for(&mut self, steps: usize) -> Result<Step> {
        for _ in 0..steps {
            if self.step()? == Step::Halted {
                return Ok(Step::Halted);
            }
        }
        Ok(Step::Continue)
    }
}

/// Two consecutive `1nnn` jumps to the same address
fn is_idle_loop(previous: Option<u16>, op: u16) -> bool {
    match previous {
        Some(prev) => prev.family() == 0x1 && op.family() == 0x1 && prev.addr() == op.addr(),
        None => false,
    }
}
