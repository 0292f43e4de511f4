//! A CHIP-8 virtual machine.
//!
//! [`Interpreter`] runs programs against any [`Display`] and [`Keyboard`];
//! the delay and sound [`Timers`] are ticked separately by a
//! [`TimerScheduler`].
pub use config::Config;
pub use cpu::Cpu;
pub use display::{Display, FrameBuffer, SharedFrameBuffer};
pub use error::{Error, Result};
pub use interpreter::{Interpreter, Step};
pub use keypad::{Keyboard, Keypad};
pub use memory::Memory;
pub use opcode::Opcode;
pub use timer::{Beep, Beeper, Mute, Tick, TimerScheduler, TimerSnapshot, Timers};

mod config;
pub mod constants;
mod cpu;
mod display;
mod error;
mod instruction;
mod interpreter;
mod keypad;
mod memory;
mod opcode;
mod operations;
mod timer;
