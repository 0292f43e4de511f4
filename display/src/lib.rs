//! SDL2 front end for the CHIP-8 interpreter: a window that renders frame
//! buffers and a buzzer for the sound timer.
pub use audio::Buzzer;
pub use error::{Error, Result};
pub use window::Window;

mod audio;
mod error;
mod window;
