use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, info};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use thiserror::Error;

use chip8_core::constants::PROGRAM_START;
use chip8_core::{Beep, Config, Interpreter, Keypad, SharedFrameBuffer, TimerScheduler};
use chip8_display::{Buzzer, Window};

use crate::keymap::keymap;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("unable to read ROM: {0}")]
    Rom(#[from] std::io::Error),

    #[error(transparent)]
    Interpreter(#[from] chip8_core::Error),

    #[error(transparent)]
    Display(#[from] chip8_display::Error),

    #[error("interpreter thread panicked")]
    Panicked,
}

impl From<String> for RunError {
    fn from(message: String) -> Self {
        RunError::Display(message.into())
    }
}

type Running = JoinHandle<chip8_core::Result<()>>;

/// Runs `rom` until the window is closed or the program fails.
///
/// The interpreter runs on its own thread; this thread owns SDL, so it
/// forwards key events to the keypad, renders frames as they change and turns
/// sound timer beeps into a tone.
pub fn run(rom: &Path, config: Config, scale: u32, dump: bool) -> Result<(), RunError> {
    let frame = SharedFrameBuffer::new();
    let keypad = Keypad::new();
    let mut interpreter = Interpreter::new(frame.clone(), keypad.clone(), config);

    // Load ROM
    let file = File::open(rom)?;
    let mut reader = BufReader::new(file);
    let size = interpreter.load_from(&mut reader)?;
    if dump {
        let start = PROGRAM_START as usize;
        info!("program memory:\n{}", interpreter.memory().dump(start..start + size));
    }

    // Get SDL2 context
    let sdl = sdl2::init()?;
    let mut window = Window::new(&sdl, scale)?;
    let mut buzzer = Buzzer::new(&sdl, TimerScheduler::period() * 2)?;
    let mut events = sdl.event_pump()?;

    let (beeper, beeps) = mpsc::channel::<Beep>();
    let mut scheduler = TimerScheduler::spawn(interpreter.timers(), beeper)?;

    let stop = Arc::new(AtomicBool::new(false));
    let mut running: Option<Running> = Some(
        thread::Builder::new()
            .name("interpreter".into())
            .spawn({
                let stop = Arc::clone(&stop);
                move || {
                    let result = interpreter.run_until(&stop);
                    let cpu = interpreter.cpu();
                    info!(
                        "interpreter stopped [pc: {:04X}, i: {:04X}, stack depth: {}]",
                        cpu.pc,
                        cpu.i,
                        cpu.stack_depth()
                    );
                    result
                }
            })
            .map_err(chip8_core::Error::from)?,
    );

    let frame_time = TimerScheduler::period();
    let mut last_frame = Instant::now();
    let mut result = Ok(());

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => {
                    if let Some(kc) = keymap(key) {
                        keypad.press(kc);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        keypad.release(kc);
                    }
                }
                _ => continue,
            };
        }

        // If the frame changed, render it
        if let Some(frame) = frame.take_frame() {
            window.render(&frame)?;
        }

        for Beep in beeps.try_iter() {
            buzzer.beep();
        }
        buzzer.update();

        // A halted program leaves its last frame up until the window closes
        if running.as_ref().map_or(false, JoinHandle::is_finished) {
            if let Some(handle) = running.take() {
                match join(handle) {
                    Ok(()) => info!("program halted; close the window to exit"),
                    Err(e) => {
                        result = Err(e);
                        break 'event;
                    }
                }
            }
        }

        // Handle timing
        let elapsed_frame_time = last_frame.elapsed();
        if frame_time > elapsed_frame_time {
            thread::sleep(frame_time - elapsed_frame_time);
        }
        last_frame = Instant::now();
    }

    stop.store(true, Ordering::Relaxed);
    keypad.close();
    scheduler.stop();
    if let Some(handle) = running.take() {
        match join(handle) {
            Err(RunError::Interpreter(chip8_core::Error::InputClosed)) => {
                debug!("interrupted while waiting for a key")
            }
            other => other?,
        }
    }
    result
}

fn join(handle: Running) -> Result<(), RunError> {
    handle.join().map_err(|_| RunError::Panicked)??;
    Ok(())
}
