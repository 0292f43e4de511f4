use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::constants::TIMER_HZ;
use crate::error::Result;

/// # Timers
/// The delay (DT) and sound (ST) countdown registers.
///
/// Both count down at 60Hz on their own schedule, independent of how fast
/// instructions execute, and stop at 0. While ST is above 0 each decrement is
/// a beep.
///
/// The registers are atomics: the scheduler thread ticks them while the
/// interpreter reads and loads them.
#[derive(Debug, Default)]
pub struct Timers {
    delay: AtomicU8,
    sound: AtomicU8,
}

/// Timer values at one instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerSnapshot {
    pub delay: u8,
    pub sound: u8,
}

/// Which timers a [`Timers::tick`] decremented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub delay: bool,
    /// A sound tick; the caller should beep
    pub sound: bool,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// DT = value
    pub fn set_delay(&self, value: u8) {
        self.delay.store(value, Ordering::SeqCst);
    }

    /// ST = value
    pub fn set_sound(&self, value: u8) {
        self.sound.store(value, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            delay: self.delay.load(Ordering::SeqCst),
            sound: self.sound.load(Ordering::SeqCst),
        }
    }

    /// Decrements each timer that is above 0
    pub fn tick(&self) -> Tick {
        Tick {
            delay: decrement(&self.delay),
            sound: decrement(&self.sound),
        }
    }
}

/// Saturating decrement; false if already 0
fn decrement(timer: &AtomicU8) -> bool {
    timer
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| t.checked_sub(1))
        .is_ok()
}

/// A sound timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beep;

/// Receives a beep for every sound timer tick.
/// The scheduler calls this from its own thread.
pub trait Beeper: Send {
    fn beep(&mut self);
}

/// Forwards beeps to whoever owns the audio device
impl Beeper for Sender<Beep> {
    fn beep(&mut self) {
        // nobody listening
        let _ = self.send(Beep);
    }
}

/// Drops beeps on the floor
#[derive(Debug, Default)]
pub struct Mute;

impl Beeper for Mute {
    fn beep(&mut self) {}
}

/// # Timer scheduler
/// Ticks [`Timers`] 60 times a second on a dedicated thread until stopped or
/// dropped.
pub struct TimerScheduler {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TimerScheduler {
    pub fn period() -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(TIMER_HZ))
    }

    pub fn spawn<B: Beeper + 'static>(timers: Arc<Timers>, mut beeper: B) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let handle = thread::Builder::new().name("timers".into()).spawn({
            let running = Arc::clone(&running);
            move || {
                debug!("timer schedule started");
                let period = Self::period();
                let mut next = Instant::now() + period;
                while running.load(Ordering::SeqCst) {
                    if timers.tick().sound {
                        beeper.beep();
                    }
                    let now = Instant::now();
                    if next > now {
                        thread::sleep(next - now);
                    }
                    next += period;
                }
                debug!("timer schedule stopped");
            }
        })?;
        Ok(TimerScheduler {
            running,
            handle: Some(handle),
        })
    }

    /// Stops ticking and waits for the scheduler thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
