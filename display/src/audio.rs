use std::time::{Duration, Instant};

use log::{debug, info};
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

const SAMPLE_RATE: i32 = 44_100;
const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.25;

/// A square wave at a fixed frequency
struct SquareWave {
    phase_inc: f32,
    phase: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase <= 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// # Buzzer
/// Plays a tone while beeps keep arriving and goes quiet once they stop.
pub struct Buzzer {
    device: AudioDevice<SquareWave>,
    hold: Duration,
    last_beep: Option<Instant>,
}

impl Buzzer {
    /// Opens the default playback device, paused.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context to play audio through
    /// * `hold` how long a single beep keeps the tone going
    pub fn new(sdl: &sdl2::Sdl, hold: Duration) -> crate::Result<Self> {
        let audio_subsystem = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(SAMPLE_RATE),
            channels: Some(1),
            samples: None,
        };
        let device = audio_subsystem.open_playback(None, &desired, |spec| {
            info!("opened audio device [{} Hz]", spec.freq);
            SquareWave {
                phase_inc: TONE_HZ / spec.freq as f32,
                phase: 0.0,
                volume: VOLUME,
            }
        })?;
        Ok(Buzzer {
            device,
            hold,
            last_beep: None,
        })
    }

    pub fn beep(&mut self) {
        if self.last_beep.is_none() {
            debug!("buzzer on");
            self.device.resume();
        }
        self.last_beep = Some(Instant::now());
    }

    /// Pauses the tone if no beep arrived within the hold time
    pub fn update(&mut self) {
        if let Some(last_beep) = self.last_beep {
            if last_beep.elapsed() > self.hold {
                debug!("buzzer off");
                self.device.pause();
                self.last_beep = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_wave() {
        let mut wave = SquareWave {
            phase_inc: 0.25,
            phase: 0.0,
            volume: 0.5,
        };
        let mut out = [0.0; 8];
        wave.callback(&mut out);
        assert_eq!(out, [0.5, 0.5, 0.5, -0.5, 0.5, 0.5, 0.5, -0.5]);
    }
}
