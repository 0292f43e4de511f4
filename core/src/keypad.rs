use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::constants::KEY_COUNT;
use crate::error::{Error, Result};

/// Keyboard is read by the interpreter for the `Ex9E`, `ExA1` and `Fx0A`
/// instructions.
pub trait Keyboard {
    /// Whether `key` (0x0..=0xF) is held down. Anything above 0xF is never pressed.
    fn is_key_pressed(&self, key: u8) -> bool;

    /// Block until the next key press and return it.
    fn wait_for_key(&mut self) -> Result<u8>;
}

#[derive(Debug, Default)]
struct KeyState {
    pressed: [bool; KEY_COUNT],
    /// Bumped on every key press so waiters can tell a new press from a held key
    presses: u64,
    last_pressed: u8,
    closed: bool,
}

/// # Keypad
/// The 16 key hexadecimal keypad.
///
/// ```text
/// |1|2|3|C|
/// |4|5|6|D|
/// |7|8|9|E|
/// |A|0|B|F|
/// ```
///
/// Clones share the same keys, so an event loop can `press` and `release`
/// while the interpreter thread reads them or waits in `wait_for_key`.
#[derive(Debug, Clone, Default)]
pub struct Keypad {
    shared: Arc<(Mutex<KeyState>, Condvar)>,
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, KeyState> {
        self.shared.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the pressed status of `key` and wake anything waiting for a key
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was pressed
    pub fn press(&self, key: u8) {
        if key as usize >= KEY_COUNT {
            return;
        }
        let mut state = self.state();
        state.pressed[key as usize] = true;
        state.presses += 1;
        state.last_pressed = key;
        self.shared.1.notify_all();
    }

    /// Unset the pressed status of `key`
    ///
    /// # Arguments
    /// * `key` the 4-bit representation of the key that was released
    pub fn release(&self, key: u8) {
        if let Some(pressed) = self.state().pressed.get_mut(key as usize) {
            *pressed = false;
        }
    }

    /// Shut the keypad down; pending and future `wait_for_key` calls fail
    /// with [`Error::InputClosed`].
    pub fn close(&self) {
        self.state().closed = true;
        self.shared.1.notify_all();
    }
}

impl Keyboard for Keypad {
    fn is_key_pressed(&self, key: u8) -> bool {
        self.state()
            .pressed
            .get(key as usize)
            .copied()
            .unwrap_or(false)
    }

    fn wait_for_key(&mut self) -> Result<u8> {
        let mut state = self.state();
        let seen = state.presses;
        debug!("waiting for a key press");
        loop {
            if state.closed {
                return Err(Error::InputClosed);
            }
            if state.presses != seen {
                return Ok(state.last_pressed);
            }
            state = self
                .shared
                .1
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_press_release() {
        let keypad = Keypad::new();
        keypad.press(0xA);
        assert!(keypad.is_key_pressed(0xA));
        assert!(!keypad.is_key_pressed(0xB));
        keypad.release(0xA);
        assert!(!keypad.is_key_pressed(0xA));
    }

    #[test]
    fn test_out_of_range_keys_ignored() {
        let keypad = Keypad::new();
        keypad.press(0x10);
        keypad.release(0xFF);
        assert!(!keypad.is_key_pressed(0x10));
    }

    #[test]
    fn test_wait_for_key_blocks_until_press() {
        let mut keypad = Keypad::new();
        let presser = keypad.clone();
        // a key already held down doesn't count as the next press
        presser.press(0x1);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            presser.press(0x7);
        });
        assert_eq!(keypad.wait_for_key().unwrap(), 0x7);
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_for_key_fails_when_closed() {
        let mut keypad = Keypad::new();
        let closer = keypad.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            closer.close();
        });
        assert!(matches!(keypad.wait_for_key(), Err(Error::InputClosed)));
        handle.join().unwrap();
    }
}
