use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Display is drawn on by the interpreter. It should abstract the
/// implementation details, so a window, a terminal or a plain buffer in a test
/// all work.
pub trait Display {
    /// Turn every pixel off
    fn clear(&mut self);

    /// Toggle the pixel at `(x, y)`, wrapping coordinates that fall off the
    /// screen. Returns whether a lit pixel was turned off.
    fn set_pixel(&mut self, x: usize, y: usize) -> bool;
}

/// # Frame buffer
/// 64x32 monochrome pixels, stored as 1/0 and indexed as `[y][x]`.
///
/// Tracks whether it changed since a renderer last looked at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH] == 1
    }

    /// Rows of 1/0 pixels, top to bottom
    pub fn rows(&self) -> &[[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT] {
        &self.pixels
    }

    pub fn lit_count(&self) -> usize {
        self.pixels
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&p| p == 1)
            .count()
    }

    /// Returns whether the buffer changed since the last call, and resets it
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    fn set_pixel(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH];
        let erased = *pixel == 1;
        *pixel ^= 1;
        self.dirty = true;
        erased
    }
}

/// A [`FrameBuffer`] shared between the interpreter thread, which draws on
/// it, and a renderer on another thread.
#[derive(Debug, Clone, Default)]
pub struct SharedFrameBuffer {
    inner: Arc<Mutex<FrameBuffer>>,
}

impl SharedFrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrameBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the frame if it should be redrawn
    pub fn take_frame(&self) -> Option<FrameBuffer> {
        let mut frame = self.lock();
        if frame.take_dirty() {
            Some(*frame)
        } else {
            None
        }
    }

    /// Returns a copy of the current frame
    pub fn snapshot(&self) -> FrameBuffer {
        *self.lock()
    }
}

impl Display for SharedFrameBuffer {
    fn clear(&mut self) {
        self.lock().clear()
    }

    fn set_pixel(&mut self, x: usize, y: usize) -> bool {
        self.lock().set_pixel(x, y)
    }
}
