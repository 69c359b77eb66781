//! Timeline and playback scheduling.
//!
//! The timeline owns the current frame and the running tick source. A tick
//! source is anything implementing [`TickHandle`]; in the browser that is a
//! 33 ms `gloo_timers` interval, in tests a counter. Holding the handle is what
//! "playing" means, so a stopped timeline cannot have a live tick source and
//! the handle is consumed by exactly one `cancel`.

#[cfg(test)]
#[path = "playback_test.rs"]
mod playback_test;

use std::fmt;

use crate::consts::DEFAULT_MAX_FRAME;

/// A running periodic tick source.
pub trait TickHandle {
    /// Stop the source. Consumes the handle so it cannot be cancelled twice.
    fn cancel(self: Box<Self>);
}

/// Playhead state.
pub struct Timeline {
    current_frame: u32,
    max_frame: u32,
    handle: Option<Box<dyn TickHandle>>,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("current_frame", &self.current_frame)
            .field("max_frame", &self.max_frame)
            .field("playing", &self.is_playing())
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME)
    }
}

impl Timeline {
    #[must_use]
    pub fn new(max_frame: u32) -> Self {
        Self { current_frame: 0, max_frame, handle: None }
    }

    #[must_use]
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    #[must_use]
    pub fn max_frame(&self) -> u32 {
        self.max_frame
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.handle.is_some()
    }

    /// Begin playback with a tick source built by `make_handle`.
    ///
    /// Returns `false` without calling `make_handle` when already playing.
    pub fn start(&mut self, make_handle: impl FnOnce() -> Box<dyn TickHandle>) -> bool {
        if self.is_playing() {
            return false;
        }
        self.handle = Some(make_handle());
        log::debug!("playback: started at frame {}", self.current_frame);
        true
    }

    /// Stop ticking and keep the current frame. Returns whether it was playing.
    pub fn pause(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        handle.cancel();
        log::debug!("playback: paused at frame {}", self.current_frame);
        true
    }

    /// Stop ticking and rewind to frame 0. Returns whether it was playing.
    pub fn stop(&mut self) -> bool {
        let was_playing = self.pause();
        self.current_frame = 0;
        was_playing
    }

    /// Advance one frame, wrapping to 0 past `max_frame`.
    ///
    /// Returns the new frame, or `None` when stopped (the tick is ignored).
    pub fn tick(&mut self) -> Option<u32> {
        if !self.is_playing() {
            log::trace!("playback: tick ignored while stopped");
            return None;
        }
        self.current_frame = if self.current_frame >= self.max_frame { 0 } else { self.current_frame + 1 };
        Some(self.current_frame)
    }

    /// Move the playhead, clamped to `[0, max_frame]`. Returns the new frame.
    pub fn seek(&mut self, frame: u32) -> u32 {
        self.current_frame = frame.min(self.max_frame);
        self.current_frame
    }

    /// Change the last frame, pulling the playhead back if needed.
    pub fn set_max_frame(&mut self, max_frame: u32) {
        self.max_frame = max_frame;
        self.current_frame = self.current_frame.min(max_frame);
    }
}
