//! Spinner and status light for the status bar

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    current_frame: usize,
    last_update: Instant,
    interval: Duration,
}

impl Spinner {
    pub fn dots() -> Self {
        Self::with_frames(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"], 80)
    }

    /// Used while waiting on the model
    pub fn thinking() -> Self {
        Self::with_frames(&["◐", "◓", "◑", "◒"], 150)
    }

    fn with_frames(frames: &'static [&'static str], millis: u64) -> Self {
        Self {
            frames,
            current_frame: 0,
            last_update: Instant::now(),
            interval: Duration::from_millis(millis),
        }
    }

    pub fn tick(&mut self) {
        if self.last_update.elapsed() >= self.interval {
            self.current_frame = (self.current_frame + 1) % self.frames.len();
            self.last_update = Instant::now();
        }
    }

    pub fn frame(&self) -> &'static str {
        self.frames[self.current_frame]
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.last_update = Instant::now();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusState {
    Idle,
    Working,
    Success,
    /// Informational, e.g. no SQL in the model reply
    Notice,
    Error,
}

/// Colored icon reflecting the outcome of the last event
#[derive(Debug, Clone)]
pub struct StatusIndicator {
    state: StatusState,
    spinner: Spinner,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            state: StatusState::Idle,
            spinner: Spinner::dots(),
        }
    }

    pub fn set_state(&mut self, state: StatusState) {
        if self.state != state {
            self.state = state;
            self.spinner.reset();
        }
    }

    pub fn tick(&mut self) {
        if self.state == StatusState::Working {
            self.spinner.tick();
        }
    }

    pub fn render(&self) -> (&'static str, (u8, u8, u8)) {
        match self.state {
            StatusState::Idle => ("●", (100, 100, 100)),
            StatusState::Working => (self.spinner.frame(), (100, 200, 255)),
            StatusState::Success => ("✓", (100, 255, 100)),
            StatusState::Notice => ("ℹ", (255, 220, 100)),
            StatusState::Error => ("✗", (255, 110, 110)),
        }
    }

    pub fn state(&self) -> StatusState {
        self.state
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}
