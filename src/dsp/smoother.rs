//! # One-Pole Parameter Smoother
//!
//! When the delay time knob moves, the read head must not jump: a jump
//! of the read position is a discontinuity in the output, heard as a
//! click, and a stream of small jumps is heard as "zipper noise". Instead
//! the delay time *glides* toward its new value.
//!
//! The glide is a one-pole lowpass filter run on the control value rather
//! than on audio:
//!
//! ```text
//! smoothed[n] = smoothed[n-1] + k * (target - smoothed[n-1])
//! ```
//!
//! which is the familiar `y[n] = (1 - a) * x[n] + a * y[n-1]` with
//! `k = 1 - a`. Every sample the smoothed value covers a fixed fraction
//! `k` of the remaining distance to the target, so it approaches the
//! target exponentially and never overshoots.
//!
//! With `k = 0.001` the remaining distance shrinks to `1/e` after 1000
//! samples, about 23 ms at 44.1 kHz.
//!
//! Delay time reaches the read head multiplied by the sample rate
//! (up to ~192000), so the state is kept in `f64`: an `f32` smoothed
//! value would quantise the read head to steps of several hundredths
//! of a sample at long delays.

/// Fraction of the remaining distance covered per sample when gliding
/// the delay time.
pub const DELAY_TIME_SMOOTHING: f64 = 0.001;

/// Exponential one-pole smoother for a control value.
#[derive(Debug, Clone)]
pub struct OnePoleSmoother {
    /// Fraction of the gap to the target closed each step, in `(0, 1]`.
    coefficient: f64,

    /// Current smoothed value.
    value: f64,
}

impl OnePoleSmoother {
    /// Create a smoother sitting at `initial` with the given step
    /// coefficient.
    pub fn new(coefficient: f64, initial: f64) -> Self {
        Self {
            coefficient: coefficient.clamp(f64::MIN_POSITIVE, 1.0),
            value: initial,
        }
    }

    /// A smoother tuned for delay time, in seconds.
    pub fn for_delay_time(initial_seconds: f64) -> Self {
        Self::new(DELAY_TIME_SMOOTHING, initial_seconds)
    }

    /// Step once toward `target` and return the new smoothed value.
    ///
    /// Runs every sample whether or not the target changed; once the value
    /// has reached the target it stays there exactly.
    #[inline]
    pub fn next(&mut self, target: f64) -> f64 {
        self.value += self.coefficient * (target - self.value);
        self.value
    }

    /// Jump straight to `value` with no glide.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }

    /// The current smoothed value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
