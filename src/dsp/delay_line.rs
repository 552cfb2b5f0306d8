//! # Delay Line (Circular Buffer)
//!
//! A delay line stores audio samples and lets you read them back after a
//! specified time delay. Each delay channel of the engine owns exactly one.
//!
//! ## Write Head and Read Head
//!
//! The buffer is a fixed-size `Vec<f32>` treated as a ring. The *write
//! head* is an integer index where the current sample is stored. The
//! *read head* is a fractional position found by looking back
//! `delay_samples` from the write head:
//!
//! ```text
//! read_head = write_pos - delay_samples      (add buffer_len if negative)
//! ```
//!
//! Per sample, the engine does:
//!
//! 1. [`write()`](DelayLine::write) the new sample at `write_pos`.
//! 2. [`read()`](DelayLine::read) the delayed sample at `read_head`.
//! 3. [`advance()`](DelayLine::advance) `write_pos` by one, wrapping to 0.
//!
//! Because the write happens first, `read(0.0)` returns the sample that was
//! just written, and `read(n)` returns the sample written `n` calls to
//! `advance()` ago.
//!
//! ## Linear Interpolation
//!
//! Smoothed delay times are almost never whole numbers of samples, so the
//! read head lands between two stored samples. Splitting it into an
//! integer base `x` and a fraction `frac`:
//!
//! ```text
//! x      = floor(read_head)
//! x1     = x + 1            (wrapped to 0 at buffer_len)
//! result = buffer[x] * (1 - frac) + buffer[x1] * frac
//! ```
//!
//! For `read_head = 95.25`: `buffer[95]` gets weight 0.75 and `buffer[96]`
//! gets weight 0.25.

use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;

/// The two buffer slots a fractional read head falls between, plus the
/// blend weight of the second one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadPosition {
    /// Integer base index, always `< buffer_len`.
    pub index: usize,
    /// The slot after `index`, wrapped, always `< buffer_len`.
    pub next_index: usize,
    /// Weight of `next_index`, in `[0, 1)` for finite read heads.
    pub frac: f32,
}

/// A circular buffer that functions as an audio delay line.
///
/// The buffer is allocated once, when the engine is configured, so no
/// memory allocation ever happens during audio processing. Changing the
/// delay time only moves the read head.
#[derive(Debug, Clone)]
pub struct DelayLine {
    /// Stored samples. All values start at 0.0 (silence).
    buffer: Vec<f32>,

    /// Where the current sample is written. Invariant:
    /// `write_pos < buffer.len()`.
    write_pos: usize,
}

impl DelayLine {
    /// Create a silent delay line holding `length` samples.
    ///
    /// `NonZeroUsize` rules out the zero-length buffer, on which every
    /// wrap-around operation would divide by zero.
    pub fn new(length: NonZeroUsize) -> Self {
        Self {
            buffer: vec![0.0; length.get()],
            write_pos: 0,
        }
    }

    /// Capacity in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Current write head position.
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Store a sample at the write head. Does not advance it.
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Resolve the read head for a delay of `delay_samples` behind the
    /// write head into two valid buffer indices and a blend weight.
    ///
    /// The read head is wrapped by adding `buffer_len` once when it is
    /// negative. Delays are bounded by the buffer capacity upstream, but
    /// the indices stay in range regardless: a read head that rounds to
    /// exactly `buffer_len` resolves to slot 0, and out-of-contract values
    /// (negative delays, delays beyond capacity, NaN) are folded back into
    /// the buffer rather than indexing past it.
    pub fn read_position(&self, delay_samples: f64) -> ReadPosition {
        let buffer_len = self.buffer.len();

        let mut read_head = self.write_pos as f64 - delay_samples;
        if read_head < 0.0 {
            read_head += buffer_len as f64;
        }

        let base = read_head.floor();
        let frac = (read_head - base) as f32;

        // `as usize` saturates: negative and NaN become 0.
        let mut index = base as usize;
        if index >= buffer_len {
            index %= buffer_len;
        }

        let mut next_index = index + 1;
        if next_index >= buffer_len {
            next_index = 0;
        }

        nih_debug_assert!(index < buffer_len && next_index < buffer_len);

        ReadPosition {
            index,
            next_index,
            frac,
        }
    }

    /// Read the sample `delay_samples` behind the write head, linearly
    /// interpolating between the two neighbouring slots.
    pub fn read(&self, delay_samples: f64) -> f32 {
        let ReadPosition {
            index,
            next_index,
            frac,
        } = self.read_position(delay_samples);

        lerp(self.buffer[index], self.buffer[next_index], frac)
    }

    /// Move the write head forward by one sample, wrapping to 0 at the end
    /// of the buffer.
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos >= self.buffer.len() {
            self.write_pos = 0;
        }
    }

    /// Zero the whole buffer and move the write head back to 0.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Two-point linear interpolation: `a` at `frac = 0`, `b` at `frac = 1`.
#[inline]
pub fn lerp(a: f32, b: f32, frac: f32) -> f32 {
    (1.0 - frac) * a + frac * b
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
