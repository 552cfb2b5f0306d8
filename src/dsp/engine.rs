//! # Stereo Delay Engine
//!
//! Two independent delay channels (left and right) sharing one feedback
//! coefficient and one dry/wet mix. Each channel owns its own circular
//! buffer, delay-time smoother and feedback sample, so the two sides can
//! run at different delay times.
//!
//! ## Per-sample algorithm (one channel)
//!
//! ```text
//! smoothed  += 0.001 * (target - smoothed)        glide the delay time
//! delay      = sample_rate * smoothed             seconds → samples
//! buffer[w]  = input + feedback_sample            write (last sample's feedback)
//! wet        = interpolated read at w - delay     fractional read head
//! feedback_sample = wet * feedback                stored for the next sample
//! w          = (w + 1) % len                      advance
//! ```
//!
//! ## Ping-pong
//!
//! With ping-pong on, the two channels cross over:
//!
//! ```text
//!   in L ──┐   ┌── in R                 each input enters the opposite line
//!          ╳
//!   [line L]   [line R]
//!       │  ╲   ╱  │
//!       │   ╲ ╱   │                     feedback samples swap once per
//!       │    ╳    │                     frame, after both are computed
//!       │   ╱ ╲   │
//!     wet L     wet R
//! ```
//!
//! An impulse on the left input therefore echoes on the right first, then
//! on the left, then on the right again, each repeat one feedback factor
//! quieter.
//!
//! Because the feedback written on sample `n` was computed on sample
//! `n - 1`, the recirculating loop is one sample longer than the delay:
//! for a delay of `d` samples, echo `k` (counting from 0) arrives at
//! `d + k * (d + 1)` samples with amplitude `feedback^k`.

use std::num::NonZeroUsize;

use nih_plug::nih_debug_assert;

use super::delay_line::DelayLine;
use super::smoother::OnePoleSmoother;
use crate::error::DelayError;

/// Longest delay time the plugin exposes, and therefore the size of the
/// delay buffers, in seconds.
pub const MAX_DELAY_SECONDS: f64 = 2.0;

/// Extra buffer beyond [`MAX_DELAY_SECONDS`]. A delay equal to the buffer
/// length reads back the slot written on the same sample, so the buffer
/// must be strictly longer than the longest delay the parameters allow.
pub const BUFFER_HEADROOM_SECONDS: f64 = 0.1;

/// Identifies one of the engine's two delay channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    const fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// Sample rate and buffer sizing for the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Audio sample rate in Hz.
    pub sample_rate: f64,
    /// Upper bound on delay time, in seconds. Sets the buffer capacity.
    pub max_delay_seconds: f64,
}

impl EngineConfig {
    pub fn new(sample_rate: f64, max_delay_seconds: f64) -> Self {
        Self {
            sample_rate,
            max_delay_seconds,
        }
    }

    /// Config for delays of up to `max_delay_seconds`, with
    /// [`BUFFER_HEADROOM_SECONDS`] of extra buffer so the longest delay
    /// still lands strictly behind the write head.
    pub fn with_headroom(sample_rate: f64, max_delay_seconds: f64) -> Self {
        Self::new(sample_rate, max_delay_seconds + BUFFER_HEADROOM_SECONDS)
    }

    /// The delay buffer capacity, `round(sample_rate * max_delay_seconds)`.
    ///
    /// Fails for non-positive or non-finite inputs, and for products that
    /// round to an empty buffer.
    pub fn capacity(&self) -> Result<NonZeroUsize, DelayError> {
        let invalid =
            || DelayError::invalid_configuration(self.sample_rate, self.max_delay_seconds);

        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(invalid());
        }
        if !(self.max_delay_seconds.is_finite() && self.max_delay_seconds > 0.0) {
            return Err(invalid());
        }

        let samples = (self.sample_rate * self.max_delay_seconds).round();
        if !samples.is_finite() || samples > usize::MAX as f64 {
            return Err(invalid());
        }

        NonZeroUsize::new(samples as usize).ok_or_else(invalid)
    }
}

/// One sample's worth of control parameter values.
///
/// The engine never looks at host parameter state directly; whoever
/// drives it hands over a snapshot per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    /// Crossfade between dry (0.0) and wet (1.0).
    pub dry_wet: f32,
    /// Gain applied to the delayed signal before it re-enters a line.
    pub feedback: f32,
    /// Target delay time of the left channel, in seconds.
    pub delay_time_left: f32,
    /// Target delay time of the right channel, in seconds.
    pub delay_time_right: f32,
    /// Cross the channel inputs and feedback paths.
    pub ping_pong: bool,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            dry_wet: 0.5,
            feedback: 0.5,
            delay_time_left: 0.5,
            delay_time_right: 0.5,
            ping_pong: false,
        }
    }
}

/// Anything the engine can poll for current parameter values.
///
/// Implementations are read on the audio thread once per sample, so
/// `snapshot()` must not block or allocate. Reading each value with a
/// single atomic load is enough: a snapshot may be a sample stale, or mix
/// values from before and after a concurrent write, but never holds a
/// torn scalar.
pub trait ParamSource {
    fn snapshot(&self) -> ParamSnapshot;
}

impl ParamSource for ParamSnapshot {
    fn snapshot(&self) -> ParamSnapshot {
        *self
    }
}

/// Linear dry/wet crossfade. No equal-power compensation.
///
/// `dry_wet = 0.0` returns `dry` bit for bit, `dry_wet = 1.0` returns
/// `wet` bit for bit.
#[inline]
pub fn mix(dry: f32, wet: f32, dry_wet: f32) -> f32 {
    dry * (1.0 - dry_wet) + wet * dry_wet
}

/// State of one delay channel.
#[derive(Debug, Clone)]
struct DelayChannel {
    line: DelayLine,
    delay_time: OnePoleSmoother,
    /// Previous output times feedback, written into the next sample of
    /// whichever line this channel currently feeds.
    feedback_sample: f32,
}

impl DelayChannel {
    fn new(capacity: NonZeroUsize, initial_delay_time: f32) -> Self {
        Self {
            line: DelayLine::new(capacity),
            delay_time: OnePoleSmoother::for_delay_time(initial_delay_time as f64),
            feedback_sample: 0.0,
        }
    }

    fn prepare(&mut self, initial_delay_time: f32) {
        self.line.clear();
        self.delay_time.reset(initial_delay_time as f64);
        self.feedback_sample = 0.0;
    }

    fn process(
        &mut self,
        sample_rate: f64,
        target_delay_time: f32,
        feedback: f32,
        input: f32,
    ) -> (f32, f32) {
        let smoothed = self.delay_time.next(target_delay_time as f64);
        let delay_samples = sample_rate * smoothed;

        self.line.write(input + self.feedback_sample);
        let delayed = self.line.read(delay_samples);

        self.feedback_sample = delayed * feedback;
        self.line.advance();

        (delayed, self.feedback_sample)
    }
}

/// Buffers and per-channel state that exist once the engine is configured.
#[derive(Debug, Clone)]
struct Configured {
    config: EngineConfig,
    channels: [DelayChannel; 2],
}

/// The stereo delay engine.
///
/// Starts unconfigured: until [`configure()`](Self::configure) succeeds,
/// processing passes the dry signal through untouched.
#[derive(Debug, Clone, Default)]
pub struct DelayEngine {
    state: Option<Configured>,
}

impl DelayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the delay buffers for `config` and prepare for playback.
    ///
    /// Buffers are reallocated only when the capacity changes; otherwise
    /// the existing ones are reused. Either way they are zeroed, both
    /// write heads return to 0, feedback is cleared and each channel's
    /// smoothed delay time jumps straight to its initial target so that
    /// playback starts without a glide.
    ///
    /// On error the engine is left exactly as it was.
    ///
    /// Allocates, so call it from the control thread only.
    pub fn configure(
        &mut self,
        config: EngineConfig,
        initial_delay_left: f32,
        initial_delay_right: f32,
    ) -> Result<(), DelayError> {
        let capacity = config.capacity()?;

        match &mut self.state {
            Some(state) if state.capacity() == capacity.get() => state.config = config,
            state => {
                *state = Some(Configured {
                    config,
                    channels: [
                        DelayChannel::new(capacity, initial_delay_left),
                        DelayChannel::new(capacity, initial_delay_right),
                    ],
                });
            }
        }

        self.prepare(initial_delay_left, initial_delay_right);
        Ok(())
    }

    /// Clear the delay lines and reset heads and smoothing without
    /// touching the buffer allocation. Used whenever playback restarts.
    pub fn prepare(&mut self, initial_delay_left: f32, initial_delay_right: f32) {
        if let Some(state) = &mut self.state {
            let [left, right] = &mut state.channels;
            left.prepare(initial_delay_left);
            right.prepare(initial_delay_right);
        }
    }

    pub fn is_configured(&self) -> bool {
        self.state.is_some()
    }

    /// The active configuration, if any.
    pub fn config(&self) -> Option<EngineConfig> {
        self.state.as_ref().map(|state| state.config)
    }

    /// Delay buffer capacity in samples, 0 when unconfigured.
    pub fn buffer_len(&self) -> usize {
        self.state.as_ref().map_or(0, Configured::capacity)
    }

    /// Current write head of `channel`, if configured.
    pub fn write_head(&self, channel: Channel) -> Option<usize> {
        self.channel(channel).map(|ch| ch.line.write_pos())
    }

    /// Current smoothed delay time of `channel` in seconds, if configured.
    pub fn smoothed_delay_time(&self, channel: Channel) -> Option<f64> {
        self.channel(channel).map(|ch| ch.delay_time.value())
    }

    /// Pending feedback sample of `channel`, if configured.
    pub fn feedback_sample(&self, channel: Channel) -> Option<f32> {
        self.channel(channel).map(|ch| ch.feedback_sample)
    }

    fn channel(&self, channel: Channel) -> Option<&DelayChannel> {
        self.state
            .as_ref()
            .map(|state| &state.channels[channel.index()])
    }

    /// Run one sample through a single channel.
    ///
    /// Returns the delayed (wet) sample and the channel's fresh feedback
    /// sample. No ping-pong handling happens here; see
    /// [`process_frame()`](Self::process_frame) for the coordinated stereo
    /// path. Returns silence when unconfigured.
    pub fn process_sample(
        &mut self,
        channel: Channel,
        target_delay_time: f32,
        feedback: f32,
        input: f32,
    ) -> (f32, f32) {
        let Some(state) = &mut self.state else {
            return (0.0, 0.0);
        };

        let sample_rate = state.config.sample_rate;
        state.channels[channel.index()].process(sample_rate, target_delay_time, feedback, input)
    }

    /// Process one stereo frame and return the mixed `(left, right)`
    /// output.
    pub fn process_frame(&mut self, left: f32, right: f32, params: &ParamSnapshot) -> (f32, f32) {
        let Some(state) = &mut self.state else {
            return (left, right);
        };

        let sample_rate = state.config.sample_rate;
        let [left_channel, right_channel] = &mut state.channels;

        // Under ping-pong each input enters the opposite line, so a signal
        // panned hard left is first heard echoing on the right.
        let (into_left, into_right) = if params.ping_pong {
            (right, left)
        } else {
            (left, right)
        };

        let (wet_left, _) = left_channel.process(
            sample_rate,
            params.delay_time_left,
            params.feedback,
            into_left,
        );
        let (wet_right, _) = right_channel.process(
            sample_rate,
            params.delay_time_right,
            params.feedback,
            into_right,
        );

        // Swap only after both channels hold this frame's feedback.
        if params.ping_pong {
            std::mem::swap(
                &mut left_channel.feedback_sample,
                &mut right_channel.feedback_sample,
            );
        }

        nih_debug_assert!(left_channel.line.write_pos() == right_channel.line.write_pos());

        (
            mix(left, wet_left, params.dry_wet),
            mix(right, wet_right, params.dry_wet),
        )
    }

    /// Process a block in place, polling `params` once per sample.
    ///
    /// Only the common length of `left` and `right` is processed.
    pub fn process_block<P>(&mut self, left: &mut [f32], right: &mut [f32], params: &P)
    where
        P: ParamSource + ?Sized,
    {
        nih_debug_assert!(left.len() == right.len());

        for (left, right) in left.iter_mut().zip(right.iter_mut()) {
            let snapshot = params.snapshot();
            (*left, *right) = self.process_frame(*left, *right, &snapshot);
        }
    }
}

impl Configured {
    fn capacity(&self) -> usize {
        self.channels[0].line.len()
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
