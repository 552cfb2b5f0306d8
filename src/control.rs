//! Host-agnostic control parameters.
//!
//! [`SharedParams`] is the lock-free parameter store for hosts that don't
//! bring their own parameter system. A control thread writes it by name
//! or by [`ParamId`], the audio thread reads it through [`ParamSource`].
//!
//! Each value lives in its own atomic (`f32`s as their `u32` bit
//! pattern), so a reader sees either the old or the new value of a
//! parameter, never half of each. Relaxed ordering is sufficient: the
//! parameters are independent and a one-sample-stale read is harmless.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use nih_plug::nih_warn;

use crate::dsp::engine::{ParamSnapshot, ParamSource, MAX_DELAY_SECONDS};
use crate::error::DelayError;

pub const DRY_WET_RANGE: (f32, f32) = (0.0, 1.0);
pub const FEEDBACK_RANGE: (f32, f32) = (0.01, 0.98);
pub const MIN_DELAY_SECONDS: f32 = 0.01;

/// The five control parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    DryWet,
    Feedback,
    DelayTimeLeft,
    DelayTimeRight,
    PingPong,
}

impl ParamId {
    pub const ALL: [ParamId; 5] = [
        ParamId::DryWet,
        ParamId::Feedback,
        ParamId::DelayTimeLeft,
        ParamId::DelayTimeRight,
        ParamId::PingPong,
    ];

    /// Stable string id. The plugin registers its parameters under the
    /// same ids, so names are interchangeable between the two.
    pub const fn id(self) -> &'static str {
        match self {
            ParamId::DryWet => "dryWet",
            ParamId::Feedback => "feedback",
            ParamId::DelayTimeLeft => "delayTimeLeft",
            ParamId::DelayTimeRight => "delayTimeRight",
            ParamId::PingPong => "pingPongEnabled",
        }
    }

    /// Valid `(min, max)` range for a store whose longest delay is
    /// `max_delay_seconds`. Booleans use `(0, 1)`.
    pub fn range(self, max_delay_seconds: f32) -> (f32, f32) {
        match self {
            ParamId::DryWet => DRY_WET_RANGE,
            ParamId::Feedback => FEEDBACK_RANGE,
            ParamId::DelayTimeLeft | ParamId::DelayTimeRight => {
                (MIN_DELAY_SECONDS, max_delay_seconds.max(MIN_DELAY_SECONDS))
            }
            ParamId::PingPong => (0.0, 1.0),
        }
    }
}

impl FromStr for ParamId {
    type Err = DelayError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ParamId::ALL
            .into_iter()
            .find(|id| id.id() == name)
            .ok_or_else(|| DelayError::UnknownParameter(name.to_owned()))
    }
}

/// An `f32` that can be shared between threads.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Lock-free store of the current control parameter values.
#[derive(Debug)]
pub struct SharedParams {
    max_delay_seconds: f32,
    dry_wet: AtomicF32,
    feedback: AtomicF32,
    delay_time_left: AtomicF32,
    delay_time_right: AtomicF32,
    ping_pong: AtomicBool,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(MAX_DELAY_SECONDS as f32)
    }
}

impl SharedParams {
    /// A store with default values whose delay times are limited to
    /// `max_delay_seconds`.
    pub fn new(max_delay_seconds: f32) -> Self {
        let defaults = ParamSnapshot::default();
        let store = Self {
            max_delay_seconds,
            dry_wet: AtomicF32::new(0.0),
            feedback: AtomicF32::new(0.0),
            delay_time_left: AtomicF32::new(0.0),
            delay_time_right: AtomicF32::new(0.0),
            ping_pong: AtomicBool::new(defaults.ping_pong),
        };

        // Runs the defaults through clamping, which matters when
        // `max_delay_seconds` is below the default delay time.
        store.set(ParamId::DryWet, defaults.dry_wet);
        store.set(ParamId::Feedback, defaults.feedback);
        store.set(ParamId::DelayTimeLeft, defaults.delay_time_left);
        store.set(ParamId::DelayTimeRight, defaults.delay_time_right);
        store
    }

    pub fn max_delay_seconds(&self) -> f32 {
        self.max_delay_seconds
    }

    /// Write a parameter. Out-of-range values are clamped into range and
    /// NaN falls back to the range minimum; neither is an error. For
    /// [`ParamId::PingPong`] any value `>= 0.5` means on.
    pub fn set(&self, id: ParamId, value: f32) {
        let (min, max) = id.range(self.max_delay_seconds);
        let clamped = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
        if clamped != value {
            nih_warn!("{} = {} is out of range, using {}", id.id(), value, clamped);
        }

        match id {
            ParamId::DryWet => self.dry_wet.store(clamped),
            ParamId::Feedback => self.feedback.store(clamped),
            ParamId::DelayTimeLeft => self.delay_time_left.store(clamped),
            ParamId::DelayTimeRight => self.delay_time_right.store(clamped),
            ParamId::PingPong => self.ping_pong.store(clamped >= 0.5, Ordering::Relaxed),
        }
    }

    /// Write a parameter by its string id.
    pub fn set_by_name(&self, name: &str, value: f32) -> Result<(), DelayError> {
        match name.parse::<ParamId>() {
            Ok(id) => {
                self.set(id, value);
                Ok(())
            }
            Err(err) => {
                nih_warn!("ignoring parameter write: {err}");
                Err(err)
            }
        }
    }

    pub fn set_ping_pong(&self, enabled: bool) {
        self.ping_pong.store(enabled, Ordering::Relaxed);
    }

    /// Read a single parameter. Booleans read as 0.0 or 1.0.
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::DryWet => self.dry_wet.load(),
            ParamId::Feedback => self.feedback.load(),
            ParamId::DelayTimeLeft => self.delay_time_left.load(),
            ParamId::DelayTimeRight => self.delay_time_right.load(),
            ParamId::PingPong => {
                if self.ping_pong.load(Ordering::Relaxed) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl ParamSource for SharedParams {
    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            dry_wet: self.dry_wet.load(),
            feedback: self.feedback.load(),
            delay_time_left: self.delay_time_left.load(),
            delay_time_right: self.delay_time_right.load(),
            ping_pong: self.ping_pong.load(Ordering::Relaxed),
        }
    }
}
