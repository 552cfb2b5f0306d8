//! Errors surfaced by the delay engine's non-realtime entry points.
//!
//! Nothing in the per-sample path can fail: once the engine has been
//! configured, every buffer index is wrapped into range by construction.
//! The only fallible calls are configuration and name-based parameter
//! writes, both of which happen on the control thread.

use thiserror::Error;

/// Errors returned by [`DelayEngine::configure`](crate::dsp::engine::DelayEngine::configure)
/// and [`SharedParams::set_by_name`](crate::control::SharedParams::set_by_name).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DelayError {
    /// The sample rate or maximum delay time was zero, negative, not
    /// finite, or too small to hold a single sample. The engine keeps
    /// whatever configuration it had before the failed call.
    #[error(
        "invalid configuration: sample rate {sample_rate} Hz with max delay \
         {max_delay_seconds} s does not give a usable delay buffer"
    )]
    InvalidConfiguration {
        sample_rate: f64,
        max_delay_seconds: f64,
    },

    /// A parameter write named a parameter that does not exist.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),
}

impl DelayError {
    pub fn invalid_configuration(sample_rate: f64, max_delay_seconds: f64) -> Self {
        DelayError::InvalidConfiguration {
            sample_rate,
            max_delay_seconds,
        }
    }
}
