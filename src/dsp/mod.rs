//! # DSP (Digital Signal Processing)
//!
//! - **`delay_line`**: a circular buffer with a fractional, linearly
//!   interpolated read head. One per audio channel.
//!
//! - **`smoother`**: a one-pole smoother that glides the delay time
//!   toward its target so the read head never jumps.
//!
//! - **`engine`**: the stereo delay engine tying two delay lines together
//!   with shared feedback, dry/wet mix and optional ping-pong routing.

pub mod delay_line;
pub mod engine;
pub mod smoother;
