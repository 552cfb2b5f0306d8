//! # Loveless Ping-Pong Delay: An AU/VST3/CLAP Stereo Delay Plugin
//!
//! A stereo delay built with [nih-plug](https://github.com/robbert-vdh/nih-plug).
//! Left and right have their own delay times, share one feedback amount,
//! and can be switched into ping-pong mode where the echoes bounce from
//! side to side.
//!
//! ## Signal Flow (one channel, ping-pong off)
//!
//! ```text
//! Input ──┬─────────────────────────────────────────── × (1 - mix) ──┐
//!         │                                                          │
//!         │    ┌───────────────────────────────────────────────┐     │
//!         │    │                FEEDBACK LOOP                  │     │
//!         │    │                                               │     │
//!         └──►(+)──► [Circular Buffer] ──► interpolated read ──┤     │
//!              ▲      (write head + fractional read head,      │     │
//!              │       delay time glides via smoother)         │     │
//!              │                                               ▼     │
//!              └───────────── × feedback (next sample) ◄───── wet    │
//!                                                               │    │
//!                                                               └─ × mix ─►(+)──► Output
//! ```
//!
//! With ping-pong on, the inputs enter the opposite channel's buffer and
//! the two feedback paths are crossed, so each echo lands on the other
//! side from the one before. See [`dsp::engine`] for the details.
//!
//! The engine is host-independent: [`dsp::engine::DelayEngine`] can be
//! driven from any Rust code with a [`control::SharedParams`] store or a
//! plain [`ParamSnapshot`](dsp::engine::ParamSnapshot).

pub mod control;
pub mod dsp;
pub mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::engine::{DelayEngine, EngineConfig, ParamSnapshot, ParamSource, MAX_DELAY_SECONDS};
use nih_plug::prelude::*;
use params::PluginParams;

/// The main plugin struct.
///
/// ## Why separate state from parameters?
///
/// Parameters (`PluginParams`) are shared with the host via `Arc` and can
/// be written from any thread (the UI thread, the host's automation
/// thread). The delay engine is owned exclusively by the audio thread and
/// only touched in `initialize()`, `reset()` and `process()`. Once per
/// sample the engine takes a snapshot of the parameters, which is the only
/// point where the two meet.
struct LovelessDelay {
    /// Shared reference to the plugin parameters.
    params: Arc<PluginParams>,

    /// The current sample rate in Hz. Set during `initialize()`; used for
    /// the tail length.
    sample_rate: f32,

    /// The stereo delay engine. Unconfigured (dry passthrough) until
    /// `initialize()` has sized its buffers.
    engine: DelayEngine,
}

impl Default for LovelessDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(PluginParams::default()),
            // Placeholder until the host tells us the real rate.
            sample_rate: 44100.0,
            engine: DelayEngine::new(),
        }
    }
}

impl Plugin for LovelessDelay {
    const NAME: &'static str = "Loveless Ping-Pong Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // The engine is strictly two-channel (ping-pong needs a left and a
    // right), so stereo is the only layout offered.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[AudioIOLayout {
        main_input_channels: NonZeroU32::new(2),
        main_output_channels: NonZeroU32::new(2),
        aux_input_ports: &[],
        aux_output_ports: &[],
        names: PortNames::const_default(),
    }];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameter changes take effect at the exact sample the host
    // automates them, matching the engine's once-per-sample reads.
    const SAMPLE_ACCURATE_AUTOMATION: bool = true;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is loaded or the audio configuration changes.
    /// This is where the delay buffers are allocated: their size depends on
    /// the sample rate, which only the host knows.
    ///
    /// Returning `false` tells the host this configuration can't be used.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        let config = plugin_engine_config(buffer_config.sample_rate);
        let targets = self.params.snapshot();

        match self
            .engine
            .configure(config, targets.delay_time_left, targets.delay_time_right)
        {
            Ok(()) => {
                self.sample_rate = buffer_config.sample_rate;
                nih_log!(
                    "delay configured at {} Hz with {} samples per channel",
                    buffer_config.sample_rate,
                    self.engine.buffer_len()
                );
                true
            }
            Err(err) => {
                nih_error!("cannot initialize delay: {err}");
                false
            }
        }
    }

    /// Called when playback stops or the plugin is bypassed. Clears the
    /// delay lines so stale echoes don't burst out on the next play, and
    /// snaps the delay time to its current target.
    fn reset(&mut self) {
        let targets = self.params.snapshot();
        self.engine
            .prepare(targets.delay_time_left, targets.delay_time_right);
    }

    /// The audio callback. Processes the block one stereo frame at a time,
    /// in place, reading the parameters fresh for every frame.
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        for mut channel_samples in buffer.iter_samples() {
            let params = self.params.snapshot();

            let mut samples = channel_samples.iter_mut();
            let (Some(left), Some(right)) = (samples.next(), samples.next()) else {
                continue;
            };

            (*left, *right) = self.engine.process_frame(*left, *right, &params);
        }

        // Tell the host how long the echoes ring on after the input goes
        // silent, so it keeps calling process() instead of cutting them off.
        ProcessStatus::Tail(tail_samples(self.sample_rate, &self.params.snapshot()))
    }
}

/// The delay parameters go up to exactly `MAX_DELAY_SECONDS`, so the
/// buffers get headroom on top of that.
fn plugin_engine_config(sample_rate: f32) -> EngineConfig {
    EngineConfig::with_headroom(sample_rate as f64, MAX_DELAY_SECONDS)
}

const fn calculate_delay_samples(delay_seconds: f32, sample_rate: f32) -> f32 {
    delay_seconds * sample_rate
}

/// Samples until the longer channel's echoes decay to -60 dB.
///
/// Each trip around the loop takes one sample more than the delay time
/// and scales the echo by `feedback`, so after N repeats the level is
/// `feedback^N`. Solving `feedback^N = 0.001`:
///
/// ```text
/// N = log10(0.001) / log10(feedback) = -3 / log10(feedback)
/// ```
///
/// The tail is the first echo plus N further loop periods.
fn tail_samples(sample_rate: f32, params: &ParamSnapshot) -> u32 {
    let longest = params.delay_time_left.max(params.delay_time_right);
    let delay_samps = calculate_delay_samples(longest, sample_rate);

    if params.feedback > 0.001 && params.feedback < 1.0 {
        let repeats = -3.0 / params.feedback.log10();
        (delay_samps + repeats * (delay_samps + 1.0)) as u32
    } else {
        // No usable feedback: a single echo.
        delay_samps as u32
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────

impl ClapPlugin for LovelessDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-pingpong-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A stereo delay with independent left/right times and ping-pong feedback");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for LovelessDelay {
    // The `*b"..."` syntax creates a `[u8; 16]` from a 16-character
    // ASCII string literal.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssPingPong001";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// nih_export_clap! exports the `clap_entry` symbol for CLAP hosts.
// nih_export_vst3! exports `GetPluginFactory` for VST3 hosts.
// clap_wrapper re-exports the CLAP entry point as AUv2 so Logic Pro
// (Audio Units only) can load it.

nih_export_clap!(LovelessDelay);
nih_export_vst3!(LovelessDelay);
clap_wrapper::export_auv2!();

#[cfg(test)]
mod tests {
    use super::*;

    fn params(feedback: f32, left: f32, right: f32) -> ParamSnapshot {
        ParamSnapshot {
            feedback,
            delay_time_left: left,
            delay_time_right: right,
            ..ParamSnapshot::default()
        }
    }

    #[test]
    fn test_tail_uses_longer_channel() {
        let short_left = tail_samples(1000.0, &params(0.5, 0.1, 1.0));
        let short_right = tail_samples(1000.0, &params(0.5, 1.0, 0.1));
        assert_eq!(short_left, short_right);

        let both_short = tail_samples(1000.0, &params(0.5, 0.1, 0.1));
        assert!(both_short < short_left);
    }

    #[test]
    fn test_tail_grows_with_feedback() {
        let low = tail_samples(48000.0, &params(0.1, 0.5, 0.5));
        let high = tail_samples(48000.0, &params(0.98, 0.5, 0.5));
        assert!(high > low * 10, "low {low}, high {high}");
    }

    /// At 10% feedback the echoes fall below -60 dB after three repeats.
    #[test]
    fn test_tail_length_at_ten_percent_feedback() {
        let tail = tail_samples(1000.0, &params(0.1, 1.0, 1.0));
        // first echo at 1000, then three loops of 1001 samples
        let expected = 1000 + 3 * 1001;
        assert!(tail.abs_diff(expected) <= 1, "got {tail}, expected {expected}");
    }

    #[test]
    fn test_tail_without_feedback_is_one_echo() {
        assert_eq!(tail_samples(1000.0, &params(0.0, 0.25, 0.5)), 500);
    }

    /// The longest delay the parameters allow fits strictly inside the
    /// buffer at common sample rates.
    #[test]
    fn test_buffer_longer_than_max_delay() {
        for sample_rate in [44100.0_f32, 48000.0, 96000.0, 192000.0] {
            let capacity = plugin_engine_config(sample_rate).capacity().unwrap().get();
            let max_delay_samples = (MAX_DELAY_SECONDS * sample_rate as f64).ceil() as usize;
            assert!(
                capacity >= max_delay_samples + 2,
                "{sample_rate} Hz: capacity {capacity}, max delay {max_delay_samples}"
            );
        }
    }

    /// Stereo in, stereo out is the only layout on offer.
    #[test]
    fn test_only_stereo_layout() {
        let layouts = LovelessDelay::AUDIO_IO_LAYOUTS;
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].main_input_channels, NonZeroU32::new(2));
        assert_eq!(layouts[0].main_output_channels, NonZeroU32::new(2));
    }

    #[test]
    fn test_plugin_starts_unconfigured() {
        let plugin = LovelessDelay::default();
        assert!(!plugin.engine.is_configured());
        assert_eq!(plugin.params.snapshot(), ParamSnapshot::default());
    }
}
