//! # Plugin Parameters
//!
//! Parameters are the knobs and switches the user sees in the DAW. Each
//! one has:
//!
//! - A **unique string ID** (`#[id = "..."]`) that the host uses to save
//!   and recall presets. These are the same ids as
//!   [`ParamId::id()`](crate::control::ParamId::id), and must never change
//!   once published or existing presets will break.
//! - A **human-readable name** shown in the DAW's UI.
//! - A **range** and a **default value**.
//!
//! ## No Host-Side Smoothing
//!
//! None of these parameters use a nih-plug smoother. The delay engine
//! glides delay time itself with a one-pole smoother, so adding a second
//! ramp on top would only change how the glide sounds. Dry/wet and
//! feedback are applied straight from the current value each sample.

use nih_plug::prelude::*;

use crate::control::{DRY_WET_RANGE, FEEDBACK_RANGE, MIN_DELAY_SECONDS};
use crate::dsp::engine::{ParamSnapshot, ParamSource, MAX_DELAY_SECONDS};

/// All user-facing parameters of the plugin.
#[derive(Params)]
pub struct PluginParams {
    /// **Dry/Wet**: the balance between the original and the delayed
    /// signal. 0% is fully dry, 100% is only echoes.
    #[id = "dryWet"]
    pub dry_wet: FloatParam,

    /// **Feedback**: how much of each echo is sent back into the delay.
    ///
    /// The 1% floor keeps at least a trace of repeats; the 98% ceiling
    /// keeps every repeat quieter than the one before, so the loop always
    /// decays.
    #[id = "feedback"]
    pub feedback: FloatParam,

    /// **Delay Left**: time until the first echo on the left channel.
    #[id = "delayTimeLeft"]
    pub delay_time_left: FloatParam,

    /// **Delay Right**: time until the first echo on the right channel.
    #[id = "delayTimeRight"]
    pub delay_time_right: FloatParam,

    /// **Ping-Pong**: when on, each side's echoes bounce to the other
    /// side.
    #[id = "pingPongEnabled"]
    pub ping_pong: BoolParam,
}

impl Default for PluginParams {
    fn default() -> Self {
        let defaults = ParamSnapshot::default();

        Self {
            dry_wet: FloatParam::new(
                "Dry/Wet",
                defaults.dry_wet,
                FloatRange::Linear {
                    min: DRY_WET_RANGE.0,
                    max: DRY_WET_RANGE.1,
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            feedback: FloatParam::new(
                "Feedback",
                defaults.feedback,
                FloatRange::Linear {
                    min: FEEDBACK_RANGE.0,
                    max: FEEDBACK_RANGE.1,
                },
            )
            .with_unit("%")
            .with_value_to_string(formatters::v2s_f32_percentage(1))
            .with_string_to_value(formatters::s2v_f32_percentage()),

            delay_time_left: delay_time_param("Delay Left", defaults.delay_time_left),
            delay_time_right: delay_time_param("Delay Right", defaults.delay_time_right),

            ping_pong: BoolParam::new("Ping-Pong", defaults.ping_pong),
        }
    }
}

/// Delay times are in seconds, skewed so that more knob travel goes to
/// the short times where small changes are most audible.
fn delay_time_param(name: &str, default: f32) -> FloatParam {
    FloatParam::new(
        name,
        default,
        FloatRange::Skewed {
            min: MIN_DELAY_SECONDS,
            max: MAX_DELAY_SECONDS as f32,
            factor: FloatRange::skew_factor(-1.0),
        },
    )
    .with_unit(" s")
    .with_step_size(0.001)
}

/// Each `value()` is a single atomic load, so polling the parameters from
/// the audio thread is safe while the host writes them.
impl ParamSource for PluginParams {
    fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            dry_wet: self.dry_wet.value(),
            feedback: self.feedback.value(),
            delay_time_left: self.delay_time_left.value(),
            delay_time_right: self.delay_time_right.value(),
            ping_pong: self.ping_pong.value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ParamId;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let params = PluginParams::default();
        assert_eq!(params.snapshot(), ParamSnapshot::default());
    }

    /// Every control id is registered with the host under the same name.
    #[test]
    fn test_ids_match_control_ids() {
        let params = PluginParams::default();
        let registered: Vec<String> = params
            .param_map()
            .into_iter()
            .map(|(id, _, _)| id)
            .collect();

        for id in ParamId::ALL {
            assert!(
                registered.iter().any(|r| r == id.id()),
                "{} is not registered, got {registered:?}",
                id.id()
            );
        }
        assert_eq!(registered.len(), ParamId::ALL.len());
    }
}
