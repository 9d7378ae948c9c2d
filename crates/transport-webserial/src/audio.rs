use actor_runtime::actor_debug;
use core_types::{CueError, NotificationSink};
use std::cell::RefCell;
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, OscillatorType};

/// Tone pitch (Hz)
pub const CUE_FREQUENCY_HZ: f32 = 800.0;

/// Gain at the start of the cue; quiet enough for rapid bursts
pub const CUE_START_GAIN: f32 = 0.1;

/// Gain the cue decays to (exponential ramps cannot reach zero)
pub const CUE_END_GAIN: f32 = 0.01;

/// Cue length (seconds)
pub const CUE_DURATION_SECS: f64 = 0.1;

fn unavailable(err: JsValue) -> CueError {
    CueError::Unavailable(format!("{:?}", err))
}

/// Plays a short sine blip through Web Audio
///
/// The AudioContext is created on first use. Browsers may start it
/// suspended until a user gesture, so each cue resumes it first.
#[derive(Default)]
pub struct WebAudioCue {
    context: RefCell<Option<AudioContext>>,
}

impl WebAudioCue {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&self) -> Result<AudioContext, CueError> {
        let mut slot = self.context.borrow_mut();
        if let Some(ctx) = slot.as_ref() {
            return Ok(ctx.clone());
        }
        let ctx = AudioContext::new().map_err(unavailable)?;
        *slot = Some(ctx.clone());
        Ok(ctx)
    }
}

impl NotificationSink for WebAudioCue {
    fn play_cue(&self) -> Result<(), CueError> {
        let ctx = self.context()?;

        if ctx.state() == AudioContextState::Suspended {
            // Resolves asynchronously; the tone is scheduled either way
            let _ = ctx.resume().map_err(unavailable)?;
            actor_debug!("AudioContext resumed");
        }

        let oscillator = ctx.create_oscillator().map_err(unavailable)?;
        let gain = ctx.create_gain().map_err(unavailable)?;

        oscillator
            .connect_with_audio_node(&gain)
            .map_err(unavailable)?;
        gain.connect_with_audio_node(&ctx.destination())
            .map_err(unavailable)?;

        let now = ctx.current_time();
        oscillator.set_type(OscillatorType::Sine);
        oscillator
            .frequency()
            .set_value_at_time(CUE_FREQUENCY_HZ, now)
            .map_err(unavailable)?;

        gain.gain()
            .set_value_at_time(CUE_START_GAIN, now)
            .map_err(unavailable)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(CUE_END_GAIN, now + CUE_DURATION_SECS)
            .map_err(unavailable)?;

        oscillator.start_with_when(now).map_err(unavailable)?;
        oscillator
            .stop_with_when(now + CUE_DURATION_SECS)
            .map_err(unavailable)?;
        Ok(())
    }
}
