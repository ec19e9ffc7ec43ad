//! One reference voice per MIDI channel, summed into a mono buffer.

use crate::io::midi::MidiBuffer;
use crate::mpe::splitter::MpeSplit;
use crate::mpe::NUM_CHANNELS;
use crate::synth::RefVoice;
use crate::tuning::math;
use crate::tuning::mts::TuningSink;
use crate::tuning::table::{FreqTable, PitchMode, ScaleParams};

pub struct SynthBank {
    voices: [RefVoice; NUM_CHANNELS],
}

impl SynthBank {
    pub fn new() -> Self {
        Self {
            voices: std::array::from_fn(|_| RefVoice::new()),
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
    }

    /// Render all channel voices additively into `out`. Frequencies come
    /// from the tuning-standard sink when that mode is active (internal
    /// table as fallback), otherwise from the table or the nearest-step
    /// search depending on the pitch mode.
    pub fn render(
        &mut self,
        split: &MpeSplit,
        table: &FreqTable,
        scale: ScaleParams,
        sink: &dyn TuningSink,
        mts_enabled: bool,
        out: &mut [f32],
    ) {
        for channel in 1..=NUM_CHANNELS {
            let midi: &MidiBuffer = &split[channel];
            let voice = &mut self.voices[channel - 1];

            if mts_enabled {
                voice.render(out, midi, |key| {
                    sink.query_frequency(key).unwrap_or_else(|| table.freq(key))
                });
            } else {
                match scale.mode {
                    PitchMode::Rescale => voice.render(out, midi, |key| table.freq(key)),
                    PitchMode::Nearest => voice.render(out, midi, |key| {
                        math::closest_freq(
                            math::note_to_freq(
                                key as f64,
                                math::STANDARD_EDO,
                                math::CONCERT_PITCH,
                                math::CONCERT_FREQ,
                            ),
                            scale.divisions,
                            scale.anchor_pitch,
                            scale.anchor_freq,
                        )
                    }),
                }
            }
        }
    }
}

impl Default for SynthBank {
    fn default() -> Self {
        Self::new()
    }
}
