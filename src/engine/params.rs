//! Engine parameters, published from the control thread as whole
//! snapshots.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tuning::table::{PitchMode, ScaleParams};

pub const MIN_DIVISIONS: f64 = 1.0;
pub const MAX_DIVISIONS: f64 = 100.0;
pub const MIN_ANCHOR_FREQ: f64 = 8.0;
pub const MAX_ANCHOR_FREQ: f64 = 22_000.0;
pub const MIN_PB_RANGE: f64 = 1.0;

/// One complete parameter snapshot. `Copy` so a snapshot crosses the
/// control -> audio ring without tearing; the audio thread reads one
/// snapshot per block and tolerates it being a block stale.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Steps per octave, 1..=100.
    pub divisions: f64,
    /// Anchor MIDI note, 0..=127.
    pub anchor_pitch: f64,
    /// Anchor frequency in Hz, 8..=22000.
    pub anchor_freq: f64,
    /// Semitones covered by full pitch-bend excursion, >= 1.
    pub pb_range: f64,
    pub mode: PitchMode,
    /// Retag note streams onto per-note MPE channels.
    pub auto_mpe: bool,
    /// Render the audible reference tone.
    pub use_synth: bool,
    /// Publish tuning tables instead of rescaling MIDI.
    pub mts_enabled: bool,
    /// Note on/off delay in samples, 0 to bypass.
    pub note_delay: usize,
}

impl Default for Params {
    fn default() -> Self {
        let scale = ScaleParams::default();
        Self {
            divisions: scale.divisions,
            anchor_pitch: scale.anchor_pitch,
            anchor_freq: scale.anchor_freq,
            pb_range: 48.0,
            mode: scale.mode,
            auto_mpe: true,
            use_synth: true,
            mts_enabled: false,
            note_delay: 0,
        }
    }
}

impl Params {
    /// Pull every field into its legal range. Out-of-range input is
    /// corrected silently, never reported.
    pub fn clamped(self) -> Self {
        Self {
            divisions: self.divisions.clamp(MIN_DIVISIONS, MAX_DIVISIONS),
            anchor_pitch: self.anchor_pitch.clamp(0.0, 127.0),
            anchor_freq: self.anchor_freq.clamp(MIN_ANCHOR_FREQ, MAX_ANCHOR_FREQ),
            pb_range: self.pb_range.max(MIN_PB_RANGE),
            ..self
        }
    }

    pub fn scale(&self) -> ScaleParams {
        ScaleParams {
            divisions: self.divisions,
            anchor_pitch: self.anchor_pitch,
            anchor_freq: self.anchor_freq,
            mode: self.mode,
        }
    }
}
