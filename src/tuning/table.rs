//! The 128-entry note -> frequency table shared by the rescaler, the
//! reference synth, and tuning-standard publication.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tuning::{math, NUM_PITCHES};

/// How incoming notes are mapped onto the custom scale.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchMode {
    /// Each key is a scale step: frequency comes straight from the table.
    Rescale,
    /// Each key keeps its 12-EDO meaning and snaps to the nearest custom
    /// step. The table holds snapped entries and note-ons run a
    /// closest-frequency search.
    Nearest,
}

/// The parameter set a table is built from. Equality is the dirty check.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParams {
    /// Steps per octave (the "xen" value).
    pub divisions: f64,
    /// MIDI note the scale is anchored at.
    pub anchor_pitch: f64,
    /// Frequency of the anchor note in Hz.
    pub anchor_freq: f64,
    pub mode: PitchMode,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            divisions: math::STANDARD_EDO,
            anchor_pitch: math::CONCERT_PITCH,
            anchor_freq: math::CONCERT_FREQ,
            mode: PitchMode::Rescale,
        }
    }
}

/// One frequency per MIDI note, rebuilt only when the scale changes.
///
/// Rebuilding is O(128) and runs at most once per block; every consumer
/// inside a block reads the same immutable table.
pub struct FreqTable {
    freqs: [f64; NUM_PITCHES],
    built_from: Option<ScaleParams>,
}

impl FreqTable {
    pub fn new() -> Self {
        Self {
            freqs: [0.0; NUM_PITCHES],
            built_from: None,
        }
    }

    /// Rebuild if `params` differ from what the table was built from.
    /// Returns true when a rebuild happened.
    pub fn rebuild_if_changed(&mut self, params: ScaleParams) -> bool {
        if self.built_from == Some(params) {
            return false;
        }

        let hz = match params.mode {
            PitchMode::Rescale => math::note_to_freq,
            PitchMode::Nearest => math::note_to_freq_in_12_steps,
        };
        for (note, freq) in self.freqs.iter_mut().enumerate() {
            *freq = hz(
                note as f64,
                params.divisions,
                params.anchor_pitch,
                params.anchor_freq,
            );
        }
        self.built_from = Some(params);
        true
    }

    pub fn freq(&self, note: u8) -> f64 {
        self.freqs[note as usize & (NUM_PITCHES - 1)]
    }

    pub fn freqs(&self) -> &[f64; NUM_PITCHES] {
        &self.freqs
    }
}

impl Default for FreqTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rebuild_only_on_change() {
        let mut table = FreqTable::new();
        let params = ScaleParams::default();

        assert!(table.rebuild_if_changed(params));
        assert!(!table.rebuild_if_changed(params));

        let changed = ScaleParams {
            divisions: 19.0,
            ..params
        };
        assert!(table.rebuild_if_changed(changed));
    }

    #[test]
    fn test_rescale_entries_match_math() {
        let mut table = FreqTable::new();
        let params = ScaleParams {
            divisions: 17.0,
            ..ScaleParams::default()
        };
        table.rebuild_if_changed(params);

        for note in 0..128u8 {
            let expected = math::note_to_freq(note as f64, 17.0, 69.0, 440.0);
            assert_relative_eq!(table.freq(note), expected);
        }
    }

    #[test]
    fn test_nearest_entries_are_snapped() {
        let mut table = FreqTable::new();
        let params = ScaleParams {
            divisions: 19.0,
            mode: PitchMode::Nearest,
            ..ScaleParams::default()
        };
        table.rebuild_if_changed(params);

        for note in 0..128u8 {
            let step = math::freq_to_note(table.freq(note), 19.0, 69.0, 440.0);
            assert_relative_eq!(step, step.round(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_standard_table_is_concert_tuning() {
        let mut table = FreqTable::new();
        table.rebuild_if_changed(ScaleParams::default());
        assert_relative_eq!(table.freq(69), 440.0);
        assert_relative_eq!(table.freq(57), 220.0, max_relative = 1e-12);
        assert_relative_eq!(table.freq(81), 880.0, max_relative = 1e-12);
    }
}
