//! Pure pitch-mapping functions for equal divisions of the octave.

/*
EDO Pitch Mapping
=================

An EDO ("equal division of the octave") scale splits each octave into a
fixed number of equal steps. 12-EDO is the ordinary chromatic scale; 19-EDO
or 31-EDO give noticeably different intervals while still repeating at the
octave.

The whole mapping is anchored by one (pitch, frequency) pair - typically
MIDI note 69 at 440 Hz - so a custom scale still lines up with real-world
pitch at one reference point:

    freq(note) = anchor_freq * 2^((note - anchor_pitch) / divisions)

`freq_to_note` is the exact inverse:

    note(freq) = anchor_pitch + divisions * log2(freq / anchor_freq)

Snap mode ("steps in 12") answers a different question: where would the
conventional semitone positions land if rounded onto the custom scale? We
compute the 12-EDO frequency for the key, convert it into fractional target
steps, round, and re-expand. Playing a chromatic keyboard then walks the
nearest custom steps instead of arbitrary fractional ones.

All math is f64. There are no NaN/Inf guards: callers must keep
`divisions > 0` and `anchor_freq > 0` (the table and engine clamp their
inputs before calling in here).
*/

/// MIDI note number of concert A (A4).
pub const CONCERT_PITCH: f64 = 69.0;
/// Frequency of concert A in Hz.
pub const CONCERT_FREQ: f64 = 440.0;
/// Steps per octave of the conventional chromatic scale.
pub const STANDARD_EDO: f64 = 12.0;

/// Frequency of a scale step in a `divisions`-EDO scale.
#[inline]
pub fn note_to_freq(note: f64, divisions: f64, anchor_pitch: f64, anchor_freq: f64) -> f64 {
    anchor_freq * ((note - anchor_pitch) / divisions).exp2()
}

/// Fractional scale step of a frequency. Exact inverse of [`note_to_freq`].
#[inline]
pub fn freq_to_note(freq: f64, divisions: f64, anchor_pitch: f64, anchor_freq: f64) -> f64 {
    anchor_pitch + divisions * (freq / anchor_freq).log2()
}

/// Frequency of the custom-scale step nearest to the conventional 12-EDO
/// position of `note` (snap mode).
#[inline]
pub fn note_to_freq_in_12_steps(
    note: f64,
    divisions: f64,
    anchor_pitch: f64,
    anchor_freq: f64,
) -> f64 {
    let freq_12 = note_to_freq(note, STANDARD_EDO, anchor_pitch, anchor_freq);
    let step = freq_to_note(freq_12, divisions, anchor_pitch, anchor_freq).round();
    note_to_freq(step, divisions, anchor_pitch, anchor_freq)
}

/// Frequency of the scale step (over notes 0..128) closest to `freq`.
///
/// Linear scan, O(128). Called at most once per note-on, never per sample.
pub fn closest_freq(freq: f64, divisions: f64, anchor_pitch: f64, anchor_freq: f64) -> f64 {
    let mut best_freq = 0.0;
    let mut best_dist = f64::MAX;

    for note in 0..crate::tuning::NUM_PITCHES {
        let note_freq = note_to_freq(note as f64, divisions, anchor_pitch, anchor_freq);
        let dist = (freq - note_freq).abs();
        if dist < best_dist {
            best_dist = dist;
            best_freq = note_freq;
        }
    }

    best_freq
}
