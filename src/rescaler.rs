//! Rewrites note-ons into (rounded note + pitch-bend) pairs so any
//! MPE-capable synth plays the custom scale.
//!
//! For each note-on the target frequency is converted back into a
//! fractional 12-EDO note number. The integer part becomes the emitted
//! note, the fraction becomes a 14-bit pitch-bend scaled by the configured
//! bend range. The bend is emitted immediately before the note-on at the
//! same timestamp; receivers must see it first.
//!
//! Each channel tracks only the single most recent note-on: its note-off
//! re-emits that stored (channel, note) and ignores the incoming note
//! number. Overlapping legato notes on one channel are therefore not
//! represented correctly; with the allocator upstream each member channel
//! is monophonic and the case does not arise.

use crate::io::midi::{MidiBuffer, MidiEvent};
use crate::mpe::splitter::MpeSplit;
use crate::mpe::{FIRST_MEMBER_CHANNEL, GLOBAL_CHANNEL, NUM_MEMBER_CHANNELS};
use crate::tuning::math;
use crate::tuning::table::{FreqTable, PitchMode, ScaleParams};

const PB_MAX: f64 = 16383.0;
const PB_CENTER: f64 = PB_MAX / 2.0;

/// Single-channel transducer.
pub struct XenRescaler {
    // Channel and note of the last emitted note-on, reused verbatim by the
    // next note-off on this channel.
    channel: u8,
    note: u8,
}

impl XenRescaler {
    pub fn new() -> Self {
        Self {
            channel: GLOBAL_CHANNEL,
            note: 0,
        }
    }

    pub fn process(
        &mut self,
        midi: &MidiBuffer,
        out: &mut MidiBuffer,
        table: &FreqTable,
        scale: ScaleParams,
        pb_range: f64,
    ) {
        for event in midi.events() {
            match event.message {
                MidiEvent::NoteOn {
                    channel,
                    key,
                    velocity,
                } => {
                    let freq = match scale.mode {
                        PitchMode::Rescale => table.freq(key),
                        PitchMode::Nearest => math::closest_freq(
                            math::note_to_freq(
                                key as f64,
                                math::STANDARD_EDO,
                                math::CONCERT_PITCH,
                                math::CONCERT_FREQ,
                            ),
                            scale.divisions,
                            scale.anchor_pitch,
                            scale.anchor_freq,
                        ),
                    };
                    self.note_on(out, channel, velocity, freq, pb_range, event.timestamp);
                }
                MidiEvent::NoteOff { .. } => {
                    out.add_sorted(
                        MidiEvent::NoteOff {
                            channel: self.channel,
                            key: self.note,
                            velocity: 0,
                        },
                        event.timestamp,
                    );
                }
                other => out.add_sorted(other, event.timestamp),
            }
        }
    }

    fn note_on(
        &mut self,
        out: &mut MidiBuffer,
        channel: u8,
        velocity: u8,
        freq: f64,
        pb_range: f64,
        timestamp: usize,
    ) {
        let note = math::freq_to_note(
            freq,
            math::STANDARD_EDO,
            math::CONCERT_PITCH,
            math::CONCERT_FREQ,
        );
        let rounded = note.round();
        let frac = (note - rounded) / pb_range;
        let bend = frac * PB_CENTER + PB_CENTER;

        self.channel = channel;
        self.note = rounded.clamp(0.0, 127.0) as u8;

        out.add_sorted(
            MidiEvent::PitchBend {
                channel,
                value: bend.clamp(0.0, PB_MAX) as u16,
            },
            timestamp,
        );
        out.add_sorted(
            MidiEvent::NoteOn {
                channel,
                key: self.note,
                velocity,
            },
            timestamp,
        );
    }
}

impl Default for XenRescaler {
    fn default() -> Self {
        Self::new()
    }
}

/// Rescales all MPE member channels of a split block into one output
/// stream. The global channel (1) passes through unmodified; the rescaler
/// owns channels 2..=16 only.
pub struct MpeRescaler {
    rescalers: [XenRescaler; NUM_MEMBER_CHANNELS],
}

impl MpeRescaler {
    pub fn new() -> Self {
        Self {
            rescalers: std::array::from_fn(|_| XenRescaler::new()),
        }
    }

    pub fn process(
        &mut self,
        split: &MpeSplit,
        out: &mut MidiBuffer,
        table: &FreqTable,
        scale: ScaleParams,
        pb_range: f64,
    ) {
        for event in split[GLOBAL_CHANNEL as usize].events() {
            out.add_sorted(event.message, event.timestamp);
        }
        for (slot, rescaler) in self.rescalers.iter_mut().enumerate() {
            let channel = FIRST_MEMBER_CHANNEL as usize + slot;
            rescaler.process(&split[channel], out, table, scale, pb_range);
        }
    }
}

impl Default for MpeRescaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(scale: ScaleParams) -> FreqTable {
        let mut table = FreqTable::new();
        table.rebuild_if_changed(scale);
        table
    }

    fn rescale_one(scale: ScaleParams, pb_range: f64, key: u8) -> Vec<MidiEvent> {
        let table = table_for(scale);
        let mut rescaler = XenRescaler::new();
        let mut midi = MidiBuffer::new();
        midi.push(
            MidiEvent::NoteOn {
                channel: 2,
                key,
                velocity: 100,
            },
            0,
        );
        let mut out = MidiBuffer::new();
        rescaler.process(&midi, &mut out, &table, scale, pb_range);
        out.events().iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_bend_precedes_note_on_at_same_timestamp() {
        let out = rescale_one(
            ScaleParams {
                divisions: 19.0,
                ..ScaleParams::default()
            },
            48.0,
            60,
        );
        assert!(matches!(out[0], MidiEvent::PitchBend { .. }));
        assert!(matches!(out[1], MidiEvent::NoteOn { .. }));
    }

    #[test]
    fn test_standard_scale_is_passthrough_with_centered_bend() {
        let out = rescale_one(ScaleParams::default(), 48.0, 60);

        match out[0] {
            MidiEvent::PitchBend { value, .. } => {
                // Zero fraction maps to the 8191.5 midpoint, truncated.
                assert_eq!(value, 8191);
            }
            ref other => panic!("expected pitch bend, got {other:?}"),
        }
        assert_eq!(
            out[1],
            MidiEvent::NoteOn {
                channel: 2,
                key: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_17_edo_bend_within_range_and_note_nearby() {
        let scale = ScaleParams {
            divisions: 17.0,
            ..ScaleParams::default()
        };
        let out = rescale_one(scale, 48.0, 60);

        let freq = math::note_to_freq(60.0, 17.0, 69.0, 440.0);
        let expected_note = math::freq_to_note(freq, 12.0, 69.0, 440.0);

        match (out[0], out[1]) {
            (MidiEvent::PitchBend { value, .. }, MidiEvent::NoteOn { key, .. }) => {
                assert!(value <= 16383);
                assert!((key as f64 - expected_note).abs() <= 1.0);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_note_off_reuses_stored_note() {
        let scale = ScaleParams {
            divisions: 19.0,
            ..ScaleParams::default()
        };
        let table = table_for(scale);
        let mut rescaler = XenRescaler::new();

        let mut midi = MidiBuffer::new();
        midi.push(
            MidiEvent::NoteOn {
                channel: 5,
                key: 72,
                velocity: 90,
            },
            0,
        );
        // Incoming note-off carries a different key; the emitted note-off
        // must use the remapped note of the preceding note-on.
        midi.push(
            MidiEvent::NoteOff {
                channel: 5,
                key: 72,
                velocity: 0,
            },
            10,
        );
        let mut out = MidiBuffer::new();
        rescaler.process(&midi, &mut out, &table, scale, 48.0);

        let emitted_key = match out.events()[1].message {
            MidiEvent::NoteOn { key, .. } => key,
            ref other => panic!("expected note on, got {other:?}"),
        };
        assert_eq!(
            out.events()[2].message,
            MidiEvent::NoteOff {
                channel: 5,
                key: emitted_key,
                velocity: 0
            }
        );
    }

    #[test]
    fn test_overlapping_notes_share_state_known_limitation() {
        // Documented limitation: one channel tracks a single note. The
        // second note-on overwrites the first; both note-offs re-emit the
        // second note.
        let scale = ScaleParams::default();
        let table = table_for(scale);
        let mut rescaler = XenRescaler::new();

        let mut midi = MidiBuffer::new();
        for (key, ts) in [(60u8, 0usize), (64, 1)] {
            midi.push(
                MidiEvent::NoteOn {
                    channel: 2,
                    key,
                    velocity: 100,
                },
                ts,
            );
        }
        midi.push(
            MidiEvent::NoteOff {
                channel: 2,
                key: 60,
                velocity: 0,
            },
            2,
        );
        let mut out = MidiBuffer::new();
        rescaler.process(&midi, &mut out, &table, scale, 48.0);

        assert_eq!(
            out.events().last().unwrap().message,
            MidiEvent::NoteOff {
                channel: 2,
                key: 64,
                velocity: 0
            }
        );
    }

    #[test]
    fn test_other_events_pass_through() {
        let scale = ScaleParams::default();
        let table = table_for(scale);
        let mut rescaler = XenRescaler::new();

        let cc = MidiEvent::ControlChange {
            channel: 2,
            controller: 74,
            value: 33,
        };
        let mut midi = MidiBuffer::new();
        midi.push(cc, 3);
        let mut out = MidiBuffer::new();
        rescaler.process(&midi, &mut out, &table, scale, 48.0);

        assert_eq!(out.events()[0].message, cc);
        assert_eq!(out.events()[0].timestamp, 3);
    }

    #[test]
    fn test_mpe_rescaler_merges_channels_in_timestamp_order() {
        let scale = ScaleParams {
            divisions: 17.0,
            ..ScaleParams::default()
        };
        let table = table_for(scale);
        let mut split = MpeSplit::new();
        let mut midi = MidiBuffer::new();
        midi.push(
            MidiEvent::NoteOn {
                channel: 3,
                key: 60,
                velocity: 100,
            },
            1,
        );
        midi.push(
            MidiEvent::NoteOn {
                channel: 2,
                key: 64,
                velocity: 100,
            },
            6,
        );
        split.process(&mut midi);

        let mut rescaler = MpeRescaler::new();
        let mut out = MidiBuffer::new();
        rescaler.process(&split, &mut out, &table, scale, 48.0);

        let stamps: Vec<usize> = out.events().iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, [1, 1, 6, 6]);
        // Channel 3's pair comes first even though channel 2 is processed
        // later: merging is by timestamp, not processing order.
        assert_eq!(out.events()[0].message.channel(), Some(3));
        assert_eq!(out.events()[2].message.channel(), Some(2));
    }

    #[test]
    fn test_global_channel_passes_through_unrescaled() {
        let scale = ScaleParams {
            divisions: 19.0,
            ..ScaleParams::default()
        };
        let table = table_for(scale);
        let mut split = MpeSplit::new();
        let mut midi = MidiBuffer::new();
        let global_cc = MidiEvent::ControlChange {
            channel: 1,
            controller: 7,
            value: 100,
        };
        midi.push(global_cc, 0);
        split.process(&mut midi);

        let mut rescaler = MpeRescaler::new();
        let mut out = MidiBuffer::new();
        rescaler.process(&split, &mut out, &table, scale, 48.0);

        assert_eq!(out.events()[0].message, global_cc);
    }
}
