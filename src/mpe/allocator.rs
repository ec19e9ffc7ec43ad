//! Automatic MPE channel allocation.
//!
//! Each incoming note-on is retagged onto its own member channel so that
//! downstream pitch-bend applies per note. Allocation walks a fixed ring of
//! voice slots with a rotating cursor: the cursor advances one slot per
//! attempt, which keeps assignment round-robin fair and makes the
//! least-recently-assigned channel the one stolen under starvation.

use crate::io::midi::{MidiBuffer, MidiEvent};
use crate::mpe::{FIRST_MEMBER_CHANNEL, NUM_MEMBER_CHANNELS};

/// One member-channel slot. Slots are created once and only ever reset;
/// `note` is meaningful only while `active`.
#[derive(Debug, Clone, Copy)]
struct Voice {
    note: Option<u8>,
    channel: u8,
    active: bool,
}

pub struct AutoMpe {
    voices: [Voice; NUM_MEMBER_CHANNELS],
    cursor: usize,
    scratch: MidiBuffer,
}

impl AutoMpe {
    pub fn new() -> Self {
        let voices = std::array::from_fn(|slot| Voice {
            note: None,
            channel: FIRST_MEMBER_CHANNEL + slot as u8,
            active: false,
        });
        Self {
            voices,
            cursor: 0,
            scratch: MidiBuffer::with_capacity(1024),
        }
    }

    /// Rewrite note on/off channels in place. Non-note events pass through
    /// with their original channel and timestamp; relative order with the
    /// note events around them is preserved.
    pub fn process(&mut self, midi: &mut MidiBuffer) {
        self.scratch.clear();
        for event in midi.events() {
            match event.message {
                MidiEvent::NoteOn { key, velocity, .. } => {
                    self.note_on(key, velocity, event.timestamp);
                }
                MidiEvent::NoteOff { key, velocity, .. } => {
                    self.note_off(key, velocity, event.timestamp);
                }
                other => self.scratch.push(other, event.timestamp),
            }
        }
        midi.swap(&mut self.scratch);
    }

    fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % NUM_MEMBER_CHANNELS;
    }

    fn note_on(&mut self, key: u8, velocity: u8, timestamp: usize) {
        for _ in 0..NUM_MEMBER_CHANNELS {
            self.advance();
            if !self.voices[self.cursor].active {
                self.assign(key, velocity, timestamp);
                return;
            }
        }

        // Every slot is busy: steal the one the cursor lands on next. Its
        // note-off goes out first, at the stealing note-on's timestamp.
        self.advance();
        let stolen = self.voices[self.cursor];
        self.scratch.push(
            MidiEvent::NoteOff {
                channel: stolen.channel,
                key: stolen.note.unwrap_or(0),
                velocity: 0,
            },
            timestamp,
        );
        self.assign(key, velocity, timestamp);
    }

    fn assign(&mut self, key: u8, velocity: u8, timestamp: usize) {
        let voice = &mut self.voices[self.cursor];
        voice.note = Some(key);
        voice.active = true;
        self.scratch.push(
            MidiEvent::NoteOn {
                channel: voice.channel,
                key,
                velocity,
            },
            timestamp,
        );
    }

    /// Match most-recently-allocated first, scanning backward from the
    /// cursor. An unmatched note-off is dropped: there is no voice to
    /// release, and emitting it on a guessed channel could cut a live note.
    fn note_off(&mut self, key: u8, velocity: u8, timestamp: usize) {
        for back in 0..NUM_MEMBER_CHANNELS {
            let slot = (self.cursor + NUM_MEMBER_CHANNELS - back) % NUM_MEMBER_CHANNELS;
            let voice = &mut self.voices[slot];
            if voice.active && voice.note == Some(key) {
                voice.active = false;
                voice.note = None;
                let channel = voice.channel;
                self.scratch.push(
                    MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity,
                    },
                    timestamp,
                );
                return;
            }
        }
    }
}

impl Default for AutoMpe {
    fn default() -> Self {
        Self::new()
    }
}
