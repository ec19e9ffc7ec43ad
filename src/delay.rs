//! Delays note on/off events by a fixed number of samples, across block
//! boundaries.
//!
//! Pending notes sit in a fixed 32-slot rotating stack. Each block, any
//! pending note whose delayed timestamp falls inside the block is emitted;
//! the rest have the block length subtracted and stay queued for a later
//! block. Nothing is dropped unless the stack itself overflows, in which
//! case the slot under the cursor is overwritten (oldest-ish, same policy
//! as channel stealing). Non-note events are never delayed.

use crate::io::midi::{MidiBuffer, MidiEvent};

const STACK_SIZE: usize = 32;
const STACK_MASK: usize = STACK_SIZE - 1;

pub struct NoteDelay {
    pending: [Option<(MidiEvent, usize)>; STACK_SIZE],
    cursor: usize,
    scratch: MidiBuffer,
}

impl NoteDelay {
    pub fn new() -> Self {
        Self {
            pending: [None; STACK_SIZE],
            cursor: 0,
            scratch: MidiBuffer::with_capacity(1024),
        }
    }

    pub fn process(&mut self, midi: &mut MidiBuffer, num_samples: usize, delay_samples: usize) {
        self.defer_notes(midi, delay_samples);
        self.emit_mature(midi, num_samples);
    }

    /// Pull note on/off events out of the stream into the pending stack,
    /// stamped with their delayed position.
    fn defer_notes(&mut self, midi: &mut MidiBuffer, delay_samples: usize) {
        self.scratch.clear();
        for event in midi.events() {
            if event.message.is_note() {
                self.push_pending(event.message, event.timestamp + delay_samples);
            } else {
                self.scratch.push(event.message, event.timestamp);
            }
        }
        midi.swap(&mut self.scratch);
    }

    fn push_pending(&mut self, message: MidiEvent, timestamp: usize) {
        for _ in 0..STACK_SIZE {
            self.cursor = (self.cursor + 1) & STACK_MASK;
            if self.pending[self.cursor].is_none() {
                self.pending[self.cursor] = Some((message, timestamp));
                return;
            }
        }
        self.cursor = (self.cursor + 1) & STACK_MASK;
        self.pending[self.cursor] = Some((message, timestamp));
    }

    /// Emit pending notes that land inside this block; re-bias the rest by
    /// the block length and keep them.
    fn emit_mature(&mut self, midi: &mut MidiBuffer, num_samples: usize) {
        for offset in 0..STACK_SIZE {
            let slot = (self.cursor + offset + 1) & STACK_MASK;
            if let Some((message, timestamp)) = self.pending[slot] {
                if timestamp < num_samples {
                    midi.add_sorted(message, timestamp);
                    self.pending[slot] = None;
                } else {
                    self.pending[slot] = Some((message, timestamp - num_samples));
                }
            }
        }
    }
}

impl Default for NoteDelay {
    fn default() -> Self {
        Self::new()
    }
}
