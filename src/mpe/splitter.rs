//! Per-channel MIDI demultiplexer.

use std::ops::{Index, IndexMut};

use crate::io::midi::MidiBuffer;
use crate::mpe::NUM_CHANNELS;

/// Bucket index for events that carry no channel.
pub const SYSTEM_BUCKET: usize = 0;

/// Splits one MIDI stream into 17 buckets: one per channel 1..=16 plus the
/// system bucket. Buckets are rebuilt from scratch every block and hold
/// nothing across blocks.
pub struct MpeSplit {
    buckets: [MidiBuffer; NUM_CHANNELS + 1],
}

impl MpeSplit {
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| MidiBuffer::with_capacity(1024)),
        }
    }

    /// Demultiplex `midi` by channel. Afterwards `midi` holds the system
    /// bucket, ready to serve as the base of the block's output stream.
    pub fn process(&mut self, midi: &mut MidiBuffer) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }

        for event in midi.events() {
            let bucket = match event.message.channel() {
                Some(channel @ 1..=16) => channel as usize,
                _ => SYSTEM_BUCKET,
            };
            self.buckets[bucket].push(event.message, event.timestamp);
        }

        midi.swap(&mut self.buckets[SYSTEM_BUCKET]);
    }

    /// Merge channel buckets 1..=16 into `out` unmodified, keeping
    /// timestamp order. Used when the rescaler is bypassed.
    pub fn merge_channels_into(&self, out: &mut MidiBuffer) {
        for bucket in &self.buckets[1..] {
            for event in bucket.events() {
                out.add_sorted(event.message, event.timestamp);
            }
        }
    }
}

impl Default for MpeSplit {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for MpeSplit {
    type Output = MidiBuffer;

    fn index(&self, channel: usize) -> &MidiBuffer {
        &self.buckets[channel]
    }
}

impl IndexMut<usize> for MpeSplit {
    fn index_mut(&mut self, channel: usize) -> &mut MidiBuffer {
        &mut self.buckets[channel]
    }
}
