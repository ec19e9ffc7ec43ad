//! MIDI event and per-block buffer types.
//!
//! Channels are 1-based (1..=16) as on the wire; channel 1 is the MPE
//! global channel. Events without a channel field (clock, sysex, ...) are
//! represented by [`MidiEvent::System`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit pitch wheel position, 0..=16383, center 8192.
    PitchBend { channel: u8, value: u16 },
    ProgramChange { channel: u8, program: u8 },
    /// Non-channel message, identified by its status byte.
    System { status: u8 },
}

impl MidiEvent {
    /// The channel this event is addressed to, if it has one.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => Some(channel),
            MidiEvent::System { .. } => None,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(
            self,
            MidiEvent::NoteOn { .. } | MidiEvent::NoteOff { .. }
        )
    }
}

/// A MIDI event stamped with its sample offset inside the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub message: MidiEvent,
    pub timestamp: usize,
}

/// An ordered per-block event list, reused across blocks.
///
/// Events are kept in non-decreasing timestamp order. `push` appends and is
/// for producers that already emit in order; `add_sorted` inserts after any
/// events carrying the same timestamp, which preserves the relative order
/// of same-timestamp events from different sources.
#[derive(Debug, Default, Clone)]
pub struct MidiBuffer {
    events: Vec<TimedEvent>,
}

impl MidiBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push(&mut self, message: MidiEvent, timestamp: usize) {
        debug_assert!(
            self.events.last().map_or(true, |e| e.timestamp <= timestamp),
            "push out of timestamp order"
        );
        self.events.push(TimedEvent { message, timestamp });
    }

    pub fn add_sorted(&mut self, message: MidiEvent, timestamp: usize) {
        let at = self
            .events
            .partition_point(|e| e.timestamp <= timestamp);
        self.events.insert(at, TimedEvent { message, timestamp });
    }

    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Exchange contents with another buffer without copying events.
    pub fn swap(&mut self, other: &mut MidiBuffer) {
        std::mem::swap(&mut self.events, &mut other.events);
    }
}

impl<'a> IntoIterator for &'a MidiBuffer {
    type Item = &'a TimedEvent;
    type IntoIter = std::slice::Iter<'a, TimedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
