// Purpose - pitch mapping math, frequency table, tuning-standard client

pub mod math;
pub mod mts;
pub mod table;

/// Size of the standard MIDI note range, and of every frequency table.
pub const NUM_PITCHES: usize = 128;
