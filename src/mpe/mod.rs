// Purpose - MPE channel management: per-note allocation and splitting

pub mod allocator;
pub mod splitter;

pub const NUM_CHANNELS: usize = 16;
/// Member channels carry one note each; channel 1 is the MPE global channel.
pub const NUM_MEMBER_CHANNELS: usize = 15;
pub const GLOBAL_CHANNEL: u8 = 1;
pub const FIRST_MEMBER_CHANNEL: u8 = 2;
