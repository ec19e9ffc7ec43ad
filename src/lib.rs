pub mod delay; // Cross-block note delay
pub mod engine; // Block pipeline and parameter snapshots
pub mod io;
pub mod mpe; // MPE channel allocation and splitting
pub mod rescaler; // Note -> (note + pitch-bend) transducer
pub mod synth; // Reference oscillator bank
pub mod tuning; // Pitch mapping, frequency table, tuning-standard client

pub const MAX_BLOCK_SIZE: usize = 2048;

pub use engine::{params::Params, XenEngine};
pub use io::midi::{MidiBuffer, MidiEvent};
pub use tuning::table::{PitchMode, ScaleParams};
