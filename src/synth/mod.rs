// Purpose - audible reference tone, one oscillator per MPE channel

mod bank;
mod voice;

pub use bank::SynthBank;
pub use voice::RefVoice;
