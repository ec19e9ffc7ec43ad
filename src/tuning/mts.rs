//! Client handle for an external micro-tuning standard.
//!
//! The engine never talks to a process-global tuning service directly; it
//! holds a boxed [`TuningSink`] injected by the host glue. Registration
//! lifecycle (and any periodic re-registration polling) belongs to that
//! glue, not to the realtime pipeline.

use crate::tuning::NUM_PITCHES;

pub trait TuningSink: Send {
    /// Try to take the master role. Returns whether the sink is usable.
    /// Called from non-realtime code only.
    fn register_if_available(&mut self) -> bool;

    /// Broadcast a full 128-entry note -> frequency table and scale name.
    /// Called on table rebuild while the tuning-standard mode is active,
    /// so at most once per block.
    fn publish_table(&mut self, freqs: &[f64; NUM_PITCHES], name: &str);

    /// Frequency this client should use for `note`, or None when the
    /// service is unavailable. Callers fall back to the internal table.
    fn query_frequency(&self, note: u8) -> Option<f64>;

    /// Give up the master role. Called from non-realtime code only.
    fn deregister(&mut self);
}

/// Default handle: the tuning standard is absent and every operation is a
/// no-op.
pub struct NullTuningSink;

impl TuningSink for NullTuningSink {
    fn register_if_available(&mut self) -> bool {
        false
    }

    fn publish_table(&mut self, _freqs: &[f64; NUM_PITCHES], _name: &str) {}

    fn query_frequency(&self, _note: u8) -> Option<f64> {
        None
    }

    fn deregister(&mut self) {}
}
