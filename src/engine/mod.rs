//! The block-synchronous pipeline: note delay -> channel allocator ->
//! splitter -> {reference synth, rescaler} -> output MIDI + audio.
//!
//! `process_block` runs once per audio callback on the realtime thread.
//! Nothing in it locks, blocks, or allocates: all buffers are pre-sized at
//! construction and parameter changes arrive as whole snapshots through an
//! SPSC ring drained at block start.

pub mod params;

use std::fmt::Write;

use crate::delay::NoteDelay;
use crate::io::midi::MidiBuffer;
use crate::io::AudioOutput;
use crate::mpe::allocator::AutoMpe;
use crate::mpe::splitter::MpeSplit;
use crate::rescaler::MpeRescaler;
use crate::synth::SynthBank;
use crate::tuning::mts::{NullTuningSink, TuningSink};
use crate::tuning::table::FreqTable;

pub use params::Params;

pub struct XenEngine {
    params: Params,
    #[cfg(feature = "rtrb")]
    params_rx: Option<rtrb::Consumer<Params>>,
    prev_mts: bool,

    table: FreqTable,
    allocator: AutoMpe,
    split: MpeSplit,
    rescaler: MpeRescaler,
    synth: SynthBank,
    delay: NoteDelay,

    sink: Box<dyn TuningSink>,
    // Reused scale-name buffer so publishing does not allocate after the
    // first format.
    name: String,
}

impl XenEngine {
    pub fn new(sample_rate: f64) -> Self {
        let mut synth = SynthBank::new();
        synth.prepare(sample_rate);
        Self {
            params: Params::default(),
            #[cfg(feature = "rtrb")]
            params_rx: None,
            prev_mts: false,
            table: FreqTable::new(),
            allocator: AutoMpe::new(),
            split: MpeSplit::new(),
            rescaler: MpeRescaler::new(),
            synth,
            delay: NoteDelay::new(),
            sink: Box::new(NullTuningSink),
            name: String::with_capacity(16),
        }
    }

    /// Swap in a tuning-standard client handle. The engine publishes
    /// through it; registration lifecycle stays with the caller.
    pub fn set_tuning_sink(&mut self, sink: Box<dyn TuningSink>) {
        self.sink = sink;
    }

    /// Attach the consumer end of a control ring. The producer side pushes
    /// complete [`Params`] snapshots from the non-realtime thread.
    #[cfg(feature = "rtrb")]
    pub fn attach_control(&mut self, rx: rtrb::Consumer<Params>) {
        self.params_rx = Some(rx);
    }

    /// Direct parameter update for single-threaded use (tests, offline
    /// rendering).
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// Process one block: consume `midi`, leave the rewritten stream in it,
    /// and accumulate the reference tone into `audio` (cleared first).
    /// Event timestamps must be in non-decreasing order and below the block
    /// length.
    pub fn process_block(&mut self, midi: &mut MidiBuffer, audio: &mut AudioOutput) {
        self.drain_control();
        let p = self.params.clamped();
        let num_samples = audio.frames();

        for buffer in &mut audio.buffers {
            buffer.fill(0.0);
        }

        if p.note_delay > 0 {
            self.delay.process(midi, num_samples, p.note_delay);
        }
        if p.auto_mpe {
            self.allocator.process(midi);
        }
        self.split.process(midi);

        let scale = p.scale();
        let rebuilt = self.table.rebuild_if_changed(scale);
        let mts_turned_on = p.mts_enabled && !self.prev_mts;
        if p.mts_enabled && (rebuilt || mts_turned_on) {
            self.name.clear();
            let _ = write!(self.name, "{} edo", scale.divisions);
            self.sink.publish_table(self.table.freqs(), &self.name);
        }
        self.prev_mts = p.mts_enabled;

        if p.use_synth && num_samples > 0 {
            let (first, rest) = audio.buffers.split_at_mut(1);
            self.synth.render(
                &self.split,
                &self.table,
                scale,
                self.sink.as_ref(),
                p.mts_enabled,
                &mut first[0],
            );
            if let Some(second) = rest.first_mut() {
                second.copy_from_slice(&first[0]);
            }
        }

        // `midi` holds the system bucket after the split; the rescaled (or
        // passed-through) channel events merge back into it in order.
        if p.mts_enabled {
            self.split.merge_channels_into(midi);
        } else {
            self.rescaler
                .process(&self.split, midi, &self.table, scale, p.pb_range);
        }
    }

    fn drain_control(&mut self) {
        #[cfg(feature = "rtrb")]
        if let Some(rx) = &mut self.params_rx {
            while let Ok(params) = rx.pop() {
                self.params = params;
            }
        }
    }
}
