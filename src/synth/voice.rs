//! A single reference-tone voice: phase-accumulator sine through a tanh
//! saturator, gated by an asymmetric one-pole envelope.
//!
//! This is a sanity-check tone for hearing the mapping, not a playable
//! instrument. The envelope rises fast (~500 Hz corner) and falls slow
//! (~80 Hz corner); note-off only drops the gate, the frequency stays put
//! while the tail decays.

use std::f64::consts::{PI, TAU};

use crate::io::midi::{MidiBuffer, MidiEvent};

const GAIN: f64 = 0.2;
const RISE_HZ: f64 = 500.0;
const FALL_HZ: f64 = 80.0;

pub struct RefVoice {
    phase: f64,
    inc: f64,
    env: f64,
    rise: f64,
    fall: f64,
    sr_inv_tau: f64,
    gate: bool,
}

impl RefVoice {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            inc: 0.0,
            env: 0.0,
            rise: 0.0,
            fall: 0.0,
            sr_inv_tau: 1.0,
            gate: false,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.sr_inv_tau = TAU / sample_rate;
        self.rise = RISE_HZ / sample_rate;
        self.fall = FALL_HZ / sample_rate;
    }

    pub fn set_freq(&mut self, hz: f64) {
        self.inc = hz * self.sr_inv_tau;
    }

    /// Render this voice over one block, reacting to the channel's note
    /// events at their sample positions. `freq_for_note` resolves a note-on
    /// key to a frequency; the caller picks table lookup, nearest-step
    /// search, or a tuning-standard query. Output is accumulated, not
    /// overwritten.
    pub fn render(
        &mut self,
        out: &mut [f32],
        midi: &MidiBuffer,
        mut freq_for_note: impl FnMut(u8) -> f64,
    ) {
        let mut cursor = 0;
        for event in midi.events() {
            match event.message {
                MidiEvent::NoteOn { key, .. } => {
                    cursor = self.run(out, cursor, event.timestamp);
                    self.set_freq(freq_for_note(key));
                    self.gate = true;
                }
                MidiEvent::NoteOff { .. } => {
                    cursor = self.run(out, cursor, event.timestamp);
                    self.gate = false;
                }
                _ => {}
            }
        }
        self.run(out, cursor, out.len());
    }

    fn run(&mut self, out: &mut [f32], from: usize, to: usize) -> usize {
        let to = to.min(out.len());
        for sample in &mut out[from..to] {
            *sample += self.tick() as f32;
        }
        to
    }

    fn tick(&mut self) -> f64 {
        self.phase += self.inc;
        if self.phase > PI {
            self.phase -= TAU;
        }
        let saturated = (4.0 * self.phase.sin()).tanh() * GAIN;

        let target = if self.gate { 1.0 } else { 0.0 };
        let rate = if self.gate { self.rise } else { self.fall };
        self.env += rate * (target - self.env);

        saturated * self.env
    }
}

impl Default for RefVoice {
    fn default() -> Self {
        Self::new()
    }
}
