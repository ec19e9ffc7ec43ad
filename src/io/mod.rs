// Purpose - external interfaces: MIDI events and audio block buffers

pub mod midi;

/// Audio output for one block: one inner buffer per hardware channel.
///
/// The engine writes the reference tone into buffer 0 and copies it to
/// buffer 1 when a second channel is present. Buffers are owned by the
/// caller and reused across blocks.
#[derive(Debug, Default)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn mono(frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]],
        }
    }

    pub fn stereo(frames: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; frames]; 2],
        }
    }

    /// Number of frames in this block (0 when no buffers are attached).
    pub fn frames(&self) -> usize {
        self.buffers.first().map(Vec::len).unwrap_or(0)
    }
}
