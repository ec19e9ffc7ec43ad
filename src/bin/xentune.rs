//! xentune - audible demo of the retuning pipeline.
//!
//! Opens the default output device and plays a looping arpeggio through
//! the engine in 19-EDO, switching to nearest-step mode halfway through
//! each pass. Run with: cargo run

#[cfg(feature = "rtrb")]
fn main() -> color_eyre::Result<()> {
    demo::run()
}

#[cfg(not(feature = "rtrb"))]
fn main() {
    eprintln!("The demo needs the default `rtrb` feature for its control ring.");
}

#[cfg(feature = "rtrb")]
mod demo {
    use color_eyre::eyre::{eyre, Result, WrapErr};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use rtrb::RingBuffer;
    use std::{thread, time::Duration};
    use xentune::{
        io::AudioOutput, MidiBuffer, MidiEvent, Params, PitchMode, XenEngine, MAX_BLOCK_SIZE,
    };

    /// Scale degrees of a 19-EDO arpeggio around middle C.
    const ARPEGGIO: [u8; 4] = [60, 66, 71, 79];

    pub fn run() -> Result<()> {
        color_eyre::install()?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        let sample_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;

        let (mut params_tx, params_rx) = RingBuffer::<Params>::new(8);
        let (mut midi_tx, mut midi_rx) = RingBuffer::<MidiEvent>::new(256);

        let mut engine = XenEngine::new(sample_rate);
        engine.attach_control(params_rx);
        engine.set_params(Params {
            divisions: 19.0,
            ..Params::default()
        });

        let mut audio = AudioOutput::mono(MAX_BLOCK_SIZE);
        let mut midi = MidiBuffer::with_capacity(256);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels;
                    let mut written = 0;
                    while written < total_frames {
                        let frames = (total_frames - written).min(MAX_BLOCK_SIZE);
                        audio.buffers[0].resize(frames, 0.0);

                        midi.clear();
                        while let Ok(message) = midi_rx.pop() {
                            midi.push(message, 0);
                        }
                        engine.process_block(&mut midi, &mut audio);

                        let out_off = written * channels;
                        for (i, &s) in audio.buffers[0].iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }
                        written += frames;
                    }
                },
                move |err| eprintln!("stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;
        stream.play().wrap_err("failed to start output stream")?;

        println!("Playing a 19-EDO arpeggio. Ctrl-C to quit.");
        let mut nearest = false;
        loop {
            for &key in &ARPEGGIO {
                let _ = midi_tx.push(MidiEvent::NoteOn {
                    channel: 1,
                    key,
                    velocity: 100,
                });
                thread::sleep(Duration::from_millis(350));
                let _ = midi_tx.push(MidiEvent::NoteOff {
                    channel: 1,
                    key,
                    velocity: 0,
                });
                thread::sleep(Duration::from_millis(50));
            }

            // Alternate the mapping mode each pass so the difference between
            // rescale and nearest-step is audible.
            nearest = !nearest;
            let _ = params_tx.push(Params {
                divisions: 19.0,
                mode: if nearest {
                    PitchMode::Nearest
                } else {
                    PitchMode::Rescale
                },
                ..Params::default()
            });
        }
    }
}
