//! Render side of the audio graph.
//!
//! The `Mixer` runs on the audio thread. It drains topology commands,
//! reads gain and position parameters once per block and renders every
//! voice into an interleaved stereo buffer. It never waits on controller
//! locks.

use crate::buffer::AudioBuffer;
use crate::config::EngineConfig;
use crate::graph::{ContextState, GraphCommand, NodeId, SharedGraph, VoiceNodes};
use crate::panner::{SpatialGains, MAX_INTERAURAL_DELAY};
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Largest per-frame change of an interaural delay, in samples.
const DELAY_SLEW: f32 = 0.05;

/// Voices the render list holds before it has to grow.
const VOICE_CAPACITY: usize = 256;

/// Frames rendered per pass for devices that are not stereo.
const SCRATCH_FRAMES: usize = 4096;

/// Fractional delay line for interaural time differences.
#[derive(Debug)]
struct DelayLine {
    buf: Vec<f32>,
    write: usize,
}

impl DelayLine {
    fn new(max_delay_samples: usize) -> Self {
        Self {
            buf: vec![0.0; max_delay_samples + 2],
            write: 0,
        }
    }

    #[inline]
    fn push(&mut self, sample: f32) {
        self.buf[self.write] = sample;
        self.write = (self.write + 1) % self.buf.len();
    }

    /// Sample written `delay` samples before the latest one.
    #[inline]
    fn read(&self, delay: f32) -> f32 {
        let len = self.buf.len();
        let delay = delay.clamp(0.0, (len - 2) as f32);
        let whole = delay.floor() as usize;
        let frac = delay - whole as f32;
        let newest = (self.write + len - 1) % len;
        let a = self.buf[(newest + len - whole) % len];
        let b = self.buf[(newest + len - whole - 1) % len];
        a + (b - a) * frac
    }
}

/// Moves `current` toward `target` by at most `step`.
#[inline]
fn approach(current: f32, target: f32, step: f32) -> f32 {
    if (target - current).abs() <= step {
        target
    } else if target > current {
        current + step
    } else {
        current - step
    }
}

/// One playing voice as the mixer sees it.
pub(crate) struct RenderVoice {
    nodes: Arc<VoiceNodes>,
    buffer: Arc<AudioBuffer>,
    /// Read position in buffer frames.
    cursor: f64,
    /// Buffer frames advanced per output frame.
    rate: f64,
    gain_l: f32,
    gain_r: f32,
    delay_l: f32,
    delay_r: f32,
    line: DelayLine,
    stopping: bool,
}

impl RenderVoice {
    /// Built on the controller side so the audio thread never allocates.
    pub(crate) fn new(nodes: Arc<VoiceNodes>, buffer: Arc<AudioBuffer>, sample_rate: u32) -> Self {
        let max_delay = (MAX_INTERAURAL_DELAY * sample_rate as f32).ceil() as usize;
        let rate = buffer.sample_rate() as f64 / sample_rate.max(1) as f64;
        Self {
            nodes,
            buffer,
            cursor: 0.0,
            rate,
            gain_l: 0.0,
            gain_r: 0.0,
            delay_l: 0.0,
            delay_r: 0.0,
            line: DelayLine::new(max_delay),
            stopping: false,
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.nodes.id
    }

    /// Next looping frame, linearly interpolated.
    #[inline]
    fn next_frame(&mut self) -> (f32, f32) {
        let frames = self.buffer.frames();
        let i = self.cursor as usize % frames;
        let j = (i + 1) % frames;
        let frac = (self.cursor - self.cursor.floor()) as f32;
        let (al, ar) = self.buffer.stereo_frame(i);
        let (bl, br) = self.buffer.stereo_frame(j);

        self.cursor = (self.cursor + self.rate) % frames as f64;
        (al + (bl - al) * frac, ar + (br - ar) * frac)
    }

    /// Whether a stopping voice has faded out completely.
    fn finished(&self) -> bool {
        self.stopping && self.gain_l == 0.0 && self.gain_r == 0.0
    }

    fn render(
        &mut self,
        out: &mut [f32],
        target: SpatialGains,
        sample_rate: f32,
        slew: f32,
    ) {
        let (target_l, target_r) = if self.stopping {
            (0.0, 0.0)
        } else {
            (target.left, target.right)
        };
        let delay_target_l = target.delay_left * sample_rate;
        let delay_target_r = target.delay_right * sample_rate;
        let spatial = self.nodes.panner.is_some();

        for frame in out.chunks_exact_mut(2) {
            self.gain_l = approach(self.gain_l, target_l, slew);
            self.gain_r = approach(self.gain_r, target_r, slew);
            let (l, r) = self.next_frame();

            if spatial {
                self.delay_l = approach(self.delay_l, delay_target_l, DELAY_SLEW);
                self.delay_r = approach(self.delay_r, delay_target_r, DELAY_SLEW);
                self.line.push((l + r) * 0.5);
                frame[0] += self.line.read(self.delay_l) * self.gain_l;
                frame[1] += self.line.read(self.delay_r) * self.gain_r;
            } else {
                frame[0] += l * self.gain_l;
                frame[1] += r * self.gain_r;
            }
        }
    }
}

/// Audio-thread half of the graph.
pub struct Mixer {
    shared: Arc<SharedGraph>,
    commands: Receiver<GraphCommand>,
    voices: Vec<RenderVoice>,
    initialized: bool,
    closed: bool,
    sample_rate: u32,
    /// Largest gain change per frame.
    slew: f32,
    limiter_threshold: f32,
    /// Scratch buffer for devices that are not stereo.
    scratch: Vec<f32>,
}

impl Mixer {
    pub(crate) fn new(
        shared: Arc<SharedGraph>,
        commands: Receiver<GraphCommand>,
        config: &EngineConfig,
    ) -> Self {
        let ramp = config.ramp_frames();
        Self {
            shared,
            commands,
            voices: Vec::with_capacity(VOICE_CAPACITY),
            initialized: false,
            closed: false,
            sample_rate: config.sample_rate,
            slew: if ramp == 0 { f32::INFINITY } else { 1.0 / ramp as f32 },
            limiter_threshold: config.limiter_threshold,
            scratch: vec![0.0; SCRATCH_FRAMES * 2],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Voices currently rendered, including ones fading out.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                GraphCommand::Initialize => self.initialized = true,
                GraphCommand::Connect(voice) => {
                    if !self.closed {
                        self.voices.push(*voice);
                    }
                }
                GraphCommand::Disconnect(id) => {
                    for voice in self.voices.iter_mut().filter(|v| v.id() == id) {
                        voice.stopping = true;
                    }
                }
                GraphCommand::Close => {
                    self.closed = true;
                    self.voices.clear();
                }
            }
        }
    }

    /// Render one block of interleaved stereo into `out`.
    pub fn process(&mut self, out: &mut [f32]) {
        self.drain_commands();
        out.fill(0.0);

        let running = self.initialized
            && !self.closed
            && self.shared.context() == ContextState::Running;
        if !running {
            // Nothing is audible, so stopped voices can go right away
            self.voices.retain(|v| !v.stopping);
            return;
        }

        let listener = self.shared.listener.pose();
        let master = self.shared.master.get();
        let sample_rate = self.sample_rate as f32;

        for voice in self.voices.iter_mut() {
            let nodes = &voice.nodes;
            let level = nodes.gain.get() * self.shared.bus(nodes.category).get() * master;
            let spatial = match &nodes.panner {
                Some(panner) => panner.gains(&listener),
                None => SpatialGains::UNITY,
            };
            let target = SpatialGains {
                left: spatial.left * level,
                right: spatial.right * level,
                ..spatial
            };
            voice.render(out, target, sample_rate, self.slew);
        }
        self.voices.retain(|v| !v.finished());

        // Simple hard clamp
        let threshold = self.limiter_threshold;
        for s in out.iter_mut() {
            *s = s.clamp(-threshold, threshold);
        }
    }

    /// Render into an interleaved buffer with `channels` channels. Mono
    /// devices get the stereo downmix; extra channels stay silent.
    pub fn process_frames(&mut self, out: &mut [f32], channels: usize) {
        if channels == 2 {
            self.process(out);
            return;
        }
        if channels == 0 {
            return;
        }

        // Long blocks are rendered in scratch-sized passes
        let mut scratch = std::mem::take(&mut self.scratch);
        for block in out.chunks_mut(SCRATCH_FRAMES * channels) {
            let frames = block.len() / channels;
            let stereo = &mut scratch[..frames * 2];
            self.process(stereo);

            for (frame, lr) in block.chunks_exact_mut(channels).zip(stereo.chunks_exact(2)) {
                frame.fill(0.0);
                if channels == 1 {
                    frame[0] = (lr[0] + lr[1]) * 0.5;
                } else {
                    frame[0] = lr[0];
                    frame[1] = lr[1];
                }
            }
        }
        self.scratch = scratch;
    }
}
