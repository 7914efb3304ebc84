//! GraphEngine - non-realtime renderer for saavy graph tracks
//!
//! Each track is one voice (one GraphNode) fed by its own ring buffer of
//! timed note messages. Scheduling code pushes messages while simulated time
//! advances; `start_rendering` then moves the tracks to a worker thread,
//! applies every message at its exact frame and mixes the result.

use log::{debug, trace};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::RenderConfig,
    deferred::{Deferred, RenderResult},
    engine::{
        message::{MessageReceiver, NoteMessage, TimedMessage},
        RenderEngine,
    },
    error::RenderError,
    graph::{GraphNode, RenderCtx},
    io::AudioBuffer,
    MAX_BLOCK_SIZE,
};

/// Messages a track can hold before `TrackHandle` reports `QueueFull`
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

const RENDER_THREAD_NAME: &str = "saavy-offline-render";

/// Sending side of a track's message queue
pub struct TrackHandle {
    track: usize,
    tx: Producer<TimedMessage>,
}

impl TrackHandle {
    /// Index of the track this handle feeds
    pub fn track(&self) -> usize {
        self.track
    }

    pub fn note_on(&mut self, time: f64, note: u8, velocity: u8) -> Result<(), RenderError> {
        self.push(time, NoteMessage::NoteOn { note, velocity })
    }

    pub fn note_off(&mut self, time: f64, note: u8) -> Result<(), RenderError> {
        self.push(time, NoteMessage::NoteOff { note })
    }

    pub fn all_notes_off(&mut self, time: f64) -> Result<(), RenderError> {
        self.push(time, NoteMessage::AllNotesOff)
    }

    fn push(&mut self, time: f64, message: NoteMessage) -> Result<(), RenderError> {
        self.tx
            .push(TimedMessage { time, message })
            .map_err(|_| RenderError::QueueFull { track: self.track })
    }
}

/// One voice plus its pending messages
struct Track {
    node: Box<dyn GraphNode>,
    rx: Consumer<TimedMessage>,
    current_note: Option<u8>,
    velocity: f32,
}

impl Track {
    /// Pending messages as (frame, message), ordered by frame.
    /// Messages on the same frame keep their push order.
    fn drain_events(&mut self, sample_rate: f32) -> Vec<(usize, TimedMessage)> {
        let mut events = Vec::new();
        while let Some(msg) = MessageReceiver::pop(&mut self.rx) {
            events.push((msg.frame(sample_rate), msg));
        }
        events.sort_by_key(|(frame, _)| *frame);
        events
    }

    fn apply(&mut self, msg: &TimedMessage, sample_rate: f32) {
        match msg.message {
            NoteMessage::NoteOn { note, velocity } => {
                self.current_note = Some(note);
                self.velocity = velocity as f32;
                let ctx = RenderCtx::from_note(sample_rate, note, self.velocity).at(msg.time);
                self.node.note_on(&ctx);
            }
            NoteMessage::NoteOff { note } => {
                // Only release the note we're playing; keep it until the tail ends
                if self.current_note == Some(note) {
                    let ctx = RenderCtx::from_note(sample_rate, note, 0.0).at(msg.time);
                    self.node.note_off(&ctx);
                }
            }
            NoteMessage::AllNotesOff => {
                if let Some(note) = self.current_note {
                    let ctx = RenderCtx::from_note(sample_rate, note, 0.0).at(msg.time);
                    self.node.note_off(&ctx);
                }
            }
        }
    }

    fn render(&mut self, out: &mut [f32], start_frame: usize, sample_rate: f32) {
        let Some(note) = self.current_note else {
            out.fill(0.0);
            return;
        };

        let time = start_frame as f64 / sample_rate as f64;
        let ctx = RenderCtx::from_note(sample_rate, note, self.velocity).at(time);
        self.node.render_block(out, &ctx);

        if !self.node.is_active() {
            self.current_note = None;
        }
    }
}

/// Offline renderer over a set of monophonic tracks
pub struct GraphEngine {
    config: RenderConfig,
    tracks: Vec<Track>,
    rendered: bool,
}

impl GraphEngine {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            config: *config,
            tracks: Vec::new(),
            rendered: false,
        }
    }

    /// Add a voice; returns the handle used to schedule its notes
    pub fn add_track<N: GraphNode + 'static>(&mut self, node: N) -> TrackHandle {
        self.add_track_with_capacity(node, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn add_track_with_capacity<N: GraphNode + 'static>(
        &mut self,
        node: N,
        capacity: usize,
    ) -> TrackHandle {
        let (tx, rx) = RingBuffer::new(capacity);
        let track = self.tracks.len();
        self.tracks.push(Track {
            node: Box::new(node),
            rx,
            current_note: None,
            velocity: 0.0,
        });
        TrackHandle { track, tx }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl RenderEngine for GraphEngine {
    fn start_rendering(&mut self) -> RenderResult {
        if self.rendered {
            return Deferred::rejected(RenderError::AlreadyRendered);
        }
        self.rendered = true;

        let tracks = std::mem::take(&mut self.tracks);
        let config = self.config;
        let (resolver, deferred) = Deferred::channel();

        let spawned = std::thread::Builder::new()
            .name(RENDER_THREAD_NAME.to_string())
            .spawn(move || resolver.resolve(render_tracks(tracks, &config)));

        match spawned {
            Ok(_) => deferred,
            Err(err) => Deferred::rejected(RenderError::Spawn(err.to_string())),
        }
    }

    fn render_config(&self) -> Option<&RenderConfig> {
        Some(&self.config)
    }
}

fn render_tracks(tracks: Vec<Track>, config: &RenderConfig) -> AudioBuffer {
    let frames = config.frames();
    let sample_rate = config.sample_rate();
    let mut mix = vec![0.0f32; frames];
    let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

    debug!(
        "rendering {} tracks, {} frames at {} Hz",
        tracks.len(),
        frames,
        sample_rate
    );

    for (index, mut track) in tracks.into_iter().enumerate() {
        let events = track.drain_events(sample_rate);
        trace!("track {}: {} messages", index, events.len());

        let mut next = 0;
        let mut cursor = 0;
        while cursor < frames {
            while let Some((frame, msg)) = events.get(next) {
                if *frame > cursor {
                    break;
                }
                track.apply(msg, sample_rate);
                next += 1;
            }

            // Split blocks so the next message lands on its exact frame
            let boundary = events.get(next).map_or(frames, |(frame, _)| (*frame).min(frames));
            let end = boundary.min(cursor + MAX_BLOCK_SIZE);

            let out = &mut block[..end - cursor];
            track.render(out, cursor, sample_rate);
            for (m, s) in mix[cursor..end].iter_mut().zip(out.iter()) {
                *m += *s;
            }
            cursor = end;
        }
    }

    // Mono mix to every channel
    AudioBuffer {
        sample_rate,
        channels: vec![mix; config.channels()],
    }
}
