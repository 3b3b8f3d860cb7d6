use crate::audio::pcm::{self, AudioBuffer};
use crate::error::SessionError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle for a buffer that has been handed to the output sink.
pub type SourceId = u64;

/// The output device's timeline, in seconds.
pub trait OutputClock: Send {
    fn now(&self) -> f64;
}

/// Monotonic wall clock anchored at construction time.
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputClock for SystemClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

impl OutputClock for Arc<SystemClock> {
    fn now(&self) -> f64 {
        self.as_ref().now()
    }
}

/// Destination for scheduled buffers.
///
/// `start` must begin playing `buffer` at `at` on the output timeline and
/// later report natural completion of `id` to whoever owns the scheduler.
/// `stop` is best-effort: a source that already finished is not an error.
pub trait AudioSink: Send {
    fn start(&mut self, id: SourceId, buffer: AudioBuffer, at: f64);
    fn stop(&mut self, id: SourceId);
}

/// Timer-backed sink for headless operation: each source is a tokio task
/// that sleeps until the buffer's end time and then reports completion.
pub struct TimerSink {
    clock: Arc<SystemClock>,
    done_tx: mpsc::UnboundedSender<SourceId>,
    playing: HashMap<SourceId, JoinHandle<()>>,
}

impl TimerSink {
    pub fn new(clock: Arc<SystemClock>, done_tx: mpsc::UnboundedSender<SourceId>) -> Self {
        Self {
            clock,
            done_tx,
            playing: HashMap::new(),
        }
    }
}

impl AudioSink for TimerSink {
    fn start(&mut self, id: SourceId, buffer: AudioBuffer, at: f64) {
        let end = at + buffer.duration_secs();
        let delay = (end - self.clock.now()).max(0.0);
        let done_tx = self.done_tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs_f64(delay)).await;
            // Receiver gone means the session is tearing down.
            let _ = done_tx.send(id);
        });

        self.playing.insert(id, task);
    }

    fn stop(&mut self, id: SourceId) {
        if let Some(task) = self.playing.remove(&id) {
            task.abort();
        }
    }
}

/// A chunk accepted by the scheduler.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledChunk {
    pub id: SourceId,
    pub start: f64,
    pub duration: f64,
    /// RMS level of the decoded buffer, 0..1
    pub level: f32,
}

/// Plays inbound PCM chunks back-to-back on a shared timeline.
///
/// The single piece of mutable scheduling state is `next_start`: the offset
/// at which the next buffer begins. It only moves forward, except on
/// interruption, which resets it to zero. The scheduler assumes it is the
/// sole writer, which holds because one event loop drives it.
pub struct PlaybackScheduler<C: OutputClock, S: AudioSink> {
    clock: C,
    sink: S,
    sample_rate: u32,
    channels: u16,
    next_start: f64,
    active: HashSet<SourceId>,
    next_id: SourceId,
}

impl<C: OutputClock, S: AudioSink> PlaybackScheduler<C, S> {
    pub fn new(clock: C, sink: S, sample_rate: u32, channels: u16) -> Self {
        Self {
            clock,
            sink,
            sample_rate,
            channels,
            next_start: 0.0,
            active: HashSet::new(),
            next_id: 0,
        }
    }

    /// Decode one inbound PCM chunk and schedule it to play immediately
    /// after whatever is already queued (or now, if the queue has drained).
    ///
    /// A malformed chunk is rejected without touching the schedule.
    pub fn enqueue(&mut self, bytes: &[u8]) -> Result<ScheduledChunk, SessionError> {
        let buffer = pcm::decode_pcm16(bytes, self.sample_rate, self.channels)?;

        let start = self.next_start.max(self.clock.now());
        let duration = buffer.duration_secs();
        let level = buffer.rms();

        let id = self.next_id;
        self.next_id += 1;

        self.next_start = start + duration;
        self.active.insert(id);
        self.sink.start(id, buffer, start);

        debug!(id, start, duration, "scheduled audio chunk");

        Ok(ScheduledChunk {
            id,
            start,
            duration,
            level,
        })
    }

    /// Record natural completion of a source. Returns true when this
    /// completion drained the active set to empty (speech finished).
    pub fn on_source_ended(&mut self, id: SourceId) -> bool {
        let was_active = self.active.remove(&id);
        if !was_active {
            // Already stopped by an interruption; late completions are fine.
            return false;
        }
        self.active.is_empty()
    }

    /// Barge-in: stop everything that is playing and rewind the timeline.
    /// The next chunk will be scheduled against the current clock.
    pub fn interrupt(&mut self) {
        let stopped = self.active.len();
        for id in self.active.drain() {
            self.sink.stop(id);
        }
        self.next_start = 0.0;

        if stopped > 0 {
            warn!(stopped, "playback interrupted");
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn next_start(&self) -> f64 {
        self.next_start
    }
}
