pub mod capture;
pub mod file;
pub mod pcm;
pub mod playback;

pub use capture::{AudioFrame, CaptureSource};
pub use file::WavSource;
pub use pcm::AudioBuffer;
pub use playback::{
    AudioSink, OutputClock, PlaybackScheduler, ScheduledChunk, SourceId, SystemClock, TimerSink,
};
