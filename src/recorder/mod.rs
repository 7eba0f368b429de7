//! Recording process lifecycle
//!
//! This module provides the `Recorder` abstraction that manages:
//! - Spawning the capture utility as a subprocess
//! - Exposing its stdout as a pausable byte stream
//! - Signal-based pause/resume (SIGSTOP/SIGCONT)
//! - Asynchronous exit observation and cleanup

mod session;
mod signal;
mod stream;

pub use session::{Recorder, RecorderHooks, RecorderState};
pub use stream::AudioStream;
