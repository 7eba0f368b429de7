pub mod backend;
pub mod config;
pub mod recorder;

pub use backend::{
    register_backend, resolve_backend, BackendDescriptor, BackendError, CommandBuilder,
};
pub use config::{AudioType, RecordingOptions};
pub use recorder::{AudioStream, Recorder, RecorderHooks, RecorderState};
