use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container/encoding selection for the captured byte stream.
///
/// Rendered lowercase when building the capture command, so the utility
/// receives the exact token it expects (`--type wav`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioType {
    #[default]
    Wav,
    Mp3,
    Raw,
}

impl fmt::Display for AudioType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioType::Wav => write!(f, "wav"),
            AudioType::Mp3 => write!(f, "mp3"),
            AudioType::Raw => write!(f, "raw"),
        }
    }
}

/// Configuration for a recording subprocess.
///
/// Every field is optional in serialized form; missing fields fall back to
/// the documented defaults, so a partial config file is enough. The struct
/// is not mutated once handed to a `Recorder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingOptions {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Audio container/encoding for the output stream
    pub audio_type: AudioType,

    /// Stop capturing automatically after a period of silence
    pub end_on_silence: bool,

    /// Leading silence threshold as a fraction (0.3 = 30%); 0.5 when unset
    pub threshold_start: Option<f64>,

    /// Trailing silence threshold as a fraction; 0.5 when unset
    pub threshold_end: Option<f64>,

    /// Seconds of silence required before an automatic stop
    pub silence: f64,

    /// Name of the registered backend that builds the capture command
    pub backend: String,

    /// Recording device identifier, exported as AUDIODEV to the subprocess
    pub device: Option<String>,

    /// Maximum recording duration in seconds. Not enforced internally;
    /// callers wanting a cap schedule their own `stop()`.
    pub duration: Option<f64>,

    /// Extra arguments appended verbatim after the backend's own
    pub additional_args: Vec<String>,

    /// Log the resolved command line at debug level
    pub debug: bool,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            sample_rate: 16000,    // 16kHz
            channels: 1,           // Mono
            audio_type: AudioType::Wav,
            end_on_silence: false,
            threshold_start: None, // 0.5 at command construction
            threshold_end: None,   // 0.5 at command construction
            silence: 1.0,          // 1 second
            backend: "sox".to_string(),
            device: None,
            duration: None,
            additional_args: Vec::new(),
            debug: false,
        }
    }
}

impl RecordingOptions {
    /// Load options from a config file, merging over the defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
