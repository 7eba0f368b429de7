//! Backend registry: maps a backend name to the function that turns
//! recording options into a concrete capture command.
//!
//! The registry is ordinary process-wide state, initialized once with the
//! sox reference backend. Additional recorders (rec, arecord, ...) are added
//! with [`register_backend`] before constructing a `Recorder` that names
//! them.

mod sox;

pub use sox::sox_command;

use crate::config::RecordingOptions;
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};
use thiserror::Error;

/// A resolved capture command: executable plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub command: String,
    pub args: Vec<String>,
}

/// Builds a capture command from recording options.
///
/// Builders are pure: same options, same descriptor. They must not touch
/// the filesystem or mutate anything.
pub type CommandBuilder = fn(&RecordingOptions) -> BackendDescriptor;

/// Errors raised while resolving a backend name to a capture command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("unknown recording backend: {0}")]
    UnknownBackend(String),

    #[error("backend {0} produced an incomplete command")]
    InvalidDescriptor(String),
}

static REGISTRY: LazyLock<RwLock<HashMap<String, CommandBuilder>>> = LazyLock::new(|| {
    let mut builders: HashMap<String, CommandBuilder> = HashMap::new();
    builders.insert("sox".to_string(), sox_command);
    RwLock::new(builders)
});

/// Register a command builder under a backend name.
///
/// Re-registering a name replaces the previous builder.
pub fn register_backend(name: &str, builder: CommandBuilder) {
    REGISTRY
        .write()
        .expect("backend registry poisoned")
        .insert(name.to_string(), builder);
}

/// Resolve a backend name against the registry and build its command.
pub fn resolve_backend(
    name: &str,
    options: &RecordingOptions,
) -> Result<BackendDescriptor, BackendError> {
    let builder = {
        let registry = REGISTRY.read().expect("backend registry poisoned");
        registry
            .get(name)
            .copied()
            .ok_or_else(|| BackendError::UnknownBackend(name.to_string()))?
    };

    let descriptor = builder(options);
    if descriptor.command.is_empty() || descriptor.args.is_empty() {
        return Err(BackendError::InvalidDescriptor(name.to_string()));
    }

    Ok(descriptor)
}
