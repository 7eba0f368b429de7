use anyhow::Result;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::signal;
use super::stream::AudioStream;
use crate::backend::resolve_backend;
use crate::config::RecordingOptions;

/// Observable lifecycle state of a [`Recorder`].
///
/// A terminated subprocess collapses back to `Idle` as soon as its exit is
/// observed; there is no separately observable terminated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Running,
    Paused,
}

/// Lifecycle notification callbacks.
///
/// `on_error` doubles as the injected error handler: when present,
/// construction with an unresolvable backend reports through it and yields
/// an inert recorder instead of failing.
#[derive(Clone, Default)]
pub struct RecorderHooks {
    pub on_start: Option<Arc<dyn Fn() + Send + Sync>>,
    pub on_stop: Option<Arc<dyn Fn() + Send + Sync>>,
    pub on_error: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

/// The live subprocess/stream pair. Never reused: every `start` builds a
/// fresh one, and the generation stamp keeps a stale exit callback from
/// clearing a successor session.
struct ActiveSession {
    generation: u64,
    pid: Option<u32>,
    stream: AudioStream,
}

/// Controls an external capture utility as a managed subprocess.
///
/// At most one subprocess is live per recorder. Lifecycle methods are
/// synchronous and non-blocking; they only issue spawn/signal requests and
/// must be called within a Tokio runtime, which hosts the tasks that pump
/// stdout, route stderr to the log, and observe exit.
pub struct Recorder {
    options: RecordingOptions,
    command: String,
    args: Vec<String>,
    hooks: RecorderHooks,
    active: Arc<Mutex<Option<ActiveSession>>>,
    generation: AtomicU64,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("options", &self.options)
            .field("command", &self.command)
            .field("args", &self.args)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Recorder {
    /// Create a recorder, resolving `options.backend` against the registry.
    ///
    /// Fails if the backend is unknown or produced an incomplete command.
    pub fn new(options: RecordingOptions) -> Result<Self> {
        Self::with_hooks(options, RecorderHooks::default())
    }

    /// Create a recorder with lifecycle hooks.
    ///
    /// When `hooks.on_error` is set, a backend resolution failure is
    /// reported through it and construction succeeds with a permanently
    /// inert recorder whose `start` calls are warned no-ops.
    pub fn with_hooks(options: RecordingOptions, hooks: RecorderHooks) -> Result<Self> {
        let (command, args) = match resolve_backend(&options.backend, &options) {
            Ok(descriptor) => {
                let mut args = descriptor.args;
                args.extend(options.additional_args.iter().cloned());
                (descriptor.command, args)
            }
            Err(err) => {
                let message = format!("failed to resolve recording backend: {err}");
                match &hooks.on_error {
                    Some(handler) => {
                        handler(&message);
                        (String::new(), Vec::new())
                    }
                    None => return Err(err.into()),
                }
            }
        };

        if options.debug && !command.is_empty() {
            debug!("resolved recording command: {} {}", command, args.join(" "));
        }

        Ok(Self {
            options,
            command,
            args,
            hooks,
            active: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
        })
    }

    /// Spawn the capture subprocess and bind its stdout as the session
    /// stream. Returns `&self` for chaining.
    ///
    /// A second `start` while a session is live is a warned no-op: the
    /// existing subprocess and stream are left untouched.
    pub fn start(&self) -> &Self {
        let mut active = self.active.lock().unwrap();
        if active.is_some() {
            warn!("recording already in progress; ignoring start");
            return self;
        }
        if self.command.is_empty() {
            warn!("recorder has no resolved capture command; ignoring start");
            return self;
        }

        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(device) = &self.options.device {
            command.env("AUDIODEV", device);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                let message = format!("failed to spawn {}: {err}", self.command);
                error!("{message}");
                if let Some(handler) = &self.hooks.on_error {
                    handler(&message);
                }
                return self;
            }
        };

        let pid = child.id();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let (tx, rx) = mpsc::channel(100);
        let stream = AudioStream::new(rx);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(pump_stdout(stdout, tx));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(route_stderr(stderr));
        }

        // The supervisor owns the child from here: it observes exit and
        // clears the session slot, but only while the slot still holds its
        // own generation.
        let slot = Arc::clone(&self.active);
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!("recording process exited with {status}"),
                Err(err) => error!("failed waiting on recording process: {err}"),
            }
            let mut slot = slot.lock().unwrap();
            if slot.as_ref().map(|s| s.generation) == Some(generation) {
                *slot = None;
            }
        });

        *active = Some(ActiveSession {
            generation,
            pid,
            stream,
        });
        drop(active);

        debug!("recording started");
        if let Some(on_start) = &self.hooks.on_start {
            on_start();
        }
        self
    }

    /// Terminate the subprocess if one is live.
    ///
    /// Fire-and-forget: the session slot is cleared immediately, without
    /// waiting for the OS to confirm exit. Safe in any state.
    pub fn stop(&self) {
        let taken = self.active.lock().unwrap().take();
        match taken {
            Some(session) => {
                if let Some(pid) = session.pid {
                    if let Err(err) = signal::terminate(pid) {
                        error!("failed to terminate recording process: {err}");
                    }
                }
                debug!("recording stopped");
                if let Some(on_stop) = &self.hooks.on_stop {
                    on_stop();
                }
            }
            None => warn!("no recording in progress to stop"),
        }
    }

    /// Suspend the subprocess and pause stream delivery.
    ///
    /// Suspending the process is the only way to halt capture without
    /// losing bytes already buffered in its pipe; pausing the stream just
    /// keeps the consumer from draining that buffer while the producer is
    /// frozen.
    pub fn pause(&self) {
        let guard = self.active.lock().unwrap();
        match guard.as_ref() {
            Some(session) => {
                #[cfg(unix)]
                if let Some(pid) = session.pid {
                    if let Err(err) = signal::suspend(pid) {
                        error!("failed to suspend recording process: {err}");
                    }
                }
                #[cfg(not(unix))]
                warn!("process suspension unsupported on this platform; pausing stream delivery only");

                session.stream.pause();
                debug!("recording paused");
            }
            None => warn!("recording not started yet"),
        }
    }

    /// Continue a suspended subprocess and resume stream delivery.
    pub fn resume(&self) {
        let guard = self.active.lock().unwrap();
        match guard.as_ref() {
            Some(session) => {
                #[cfg(unix)]
                if let Some(pid) = session.pid {
                    if let Err(err) = signal::resume(pid) {
                        error!("failed to continue recording process: {err}");
                    }
                }

                session.stream.resume();
                debug!("recording resumed");
            }
            None => warn!("recording not started yet"),
        }
    }

    /// Whether the recorder is currently paused.
    ///
    /// Conservatively true when nothing is recording.
    pub fn is_paused(&self) -> bool {
        let guard = self.active.lock().unwrap();
        match guard.as_ref() {
            Some(session) => session.stream.is_paused(),
            None => {
                warn!("recording not started yet");
                true
            }
        }
    }

    /// The current session stream, or `None` before `start`.
    pub fn stream(&self) -> Option<AudioStream> {
        let guard = self.active.lock().unwrap();
        match guard.as_ref() {
            Some(session) => Some(session.stream.clone()),
            None => {
                debug!("recording not yet started");
                None
            }
        }
    }

    /// Pid of the live subprocess, if any.
    pub fn pid(&self) -> Option<u32> {
        self.active.lock().unwrap().as_ref().and_then(|s| s.pid)
    }

    /// Derived lifecycle state.
    pub fn state(&self) -> RecorderState {
        match self.active.lock().unwrap().as_ref() {
            None => RecorderState::Idle,
            Some(session) if session.stream.is_paused() => RecorderState::Paused,
            Some(_) => RecorderState::Running,
        }
    }

    /// Whether this platform supports freezing the subprocess. When false,
    /// `pause` only gates stream delivery.
    pub fn pause_supported(&self) -> bool {
        signal::SUSPEND_SUPPORTED
    }

    /// The options this recorder was built with.
    pub fn options(&self) -> &RecordingOptions {
        &self.options
    }
}

/// Forward subprocess stdout into the session stream channel.
async fn pump_stdout(mut stdout: tokio::process::ChildStdout, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = vec![0u8; 8192];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => {
                debug!("recording stream ended");
                break;
            }
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).await.is_err() {
                    // Consumer gone; stop pumping.
                    break;
                }
            }
            Err(err) => {
                error!("failed reading recording stream: {err}");
                break;
            }
        }
    }
}

/// Route subprocess stderr lines to the log. Stderr noise never ends the
/// session; only `stop` or the subprocess's own exit does.
async fn route_stderr(stderr: tokio::process::ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        error!("recording process stderr: {line}");
    }
}
