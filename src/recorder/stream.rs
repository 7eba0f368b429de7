use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::{Mutex, Notify};

/// Shared handle over the subprocess's standard output.
///
/// Clones refer to the same underlying stream; pausing one pauses delivery
/// for all of them. Pausing only gates what the consumer sees; freezing
/// the producer is the recorder's job, via process suspension.
#[derive(Clone)]
pub struct AudioStream {
    shared: Arc<StreamShared>,
}

struct StreamShared {
    chunks: Mutex<mpsc::Receiver<Vec<u8>>>,
    paused: AtomicBool,
    gate: Notify,
}

impl AudioStream {
    pub(crate) fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            shared: Arc::new(StreamShared {
                chunks: Mutex::new(rx),
                paused: AtomicBool::new(false),
                gate: Notify::new(),
            }),
        }
    }

    /// Receive the next chunk of captured bytes.
    ///
    /// Returns `None` once the subprocess closes its stdout and all
    /// buffered chunks have been drained. While paused, the call parks
    /// until `resume` instead of delivering buffered data.
    pub async fn next_chunk(&self) -> Option<Vec<u8>> {
        loop {
            // Register with the gate before re-checking the flag, so a
            // resume between the check and the await cannot be lost.
            let unpaused = self.shared.gate.notified();
            tokio::pin!(unpaused);
            unpaused.as_mut().enable();

            if !self.is_paused() {
                let mut rx = self.shared.chunks.lock().await;
                return rx.recv().await;
            }

            unpaused.await;
        }
    }

    /// Stop delivering chunks until `resume`.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
    }

    /// Resume chunk delivery.
    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.gate.notify_waiters();
    }

    /// Whether delivery is currently paused.
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }
}
