//! Signal delivery to the recording subprocess.
//!
//! Pause/resume rely on SIGSTOP/SIGCONT, which freeze the producer at the
//! OS level. A pid that no longer exists (ESRCH) is treated as success:
//! the process exiting on its own races every signal we send.

use std::io;

/// Whether this platform can suspend and resume the subprocess.
pub const SUSPEND_SUPPORTED: bool = cfg!(unix);

#[cfg(unix)]
mod signals {
    pub const SUSPEND: i32 = libc::SIGSTOP;
    pub const CONTINUE: i32 = libc::SIGCONT;
    pub const TERMINATE: i32 = libc::SIGTERM;
}

/// Ask the subprocess to terminate.
pub(crate) fn terminate(pid: u32) -> io::Result<()> {
    send(pid, self::term_signal())
}

/// Freeze the subprocess without terminating it.
#[cfg(unix)]
pub(crate) fn suspend(pid: u32) -> io::Result<()> {
    send(pid, signals::SUSPEND)
}

/// Unfreeze a suspended subprocess.
#[cfg(unix)]
pub(crate) fn resume(pid: u32) -> io::Result<()> {
    send(pid, signals::CONTINUE)
}

#[cfg(unix)]
fn term_signal() -> i32 {
    signals::TERMINATE
}

#[cfg(unix)]
fn send(pid: u32, signal: i32) -> io::Result<()> {
    let Ok(pid) = i32::try_from(pid) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("pid {pid} out of range"),
        ));
    };

    // SAFETY: libc::kill takes plain integer pid/signal values; errno is
    // read immediately after the call on this thread.
    let result = unsafe { libc::kill(pid, signal) };
    if result == 0 {
        return Ok(());
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        // Already exited; nothing left to signal.
        return Ok(());
    }
    Err(err)
}

#[cfg(not(unix))]
fn term_signal() -> i32 {
    0
}

#[cfg(not(unix))]
fn send(_pid: u32, _signal: i32) -> io::Result<()> {
    Ok(())
}
