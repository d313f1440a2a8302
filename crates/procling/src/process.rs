//! Process handle: lifecycle, stream plumbing, and teardown

use std::fmt;
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::config::ProcessConfig;
use crate::error::{ProcessError, Result};
use crate::handle::Handle;
use crate::{pipe, spawn};

/// Poll interval for deadline-bounded waits
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Standard stream selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// The child's input; write-only from the parent
    Stdin,
    /// The child's output; read-only from the parent
    Stdout,
    /// The child's error output; read-only from the parent
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stream::Stdin => "stdin",
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        })
    }
}

/// Outcome of a deadline-bounded wait.
///
/// A timeout is an expected, retryable result rather than an error: callers
/// branch on it to keep waiting or to escalate to [`Process::terminate`] /
/// [`Process::kill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The process exited with the given status
    Exited(ExitStatus),
    /// The timeout elapsed first; the process was left undisturbed
    TimedOut,
}

impl WaitOutcome {
    /// The exit status, if the process exited
    pub fn exit_status(self) -> Option<ExitStatus> {
        match self {
            WaitOutcome::Exited(status) => Some(status),
            WaitOutcome::TimedOut => None,
        }
    }

    /// Whether the wait deadline elapsed before the process exited
    pub fn timed_out(self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }
}

/// A child process with piped standard streams.
///
/// [`Process::spawn`] either returns a running child with the three
/// parent-side pipe ends retained, or an error with every partially-acquired
/// resource already released. Stream endpoints have their own lifecycle:
/// [`Process::close`] releases one early, and reads/writes keep working after
/// the child itself has exited for as long as the endpoint stays open.
///
/// Dropping a `Process` releases the process handle and any still-open pipe
/// ends exactly once, but does **not** stop a running child; sequence
/// [`Process::wait`], [`Process::terminate`], or [`Process::kill`] first when
/// that matters.
#[derive(Debug)]
pub struct Process {
    /// Exclusively owned native process handle
    child: Child,
    /// Process id; equal to the process-group id (the child is its own leader)
    pid: Pid,
    /// Parent-side write end of the child's stdin
    stdin: Handle,
    /// Parent-side read end of the child's stdout
    stdout: Handle,
    /// Parent-side read end of the child's stderr
    stderr: Handle,
}

impl Process {
    /// Spawn `config`'s program with all three standard streams piped.
    ///
    /// One pipe is created per stream; the child-side ends are handed to the
    /// launcher and closed in the parent once it returns, the parent-side
    /// ends are retained and marked close-on-exec. Failure at any step
    /// releases exactly the resources created so far.
    pub fn spawn(config: ProcessConfig) -> Result<Self> {
        if config.program.is_empty() {
            return Err(ProcessError::InvalidConfig(
                "program must not be empty".to_string(),
            ));
        }

        // Every end lives in a Handle guard, so an early `?` return from any
        // failing step below drops exactly the subset acquired so far.
        let (mut child_stdin, parent_stdin) = pipe::create()?;
        pipe::disable_inherit(open_fd(&parent_stdin, Stream::Stdin)?)?;

        let (parent_stdout, mut child_stdout) = pipe::create()?;
        pipe::disable_inherit(open_fd(&parent_stdout, Stream::Stdout)?)?;

        let (parent_stderr, mut child_stderr) = pipe::create()?;
        pipe::disable_inherit(open_fd(&parent_stderr, Stream::Stderr)?)?;

        let stdin_end = take_fd(&mut child_stdin, Stream::Stdin)?;
        let stdout_end = take_fd(&mut child_stdout, Stream::Stdout)?;
        let stderr_end = take_fd(&mut child_stderr, Stream::Stderr)?;

        // The child-side ends are consumed here; the launcher closes them in
        // the parent once the child owns copies.
        let child = spawn::spawn_child(&config, stdin_end, stdout_end, stderr_end)?;
        let pid = Pid::from_raw(child.id() as i32);

        Ok(Self {
            child,
            pid,
            stdin: parent_stdin,
            stdout: parent_stdout,
            stderr: parent_stderr,
        })
    }

    /// Process id
    pub fn pid(&self) -> u32 {
        self.pid.as_raw() as u32
    }

    /// Process group id (same as the pid; the child is a session leader)
    pub fn pgid(&self) -> u32 {
        self.pid()
    }

    /// Blocking write to the child's stdin.
    ///
    /// Returns the number of bytes actually transferred, which may be fewer
    /// than `buf` holds; loop when full delivery is required. Fails with
    /// [`ProcessError::StreamClosed`] once the stdin end has been closed.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        pipe::write(open_fd(&self.stdin, Stream::Stdin)?, buf)
    }

    /// Blocking read from the child's stdout or stderr.
    ///
    /// Returns `Ok(0)` at end-of-stream. Selecting [`Stream::Stdin`] is a
    /// caller contract violation and is answered with
    /// [`ProcessError::NotReadable`].
    pub fn read(&mut self, stream: Stream, buf: &mut [u8]) -> Result<usize> {
        let handle = match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
            // stdin is write-only from the parent; only reachable when a
            // caller breaks the read contract
            Stream::Stdin => return Err(ProcessError::NotReadable(Stream::Stdin)),
        };
        pipe::read(open_fd(handle, stream)?, buf)
    }

    /// Close one retained stream endpoint.
    ///
    /// Closing the stdin end signals end-of-input to the child. Redundant
    /// closes are no-ops; subsequent reads/writes on the stream fail with
    /// [`ProcessError::StreamClosed`].
    pub fn close(&mut self, stream: Stream) {
        let handle = match stream {
            Stream::Stdin => &mut self.stdin,
            Stream::Stdout => &mut self.stdout,
            Stream::Stderr => &mut self.stderr,
        };
        if handle.is_open() {
            debug!(pid = %self.pid, stream = %stream, "closing stream");
        }
        handle.close();
    }

    /// Check whether the process has exited, without blocking.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Check if the process is still running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Wait for the process to exit.
    ///
    /// `None` blocks until the child exits. `Some(timeout)` polls against a
    /// deadline and reports [`WaitOutcome::TimedOut`] when it elapses first;
    /// the child is left undisturbed and a later `wait` still succeeds. Once
    /// the child has been reaped its exit status is cached, so repeated
    /// calls keep returning it.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<WaitOutcome> {
        let Some(timeout) = timeout else {
            return Ok(WaitOutcome::Exited(self.child.wait()?));
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(WaitOutcome::Exited(status));
            }
            let now = Instant::now();
            if now >= deadline {
                debug!(pid = %self.pid, ?timeout, "wait timed out");
                return Ok(WaitOutcome::TimedOut);
            }
            thread::sleep(WAIT_POLL_INTERVAL.min(deadline - now));
        }
    }

    /// Ask the process group to exit and wait up to `timeout`.
    ///
    /// Sends SIGTERM to the child's process group. This is strictly "ask
    /// nicely": the child may ignore it, in which case the result is
    /// [`WaitOutcome::TimedOut`] and [`Process::kill`] is the escalation
    /// path.
    pub fn terminate(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        debug!(pid = %self.pid, "sending SIGTERM to process group");
        self.signal_group(Signal::SIGTERM)?;
        self.wait(Some(timeout))
    }

    /// Forcibly end the process group and wait up to `timeout` to confirm.
    ///
    /// Sends SIGKILL to the child's process group; barring OS-level failure
    /// this always ends the process.
    pub fn kill(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        debug!(pid = %self.pid, "sending SIGKILL to process group");
        self.signal_group(Signal::SIGKILL)?;
        self.wait(Some(timeout))
    }

    /// Send a signal to the child's process group.
    ///
    /// ESRCH and EPERM mean the group is already gone (or was reaped and its
    /// id reused under different ownership); both count as delivered.
    fn signal_group(&self, signal: Signal) -> Result<()> {
        match killpg(self.pid, signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) | Err(Errno::EPERM) => {
                debug!(pid = %self.pid, "process group already exited");
                Ok(())
            }
            Err(e) => {
                warn!(
                    pid = %self.pid,
                    signal = %signal,
                    error = %e,
                    "failed to signal process group"
                );
                Err(e.into())
            }
        }
    }
}

/// Borrow a retained endpoint for I/O, or fail cleanly once it is closed.
fn open_fd(handle: &Handle, stream: Stream) -> Result<std::os::fd::BorrowedFd<'_>> {
    handle.get().ok_or(ProcessError::StreamClosed(stream))
}

/// Transfer a child-side endpoint out of its guard.
fn take_fd(handle: &mut Handle, stream: Stream) -> Result<std::os::fd::OwnedFd> {
    handle.take().ok_or(ProcessError::StreamClosed(stream))
}
