//! # procling
//!
//! **Purpose**: synchronous child-process execution with piped standard streams
//!
//! Starts an external program with stdin/stdout/stderr redirected through
//! pipes, lets the caller write to the child's input and read its output and
//! error streams, and waits for, interrupts, or forcibly terminates the child
//! with bounded timeouts.
//!
//! ## Features
//!
//! - **Piped stdio**: the child inherits exactly three pipe endpoints and
//!   nothing else; every parent-side end is close-on-exec
//! - **Bounded waiting**: `wait` with a deadline reports a timeout as a
//!   normal outcome, not an error, so callers can retry or escalate
//! - **Graceful shutdown**: SIGTERM→SIGKILL escalation directed at the
//!   child's own process group
//! - **Deterministic teardown**: every descriptor and process handle is
//!   released exactly once, on success and on every partial-failure path
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use procling::{Process, ProcessConfig, Stream, WaitOutcome};
//!
//! # fn main() -> Result<(), procling::ProcessError> {
//! let config = ProcessConfig::new("cat");
//! let mut process = Process::spawn(config)?;
//!
//! process.write(b"hello\n")?;
//! process.close(Stream::Stdin);
//!
//! let mut buf = [0u8; 1024];
//! let n = process.read(Stream::Stdout, &mut buf)?;
//! assert_eq!(&buf[..n], b"hello\n");
//!
//! match process.wait(Some(Duration::from_secs(1)))? {
//!     WaitOutcome::Exited(status) => println!("child exited: {status}"),
//!     WaitOutcome::TimedOut => {
//!         process.kill(Duration::from_secs(1))?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod process;

mod handle;
mod pipe;
mod spawn;

pub use config::ProcessConfig;
pub use error::{ProcessError, Result};
pub use process::{Process, Stream, WaitOutcome};
