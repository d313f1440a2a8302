//! Child process creation in its own process group

// setsid() must run in the child between fork and exec, which requires an
// unsafe pre_exec hook.
#![allow(unsafe_code)]

use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::config::ProcessConfig;
use crate::error::{ProcessError, Result};

/// Start `config`'s program with its standard streams bound to the three
/// given child-side pipe ends and no other inherited descriptors.
///
/// The child becomes a session and process-group leader via `setsid()`, so
/// group-directed signals can later target it and everything it spawns
/// without touching the parent or sibling processes.
pub(crate) fn spawn_child(
    config: &ProcessConfig,
    stdin: OwnedFd,
    stdout: OwnedFd,
    stderr: OwnedFd,
) -> Result<Child> {
    debug!(
        program = %config.program,
        args = ?config.args,
        "spawning process"
    );

    let mut command = Command::new(&config.program);
    command.args(&config.args);

    if let Some(ref dir) = config.working_dir {
        command.current_dir(dir);
    }
    for (key, value) in &config.env {
        command.env(key, value);
    }

    // The three child-side pipe ends are the only descriptors handed down.
    // The parent-side ends carry FD_CLOEXEC, and the standard library marks
    // its own descriptors close-on-exec as well.
    command.stdin(Stdio::from(stdin));
    command.stdout(Stdio::from(stdout));
    command.stderr(Stdio::from(stderr));

    // Safety: setsid() is async-signal-safe and appropriate for use between
    // fork and exec.
    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid().map_err(std::io::Error::from)?;
            Ok(())
        });
    }

    let child = command.spawn().map_err(ProcessError::Spawn)?;
    info!(pid = child.id(), program = %config.program, "process spawned");

    Ok(child)
}
