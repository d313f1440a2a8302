//! Unidirectional byte-stream pipes between parent and child

use std::os::fd::{AsRawFd, BorrowedFd};

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::unistd;

use crate::error::Result;
use crate::handle::Handle;

/// Create a connected pipe pair as `(read end, write end)`.
pub(crate) fn create() -> Result<(Handle, Handle)> {
    let (read_end, write_end) = unistd::pipe()?;
    Ok((Handle::from(read_end), Handle::from(write_end)))
}

/// Mark an endpoint close-on-exec so it is not copied into children created
/// by *other* spawn calls in this process. The launcher already passes an
/// explicit endpoint list to the child; this guards the retained ends against
/// leaking through unrelated process creation.
pub(crate) fn disable_inherit(fd: BorrowedFd<'_>) -> Result<()> {
    let raw = fd.as_raw_fd();
    let flags = FdFlag::from_bits_retain(fcntl(raw, FcntlArg::F_GETFD)?);
    fcntl(raw, FcntlArg::F_SETFD(flags | FdFlag::FD_CLOEXEC))?;
    Ok(())
}

/// Blocking write. May transfer fewer bytes than `buf` holds; callers loop
/// when full delivery is required. A broken pipe (reader gone) surfaces as a
/// system error.
pub(crate) fn write(fd: BorrowedFd<'_>, buf: &[u8]) -> Result<usize> {
    loop {
        match unistd::write(fd, buf) {
            Err(Errno::EINTR) => continue,
            other => return Ok(other?),
        }
    }
}

/// Blocking read. Returns `Ok(0)` at end-of-stream: the writer closed its end
/// and no more data will ever arrive.
pub(crate) fn read(fd: BorrowedFd<'_>, buf: &mut [u8]) -> Result<usize> {
    loop {
        match unistd::read(fd.as_raw_fd(), buf) {
            Err(Errno::EINTR) => continue,
            other => return Ok(other?),
        }
    }
}
