//! Owned descriptor slot with idempotent close semantics

use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

/// A slot holding either an open file descriptor or the closed sentinel.
///
/// The descriptor is released at the OS level exactly once; closing an
/// already-closed slot is a no-op, and a closed slot cannot be borrowed for
/// I/O. Dropping an open slot also releases the descriptor.
#[derive(Debug)]
pub(crate) struct Handle(Option<OwnedFd>);

impl Handle {
    /// The closed sentinel
    pub(crate) const fn closed() -> Self {
        Self(None)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.0.is_some()
    }

    /// Release the descriptor and leave the closed sentinel behind.
    pub(crate) fn close(&mut self) {
        *self = Handle::closed();
    }

    /// Borrow the descriptor for I/O, or `None` once closed.
    pub(crate) fn get(&self) -> Option<BorrowedFd<'_>> {
        self.0.as_ref().map(AsFd::as_fd)
    }

    /// Transfer the descriptor out of the slot, leaving the closed sentinel.
    pub(crate) fn take(&mut self) -> Option<OwnedFd> {
        self.0.take()
    }
}

impl From<OwnedFd> for Handle {
    fn from(fd: OwnedFd) -> Self {
        Self(Some(fd))
    }
}
