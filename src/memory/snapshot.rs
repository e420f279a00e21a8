//! Snapshot scopes.
//!
//! Table edits and render frames hand out addresses that are valid only for
//! the duration of one callback. [`SnapshotScope::run`] bounds that extent:
//! the callback receives an active [`Snapshot`], wraps whatever addresses the
//! event carries, and the snapshot is deactivated when the callback returns,
//! including on unwind. A handle that escapes the callback is not an error;
//! it resolves to nothing from then on.

use std::{
    cell::Cell,
    fmt::{Display, Formatter, Result as FmtResult},
    rc::Rc,
};

use crate::{
    kernel::{ObjectOps, RawAddress},
    memory::{handle::ObjectHandle, owner::OwnerKind},
};

/// The two short-lived snapshot contexts.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SnapshotKind {
    /// A table is being edited; addresses are valid for this edit event.
    TableEdit,
    /// A display frame is being built; addresses are valid for this frame.
    RenderFrame,
}

impl SnapshotKind {
    pub(crate) fn owner_kind(self) -> OwnerKind {
        match self {
            SnapshotKind::TableEdit => OwnerKind::TableEditSnapshot,
            SnapshotKind::RenderFrame => OwnerKind::RenderFrameSnapshot,
        }
    }
}

impl Display for SnapshotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.owner_kind(), f)
    }
}

/// The shared activity flag of one snapshot.
///
/// Handles wrapped from a snapshot keep a token and check it on every
/// resolution.
#[derive(Clone, Debug)]
pub struct SnapshotToken {
    kind: SnapshotKind,
    active: Rc<Cell<bool>>,
}

impl SnapshotToken {
    #[inline]
    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    /// True until the originating callback has returned.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// An active snapshot, handed to the callback run by [`SnapshotScope::run`].
pub struct Snapshot {
    token: SnapshotToken,
}

impl Snapshot {
    #[inline]
    pub fn kind(&self) -> SnapshotKind {
        self.token.kind
    }

    /// A token sharing this snapshot's activity flag.
    #[inline]
    pub fn token(&self) -> SnapshotToken {
        self.token.clone()
    }

    /// Wrap an address carried by this snapshot's event.
    ///
    /// The handle resolves while the snapshot is active and degrades to
    /// unavailable afterwards; it never releases the address.
    pub fn wrap(&self, ops: Rc<dyn ObjectOps>, addr: RawAddress) -> ObjectHandle {
        ObjectHandle::from_snapshot(ops, self.token(), addr)
    }
}

/// Runs event callbacks within the dynamic extent of a snapshot.
pub struct SnapshotScope;

impl SnapshotScope {
    /// Run `func` with an active snapshot of the given kind.
    ///
    /// The snapshot is deactivated when `func` returns or unwinds; every
    /// handle wrapped from it resolves to unavailable from that point on.
    pub fn run<T>(kind: SnapshotKind, func: impl FnOnce(&Snapshot) -> T) -> T {
        let snapshot = Snapshot {
            token: SnapshotToken {
                kind,
                active: Rc::new(Cell::new(true)),
            },
        };
        let _deactivate = Deactivate(&snapshot.token);
        func(&snapshot)
    }
}

struct Deactivate<'a>(&'a SnapshotToken);

impl Drop for Deactivate<'_> {
    fn drop(&mut self) {
        self.0.active.set(false);
        log::trace!("{} closed", self.0.kind());
    }
}
