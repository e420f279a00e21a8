//! The resolution protocol.
//!
//! Resolution turns an owner context into a current native address, or
//! reports that no such address exists. Volatile contexts (document,
//! container, snapshot) are re-queried on every call; nothing is cached
//! here. The self-owned address is the one exception: it is authoritative
//! until disposal.

use std::rc::Weak;

use crate::{
    kernel::{RawAddress, StableId},
    memory::{
        owner::Owner,
        snapshot::SnapshotToken,
        store::{MutableResolution, ResolutionSource},
    },
};

/// Outcome of resolving a handle.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Resolution {
    /// A currently valid native address.
    Address(RawAddress),
    /// No live object. Reads degrade to a default value, writes fail.
    Unavailable,
    /// Write access requires detaching to a self-owned copy first.
    DetachRequired,
}

impl Resolution {
    /// The address, if resolution produced one.
    #[inline]
    pub fn address(self) -> Option<RawAddress> {
        match self {
            Resolution::Address(addr) => Some(addr),
            _ => None,
        }
    }
}

/// Resolve `owner` to a current address.
pub fn resolve(owner: &Owner, for_write: bool) -> Resolution {
    match owner {
        Owner::SelfOwned(addr) => resolve_self(*addr),
        Owner::Document { source, key } => resolve_stored(source, *key, for_write),
        Owner::Container { source, key } => resolve_stored(source, *key, for_write),
        Owner::Snapshot { token, addr } => resolve_snapshot(token, *addr, for_write),
    }
}

fn resolve_self(addr: Option<RawAddress>) -> Resolution {
    match addr {
        Some(addr) => Resolution::Address(addr),
        None => Resolution::Unavailable,
    }
}

fn resolve_stored(
    source: &Weak<dyn ResolutionSource>,
    key: StableId,
    for_write: bool,
) -> Resolution {
    let Some(source) = source.upgrade() else {
        log::trace!("resolution miss for {key}: source dropped");
        return Resolution::Unavailable;
    };

    if for_write {
        match source.resolve_mutable(key) {
            MutableResolution::Address(addr) => Resolution::Address(addr),
            MutableResolution::DetachRequired => Resolution::DetachRequired,
            MutableResolution::Gone => Resolution::Unavailable,
        }
    } else {
        match source.resolve_const(key) {
            Some(addr) => Resolution::Address(addr),
            None => {
                log::trace!("resolution miss for {key}: key no longer present");
                Resolution::Unavailable
            }
        }
    }
}

fn resolve_snapshot(token: &SnapshotToken, addr: RawAddress, for_write: bool) -> Resolution {
    if !token.is_active() {
        log::trace!("resolution miss: {} no longer active", token.kind());
        return Resolution::Unavailable;
    }
    if for_write {
        // Snapshot storage is never mutated in place.
        Resolution::DetachRequired
    } else {
        Resolution::Address(addr)
    }
}
