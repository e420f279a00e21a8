//! Resolution sources.
//!
//! Documents and serialized containers own the storage their objects live in;
//! handles only hold (source, stable id) pairs and ask for a fresh address on
//! every access. The file-I/O and document layers implement
//! [`ResolutionSource`]; [`StableIndex`] is the id-keyed table they typically
//! build that implementation on.

use fnv::FnvHashMap;

use crate::kernel::{RawAddress, StableId};

/// How a source answered a mutable resolution request.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MutableResolution {
    /// The source grants in-place mutable access at this address.
    Address(RawAddress),
    /// The object is present but shared; the caller must detach first.
    DetachRequired,
    /// The source no longer contains the key.
    Gone,
}

/// Supplies fresh addresses for stable ids.
pub trait ResolutionSource {
    /// The current read-only address for `key`, if the source still contains
    /// it.
    fn resolve_const(&self, key: StableId) -> Option<RawAddress>;

    /// Mutable resolution. Shared storage refuses by default: a present key
    /// requires a detach, an absent key is gone. Sources that allow direct
    /// mutation of their storage can override this.
    fn resolve_mutable(&self, key: StableId) -> MutableResolution {
        match self.resolve_const(key) {
            Some(_) => MutableResolution::DetachRequired,
            None => MutableResolution::Gone,
        }
    }
}

/// An id-keyed object table for [`ResolutionSource`] implementations.
#[derive(Debug, Default)]
pub struct StableIndex {
    slots: FnvHashMap<StableId, RawAddress>,
}

impl StableIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `addr` under `key`, returning the previous address if the key
    /// was already present.
    #[inline]
    pub fn insert(&mut self, key: StableId, addr: RawAddress) -> Option<RawAddress> {
        self.slots.insert(key, addr)
    }

    /// Remove `key`, returning the address it resolved to.
    #[inline]
    pub fn remove(&mut self, key: StableId) -> Option<RawAddress> {
        self.slots.remove(&key)
    }

    #[inline]
    pub fn get(&self, key: StableId) -> Option<RawAddress> {
        self.slots.get(&key).copied()
    }

    #[inline]
    pub fn contains(&self, key: StableId) -> bool {
        self.slots.contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
