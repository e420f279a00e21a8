//! Managed handles to kernel objects.
//!
//! An [`ObjectHandle`] refers to a native object through an owner context
//! rather than a guaranteed-stable address. Reads resolve a fresh address on
//! every access and degrade to default values when nothing resolves; writes
//! go through [`ObjectHandle::write_address`], which detaches shared storage
//! into a self-owned copy before the first mutation. Disposal releases
//! self-owned storage exactly once; handles that don't own their storage
//! never release anything.

use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::{
    data::{
        attributes::{AttributeState, IdentityState},
        status::ObjectStatus,
    },
    error::{
        AttributeError, DuplicationError, GkrsResult, InstantiationError, ResolutionError,
    },
    kernel::{AttrKind, AttrValue, InitArgs, ObjectOps, RawAddress, StableId, DEFAULT_HASH_SEED},
    memory::{
        owner::{Owner, OwnerKind},
        resolve::{resolve, Resolution},
        snapshot::SnapshotToken,
        store::ResolutionSource,
    },
};

/// A managed reference to a native kernel object.
pub struct ObjectHandle {
    owner: Owner,
    ops: Rc<dyn ObjectOps>,
    identity: IdentityState,
    // Default-seed content hash; only ever populated while self-owned.
    hash_cache: OnceCell<u64>,
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle")
            .field("owner", &self.owner)
            .field("identity", &self.identity)
            .field("hash_cache", &self.hash_cache)
            .finish_non_exhaustive()
    }
}

impl ObjectHandle {
    /// Create a fresh self-owned object backed by a new native allocation.
    pub fn create(ops: Rc<dyn ObjectOps>, args: &InitArgs) -> GkrsResult<Self> {
        let Some(addr) = ops.create(args) else {
            return Err(InstantiationError::AllocationFailed.into());
        };
        log::trace!("created self-owned object at {:?}", addr);
        Ok(Self::from_parts(ops, Owner::SelfOwned(Some(addr))))
    }

    /// Wrap an object that lives in a document.
    ///
    /// The handle holds no lifetime claim on the document; once the document
    /// is dropped or no longer contains `key`, the handle resolves to
    /// nothing.
    pub fn from_document(
        ops: Rc<dyn ObjectOps>,
        source: &Rc<dyn ResolutionSource>,
        key: StableId,
    ) -> Self {
        Self::from_parts(
            ops,
            Owner::Document {
                source: Rc::downgrade(source),
                key,
            },
        )
    }

    /// Wrap an object that lives in a serialized container.
    pub fn from_container(
        ops: Rc<dyn ObjectOps>,
        source: &Rc<dyn ResolutionSource>,
        key: StableId,
    ) -> Self {
        Self::from_parts(
            ops,
            Owner::Container {
                source: Rc::downgrade(source),
                key,
            },
        )
    }

    pub(crate) fn from_snapshot(
        ops: Rc<dyn ObjectOps>,
        token: SnapshotToken,
        addr: RawAddress,
    ) -> Self {
        Self::from_parts(ops, Owner::Snapshot { token, addr })
    }

    fn from_parts(ops: Rc<dyn ObjectOps>, owner: Owner) -> Self {
        ObjectHandle {
            owner,
            ops,
            identity: IdentityState::new(),
            hash_cache: OnceCell::new(),
        }
    }

    /// The owner context this handle resolves through.
    #[inline]
    pub fn owner_kind(&self) -> OwnerKind {
        self.owner.kind()
    }

    #[inline]
    pub fn is_self_owned(&self) -> bool {
        matches!(self.owner, Owner::SelfOwned(_))
    }

    /// True once a self-owned handle has released its allocation.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        matches!(self.owner, Owner::SelfOwned(None))
    }

    /// True if the handle currently resolves to a live object.
    pub fn is_available(&self) -> bool {
        self.resolve_const().is_some()
    }

    /// The stable id this handle resolves through, falling back to the
    /// object's id attribute for handles that own their storage.
    pub fn stable_id(&self) -> Option<StableId> {
        self.owner.stable_id().or_else(|| self.id())
    }

    /// The current read-only address, if the handle resolves.
    ///
    /// The result must not be cached by the caller: for every context other
    /// than self-owned it can be invalidated by a third party at any time.
    pub fn resolve_const(&self) -> Option<RawAddress> {
        resolve(&self.owner, false).address()
    }

    /// The address to mutate through.
    ///
    /// This is the write-path contract: self-owned addresses (and in-place
    /// grants from a source that allows them) are returned directly; shared
    /// storage is first detached via [`ObjectHandle::ensure_exclusive`], so
    /// the first write through a shared handle pays for a duplication.
    pub fn write_address(&mut self) -> GkrsResult<RawAddress> {
        match resolve(&self.owner, true) {
            Resolution::Address(addr) => {
                let _ = self.hash_cache.take();
                Ok(addr)
            }
            Resolution::DetachRequired => self.ensure_exclusive(),
            Resolution::Unavailable => Err(ResolutionError::StaleReference {
                owner: self.owner.kind(),
            })?,
        }
    }

    /// Detach this handle from shared storage.
    ///
    /// Self-owned handles return their address unchanged. For every other
    /// context the current object is duplicated into a fresh allocation, the
    /// owner is rebound to self-owned, and the old context reference is
    /// dropped. Readers of the original shared object are unaffected by
    /// anything written through the detached handle.
    pub fn ensure_exclusive(&mut self) -> GkrsResult<RawAddress> {
        // Handing out an address for mutation invalidates the cached hash.
        let _ = self.hash_cache.take();

        let kind = self.owner.kind();
        if let Owner::SelfOwned(addr) = &self.owner {
            return match *addr {
                Some(addr) => Ok(addr),
                None => Err(ResolutionError::StaleReference { owner: kind })?,
            };
        }

        let Some(current) = self.resolve_const() else {
            return Err(ResolutionError::StaleReference { owner: kind }.into());
        };
        let Some(fresh) = self.ops.duplicate(current) else {
            // A stale address must never leak into the caller's edit.
            return Err(DuplicationError::Failed { owner: kind }.into());
        };
        log::debug!("detached {} handle: {:?} -> {:?}", kind, current, fresh);
        self.owner = Owner::SelfOwned(Some(fresh));
        Ok(fresh)
    }

    /// Release self-owned storage. Idempotent; handles that don't own their
    /// storage release nothing.
    pub fn dispose(&mut self) {
        if let Owner::SelfOwned(ref mut addr) = self.owner {
            if let Some(addr) = addr.take() {
                log::trace!("releasing self-owned object at {:?}", addr);
                self.ops.release(addr);
            }
        }
    }

    // Identity attributes. Values live native-side; reads resolve a fresh
    // address and degrade to defaults, writes gate on the per-attribute state
    // machine before any native call.

    /// The object's globally unique id, if set.
    pub fn id(&self) -> Option<StableId> {
        match self.read_attribute(AttrKind::Id) {
            Some(AttrValue::Id(id)) => Some(id),
            _ => None,
        }
    }

    /// The object's position in its owning collection, if set.
    pub fn index(&self) -> Option<i32> {
        match self.read_attribute(AttrKind::Index) {
            Some(AttrValue::Index(index)) => Some(index),
            _ => None,
        }
    }

    /// The object's name, if set.
    pub fn name(&self) -> Option<String> {
        match self.read_attribute(AttrKind::Name) {
            Some(AttrValue::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// The object's status flags; empty when unset or unavailable.
    pub fn status(&self) -> ObjectStatus {
        match self.read_attribute(AttrKind::Status) {
            Some(AttrValue::Status(status)) => status,
            _ => ObjectStatus::empty(),
        }
    }

    pub fn set_id(&mut self, id: StableId) -> GkrsResult<()> {
        self.write_attribute(AttrValue::Id(id))
    }

    pub fn set_index(&mut self, index: i32) -> GkrsResult<()> {
        self.write_attribute(AttrValue::Index(index))
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> GkrsResult<()> {
        self.write_attribute(AttrValue::Name(name.into()))
    }

    pub fn set_status(&mut self, status: ObjectStatus) -> GkrsResult<()> {
        self.write_attribute(AttrValue::Status(status))
    }

    /// Reset an attribute to unset. Fails while the attribute is locked.
    pub fn clear_attribute(&mut self, kind: AttrKind) -> GkrsResult<()> {
        self.identity.slot(kind).ensure_writable()?;
        let addr = self.write_address()?;
        if !self.ops.clear_attribute(addr, kind) {
            return Err(AttributeError::Rejected { kind }.into());
        }
        self.identity.slot_mut(kind).mark_cleared();
        Ok(())
    }

    /// Irreversibly lock an attribute against further writes through this
    /// handle. Owning collections lock identity after registration.
    pub fn lock_attribute(&mut self, kind: AttrKind) {
        self.identity.slot_mut(kind).lock();
    }

    /// The lifecycle state of an attribute as seen through this handle.
    #[inline]
    pub fn attribute_state(&self, kind: AttrKind) -> AttributeState {
        self.identity.slot(kind).state()
    }

    #[inline]
    pub fn attribute_locked(&self, kind: AttrKind) -> bool {
        self.identity.slot(kind).is_locked()
    }

    fn read_attribute(&self, kind: AttrKind) -> Option<AttrValue> {
        let addr = self.resolve_const()?;
        self.ops.get_attribute(addr, kind)
    }

    fn write_attribute(&mut self, value: AttrValue) -> GkrsResult<()> {
        let kind = value.kind();
        self.identity.slot(kind).ensure_writable()?;
        let addr = self.write_address()?;
        if !self.ops.set_attribute(addr, value) {
            return Err(AttributeError::Rejected { kind }.into());
        }
        self.identity.slot_mut(kind).mark_set();
        Ok(())
    }

    // Content identity.

    /// The kernel's seeded content hash, `None` if the handle doesn't
    /// resolve. Never cached for volatile contexts.
    pub fn content_hash(&self, seed: u64) -> Option<u64> {
        let addr = self.resolve_const()?;
        Some(self.ops.content_hash(addr, seed))
    }

    /// Equality by content at the default seed.
    ///
    /// Unresolvable handles compare equal to nothing, including each other.
    pub fn contents_equal(&self, other: &ObjectHandle) -> bool {
        match (self.default_hash(), other.default_hash()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn default_hash(&self) -> Option<u64> {
        match &self.owner {
            // The self-owned address is authoritative, so the hash can be
            // cached until the next write path invalidates it.
            Owner::SelfOwned(Some(addr)) => {
                let addr = *addr;
                Some(
                    *self
                        .hash_cache
                        .get_or_init(|| self.ops.content_hash(addr, DEFAULT_HASH_SEED)),
                )
            }
            Owner::SelfOwned(None) => None,
            _ => self.content_hash(DEFAULT_HASH_SEED),
        }
    }
}

impl Drop for ObjectHandle {
    // Backstop for skipped explicit disposal; only the exclusively owned
    // allocation is touched.
    fn drop(&mut self) {
        self.dispose();
    }
}
