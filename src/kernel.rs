//! The native kernel's object ABI.
//!
//! The kernel is consumed as an opaque capability set per object kind rather
//! than linked directly: every wrapped type hands the crate an [`ObjectOps`]
//! implementation that forwards to the native entry points for that kind.
//! Nothing in this module interprets native storage; addresses are opaque and
//! only ever passed back into the kernel.

use std::{
    ffi::c_void,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    ptr::NonNull,
};

use uuid::Uuid;

use crate::data::status::ObjectStatus;

/// Seed used for content hashes when the caller doesn't provide one.
///
/// The FNV-1a 64-bit offset basis; any fixed value works, but a nonzero seed
/// keeps an all-default object from hashing to zero.
pub const DEFAULT_HASH_SEED: u64 = 0xcbf29ce484222325;

/// The address of a native object.
///
/// A `RawAddress` is only meaningful while the context that produced it is
/// alive; it is never dereferenced by this crate, only passed back into the
/// kernel.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct RawAddress(NonNull<c_void>);

impl RawAddress {
    /// Wrap a non-null native pointer.
    #[inline]
    pub fn new(ptr: NonNull<c_void>) -> Self {
        RawAddress(ptr)
    }

    /// Wrap a native pointer, `None` if it is null.
    #[inline]
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(RawAddress)
    }

    /// The raw pointer, for passing back into the kernel.
    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

impl Debug for RawAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:p}", self.0.as_ptr())
    }
}

/// An opaque token identifying a logical object across resolution calls,
/// independent of its current address.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct StableId(Uuid);

impl StableId {
    /// Generate a fresh id.
    #[inline]
    pub fn generate() -> Self {
        StableId(Uuid::new_v4())
    }

    #[inline]
    pub fn from_uuid(uuid: Uuid) -> Self {
        StableId(uuid)
    }

    #[inline]
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Display for StableId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

/// The identity attributes a kernel object carries.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrKind {
    Id,
    Index,
    Name,
    Status,
}

impl Display for AttrKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AttrKind::Id => f.write_str("id"),
            AttrKind::Index => f.write_str("index"),
            AttrKind::Name => f.write_str("name"),
            AttrKind::Status => f.write_str("status"),
        }
    }
}

/// The value of an identity attribute.
#[derive(Clone, PartialEq, Debug)]
pub enum AttrValue {
    Id(StableId),
    Index(i32),
    Name(String),
    Status(ObjectStatus),
}

impl AttrValue {
    /// The kind this value belongs to.
    #[inline]
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Id(_) => AttrKind::Id,
            AttrValue::Index(_) => AttrKind::Index,
            AttrValue::Name(_) => AttrKind::Name,
            AttrValue::Status(_) => AttrKind::Status,
        }
    }
}

/// Arguments for creating a fresh native object.
///
/// The kernel assigns the id; the other identity attributes can be seeded at
/// creation time.
#[derive(Clone, Debug, Default)]
pub struct InitArgs {
    pub name: Option<String>,
    pub index: Option<i32>,
    pub status: ObjectStatus,
}

/// The capability set the native kernel exposes per object kind.
///
/// Implementations forward to the native entry points for one kind of object.
/// Addresses returned by these operations follow the ownership rules of the
/// caller: `create` and `duplicate` hand out allocations the caller must
/// eventually `release` exactly once, the attribute operations borrow.
pub trait ObjectOps {
    /// Allocate a fresh object. `None` if the kernel could not allocate.
    fn create(&self, args: &InitArgs) -> Option<RawAddress>;

    /// Copy the object at `addr` into a new independent allocation.
    fn duplicate(&self, addr: RawAddress) -> Option<RawAddress>;

    /// Free the allocation at `addr`.
    fn release(&self, addr: RawAddress);

    /// Read an identity attribute. `None` is the kernel's own unset sentinel,
    /// not a default value fabricated by the wrapper.
    fn get_attribute(&self, addr: RawAddress, kind: AttrKind) -> Option<AttrValue>;

    /// Write an identity attribute. Returns false if the kernel refused.
    fn set_attribute(&self, addr: RawAddress, value: AttrValue) -> bool;

    /// Reset an identity attribute to the kernel's unset sentinel.
    fn clear_attribute(&self, addr: RawAddress, kind: AttrKind) -> bool;

    /// Seeded content hash, used for change detection and
    /// equality-by-content.
    fn content_hash(&self, addr: RawAddress, seed: u64) -> u64;
}
