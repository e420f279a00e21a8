//! gkrs provides the managed handle substrate for bindings to a native
//! geometry kernel. The kernel owns the actual geometry; this crate owns the
//! protocol every wrapped type relies on: how a managed handle refers to a
//! native object whose storage it may or may not own, whose address can be
//! invalidated by a third party at any time, and which must support
//! copy-on-write mutation, deterministic disposal, and lockable identity
//! attributes.
//!
//! # Overview
//!
//!  - Handles resolve through an owner context — self-owned allocation,
//!    document, serialized container, or short-lived snapshot — instead of
//!    trusting a stored address. Volatile contexts are re-queried on every
//!    access.
//!  - Reads through a handle that no longer resolves degrade to default
//!    values; writes fail loudly. Inspecting an object after its document
//!    closed is expected, mutating it is a bug.
//!  - The first write through a shared handle detaches it: the object is
//!    duplicated into a fresh self-owned allocation and the handle is rebound
//!    to it, so readers of the shared original are never affected.
//!  - Identity attributes (id, index, name, status) can be locked
//!    independently and irreversibly once an object is registered in an
//!    owning collection.
//!  - Auxiliary native buffers (matrices, string buffers, intersection
//!    results, cancellation tokens) are released deterministically, with drop
//!    as a backstop, and views of them are checked against a runtime borrow
//!    ledger.
//!  - Progress callbacks from long-running kernel calls are relayed through
//!    an explicit registry keyed by correlation serial.
//!
//! The native kernel itself is consumed as an opaque capability set per
//! object kind (the [`ObjectOps`] trait in [`kernel`]); nothing here links or
//! interprets native storage. Everything is single-threaded by contract:
//! handles, owner contexts, and registries all assume one logical thread per
//! document and use no locks.
//!
//! [`ObjectOps`]: crate::kernel::ObjectOps

pub mod data;
pub mod error;
pub mod kernel;
pub mod memory;
pub mod prelude;
pub mod registry;
