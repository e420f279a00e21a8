//! Everything related to object identity and pointer lifetime.
//!
//! A managed handle never assumes the address it last saw is still valid:
//! the [`owner`] context records who actually owns the native storage, the
//! [`resolve`] protocol re-derives a current address on every access, and
//! [`handle`] builds the read/write duality on top — reads degrade to
//! defaults when nothing resolves, writes detach shared storage into a
//! self-owned copy first. [`snapshot`] bounds the validity of addresses
//! handed out by short-lived events, [`store`] is the contract documents and
//! containers implement to answer resolution queries, [`buffer`] owns the
//! auxiliary native buffers kernel operations return, and [`ledger`] tracks
//! overlapping views of those buffers at runtime.

pub mod buffer;
pub mod handle;
pub mod ledger;
pub mod owner;
pub mod resolve;
pub mod snapshot;
pub mod store;
