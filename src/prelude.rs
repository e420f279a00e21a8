//! Everything you need to use the handle substrate.

pub use crate::{
    data::{
        attributes::{AttributeSlot, AttributeState, IdentityState},
        status::ObjectStatus,
    },
    error::{GkrsError, GkrsResult},
    kernel::{
        AttrKind, AttrValue, InitArgs, ObjectOps, RawAddress, StableId, DEFAULT_HASH_SEED,
    },
    memory::{
        buffer::{
            CancelToken, HitList, MatrixBuffer, MatrixView, MatrixViewMut, OwnedBuffer,
            StringBuffer,
        },
        handle::ObjectHandle,
        ledger::Ledger,
        owner::{Owner, OwnerKind},
        resolve::{resolve, Resolution},
        snapshot::{Snapshot, SnapshotKind, SnapshotScope, SnapshotToken},
        store::{MutableResolution, ResolutionSource, StableIndex},
    },
    registry::{ProgressRegistry, ProgressReport},
};
