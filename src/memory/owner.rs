//! Owner contexts.
//!
//! A handle never trusts a stored address on its own; the owner context
//! decides how a current address is (re-)obtained. The five contexts are a
//! tagged union so resolution can dispatch exhaustively, one arm per variant.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    rc::Weak,
};

use crate::{
    kernel::{RawAddress, StableId},
    memory::{snapshot::SnapshotToken, store::ResolutionSource},
};

/// Who actually owns the storage behind a handle.
#[derive(Debug)]
pub enum Owner {
    /// The handle exclusively owns its native allocation. The address is
    /// authoritative until disposal; `None` after disposal.
    SelfOwned(Option<RawAddress>),
    /// The object lives in a document; the address is re-derived from
    /// (document, stable id) on every access. The handle holds no lifetime
    /// claim, so the document is referenced weakly.
    Document {
        source: Weak<dyn ResolutionSource>,
        key: StableId,
    },
    /// The object lives in a serialized container; same protocol as
    /// [`Owner::Document`], the container's lifetime is the actual owner.
    Container {
        source: Weak<dyn ResolutionSource>,
        key: StableId,
    },
    /// The address was handed out by a short-lived snapshot and is valid only
    /// while that snapshot is active.
    Snapshot {
        token: SnapshotToken,
        addr: RawAddress,
    },
}

impl Owner {
    /// The discriminant, for diagnostics and error reports.
    pub fn kind(&self) -> OwnerKind {
        match self {
            Owner::SelfOwned(_) => OwnerKind::SelfOwned,
            Owner::Document { .. } => OwnerKind::Document,
            Owner::Container { .. } => OwnerKind::Container,
            Owner::Snapshot { token, .. } => token.kind().owner_kind(),
        }
    }

    /// The stable id this owner resolves through, if it resolves through one.
    pub fn stable_id(&self) -> Option<StableId> {
        match self {
            Owner::Document { key, .. } | Owner::Container { key, .. } => Some(*key),
            _ => None,
        }
    }
}

/// Discriminant-only view of [`Owner`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OwnerKind {
    SelfOwned,
    Document,
    Container,
    TableEditSnapshot,
    RenderFrameSnapshot,
}

impl OwnerKind {
    /// True for the two snapshot contexts.
    pub fn is_snapshot(self) -> bool {
        matches!(
            self,
            OwnerKind::TableEditSnapshot | OwnerKind::RenderFrameSnapshot
        )
    }
}

impl Display for OwnerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            OwnerKind::SelfOwned => f.write_str("self-owned"),
            OwnerKind::Document => f.write_str("document-owned"),
            OwnerKind::Container => f.write_str("container-owned"),
            OwnerKind::TableEditSnapshot => f.write_str("table-edit snapshot"),
            OwnerKind::RenderFrameSnapshot => f.write_str("render-frame snapshot"),
        }
    }
}
