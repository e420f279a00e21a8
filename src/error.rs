//! Everything related to errors.

use std::{error::Error as StdErr, sync::Arc};

use thiserror::Error;

use crate::{kernel::AttrKind, memory::owner::OwnerKind};

/// Alias that is used for most `Result`s in this crate.
pub type GkrsResult<T> = Result<T, Box<GkrsError>>;

/// Resolution errors.
///
/// Raised only on write paths; read access through a handle that can no longer
/// be resolved degrades to a default value instead.
#[derive(Debug, Error, Clone)]
pub enum ResolutionError {
    #[error("no live object behind this {owner} handle")]
    StaleReference { owner: OwnerKind },
}

/// Identity attribute errors.
#[derive(Debug, Error, Clone)]
pub enum AttributeError {
    #[error("the {kind} attribute is locked")]
    Locked { kind: AttrKind },
    #[error("the kernel rejected the {kind} attribute write")]
    Rejected { kind: AttrKind },
}

/// Disposal errors.
#[derive(Debug, Error, Clone)]
pub enum DisposalError {
    #[error("this {wrapper} has already been disposed")]
    Disposed { wrapper: &'static str },
}

/// Copy-on-write errors.
///
/// Duplication failure is fatal for the requested mutation: the shared
/// original must never be handed out as a mutable address.
#[derive(Debug, Error, Clone)]
pub enum DuplicationError {
    #[error("the kernel could not duplicate the object behind this {owner} handle")]
    Failed { owner: OwnerKind },
}

/// Object creation errors.
#[derive(Debug, Error, Clone)]
pub enum InstantiationError {
    #[error("the kernel could not allocate a new object")]
    AllocationFailed,
}

/// Buffer view errors.
#[derive(Debug, Error, Clone)]
pub enum AccessError {
    #[error("the requested range overlaps a borrow that is still active")]
    AlreadyBorrowed,
}

/// All different errors.
#[derive(Debug, Error, Clone)]
pub enum GkrsError {
    #[error("Other: {0}")]
    Other(Arc<dyn StdErr + 'static + Send + Sync>),
    #[error("Resolution error: {0}")]
    ResolutionError(ResolutionError),
    #[error("Attribute error: {0}")]
    AttributeError(AttributeError),
    #[error("Disposal error: {0}")]
    DisposalError(DisposalError),
    #[error("Duplication error: {0}")]
    DuplicationError(DuplicationError),
    #[error("Instantiation error: {0}")]
    InstantiationError(InstantiationError),
    #[error("Access error: {0}")]
    AccessError(AccessError),
}

impl GkrsError {
    /// Convert an arbitrary error to `GkrsError::Other`.
    #[inline]
    pub fn other<E: StdErr + 'static + Send + Sync>(reason: E) -> Self {
        GkrsError::Other(Arc::new(reason))
    }

    /// Convert an arbitrary error to `Err(GkrsError::Other)`.
    #[inline]
    pub fn other_error<T, E: StdErr + 'static + Send + Sync>(reason: E) -> Result<T, Self> {
        Err(Self::other(reason))
    }
}

macro_rules! impl_from {
    ($type:ident) => {
        impl From<$type> for GkrsError {
            #[inline]
            fn from(e: $type) -> Self {
                GkrsError::$type(e)
            }
        }

        impl From<$type> for Box<GkrsError> {
            #[inline]
            fn from(e: $type) -> Self {
                Box::new(GkrsError::from(e))
            }
        }
    };
}

impl_from!(ResolutionError);
impl_from!(AttributeError);
impl_from!(DisposalError);
impl_from!(DuplicationError);
impl_from!(InstantiationError);
impl_from!(AccessError);
