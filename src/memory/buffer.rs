//! Native buffer wrappers with deterministic disposal.
//!
//! Kernel operations hand back auxiliary buffers the managed side must free:
//! arbitrary-size matrices, dynamic string buffers, intersection-result
//! arrays, cancellation tokens. Each wrapper here exclusively owns one such
//! allocation: explicit [`dispose`] releases it immediately and is
//! idempotent, and `Drop` performs the same release if explicit disposal was
//! skipped. The drop path touches nothing but the raw handle the wrapper
//! owns and the release capability that frees it.
//!
//! Views ([`MatrixView`], [`MatrixViewMut`]) merely reference another
//! wrapper's buffer. They don't implement the disposal protocol and never
//! free shared storage; the [`Ledger`] keeps overlapping views honest.
//!
//! [`dispose`]: OwnedBuffer::dispose

use std::{
    cell::{Cell, RefCell},
    mem::size_of,
    ops::Range,
    rc::Rc,
};

use crate::{
    error::{DisposalError, GkrsResult},
    kernel::{ObjectOps, RawAddress},
    memory::ledger::{ExclusiveGuard, Ledger, SharedGuard},
};

/// Exclusive ownership of one native buffer.
///
/// The concrete wrapper types embed this; it carries the disposal protocol.
pub struct OwnedBuffer {
    addr: Cell<Option<RawAddress>>,
    ops: Rc<dyn ObjectOps>,
    wrapper: &'static str,
}

impl OwnedBuffer {
    /// Take ownership of an allocation produced by a kernel operation.
    pub fn adopt(ops: Rc<dyn ObjectOps>, addr: RawAddress, wrapper: &'static str) -> Self {
        OwnedBuffer {
            addr: Cell::new(Some(addr)),
            ops,
            wrapper,
        }
    }

    /// Release the buffer now and mark the wrapper inert. Idempotent.
    pub fn dispose(&self) {
        if let Some(addr) = self.addr.take() {
            log::trace!("disposing {} at {:?}", self.wrapper, addr);
            self.ops.release(addr);
        }
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.addr.get().is_none()
    }

    /// The buffer's address, for passing back into the kernel.
    pub fn address(&self) -> GkrsResult<RawAddress> {
        match self.addr.get() {
            Some(addr) => Ok(addr),
            None => Err(DisposalError::Disposed {
                wrapper: self.wrapper,
            })?,
        }
    }
}

impl Drop for OwnedBuffer {
    // Backstop if explicit disposal was skipped.
    fn drop(&mut self) {
        self.dispose();
    }
}

/// An arbitrary-size matrix allocated by the kernel.
pub struct MatrixBuffer {
    buf: OwnedBuffer,
    rows: usize,
    cols: usize,
}

impl MatrixBuffer {
    /// Take ownership of a kernel-allocated `rows` x `cols` matrix of f64.
    pub fn adopt(ops: Rc<dyn ObjectOps>, addr: RawAddress, rows: usize, cols: usize) -> Self {
        MatrixBuffer {
            buf: OwnedBuffer::adopt(ops, addr, "matrix buffer"),
            rows,
            cols,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn dispose(&self) {
        self.buf.dispose();
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.buf.is_disposed()
    }

    pub fn address(&self) -> GkrsResult<RawAddress> {
        self.buf.address()
    }

    /// A shared view, registered in `ledger` for the guard's lifetime.
    pub fn view<'b>(&self, ledger: &'b RefCell<Ledger>) -> GkrsResult<MatrixView<'b, '_>> {
        let guard = Ledger::try_borrow(ledger, self.data_range()?)?;
        Ok(MatrixView {
            _guard: guard,
            matrix: self,
        })
    }

    /// An exclusive view; fails while any overlapping view is registered.
    pub fn view_mut<'b>(&self, ledger: &'b RefCell<Ledger>) -> GkrsResult<MatrixViewMut<'b, '_>> {
        let guard = Ledger::try_borrow_mut(ledger, self.data_range()?)?;
        Ok(MatrixViewMut {
            _guard: guard,
            matrix: self,
        })
    }

    fn data_range(&self) -> GkrsResult<Range<*const u8>> {
        let start = self.buf.address()?.as_ptr().cast_const().cast::<u8>();
        let len = self.element_count() * size_of::<f64>();
        Ok(start..start.wrapping_add(len))
    }
}

/// A non-owning view of a [`MatrixBuffer`].
///
/// Relies on the owner's disposal; never frees shared storage.
pub struct MatrixView<'b, 'm> {
    _guard: SharedGuard<'b>,
    matrix: &'m MatrixBuffer,
}

impl MatrixView<'_, '_> {
    pub fn address(&self) -> GkrsResult<RawAddress> {
        self.matrix.address()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }
}

/// An exclusive non-owning view of a [`MatrixBuffer`].
pub struct MatrixViewMut<'b, 'm> {
    _guard: ExclusiveGuard<'b>,
    matrix: &'m MatrixBuffer,
}

impl MatrixViewMut<'_, '_> {
    pub fn address(&self) -> GkrsResult<RawAddress> {
        self.matrix.address()
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }
}

/// A dynamic string buffer allocated by the kernel.
///
/// Marshaling the contents belongs to the string helpers; this wrapper only
/// manages the allocation's lifetime.
pub struct StringBuffer {
    buf: OwnedBuffer,
}

impl StringBuffer {
    pub fn adopt(ops: Rc<dyn ObjectOps>, addr: RawAddress) -> Self {
        StringBuffer {
            buf: OwnedBuffer::adopt(ops, addr, "string buffer"),
        }
    }

    pub fn dispose(&self) {
        self.buf.dispose();
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.buf.is_disposed()
    }

    pub fn address(&self) -> GkrsResult<RawAddress> {
        self.buf.address()
    }
}

/// An intersection-result array allocated by the kernel.
pub struct HitList {
    buf: OwnedBuffer,
    hits: usize,
}

impl HitList {
    pub fn adopt(ops: Rc<dyn ObjectOps>, addr: RawAddress, hits: usize) -> Self {
        HitList {
            buf: OwnedBuffer::adopt(ops, addr, "hit list"),
            hits,
        }
    }

    /// Number of intersection events in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.hits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hits == 0
    }

    pub fn dispose(&self) {
        self.buf.dispose();
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.buf.is_disposed()
    }

    pub fn address(&self) -> GkrsResult<RawAddress> {
        self.buf.address()
    }
}

/// A cancellation token for long-running kernel calls.
///
/// The kernel polls the token's address during the call; the managed side
/// records the request so callers can query it without another native call.
pub struct CancelToken {
    buf: OwnedBuffer,
    requested: Cell<bool>,
}

impl CancelToken {
    pub fn adopt(ops: Rc<dyn ObjectOps>, addr: RawAddress) -> Self {
        CancelToken {
            buf: OwnedBuffer::adopt(ops, addr, "cancel token"),
            requested: Cell::new(false),
        }
    }

    /// Request cooperative cancellation of the call polling this token.
    pub fn request_cancel(&self) -> GkrsResult<()> {
        // Fails once the token is disposed; the kernel no longer polls it.
        let _ = self.buf.address()?;
        self.requested.set(true);
        Ok(())
    }

    #[inline]
    pub fn cancel_requested(&self) -> bool {
        self.requested.get()
    }

    pub fn dispose(&self) {
        self.buf.dispose();
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.buf.is_disposed()
    }

    pub fn address(&self) -> GkrsResult<RawAddress> {
        self.buf.address()
    }
}
