//! Dynamic borrow tracking for native buffer views.
//!
//! Native buffers are shared with the kernel, so the compiler can't see every
//! reader and writer. The ledger checks view requests at runtime instead:
//! shared views of a buffer may overlap each other but never an exclusive
//! view, and an exclusive view may overlap nothing. Guards deregister their
//! range when dropped.

// Adapted from neon:
// https://github.com/neon-bindings/neon/blob/09c04b3129798b16021549352c74323f629d5bb0/crates/neon/src/types/buffer/lock.rs

use std::{cell::RefCell, ops::Range};

use crate::error::{AccessError, GkrsResult};

#[derive(Debug, Default)]
pub struct Ledger {
    exclusive: Vec<Range<*const u8>>,
    shared: Vec<Range<*const u8>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shared view of `range`.
    pub fn try_borrow(
        ledger: &RefCell<Self>,
        range: Range<*const u8>,
    ) -> GkrsResult<SharedGuard<'_>> {
        let mut this = ledger.borrow_mut();
        check_overlap(&this.exclusive, &range)?;
        this.shared.push(range.clone());
        Ok(SharedGuard { ledger, range })
    }

    /// Register an exclusive view of `range`.
    pub fn try_borrow_mut(
        ledger: &RefCell<Self>,
        range: Range<*const u8>,
    ) -> GkrsResult<ExclusiveGuard<'_>> {
        let mut this = ledger.borrow_mut();
        check_overlap(&this.exclusive, &range)?;
        check_overlap(&this.shared, &range)?;
        this.exclusive.push(range.clone());
        Ok(ExclusiveGuard { ledger, range })
    }

    /// Number of registered views, shared and exclusive.
    pub fn active_views(&self) -> usize {
        self.exclusive.len() + self.shared.len()
    }

    fn release(records: &mut Vec<Range<*const u8>>, range: &Range<*const u8>) {
        // One registration per guard, so remove a single occurrence.
        if let Some(idx) = records.iter().position(|r| r == range) {
            records.swap_remove(idx);
        }
    }
}

/// A registered shared view; deregisters on drop.
#[derive(Debug)]
pub struct SharedGuard<'b> {
    ledger: &'b RefCell<Ledger>,
    range: Range<*const u8>,
}

impl Drop for SharedGuard<'_> {
    fn drop(&mut self) {
        Ledger::release(&mut self.ledger.borrow_mut().shared, &self.range);
    }
}

/// A registered exclusive view; deregisters on drop.
#[derive(Debug)]
pub struct ExclusiveGuard<'b> {
    ledger: &'b RefCell<Ledger>,
    range: Range<*const u8>,
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        Ledger::release(&mut self.ledger.borrow_mut().exclusive, &self.range);
    }
}

fn is_disjoint(a: &Range<*const u8>, b: &Range<*const u8>) -> bool {
    b.start >= a.end || a.start >= b.end
}

fn check_overlap(existing: &[Range<*const u8>], range: &Range<*const u8>) -> GkrsResult<()> {
    if existing.iter().all(|i| is_disjoint(i, range)) {
        Ok(())
    } else {
        Err(AccessError::AlreadyBorrowed)?
    }
}
