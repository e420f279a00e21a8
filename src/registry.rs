//! Progress relay across the native boundary.
//!
//! Long-running kernel operations report progress through a C callback that
//! carries nothing but a numeric correlation serial. The managed side keeps a
//! [`ProgressRegistry`] mapping serials to closures; the thin C shim looks
//! the serial up and forwards the report. The registry is an explicit object
//! owned by the caller, never a process-wide static, so lifecycle and tests
//! stay under the caller's control.
//!
//! Callbacks fire on the same thread that owns the registry, re-entrantly
//! inside the blocking kernel call. Nothing genuinely concurrent occurs, but
//! a callback may register or remove entries while it runs; the registry
//! releases its interior borrow before invoking the callback to keep that
//! legal.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use smallvec::SmallVec;

/// A progress report forwarded from the kernel.
#[derive(Clone, Debug)]
pub struct ProgressReport {
    /// Completed fraction in `0.0..=1.0`.
    pub fraction: f64,
    pub message: Option<String>,
}

type Callback = Rc<dyn Fn(&ProgressReport) -> bool>;

struct Entry {
    serial: u32,
    callback: Callback,
}

/// Registry of progress callbacks keyed by serial number.
///
/// Lookup is a linear scan; a handful of concurrent long-running operations
/// is the realistic population.
pub struct ProgressRegistry {
    entries: RefCell<SmallVec<[Entry; 4]>>,
    next_serial: Cell<u32>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        ProgressRegistry {
            entries: RefCell::new(SmallVec::new()),
            next_serial: Cell::new(1),
        }
    }

    /// Register a callback, returning its correlation serial.
    ///
    /// The callback returns true to continue and false to request
    /// cancellation of the operation reporting through it.
    pub fn register(&self, callback: impl Fn(&ProgressReport) -> bool + 'static) -> u32 {
        let serial = self.next_serial.get();
        self.next_serial.set(serial + 1);
        self.entries.borrow_mut().push(Entry {
            serial,
            callback: Rc::new(callback),
        });
        serial
    }

    /// Remove a callback. True if the serial was registered.
    pub fn remove(&self, serial: u32) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|e| e.serial == serial) {
            Some(idx) => {
                entries.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, serial: u32) -> bool {
        self.entries.borrow().iter().any(|e| e.serial == serial)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Relay a report to the callback registered under `serial`.
    ///
    /// Returns false if cancellation was requested. Unknown serials continue:
    /// the callback may simply have been removed while the operation was
    /// still running.
    pub fn dispatch(&self, serial: u32, report: &ProgressReport) -> bool {
        let callback = self
            .entries
            .borrow()
            .iter()
            .find(|e| e.serial == serial)
            .map(|e| Rc::clone(&e.callback));

        match callback {
            Some(callback) => {
                let proceed = callback(report);
                if !proceed {
                    log::debug!("cancellation requested through serial {}", serial);
                }
                proceed
            }
            None => true,
        }
    }
}

impl Default for ProgressRegistry {
    fn default() -> Self {
        Self::new()
    }
}
