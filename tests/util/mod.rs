#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    ffi::c_void,
    rc::Rc,
};

use gkrs::prelude::*;

/// One fake native object: a bag of identity attributes.
#[derive(Clone, Default)]
struct NativeObject {
    attrs: HashMap<AttrKind, AttrValue>,
}

/// A stand-in kernel over an address-keyed arena.
///
/// Every release is recorded, so tests can assert that non-owned handles
/// never free storage they don't own. Addresses are synthetic non-null
/// pointers; nothing ever dereferences them.
pub struct SpyKernel {
    objects: RefCell<HashMap<usize, NativeObject>>,
    next_addr: Cell<usize>,
    released: RefCell<Vec<usize>>,
    pub fail_duplicate: Cell<bool>,
    pub fail_create: Cell<bool>,
}

/// Borrow an `Rc`'d kernel as the capability set handles consume.
pub trait OpsExt {
    fn ops(&self) -> Rc<dyn ObjectOps>;
}

impl<T: ObjectOps + 'static> OpsExt for Rc<T> {
    fn ops(&self) -> Rc<dyn ObjectOps> {
        Rc::clone(self) as Rc<dyn ObjectOps>
    }
}

/// Borrow an `Rc`'d document as a resolution source.
pub trait SourceExt {
    fn source(&self) -> Rc<dyn ResolutionSource>;
}

impl<T: ResolutionSource + 'static> SourceExt for Rc<T> {
    fn source(&self) -> Rc<dyn ResolutionSource> {
        Rc::clone(self) as Rc<dyn ResolutionSource>
    }
}

impl SpyKernel {
    pub fn new() -> Rc<Self> {
        Rc::new(SpyKernel {
            objects: RefCell::new(HashMap::new()),
            next_addr: Cell::new(0x1000),
            released: RefCell::new(Vec::new()),
            fail_duplicate: Cell::new(false),
            fail_create: Cell::new(false),
        })
    }

    fn key(addr: RawAddress) -> usize {
        addr.as_ptr() as usize
    }

    /// Allocate a fresh, empty native object. Addresses are spaced widely
    /// enough that synthetic buffers never overlap.
    pub fn alloc(&self) -> RawAddress {
        let key = self.next_addr.get();
        self.next_addr.set(key + 0x1000);
        self.objects.borrow_mut().insert(key, NativeObject::default());
        RawAddress::from_ptr(key as *mut c_void).expect("synthetic address is non-null")
    }

    pub fn release_count(&self) -> usize {
        self.released.borrow().len()
    }

    pub fn was_released(&self, addr: RawAddress) -> bool {
        self.released.borrow().contains(&Self::key(addr))
    }

    pub fn is_live(&self, addr: RawAddress) -> bool {
        self.objects.borrow().contains_key(&Self::key(addr))
    }

    pub fn live_objects(&self) -> usize {
        self.objects.borrow().len()
    }

    /// Write an attribute directly into the arena, bypassing the protocol.
    pub fn poke_attribute(&self, addr: RawAddress, value: AttrValue) {
        self.objects
            .borrow_mut()
            .get_mut(&Self::key(addr))
            .expect("object is live")
            .attrs
            .insert(value.kind(), value);
    }

    /// Read an attribute directly from the arena, bypassing the protocol.
    pub fn peek_attribute(&self, addr: RawAddress, kind: AttrKind) -> Option<AttrValue> {
        self.objects
            .borrow()
            .get(&Self::key(addr))
            .and_then(|object| object.attrs.get(&kind).cloned())
    }
}

impl ObjectOps for SpyKernel {
    fn create(&self, args: &InitArgs) -> Option<RawAddress> {
        if self.fail_create.get() {
            return None;
        }
        let addr = self.alloc();
        self.poke_attribute(addr, AttrValue::Id(StableId::generate()));
        if let Some(name) = &args.name {
            self.poke_attribute(addr, AttrValue::Name(name.clone()));
        }
        if let Some(index) = args.index {
            self.poke_attribute(addr, AttrValue::Index(index));
        }
        if !args.status.is_empty() {
            self.poke_attribute(addr, AttrValue::Status(args.status));
        }
        Some(addr)
    }

    fn duplicate(&self, addr: RawAddress) -> Option<RawAddress> {
        if self.fail_duplicate.get() {
            return None;
        }
        let copy = self.objects.borrow().get(&Self::key(addr))?.clone();
        let new_addr = self.alloc();
        self.objects.borrow_mut().insert(Self::key(new_addr), copy);
        Some(new_addr)
    }

    fn release(&self, addr: RawAddress) {
        self.released.borrow_mut().push(Self::key(addr));
        self.objects.borrow_mut().remove(&Self::key(addr));
    }

    fn get_attribute(&self, addr: RawAddress, kind: AttrKind) -> Option<AttrValue> {
        self.peek_attribute(addr, kind)
    }

    fn set_attribute(&self, addr: RawAddress, value: AttrValue) -> bool {
        match self.objects.borrow_mut().get_mut(&Self::key(addr)) {
            Some(object) => {
                object.attrs.insert(value.kind(), value);
                true
            }
            None => false,
        }
    }

    fn clear_attribute(&self, addr: RawAddress, kind: AttrKind) -> bool {
        match self.objects.borrow_mut().get_mut(&Self::key(addr)) {
            Some(object) => {
                object.attrs.remove(&kind);
                true
            }
            None => false,
        }
    }

    fn content_hash(&self, addr: RawAddress, seed: u64) -> u64 {
        let objects = self.objects.borrow();
        let Some(object) = objects.get(&Self::key(addr)) else {
            return seed;
        };
        // FNV-1a over the non-id attributes; id is identity, not content.
        let mut pairs: Vec<String> = object
            .attrs
            .iter()
            .filter(|(kind, _)| **kind != AttrKind::Id)
            .map(|(kind, value)| format!("{kind}={value:?}"))
            .collect();
        pairs.sort();
        let mut hash = seed;
        for byte in pairs.join(";").bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }
}

/// A document that answers resolution queries from a stable-id table.
pub struct MockDocument {
    index: RefCell<StableIndex>,
}

impl MockDocument {
    pub fn new() -> Rc<Self> {
        Rc::new(MockDocument {
            index: RefCell::new(StableIndex::new()),
        })
    }

    pub fn insert(&self, key: StableId, addr: RawAddress) {
        self.index.borrow_mut().insert(key, addr);
    }

    pub fn remove(&self, key: StableId) -> Option<RawAddress> {
        self.index.borrow_mut().remove(key)
    }

    pub fn len(&self) -> usize {
        self.index.borrow().len()
    }
}

impl ResolutionSource for MockDocument {
    fn resolve_const(&self, key: StableId) -> Option<RawAddress> {
        self.index.borrow().get(key)
    }
}

/// A document that allows direct mutation of its storage.
pub struct DirectDocument {
    index: RefCell<StableIndex>,
}

impl DirectDocument {
    pub fn new() -> Rc<Self> {
        Rc::new(DirectDocument {
            index: RefCell::new(StableIndex::new()),
        })
    }

    pub fn insert(&self, key: StableId, addr: RawAddress) {
        self.index.borrow_mut().insert(key, addr);
    }
}

impl ResolutionSource for DirectDocument {
    fn resolve_const(&self, key: StableId) -> Option<RawAddress> {
        self.index.borrow().get(key)
    }

    fn resolve_mutable(&self, key: StableId) -> MutableResolution {
        match self.resolve_const(key) {
            Some(addr) => MutableResolution::Address(addr),
            None => MutableResolution::Gone,
        }
    }
}

/// Allocate an object named `name`, register it in `doc`, return its key.
pub fn seed_object(kernel: &Rc<SpyKernel>, doc: &Rc<MockDocument>, name: &str) -> StableId {
    let addr = kernel.alloc();
    let id = StableId::generate();
    kernel.poke_attribute(addr, AttrValue::Id(id));
    kernel.poke_attribute(addr, AttrValue::Name(name.to_string()));
    doc.insert(id, addr);
    id
}
