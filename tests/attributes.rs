mod util;

use gkrs::{
    error::{AttributeError, GkrsError},
    prelude::*,
};
use util::{seed_object, MockDocument, OpsExt, SourceExt, SpyKernel};

#[test]
fn locked_name_rejects_writes() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    handle.set_name("Base").unwrap();
    handle.lock_attribute(AttrKind::Name);

    let err = handle.set_name("Other").unwrap_err();
    assert!(matches!(
        *err,
        GkrsError::AttributeError(AttributeError::Locked {
            kind: AttrKind::Name
        })
    ));
    assert_eq!(handle.name().as_deref(), Some("Base"));
}

#[test]
fn lock_preserves_the_stored_value() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    handle.set_index(42).unwrap();
    handle.lock_attribute(AttrKind::Index);
    assert_eq!(handle.index(), Some(42));
}

#[test]
fn locking_an_unset_attribute_blocks_the_first_write() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    handle.lock_attribute(AttrKind::Index);
    assert!(handle.set_index(1).is_err());
    assert_eq!(handle.index(), None);
}

#[test]
fn locks_are_independent_per_attribute() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    handle.set_name("Fixed").unwrap();
    handle.lock_attribute(AttrKind::Name);

    handle.set_index(3).unwrap();
    handle.set_status(ObjectStatus::SELECTED).unwrap();
    assert_eq!(handle.index(), Some(3));
    assert!(handle.status().is_selected());
    assert_eq!(handle.name().as_deref(), Some("Fixed"));
}

#[test]
fn clear_requires_an_unlocked_attribute() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    handle.set_name("Temporary").unwrap();
    handle.clear_attribute(AttrKind::Name).unwrap();
    assert_eq!(handle.name(), None);
    assert_eq!(handle.attribute_state(AttrKind::Name), AttributeState::Unset);

    handle.set_name("Final").unwrap();
    handle.lock_attribute(AttrKind::Name);
    assert!(handle.clear_attribute(AttrKind::Name).is_err());
    assert_eq!(handle.name().as_deref(), Some("Final"));
}

#[test]
fn state_machine_is_visible_through_the_handle() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    assert_eq!(handle.attribute_state(AttrKind::Name), AttributeState::Unset);
    handle.set_name("A").unwrap();
    assert_eq!(handle.attribute_state(AttrKind::Name), AttributeState::Set);
    handle.set_name("B").unwrap();
    assert_eq!(handle.attribute_state(AttrKind::Name), AttributeState::Set);
    handle.lock_attribute(AttrKind::Name);
    assert_eq!(
        handle.attribute_state(AttrKind::Name),
        AttributeState::Locked
    );
    assert!(handle.attribute_locked(AttrKind::Name));
}

#[test]
fn a_failed_write_does_not_advance_the_state_machine() {
    let kernel = SpyKernel::new();
    let doc = MockDocument::new();
    let key = seed_object(&kernel, &doc, "Base");

    let mut handle = ObjectHandle::from_document(kernel.ops(), &doc.source(), key);
    doc.remove(key);

    assert!(handle.set_name("Other").is_err());
    assert_eq!(handle.attribute_state(AttrKind::Name), AttributeState::Unset);
}

#[test]
fn identity_writes_on_shared_handles_detach_first() {
    let kernel = SpyKernel::new();
    let doc = MockDocument::new();
    let key = seed_object(&kernel, &doc, "Base");

    let mut handle = ObjectHandle::from_document(kernel.ops(), &doc.source(), key);
    handle.set_index(9).unwrap();

    assert_eq!(handle.owner_kind(), OwnerKind::SelfOwned);
    assert_eq!(handle.index(), Some(9));
    // The document's object never saw the index write.
    let original = doc.resolve_const(key).unwrap();
    assert_eq!(kernel.peek_attribute(original, AttrKind::Index), None);
}

#[test]
fn set_id_round_trips() {
    let kernel = SpyKernel::new();
    let mut handle = ObjectHandle::create(kernel.ops(), &InitArgs::default()).unwrap();

    let id = StableId::generate();
    handle.set_id(id).unwrap();
    assert_eq!(handle.id(), Some(id));
    assert_eq!(handle.stable_id(), Some(id));

    handle.lock_attribute(AttrKind::Id);
    assert!(handle.set_id(StableId::generate()).is_err());
    assert_eq!(handle.id(), Some(id));
}
