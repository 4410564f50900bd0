//! Optional and owning references, plus the interior-mutability cells.
//!
//! A present pointee is restored in place whenever nothing else can observe
//! it: always for `Option` and `Box`, and for `Rc` and `Arc` only while the
//! pointer is the sole owner. A shared `Rc`/`Arc` is re-pointed to a freshly
//! rebuilt pointee instead, leaving the other owners' value alone. Changes
//! between absent and present are always rebuilt.

use crate::restorable::Restorable;
use crate::walk::Walk;
use snapback_common::{Kind, Mirror, Segment, SnapshotError, Unavailable};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

fn capture_pointee<T: Restorable>(
    pointee: &T,
    walk: &mut Walk<'_>,
) -> Result<Mirror, SnapshotError> {
    let inner = walk.enter(Segment::Deref, |walk| pointee.capture(walk))?;
    Ok(Mirror::Reference(Some(Box::new(inner))))
}

/// The captured pointee of a reference that is never absent.
fn pointee<'m>(walk: &Walk<'_>, mirror: &'m Mirror) -> Result<&'m Mirror, SnapshotError> {
    match mirror {
        Mirror::Reference(Some(inner)) => Ok(inner),
        Mirror::Reference(None) => Err(walk.invalid("present reference", "absent reference")),
        other => Err(walk.mismatch(Kind::Reference, other)),
    }
}

fn rebuild_pointee<T: Restorable>(
    mirror: &Mirror,
    walk: &mut Walk<'_>,
) -> Result<T, SnapshotError> {
    let inner = pointee(walk, mirror)?;
    walk.enter(Segment::Deref, |walk| T::rebuild(inner, walk))
}

impl<T: Restorable> Restorable for Option<T> {
    const KIND: Kind = Kind::Reference;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        match self {
            Some(value) => capture_pointee(value, walk),
            None => Ok(Mirror::Reference(None)),
        }
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        match mirror {
            Mirror::Reference(None) => Ok(None),
            present => rebuild_pointee(present, walk).map(Some),
        }
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        if let (Some(live), Mirror::Reference(Some(inner))) = (self.as_mut(), mirror) {
            return walk.enter(Segment::Deref, |walk| live.restore(inner, walk));
        }
        *self = Self::rebuild(mirror, walk)?;
        Ok(())
    }
}

impl<T: Restorable> Restorable for Box<T> {
    const KIND: Kind = Kind::Reference;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_pointee(&**self, walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        rebuild_pointee(mirror, walk).map(Box::new)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        let inner = pointee(walk, mirror)?;
        walk.enter(Segment::Deref, |walk| (**self).restore(inner, walk))
    }
}

impl<T: Restorable> Restorable for Rc<T> {
    const KIND: Kind = Kind::Reference;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_pointee(&**self, walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        rebuild_pointee(mirror, walk).map(Rc::new)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        if let Some(live) = Rc::get_mut(self) {
            let inner = pointee(walk, mirror)?;
            return walk.enter(Segment::Deref, |walk| live.restore(inner, walk));
        }
        *self = Self::rebuild(mirror, walk)?;
        Ok(())
    }
}

impl<T: Restorable> Restorable for Arc<T> {
    const KIND: Kind = Kind::Reference;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_pointee(&**self, walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        rebuild_pointee(mirror, walk).map(Arc::new)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        if let Some(live) = Arc::get_mut(self) {
            let inner = pointee(walk, mirror)?;
            return walk.enter(Segment::Deref, |walk| live.restore(inner, walk));
        }
        *self = Self::rebuild(mirror, walk)?;
        Ok(())
    }
}

// Cells are transparent: they mirror as their contents.

impl<T: Restorable + Copy> Restorable for Cell<T> {
    const KIND: Kind = T::KIND;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        self.get().capture(walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        T::rebuild(mirror, walk).map(Cell::new)
    }
}

impl<T: Restorable> Restorable for RefCell<T> {
    const KIND: Kind = T::KIND;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        let value = self.try_borrow().map_err(|_| SnapshotError::InvalidTarget {
            path: walk.path().clone(),
            reason: Unavailable::Borrowed,
        })?;
        value.capture(walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        T::rebuild(mirror, walk).map(RefCell::new)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        self.get_mut().restore(mirror, walk)
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{capture, capture_with, rebuild, restore, restore_with};
    use snapback_common::{Mirror, Options, SnapshotError};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::{Arc, mpsc};

    #[test]
    fn option_absent_and_present() {
        assert_eq!(capture(&None::<u8>), Mirror::Reference(None));

        let mirror = capture(&Some(5u8));
        let mut live = None;
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, Some(5u8));

        let mut live = Some(9u8);
        restore(&mut live, &capture(&None::<u8>)).unwrap();
        assert_eq!(live, None);
    }

    #[test]
    fn rc_is_repointed_not_written_through() {
        let original = Rc::new(String::from("original"));
        let mirror = capture(&original);

        let other_owner = Rc::new(String::from("shared"));
        let mut live = Rc::clone(&other_owner);
        restore(&mut live, &mirror).unwrap();

        assert_eq!(*live, "original");
        assert_eq!(*other_owner, "shared");
        assert!(!Rc::ptr_eq(&live, &other_owner));
    }

    #[test]
    fn sole_owner_is_restored_in_place() {
        let mut live = Rc::new(vec![1u8, 2]);
        let mirror = capture(&live);
        let before = Rc::as_ptr(&live);
        Rc::get_mut(&mut live).unwrap().push(3);
        restore(&mut live, &mirror).unwrap();
        assert_eq!(*live, [1, 2]);
        assert_eq!(Rc::as_ptr(&live), before);

        let mut live = Arc::new(String::from("kept"));
        let mirror = capture(&live);
        let before = Arc::as_ptr(&live);
        Arc::get_mut(&mut live).unwrap().clear();
        restore(&mut live, &mirror).unwrap();
        assert_eq!(*live, "kept");
        assert_eq!(Arc::as_ptr(&live), before);
    }

    #[test]
    fn present_option_keeps_its_opaque_pointee() {
        let (tx, rx) = mpsc::channel::<u8>();
        let options = Options::lenient();
        let mut live = Some(tx);
        let mirror = capture_with(&live, &options).unwrap();
        restore_with(&mut live, &mirror, &options).unwrap();

        live.as_ref().unwrap().send(1).unwrap();
        assert_eq!(rx.recv().unwrap(), 1);
    }

    #[test]
    fn arc_rebuild() {
        let mirror = capture(&Arc::new(vec![1u32, 2]));
        let rebuilt: Arc<Vec<u32>> = rebuild(&mirror).unwrap();
        assert_eq!(*rebuilt, [1, 2]);
    }

    #[test]
    fn box_restores_in_place() {
        let mirror = capture(&Box::new((1u8, 'x')));
        let mut live = Box::new((2u8, 'y'));
        restore(&mut live, &mirror).unwrap();
        assert_eq!(*live, (1, 'x'));
    }

    #[test]
    fn box_cannot_take_an_absent_mirror() {
        let err = rebuild::<Box<u8>>(&Mirror::Reference(None)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch at $: expected present reference, found absent reference"
        );
    }

    #[test]
    fn cells_are_transparent() {
        let mirror = capture(&Cell::new(3i16));
        assert_eq!(mirror, capture(&3i16));
        let mut live = Cell::new(0i16);
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live.get(), 3);

        let mut shared = RefCell::new(vec!['a']);
        let mirror = capture(&shared);
        shared.borrow_mut().push('b');
        restore(&mut shared, &mirror).unwrap();
        assert_eq!(*shared.borrow(), ['a']);
    }

    #[test]
    fn borrowed_refcell_cannot_be_captured() {
        let cell = RefCell::new(1u8);
        let _guard = cell.borrow_mut();
        let err = capture_with(&cell, &Options::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidTarget { .. }));
    }
}
