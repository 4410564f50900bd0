use crate::restorable::Restorable;
use snapback_common::Unavailable;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Storage a snapshot is bound to.
///
/// A location is read once by `take` and written by every `revert`. Plain
/// `&mut T` is always available; the `RefCell` based locations report a
/// conflicting borrow or a dropped value instead of panicking.
pub trait Location {
    type Value: Restorable;

    fn read<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> Result<R, Unavailable>;

    fn write<R>(&mut self, f: impl FnOnce(&mut Self::Value) -> R) -> Result<R, Unavailable>;
}

impl<T: Restorable> Location for &mut T {
    type Value = T;

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, Unavailable> {
        Ok(f(&**self))
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, Unavailable> {
        Ok(f(&mut **self))
    }
}

fn read_cell<T, R>(cell: &RefCell<T>, f: impl FnOnce(&T) -> R) -> Result<R, Unavailable> {
    let value = cell.try_borrow().map_err(|_| Unavailable::Borrowed)?;
    Ok(f(&*value))
}

fn write_cell<T, R>(cell: &RefCell<T>, f: impl FnOnce(&mut T) -> R) -> Result<R, Unavailable> {
    let mut value = cell.try_borrow_mut().map_err(|_| Unavailable::Borrowed)?;
    Ok(f(&mut *value))
}

impl<T: Restorable> Location for &RefCell<T> {
    type Value = T;

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, Unavailable> {
        read_cell(*self, f)
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, Unavailable> {
        write_cell(*self, f)
    }
}

impl<T: Restorable> Location for Rc<RefCell<T>> {
    type Value = T;

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, Unavailable> {
        read_cell(&**self, f)
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, Unavailable> {
        write_cell(&**self, f)
    }
}

/// A snapshot through a `Weak` does not keep the target alive; once the
/// last strong owner is gone, revert fails with `Unavailable::Dropped`.
impl<T: Restorable> Location for Weak<RefCell<T>> {
    type Value = T;

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, Unavailable> {
        let cell = self.upgrade().ok_or(Unavailable::Dropped)?;
        read_cell(&*cell, f)
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, Unavailable> {
        let cell = self.upgrade().ok_or(Unavailable::Dropped)?;
        write_cell(&*cell, f)
    }
}
