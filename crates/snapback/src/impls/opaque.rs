//! Values that cannot be copied.
//!
//! Capture follows [`OpaquePolicy`](snapback_common::OpaquePolicy): rejected
//! by default, or recorded as unchanged. Revert never touches them, and they
//! cannot be rebuilt from a mirror.

use crate::restorable::Restorable;
use crate::walk::Walk;
use snapback_common::{Kind, Mirror, SnapshotError};
use std::sync::mpsc::{Receiver, Sender, SyncSender};
use std::thread::JoinHandle;

macro_rules! opaque {
    ($(impl[$($params:tt)*] $ty:ty;)+) => {$(
        impl<$($params)*> Restorable for $ty {
            const KIND: Kind = Kind::Opaque;

            fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
                walk.opaque(std::any::type_name::<Self>())
            }

            fn rebuild(_mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
                Err(walk.not_rebuildable::<Self>())
            }

            fn restore(&mut self, _mirror: &Mirror, _walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
                Ok(())
            }
        }
    )+};
}

opaque! {
    impl[T] Sender<T>;
    impl[T] SyncSender<T>;
    impl[T] Receiver<T>;
    impl[T] JoinHandle<T>;
    impl[T: ?Sized] *const T;
    impl[T: ?Sized] *mut T;
    impl[R] fn() -> R;
    impl[A, R] fn(A) -> R;
    impl[A, B, R] fn(A, B) -> R;
    impl[A, B, C, R] fn(A, B, C) -> R;
}
