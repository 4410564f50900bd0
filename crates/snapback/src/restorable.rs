use crate::walk::Walk;
use snapback_common::{Kind, Mirror, SnapshotError};

/// A type whose state can be captured into a [`Mirror`] and written back.
///
/// Implemented for the std scalars, collections and pointers. User types get
/// it from [`restorable!`](crate::restorable).
///
/// The three methods must agree on the mirror shape: whatever `capture`
/// produces, `restore` and `rebuild` accept.
pub trait Restorable: Sized {
    /// Category of the values of this type.
    const KIND: Kind;

    /// Deep-copy the current state.
    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError>;

    /// Construct a fresh value from a mirror.
    ///
    /// Used wherever revert has no live value to write into: a sequence that
    /// shrank, a removed mapping key, a reference that became absent.
    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError>;

    /// Write a mirror back into this value.
    ///
    /// The default replaces the value with a rebuilt one.
    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        *self = Self::rebuild(mirror, walk)?;
        Ok(())
    }
}
