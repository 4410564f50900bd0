use crate::location::Location;
use crate::restorable::Restorable;
use crate::walk::Walk;
use snapback_common::{Mirror, Options, Path, SnapshotError};
use std::any::type_name;
use std::ops::{Deref, DerefMut};

/// The state of a value at one point in time, bound to where the value lives.
///
/// Created by [`take`](crate::take) or [`Snapshot::take_with`]. The mirror is
/// never modified after capture, so a snapshot can be reverted any number of
/// times.
#[derive(Debug)]
pub struct Snapshot<L: Location> {
    location: L,
    mirror: Mirror,
    options: Options,
    skipped: Vec<Path>,
}

impl<L: Location> Snapshot<L> {
    /// Capture the value behind `location` with the default, strict options.
    pub fn take(location: L) -> Result<Self, SnapshotError> {
        Self::take_with(location, Options::default())
    }

    /// Capture the value behind `location`.
    ///
    /// Either the whole value is captured or no snapshot is returned.
    pub fn take_with(location: L, options: Options) -> Result<Self, SnapshotError> {
        let (mirror, skipped) = location
            .read(|value| {
                let mut walk = Walk::new(&options);
                let mirror = value.capture(&mut walk)?;
                Ok::<_, SnapshotError>((mirror, walk.into_skipped()))
            })
            .map_err(|reason| SnapshotError::InvalidTarget {
                path: Path::root(),
                reason,
            })??;

        tracing::debug!(
            target_type = type_name::<L::Value>(),
            nodes = mirror.node_count(),
            skipped = skipped.len(),
            "snapshot taken"
        );
        for path in &skipped {
            tracing::warn!(%path, "value left out of snapshot, revert will not touch it");
        }

        Ok(Self {
            location,
            mirror,
            options,
            skipped,
        })
    }

    /// Write the captured state back into the location.
    ///
    /// Sequences and mappings end up with exactly the captured elements,
    /// references get back their captured presence, and every scalar its
    /// captured value. Skipped and opaque values are left as they are.
    ///
    /// Revert is not atomic: when it fails partway (a value that cannot be
    /// rebuilt, a `RefCell` borrowed somewhere inside the target), the parts
    /// visited before the failure are already restored.
    pub fn revert(&mut self) -> Result<(), SnapshotError> {
        let result = self
            .location
            .write(|value| value.restore(&self.mirror, &mut Walk::new(&self.options)))
            .map_err(|reason| SnapshotError::TargetInvalidated {
                path: Path::root(),
                reason,
            })
            .and_then(|restored| restored);

        match &result {
            Ok(()) => tracing::debug!(
                target_type = type_name::<L::Value>(),
                nodes = self.mirror.node_count(),
                "snapshot reverted"
            ),
            Err(err) => tracing::warn!(%err, "revert failed, target may be partially reverted"),
        }
        result
    }

    /// The captured state.
    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// Paths left out of the capture under a lenient policy.
    pub fn skipped(&self) -> &[Path] {
        &self.skipped
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Whether the live value differs from the captured one.
    ///
    /// Mappings compare without regard to iteration order.
    pub fn is_dirty(&self) -> Result<bool, SnapshotError> {
        let current = self
            .location
            .read(|value| value.capture(&mut Walk::new(&self.options)))
            .map_err(|reason| SnapshotError::TargetInvalidated {
                path: Path::root(),
                reason,
            })??;
        Ok(!current.equivalent(&self.mirror))
    }

    /// Drop the captured state and give the location back.
    pub fn release(self) -> L {
        self.location
    }

    /// Revert automatically when the returned guard goes out of scope.
    pub fn revert_on_drop(self) -> RevertGuard<L> {
        RevertGuard {
            snapshot: self,
            armed: true,
        }
    }
}

impl<T: Restorable> Deref for Snapshot<&mut T> {
    type Target = T;

    fn deref(&self) -> &T {
        &*self.location
    }
}

impl<T: Restorable> DerefMut for Snapshot<&mut T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.location
    }
}

/// Reverts its snapshot on drop unless committed.
///
/// A failed revert during drop is logged at error level; drop never panics.
#[derive(Debug)]
pub struct RevertGuard<L: Location> {
    snapshot: Snapshot<L>,
    armed: bool,
}

impl<L: Location> RevertGuard<L> {
    /// Keep the current state of the target.
    pub fn commit(mut self) {
        self.armed = false;
    }

    /// Revert now and report the outcome instead of logging it.
    pub fn revert_now(mut self) -> Result<(), SnapshotError> {
        self.armed = false;
        self.snapshot.revert()
    }
}

impl<L: Location> Deref for RevertGuard<L> {
    type Target = Snapshot<L>;

    fn deref(&self) -> &Snapshot<L> {
        &self.snapshot
    }
}

impl<L: Location> DerefMut for RevertGuard<L> {
    fn deref_mut(&mut self) -> &mut Snapshot<L> {
        &mut self.snapshot
    }
}

impl<L: Location> Drop for RevertGuard<L> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = self.snapshot.revert() {
            tracing::error!(%err, "revert on drop failed");
        }
    }
}
