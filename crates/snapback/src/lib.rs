//! Snapshot and rollback for in-memory values.
//!
//! [`take`] deep-copies a value into a [`Mirror`] and binds it to the
//! location the value lives in. [`Snapshot::revert`] later writes the mirror
//! back, overwriting every mutation made in between.
//!
//! ```
//! use snapback::restorable;
//!
//! #[derive(Debug, PartialEq)]
//! struct Settings {
//!     name: String,
//!     enabled: bool,
//!     retries: i32,
//! }
//!
//! restorable! {
//!     struct Settings { name, enabled, retries }
//! }
//!
//! let mut settings = Settings { name: "original value".into(), enabled: true, retries: 42 };
//! let mut snapshot = snapback::take(&mut settings)?;
//!
//! snapshot.name = "updated value".into();
//! snapshot.enabled = false;
//! snapshot.retries = -556;
//!
//! snapshot.revert()?;
//! assert_eq!(snapshot.retries, 42);
//! # Ok::<(), snapback::SnapshotError>(())
//! ```
//!
//! # Invariants
//! - After a successful revert, every captured value reachable from the
//!   target equals its value at `take`.
//! - A snapshot never changes after `take`; revert can be repeated.
//! - Values that cannot be copied (channels, closures, raw pointers) and
//!   `#[skip]` fields fail the capture unless [`Options`] allow leaving them
//!   out. What was left out is listed by [`Snapshot::skipped`].

mod impls;
pub mod location;
mod macros;
pub mod restorable;
pub mod snapshot;
pub mod transaction;
pub mod walk;

pub use location::Location;
pub use restorable::Restorable;
pub use snapback_common::{
    FieldPolicy, Kind, Mirror, OpaquePolicy, Options, Path, Scalar, Segment, SnapshotError,
    Unavailable,
};
pub use snapshot::{RevertGuard, Snapshot};
pub use transaction::{TransactionError, transact, transact_with};
pub use walk::Walk;

/// Capture the value behind `location` with the default, strict options.
pub fn take<L: Location>(location: L) -> Result<Snapshot<L>, SnapshotError> {
    Snapshot::take(location)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{Mirror, Options, Restorable, SnapshotError, Walk};

    pub fn capture<T: Restorable>(value: &T) -> Mirror {
        capture_with(value, &Options::strict()).unwrap()
    }

    pub fn capture_with<T: Restorable>(value: &T, options: &Options) -> Result<Mirror, SnapshotError> {
        value.capture(&mut Walk::new(options))
    }

    pub fn rebuild<T: Restorable>(mirror: &Mirror) -> Result<T, SnapshotError> {
        T::rebuild(mirror, &mut Walk::new(&Options::strict()))
    }

    pub fn restore<T: Restorable>(value: &mut T, mirror: &Mirror) -> Result<(), SnapshotError> {
        restore_with(value, mirror, &Options::strict())
    }

    pub fn restore_with<T: Restorable>(
        value: &mut T,
        mirror: &Mirror,
        options: &Options,
    ) -> Result<(), SnapshotError> {
        value.restore(mirror, &mut Walk::new(options))
    }
}
