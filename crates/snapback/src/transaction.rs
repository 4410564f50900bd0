use crate::restorable::Restorable;
use crate::snapshot::Snapshot;
use snapback_common::{Options, SnapshotError};

/// Failure of [`transact`].
#[derive(Debug, thiserror::Error)]
pub enum TransactionError<E> {
    /// The closure failed and the target was rolled back.
    #[error("transaction aborted, target rolled back: {0}")]
    Aborted(E),
    /// The closure failed and rolling the target back failed too. The target
    /// may be partially rolled back.
    #[error("transaction aborted ({aborted}) and rollback failed")]
    RollbackFailed {
        aborted: E,
        #[source]
        source: SnapshotError,
    },
    /// The target could not be captured; the closure never ran.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Run `edit` on `target`, rolling the target back if it returns `Err`.
///
/// ```
/// use snapback::{TransactionError, transact};
///
/// let mut ports = vec![80u16, 443];
/// let result = transact(&mut ports, |ports| {
///     ports.push(8080);
///     if ports.len() > 2 {
///         return Err("too many ports");
///     }
///     Ok(())
/// });
///
/// assert!(matches!(result, Err(TransactionError::Aborted("too many ports"))));
/// assert_eq!(ports, [80, 443]);
/// ```
pub fn transact<T, R, E>(
    target: &mut T,
    edit: impl FnOnce(&mut T) -> Result<R, E>,
) -> Result<R, TransactionError<E>>
where
    T: Restorable,
{
    transact_with(target, Options::default(), edit)
}

/// [`transact`] with explicit capture options.
pub fn transact_with<T, R, E>(
    target: &mut T,
    options: Options,
    edit: impl FnOnce(&mut T) -> Result<R, E>,
) -> Result<R, TransactionError<E>>
where
    T: Restorable,
{
    let mut snapshot = Snapshot::take_with(target, options)?;
    match edit(&mut *snapshot) {
        Ok(value) => Ok(value),
        Err(aborted) => match snapshot.revert() {
            Ok(()) => {
                tracing::debug!("transaction rolled back");
                Err(TransactionError::Aborted(aborted))
            }
            Err(source) => Err(TransactionError::RollbackFailed { aborted, source }),
        },
    }
}
