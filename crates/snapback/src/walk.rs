use snapback_common::{FieldPolicy, Kind, Mirror, OpaquePolicy, Options, Path, Segment, SnapshotError};

/// Cursor shared by `capture`, `restore` and `rebuild`.
///
/// Tracks where in the target the walk currently is, enforces the depth
/// limit, applies the capture policies and collects the paths that were left
/// out of a lenient capture.
#[derive(Debug)]
pub struct Walk<'o> {
    options: &'o Options,
    path: Path,
    skipped: Vec<Path>,
}

impl<'o> Walk<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            path: Path::root(),
            skipped: Vec::new(),
        }
    }

    pub fn options(&self) -> &Options {
        self.options
    }

    /// Current position.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Paths recorded as not captured so far.
    pub fn skipped(&self) -> &[Path] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<Path> {
        self.skipped
    }

    /// Run `f` one segment deeper.
    pub fn enter<R>(
        &mut self,
        segment: Segment,
        f: impl FnOnce(&mut Self) -> Result<R, SnapshotError>,
    ) -> Result<R, SnapshotError> {
        if self.path.depth() >= self.options.max_depth {
            return Err(SnapshotError::DepthExceeded {
                path: self.path.join(segment),
                limit: self.options.max_depth,
            });
        }
        self.path.push(segment);
        let out = f(self);
        self.path.pop();
        out
    }

    /// Capture a value that cannot be copied, according to the opaque policy.
    pub fn opaque(&mut self, type_name: &'static str) -> Result<Mirror, SnapshotError> {
        match self.options.opaque {
            OpaquePolicy::Reject => Err(SnapshotError::UnsupportedType {
                path: self.path.clone(),
                type_name,
            }),
            OpaquePolicy::Ignore => {
                self.skipped.push(self.path.clone());
                Ok(Mirror::Opaque { type_name })
            }
        }
    }

    /// Capture a `#[skip]` field, according to the hidden field policy.
    pub fn hidden_field(&mut self) -> Result<Mirror, SnapshotError> {
        match self.options.hidden_fields {
            FieldPolicy::Reject => Err(SnapshotError::UnsupportedField {
                path: self.path.clone(),
            }),
            FieldPolicy::Skip => {
                self.skipped.push(self.path.clone());
                Ok(Mirror::Skipped)
            }
        }
    }

    /// Error for a type that can never be constructed from a mirror.
    pub fn not_rebuildable<T>(&self) -> SnapshotError {
        SnapshotError::UnsupportedType {
            path: self.path.clone(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Rebuild of an `#[opaque]` field: always fails, naming the field type.
    pub fn rebuild_opaque<T>(&self) -> Result<T, SnapshotError> {
        Err(self.not_rebuildable::<T>())
    }

    /// Error for a mirror of the wrong category.
    pub fn mismatch(&self, expected: Kind, found: &Mirror) -> SnapshotError {
        SnapshotError::kind_mismatch(self.path.clone(), expected, found.describe())
    }

    /// Error for a mirror of the right category but unusable content.
    pub fn invalid(&self, expected: impl Into<String>, found: impl Into<String>) -> SnapshotError {
        SnapshotError::ShapeMismatch {
            path: self.path.clone(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Fields of a record mirror.
    pub fn record<'m>(
        &self,
        mirror: &'m Mirror,
    ) -> Result<&'m [(&'static str, Mirror)], SnapshotError> {
        match mirror {
            Mirror::Record(fields) => Ok(fields),
            other => Err(self.mismatch(Kind::Record, other)),
        }
    }

    /// A named field among `fields`.
    pub fn field<'m>(
        &self,
        fields: &'m [(&'static str, Mirror)],
        name: &'static str,
    ) -> Result<&'m Mirror, SnapshotError> {
        fields
            .iter()
            .find_map(|(field, mirror)| (*field == name).then_some(mirror))
            .ok_or_else(|| self.invalid(format!("field `{name}`"), "no such field"))
    }

    /// Items of a sequence or array mirror.
    pub(crate) fn items<'m>(
        &self,
        kind: Kind,
        mirror: &'m Mirror,
    ) -> Result<&'m [Mirror], SnapshotError> {
        match (kind, mirror) {
            (Kind::Array, Mirror::Array(items)) | (Kind::Sequence, Mirror::Sequence(items)) => {
                Ok(items)
            }
            (kind, other) => Err(self.mismatch(kind, other)),
        }
    }

    /// Entries of a mapping mirror.
    pub(crate) fn entries<'m>(
        &self,
        mirror: &'m Mirror,
    ) -> Result<&'m [(Mirror, Mirror)], SnapshotError> {
        match mirror {
            Mirror::Mapping(entries) => Ok(entries),
            other => Err(self.mismatch(Kind::Mapping, other)),
        }
    }
}
