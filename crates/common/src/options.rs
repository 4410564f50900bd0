use serde::{Deserialize, Serialize};

/// Default recursion limit for a single walk.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// What to do with values that cannot be copied: channels, callables,
/// raw pointers and fields declared `#[opaque]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpaquePolicy {
    /// Fail the capture with `UnsupportedType`.
    #[default]
    Reject,
    /// Record the value as unchanged and leave it alone on revert.
    Ignore,
}

/// What to do with fields declared `#[skip]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    /// Fail the capture with `UnsupportedField`.
    #[default]
    Reject,
    /// Leave the field out of the snapshot; revert does not touch it.
    Skip,
}

/// Capture policy for a snapshot.
///
/// The defaults are strict: anything that cannot be captured and restored
/// exactly is an error. Lenient handling is opt-in, and every value left out
/// is reported by the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub opaque: OpaquePolicy,
    pub hidden_fields: FieldPolicy,
    /// Maximum nesting depth below the root.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            opaque: OpaquePolicy::Reject,
            hidden_fields: FieldPolicy::Reject,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Options {
    /// Strict options (the default).
    pub fn strict() -> Self {
        Self::default()
    }

    /// Ignore opaque values and skip hidden fields.
    pub fn lenient() -> Self {
        Self {
            opaque: OpaquePolicy::Ignore,
            hidden_fields: FieldPolicy::Skip,
            ..Self::default()
        }
    }

    pub fn with_opaque(mut self, policy: OpaquePolicy) -> Self {
        self.opaque = policy;
        self
    }

    pub fn with_hidden_fields(mut self, policy: FieldPolicy) -> Self {
        self.hidden_fields = policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Whether anything may be left out of a capture under these options.
    pub fn is_lenient(&self) -> bool {
        self.opaque == OpaquePolicy::Ignore || self.hidden_fields == FieldPolicy::Skip
    }
}
