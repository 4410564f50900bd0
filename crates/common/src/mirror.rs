use serde::Serialize;
use std::fmt;

/// Value category: the dispatch key of the snapshot walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Booleans, numbers, characters, text and `()`.
    Scalar,
    /// Aggregates with named or positional fields (structs, tuples).
    Record,
    /// Tagged unions (enums): a variant name plus that variant's fields.
    Variant,
    /// Fixed-size sequences.
    Array,
    /// Growable sequences; the length is part of the state.
    Sequence,
    /// Key/value mappings and sets.
    Mapping,
    /// Nullable or owning references.
    Reference,
    /// Values that cannot be copied (channels, callables, raw pointers).
    Opaque,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Record => "record",
            Self::Variant => "variant",
            Self::Array => "array",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Reference => "reference",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured leaf value.
///
/// Integers are widened to 128 bits and floats to `f64`; the narrowing back
/// happens when the mirror is restored into its concrete type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Unit,
    Bool(bool),
    Int(i128),
    Uint(u128),
    Float(f64),
    Char(char),
    Text(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Uint(a), Self::Uint(b)) => a == b,
            // Bitwise, so a captured NaN still equals itself.
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

/// Owned deep copy of a value's state.
///
/// Built by `capture`, consumed read-only by `restore`/`rebuild`. A mirror
/// holds no references into the value it was taken from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mirror {
    Scalar(Scalar),
    Record(Vec<(&'static str, Mirror)>),
    Variant {
        name: &'static str,
        fields: Vec<(&'static str, Mirror)>,
    },
    Array(Vec<Mirror>),
    Sequence(Vec<Mirror>),
    /// Entries in capture order.
    Mapping(Vec<(Mirror, Mirror)>),
    Reference(Option<Box<Mirror>>),
    /// Recorded under a lenient policy: left unchanged on revert.
    Opaque { type_name: &'static str },
    /// A hidden field skipped under a lenient policy.
    Skipped,
}

impl Mirror {
    /// Shorthand for a text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    /// The category this mirror was captured as. `None` for [`Mirror::Skipped`].
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Scalar(_) => Some(Kind::Scalar),
            Self::Record(_) => Some(Kind::Record),
            Self::Variant { .. } => Some(Kind::Variant),
            Self::Array(_) => Some(Kind::Array),
            Self::Sequence(_) => Some(Kind::Sequence),
            Self::Mapping(_) => Some(Kind::Mapping),
            Self::Reference(_) => Some(Kind::Reference),
            Self::Opaque { .. } => Some(Kind::Opaque),
            Self::Skipped => None,
        }
    }

    /// Short description used in mismatch errors.
    pub fn describe(&self) -> &'static str {
        self.kind().map_or("skipped field", Kind::as_str)
    }

    /// Field of a record or variant by name.
    pub fn field(&self, name: &str) -> Option<&Mirror> {
        match self {
            Self::Record(fields) | Self::Variant { fields, .. } => fields
                .iter()
                .find_map(|(field, mirror)| (*field == name).then_some(mirror)),
            _ => None,
        }
    }

    /// Number of nodes in the tree, this one included.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Record(fields) | Self::Variant { fields, .. } => {
                fields.iter().map(|(_, m)| m.node_count()).sum()
            }
            Self::Array(items) | Self::Sequence(items) => {
                items.iter().map(Mirror::node_count).sum()
            }
            Self::Mapping(entries) => entries
                .iter()
                .map(|(k, v)| k.node_count() + v.node_count())
                .sum(),
            Self::Reference(Some(inner)) => inner.node_count(),
            Self::Scalar(_) | Self::Reference(None) | Self::Opaque { .. } | Self::Skipped => 0,
        }
    }

    /// State equality.
    ///
    /// Unlike `==`, mapping entries compare as an unordered set, since hash
    /// maps do not keep iteration order across a rebuild.
    pub fn equivalent(&self, other: &Mirror) -> bool {
        match (self, other) {
            (Self::Record(a), Self::Record(b)) => fields_equivalent(a, b),
            (
                Self::Variant { name: a, fields: fa },
                Self::Variant { name: b, fields: fb },
            ) => a == b && fields_equivalent(fa, fb),
            (Self::Array(a), Self::Array(b)) | (Self::Sequence(a), Self::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Self::Mapping(a), Self::Mapping(b)) => {
                let mut unmatched: Vec<&(Mirror, Mirror)> = b.iter().collect();
                a.len() == b.len()
                    && a.iter().all(|(key, value)| {
                        let hit = unmatched
                            .iter()
                            .position(|(k, v)| key.equivalent(k) && value.equivalent(v));
                        hit.map(|i| unmatched.swap_remove(i)).is_some()
                    })
            }
            (Self::Reference(Some(a)), Self::Reference(Some(b))) => a.equivalent(b),
            _ => self == other,
        }
    }
}

fn fields_equivalent(a: &[(&'static str, Mirror)], b: &[(&'static str, Mirror)]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|((na, ma), (nb, mb))| na == nb && ma.equivalent(mb))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i128) -> Mirror {
        Mirror::Scalar(Scalar::Int(v))
    }

    #[test]
    fn nan_scalars_compare_equal() {
        let a = Scalar::Float(f64::NAN);
        assert_eq!(a, a.clone());
        assert_ne!(Scalar::Float(0.0), Scalar::Float(-0.0));
    }

    #[test]
    fn scalars_of_different_width_families_differ() {
        assert_ne!(Scalar::Int(1), Scalar::Uint(1));
    }

    #[test]
    fn field_lookup() {
        let record = Mirror::Record(vec![("port", int(8080)), ("name", Mirror::text("api"))]);
        assert_eq!(record.field("port"), Some(&int(8080)));
        assert_eq!(record.field("missing"), None);
        assert_eq!(int(1).field("port"), None);
    }

    #[test]
    fn node_count_covers_nested_shapes() {
        let mirror = Mirror::Record(vec![
            ("items", Mirror::Sequence(vec![int(1), int(2)])),
            (
                "lookup",
                Mirror::Mapping(vec![(Mirror::text("k"), int(3))]),
            ),
            ("next", Mirror::Reference(Some(Box::new(int(4))))),
            ("none", Mirror::Reference(None)),
        ]);
        // record + seq(2) + map(k, v) + ref(inner) + ref
        assert_eq!(mirror.node_count(), 1 + 3 + 3 + 2 + 1);
    }

    #[test]
    fn mapping_equivalence_ignores_order() {
        let a = Mirror::Mapping(vec![(Mirror::text("a"), int(1)), (Mirror::text("b"), int(2))]);
        let b = Mirror::Mapping(vec![(Mirror::text("b"), int(2)), (Mirror::text("a"), int(1))]);
        assert_ne!(a, b);
        assert!(a.equivalent(&b));

        let c = Mirror::Mapping(vec![(Mirror::text("a"), int(1)), (Mirror::text("b"), int(3))]);
        assert!(!a.equivalent(&c));
    }

    #[test]
    fn mapping_equivalence_counts_duplicates() {
        let a = Mirror::Mapping(vec![(int(1), int(1)), (int(1), int(1))]);
        let b = Mirror::Mapping(vec![(int(1), int(1)), (int(2), int(2))]);
        assert!(!a.equivalent(&b));
        assert!(!b.equivalent(&a));
    }

    #[test]
    fn sequence_equivalence_is_ordered() {
        let a = Mirror::Sequence(vec![int(1), int(2)]);
        let b = Mirror::Sequence(vec![int(2), int(1)]);
        assert!(!a.equivalent(&b));
    }

    #[test]
    fn kind_of_skipped_is_none() {
        assert_eq!(Mirror::Skipped.kind(), None);
        assert_eq!(Mirror::Skipped.describe(), "skipped field");
        assert_eq!(int(0).describe(), "scalar");
    }
}
