use std::fmt;

/// One step from a value into one of its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named (or positional, `"0"`) field of a record or variant.
    Field(&'static str),
    /// The active variant of an enum.
    Variant(&'static str),
    /// An element of an array or sequence.
    Index(usize),
    /// The key of the n-th mapping entry, in capture order.
    Key(usize),
    /// The value of the n-th mapping entry, in capture order.
    Entry(usize),
    /// The pointee of a reference.
    Deref,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{name}"),
            Self::Variant(name) => write!(f, "::{name}"),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(entry) => write!(f, "{{key {entry}}}"),
            Self::Entry(entry) => write!(f, "{{{entry}}}"),
            Self::Deref => f.write_str(".*"),
        }
    }
}

/// Location of a value inside a snapshot target, starting at the root (`$`).
///
/// Rendered as `$.servers[2].tls.*` and similar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root of a target.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// A new path one segment deeper.
    pub fn join(&self, segment: Segment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
