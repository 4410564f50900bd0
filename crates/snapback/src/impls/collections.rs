//! Arrays, sequences, mappings, sets and tuples.
//!
//! Sequences and mappings are restored to exactly the captured length and
//! key set. Live elements that survive are restored in place; missing ones
//! are rebuilt from the mirror.

use crate::restorable::Restorable;
use crate::walk::Walk;
use snapback_common::{Kind, Mirror, Segment, SnapshotError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::{BuildHasher, Hash};

fn capture_items<'a, T: Restorable + 'a>(
    items: impl Iterator<Item = &'a T>,
    walk: &mut Walk<'_>,
) -> Result<Vec<Mirror>, SnapshotError> {
    items
        .enumerate()
        .map(|(index, item)| walk.enter(Segment::Index(index), |walk| item.capture(walk)))
        .collect()
}

/// Rebuild `items`, numbering them from `offset`.
fn rebuild_items<T: Restorable>(
    items: &[Mirror],
    offset: usize,
    walk: &mut Walk<'_>,
) -> Result<Vec<T>, SnapshotError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| walk.enter(Segment::Index(offset + index), |walk| T::rebuild(item, walk)))
        .collect()
}

fn restore_items<'a, T: Restorable + 'a>(
    slots: impl Iterator<Item = &'a mut T>,
    items: &[Mirror],
    walk: &mut Walk<'_>,
) -> Result<(), SnapshotError> {
    for (index, (slot, item)) in slots.zip(items).enumerate() {
        walk.enter(Segment::Index(index), |walk| slot.restore(item, walk))?;
    }
    Ok(())
}

impl<T: Restorable, const N: usize> Restorable for [T; N] {
    const KIND: Kind = Kind::Array;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_items(self.iter(), walk).map(Mirror::Array)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let items = walk.items(Kind::Array, mirror)?;
        if items.len() != N {
            return Err(walk.invalid(format!("{N} elements"), format!("{} elements", items.len())));
        }
        let rebuilt = rebuild_items::<T>(items, 0, walk)?;
        rebuilt
            .try_into()
            .map_err(|_: Vec<T>| walk.invalid(format!("{N} elements"), "a different count"))
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        let items = walk.items(Kind::Array, mirror)?;
        if items.len() != N {
            return Err(walk.invalid(format!("{N} elements"), format!("{} elements", items.len())));
        }
        restore_items(self.iter_mut(), items, walk)
    }
}

impl<T: Restorable> Restorable for Vec<T> {
    const KIND: Kind = Kind::Sequence;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_items(self.iter(), walk).map(Mirror::Sequence)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let items = walk.items(Kind::Sequence, mirror)?;
        rebuild_items(items, 0, walk)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        let items = walk.items(Kind::Sequence, mirror)?;
        let kept = self.len().min(items.len());
        // Rebuild the missing tail before touching the live sequence.
        let tail = rebuild_items::<T>(&items[kept..], kept, walk)?;
        restore_items(self.iter_mut(), items, walk)?;
        self.truncate(items.len());
        self.extend(tail);
        Ok(())
    }
}

impl<T: Restorable> Restorable for VecDeque<T> {
    const KIND: Kind = Kind::Sequence;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_items(self.iter(), walk).map(Mirror::Sequence)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let items = walk.items(Kind::Sequence, mirror)?;
        rebuild_items::<T>(items, 0, walk).map(VecDeque::from)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        let items = walk.items(Kind::Sequence, mirror)?;
        let kept = self.len().min(items.len());
        let tail = rebuild_items::<T>(&items[kept..], kept, walk)?;
        restore_items(self.iter_mut(), items, walk)?;
        self.truncate(items.len());
        self.extend(tail);
        Ok(())
    }
}

fn capture_entries<'a, K, V>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    walk: &mut Walk<'_>,
) -> Result<Mirror, SnapshotError>
where
    K: Restorable + 'a,
    V: Restorable + 'a,
{
    entries
        .enumerate()
        .map(|(entry, (key, value))| {
            let key = walk.enter(Segment::Key(entry), |walk| key.capture(walk))?;
            let value = walk.enter(Segment::Entry(entry), |walk| value.capture(walk))?;
            Ok((key, value))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Mirror::Mapping)
}

fn rebuild_keys<K: Restorable>(
    entries: &[(Mirror, Mirror)],
    walk: &mut Walk<'_>,
) -> Result<Vec<K>, SnapshotError> {
    entries
        .iter()
        .enumerate()
        .map(|(entry, (key, _))| walk.enter(Segment::Key(entry), |walk| K::rebuild(key, walk)))
        .collect()
}

/// Shared revert of `HashMap` and `BTreeMap`.
///
/// Keys are rebuilt up front, so a key that cannot be rebuilt fails the
/// revert before the live map is touched.
macro_rules! restore_mapping {
    ($map:expr, $mirror:expr, $walk:expr, $keep:ty) => {{
        let (map, walk) = ($map, $walk);
        let entries = walk.entries($mirror)?;
        let keys = rebuild_keys::<K>(entries, walk)?;
        {
            let keep: $keep = keys.iter().collect();
            map.retain(|key, _| keep.contains(key));
        }
        for (entry, (key, (_, value))) in keys.into_iter().zip(entries).enumerate() {
            walk.enter(Segment::Entry(entry), |walk| match map.get_mut(&key) {
                Some(live) => live.restore(value, walk),
                None => {
                    map.insert(key, V::rebuild(value, walk)?);
                    Ok(())
                }
            })?;
        }
        Ok(())
    }};
}

impl<K, V, S> Restorable for HashMap<K, V, S>
where
    K: Restorable + Eq + Hash,
    V: Restorable,
    S: BuildHasher + Default,
{
    const KIND: Kind = Kind::Mapping;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_entries(self.iter(), walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let entries = walk.entries(mirror)?;
        let keys = rebuild_keys::<K>(entries, walk)?;
        let mut map = HashMap::with_capacity_and_hasher(entries.len(), S::default());
        for (entry, (key, (_, value))) in keys.into_iter().zip(entries).enumerate() {
            let value = walk.enter(Segment::Entry(entry), |walk| V::rebuild(value, walk))?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        restore_mapping!(self, mirror, walk, HashSet<&K>)
    }
}

impl<K, V> Restorable for BTreeMap<K, V>
where
    K: Restorable + Ord,
    V: Restorable,
{
    const KIND: Kind = Kind::Mapping;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_entries(self.iter(), walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let entries = walk.entries(mirror)?;
        let keys = rebuild_keys::<K>(entries, walk)?;
        let mut map = BTreeMap::new();
        for (entry, (key, (_, value))) in keys.into_iter().zip(entries).enumerate() {
            let value = walk.enter(Segment::Entry(entry), |walk| V::rebuild(value, walk))?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        restore_mapping!(self, mirror, walk, BTreeSet<&K>)
    }
}

// Sets are mappings with unit values. Members are keys, so they cannot be
// restored in place; revert rebuilds the whole set.

impl<K, S> Restorable for HashSet<K, S>
where
    K: Restorable + Eq + Hash,
    S: BuildHasher + Default,
{
    const KIND: Kind = Kind::Mapping;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_entries(self.iter().map(|key| (key, &())), walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let entries = walk.entries(mirror)?;
        let mut set = HashSet::with_capacity_and_hasher(entries.len(), S::default());
        set.extend(rebuild_keys::<K>(entries, walk)?);
        Ok(set)
    }
}

impl<K> Restorable for BTreeSet<K>
where
    K: Restorable + Ord,
{
    const KIND: Kind = Kind::Mapping;

    fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        capture_entries(self.iter().map(|key| (key, &())), walk)
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        let entries = walk.entries(mirror)?;
        Ok(rebuild_keys::<K>(entries, walk)?.into_iter().collect())
    }
}

macro_rules! tuples {
    ($(($($index:tt $ty:ident),+))+) => {$(
        impl<$($ty: Restorable),+> Restorable for ($($ty,)+) {
            const KIND: Kind = Kind::Record;

            fn capture(&self, walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
                Ok(Mirror::Record(vec![$(
                    (
                        stringify!($index),
                        walk.enter(Segment::Field(stringify!($index)), |walk| self.$index.capture(walk))?,
                    ),
                )+]))
            }

            fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
                let fields = walk.record(mirror)?;
                Ok(($(
                    walk.enter(Segment::Field(stringify!($index)), |walk| {
                        let field = walk.field(fields, stringify!($index))?;
                        $ty::rebuild(field, walk)
                    })?,
                )+))
            }

            fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
                let fields = walk.record(mirror)?;
                $(
                    walk.enter(Segment::Field(stringify!($index)), |walk| {
                        let field = walk.field(fields, stringify!($index))?;
                        self.$index.restore(field, walk)
                    })?;
                )+
                Ok(())
            }
        }
    )+};
}

tuples! {
    (0 A)
    (0 A, 1 B)
    (0 A, 1 B, 2 C)
    (0 A, 1 B, 2 C, 3 D)
    (0 A, 1 B, 2 C, 3 D, 4 E)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F)
}

#[cfg(test)]
mod tests {
    use crate::testing::{capture, rebuild, restore};
    use snapback_common::{Mirror, SnapshotError};
    use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

    #[test]
    fn vec_shortened_is_regrown() {
        let original = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mirror = capture(&original);
        let mut live = vec!["x".to_string()];
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, original);
    }

    #[test]
    fn vec_lengthened_is_truncated() {
        let mirror = capture(&vec![1u8, 2]);
        let mut live = vec![9u8, 9, 9, 9];
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, [1, 2]);
    }

    #[test]
    fn vec_emptied_and_refilled() {
        let mirror = capture(&Vec::<i32>::new());
        let mut live = vec![1, 2, 3];
        restore(&mut live, &mirror).unwrap();
        assert!(live.is_empty());
    }

    #[test]
    fn nested_vec_rebuild() {
        let original = vec![vec![1u16], vec![], vec![2, 3]];
        assert_eq!(rebuild::<Vec<Vec<u16>>>(&capture(&original)).unwrap(), original);
    }

    #[test]
    fn deque_restores_order_and_length() {
        let original: VecDeque<i64> = [3, 1, 2].into_iter().collect();
        let mirror = capture(&original);
        let mut live = original.clone();
        live.pop_front();
        live.push_back(99);
        live.push_back(100);
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, original);
    }

    #[test]
    fn array_restores_per_index() {
        let mirror = capture(&[true, false, true]);
        let mut live = [false; 3];
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, [true, false, true]);
    }

    #[test]
    fn array_length_mismatch() {
        let mirror = capture(&[1u8, 2]);
        let err = rebuild::<[u8; 3]>(&mirror).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch at $: expected 3 elements, found 2 elements"
        );
    }

    #[test]
    fn hashmap_keys_added_and_removed() {
        let original: HashMap<String, String> = [("a", "1"), ("b", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mirror = capture(&original);

        let mut live = original.clone();
        live.remove("a");
        live.insert("b".into(), "changed".into());
        live.insert("c".into(), "3".into());

        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, original);
    }

    #[test]
    fn btreemap_restore_and_rebuild() {
        let original: BTreeMap<u32, Vec<char>> = [(1, vec!['a']), (2, vec![])].into_iter().collect();
        let mirror = capture(&original);
        let mut live: BTreeMap<u32, Vec<char>> = BTreeMap::new();
        live.insert(3, vec!['z']);
        live.insert(1, vec!['q', 'r']);
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, original);
        assert_eq!(rebuild::<BTreeMap<u32, Vec<char>>>(&mirror).unwrap(), original);
    }

    #[test]
    fn sets_are_rebuilt() {
        let original: HashSet<i32> = [1, 2, 3].into_iter().collect();
        let mirror = capture(&original);
        let mut live: HashSet<i32> = [3, 4].into_iter().collect();
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, original);

        let ordered: BTreeSet<String> = ["x".to_string()].into_iter().collect();
        let mut live: BTreeSet<String> = BTreeSet::new();
        restore(&mut live, &capture(&ordered)).unwrap();
        assert_eq!(live, ordered);
    }

    #[test]
    fn tuples_are_records() {
        let original = (1u8, "two".to_string(), [3i32; 2]);
        let mirror = capture(&original);
        assert_eq!(mirror.field("1"), Some(&Mirror::text("two")));
        let mut live = (0u8, String::new(), [0i32; 2]);
        restore(&mut live, &mirror).unwrap();
        assert_eq!(live, original);
    }

    #[test]
    fn error_path_points_into_the_collection() {
        let mirror = Mirror::Sequence(vec![Mirror::text("not a number")]);
        let err = rebuild::<Vec<u8>>(&mirror).unwrap_err();
        assert!(matches!(err, SnapshotError::ShapeMismatch { .. }));
        assert_eq!(err.path().to_string(), "$[0]");
    }

    #[test]
    fn failed_key_rebuild_leaves_map_untouched() {
        let mirror = Mirror::Mapping(vec![(Mirror::text("k"), Mirror::text("v"))]);
        let mut live: HashMap<u8, String> = [(1, "one".to_string())].into_iter().collect();
        let err = restore(&mut live, &mirror).unwrap_err();
        assert_eq!(err.path().to_string(), "${key 0}");
        assert_eq!(live.len(), 1);
        assert_eq!(live[&1], "one");
    }
}
