//! Scalars: captured by value, restored by direct overwrite.

use crate::restorable::Restorable;
use crate::walk::Walk;
use snapback_common::{Kind, Mirror, Scalar, SnapshotError};

fn unexpected(walk: &Walk<'_>, expected: &'static str, mirror: &Mirror) -> SnapshotError {
    match mirror {
        Mirror::Scalar(scalar) => walk.invalid(expected, format!("{scalar:?}")),
        other => walk.mismatch(Kind::Scalar, other),
    }
}

macro_rules! integer_scalars {
    ($variant:ident as $wide:ty: $($ty:ty),* $(,)?) => {$(
        impl Restorable for $ty {
            const KIND: Kind = Kind::Scalar;

            fn capture(&self, _walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
                Ok(Mirror::Scalar(Scalar::$variant(*self as $wide)))
            }

            fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
                match mirror {
                    Mirror::Scalar(Scalar::$variant(value)) => <$ty>::try_from(*value)
                        .map_err(|_| walk.invalid(stringify!($ty), value.to_string())),
                    other => Err(unexpected(walk, stringify!($ty), other)),
                }
            }
        }
    )*};
}

integer_scalars!(Int as i128: i8, i16, i32, i64, i128, isize);
integer_scalars!(Uint as u128: u8, u16, u32, u64, u128, usize);

macro_rules! float_scalars {
    ($($ty:ty),* $(,)?) => {$(
        impl Restorable for $ty {
            const KIND: Kind = Kind::Scalar;

            fn capture(&self, _walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
                Ok(Mirror::Scalar(Scalar::Float(f64::from(*self))))
            }

            fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
                match mirror {
                    // Exact: every value of the narrower type went through f64 on capture.
                    Mirror::Scalar(Scalar::Float(value)) => Ok(*value as $ty),
                    other => Err(unexpected(walk, stringify!($ty), other)),
                }
            }
        }
    )*};
}

float_scalars!(f32, f64);

impl Restorable for bool {
    const KIND: Kind = Kind::Scalar;

    fn capture(&self, _walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        Ok(Mirror::Scalar(Scalar::Bool(*self)))
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        match mirror {
            Mirror::Scalar(Scalar::Bool(value)) => Ok(*value),
            other => Err(unexpected(walk, "bool", other)),
        }
    }
}

impl Restorable for char {
    const KIND: Kind = Kind::Scalar;

    fn capture(&self, _walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        Ok(Mirror::Scalar(Scalar::Char(*self)))
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        match mirror {
            Mirror::Scalar(Scalar::Char(value)) => Ok(*value),
            other => Err(unexpected(walk, "char", other)),
        }
    }
}

impl Restorable for () {
    const KIND: Kind = Kind::Scalar;

    fn capture(&self, _walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        Ok(Mirror::Scalar(Scalar::Unit))
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        match mirror {
            Mirror::Scalar(Scalar::Unit) => Ok(()),
            other => Err(unexpected(walk, "()", other)),
        }
    }
}

impl Restorable for String {
    const KIND: Kind = Kind::Scalar;

    fn capture(&self, _walk: &mut Walk<'_>) -> Result<Mirror, SnapshotError> {
        Ok(Mirror::Scalar(Scalar::Text(self.clone())))
    }

    fn rebuild(mirror: &Mirror, walk: &mut Walk<'_>) -> Result<Self, SnapshotError> {
        match mirror {
            Mirror::Scalar(Scalar::Text(value)) => Ok(value.clone()),
            other => Err(unexpected(walk, "String", other)),
        }
    }

    fn restore(&mut self, mirror: &Mirror, walk: &mut Walk<'_>) -> Result<(), SnapshotError> {
        match mirror {
            Mirror::Scalar(Scalar::Text(value)) => {
                self.clear();
                self.push_str(value);
                Ok(())
            }
            other => Err(unexpected(walk, "String", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{capture, rebuild, restore};
    use snapback_common::{Mirror, Scalar, SnapshotError};

    #[test]
    fn integers_widen_and_narrow() {
        assert_eq!(capture(&-5i8), Mirror::Scalar(Scalar::Int(-5)));
        assert_eq!(capture(&7usize), Mirror::Scalar(Scalar::Uint(7)));
        assert_eq!(rebuild::<i8>(&capture(&i8::MIN)).unwrap(), i8::MIN);
        assert_eq!(rebuild::<u64>(&capture(&u64::MAX)).unwrap(), u64::MAX);
        assert_eq!(rebuild::<i128>(&capture(&i128::MIN)).unwrap(), i128::MIN);
    }

    #[test]
    fn out_of_range_integer_is_a_mismatch() {
        let err = rebuild::<u8>(&Mirror::Scalar(Scalar::Uint(300))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch at $: expected u8, found 300"
        );
    }

    #[test]
    fn signedness_is_part_of_the_shape() {
        let err = rebuild::<u32>(&Mirror::Scalar(Scalar::Int(1))).unwrap_err();
        assert!(matches!(err, SnapshotError::ShapeMismatch { .. }));
    }

    #[test]
    fn floats_keep_their_bits() {
        let value = 0.1f32;
        assert_eq!(rebuild::<f32>(&capture(&value)).unwrap().to_bits(), value.to_bits());
        assert!(rebuild::<f64>(&capture(&f64::NAN)).unwrap().is_nan());
        assert_eq!(rebuild::<f64>(&capture(&-0.0f64)).unwrap().to_bits(), (-0.0f64).to_bits());
    }

    #[test]
    fn string_restore_overwrites_in_place() {
        let mut value = String::from("updated value");
        let mirror = capture(&String::from("original value"));
        restore(&mut value, &mirror).unwrap();
        assert_eq!(value, "original value");
    }

    #[test]
    fn other_scalars() {
        let mut flag = false;
        restore(&mut flag, &capture(&true)).unwrap();
        assert!(flag);

        let mut letter = 'a';
        restore(&mut letter, &capture(&'λ')).unwrap();
        assert_eq!(letter, 'λ');

        rebuild::<()>(&capture(&())).unwrap();
    }

    #[test]
    fn non_scalar_mirror_is_rejected() {
        let err = rebuild::<bool>(&Mirror::Sequence(vec![])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch at $: expected scalar, found sequence"
        );
    }
}
