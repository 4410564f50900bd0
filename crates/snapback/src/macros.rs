/// Implement [`Restorable`](crate::Restorable) for structs and enums.
///
/// The macro takes the shape of each type, not its full definition: field
/// names for structs, field indices for tuple structs, and variants with
/// their field names (or binding names, for tuple variants) for enums.
/// Field types are inferred from the real definition.
///
/// ```
/// use snapback::restorable;
///
/// struct Config {
///     name: String,
///     ports: Vec<u16>,
///     cache: Vec<u8>,
/// }
///
/// struct Meters(f64);
///
/// enum Shape {
///     Empty,
///     Circle { radius: f64 },
///     Rect(f64, f64),
/// }
///
/// restorable! {
///     struct Config { name, ports, #[skip] cache }
///     struct Meters(0);
///     enum Shape { Empty, Circle { radius }, Rect(w, h) }
/// }
/// ```
///
/// Field attributes:
/// - `#[skip]`: the field is hidden from snapshots, per the
///   [`FieldPolicy`](crate::FieldPolicy) of the snapshot. Its type must be
///   `Default`; rebuilt values get the default.
/// - `#[opaque]`: the field is not copyable (closures, `Box<dyn Any>`, ...)
///   and is handled per the [`OpaquePolicy`](crate::OpaquePolicy).
///   Function pointers taking references, such as `fn(&str) -> usize`, have
///   no `Restorable` impl of their own and must be marked `#[opaque]`.
///
/// Attributes go in front of the field name, or the index for tuple structs:
/// `struct Handle(0, #[opaque] 1);`.
///
/// Type parameters are supported (`struct Pair<A, B> { left, right }`) and
/// are all bounded by `Restorable`.
#[macro_export]
macro_rules! restorable {
    (@capture $walk:ident, $value:expr) => {
        $crate::Restorable::capture($value, $walk)
    };
    (@capture $walk:ident, $value:expr, skip) => {
        $walk.hidden_field()
    };
    (@capture $walk:ident, $value:expr, opaque) => {
        $walk.opaque(::core::any::type_name_of_val($value))
    };
    (@capture $walk:ident, $value:expr, $other:ident) => {
        ::core::compile_error!(::core::concat!(
            "unknown field attribute `",
            ::core::stringify!($other),
            "`, expected `skip` or `opaque`"
        ))
    };

    (@rebuild $walk:ident, $fields:ident, $field:tt) => {{
        let mirror = $walk.field($fields, ::core::stringify!($field))?;
        $crate::Restorable::rebuild(mirror, $walk)
    }};
    (@rebuild $walk:ident, $fields:ident, $field:tt, skip) => {
        ::core::result::Result::Ok(::core::default::Default::default())
    };
    (@rebuild $walk:ident, $fields:ident, $field:tt, opaque) => {
        $walk.rebuild_opaque()
    };
    (@rebuild $walk:ident, $fields:ident, $field:tt, $other:ident) => {
        ::core::compile_error!("unknown field attribute")
    };

    (@restore $walk:ident, $fields:ident, $slot:expr, $field:tt) => {{
        let mirror = $walk.field($fields, ::core::stringify!($field))?;
        $crate::Restorable::restore($slot, mirror, $walk)
    }};
    // Hidden and opaque fields are left untouched.
    (@restore $walk:ident, $fields:ident, $slot:expr, $field:tt, $attr:ident) => {
        ::core::result::Result::Ok(())
    };

    // Tuple struct fields are normalized to `(attr?) index` pairs first.
    (@tuple $name:ident [$($generics:tt)*] [$($done:tt)*] #[$attr:ident] $index:tt $(, $($rest:tt)*)?) => {
        $crate::restorable!(@tuple $name [$($generics)*] [$($done)* ($attr) $index] $($($rest)*)?);
    };
    (@tuple $name:ident [$($generics:tt)*] [$($done:tt)*] $index:tt $(, $($rest:tt)*)?) => {
        $crate::restorable!(@tuple $name [$($generics)*] [$($done)* () $index] $($($rest)*)?);
    };
    (@tuple $name:ident [$(<$($param:ident),+>)?] [$(($($attr:ident)?) $index:tt)*]) => {
        #[allow(unused_variables)]
        impl$(<$($param: $crate::Restorable),+>)? $crate::Restorable for $name$(<$($param),+>)? {
            const KIND: $crate::Kind = $crate::Kind::Record;

            fn capture(
                &self,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<$crate::Mirror, $crate::SnapshotError> {
                ::core::result::Result::Ok($crate::Mirror::Record(::std::vec![$(
                    (
                        ::core::stringify!($index),
                        walk.enter($crate::Segment::Field(::core::stringify!($index)), |walk| {
                            $crate::restorable!(@capture walk, &self.$index $(, $attr)?)
                        })?,
                    ),
                )*]))
            }

            fn rebuild(
                mirror: &$crate::Mirror,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<Self, $crate::SnapshotError> {
                let fields = walk.record(mirror)?;
                ::core::result::Result::Ok(Self {$(
                    $index: walk.enter($crate::Segment::Field(::core::stringify!($index)), |walk| {
                        $crate::restorable!(@rebuild walk, fields, $index $(, $attr)?)
                    })?,
                )*})
            }

            fn restore(
                &mut self,
                mirror: &$crate::Mirror,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<(), $crate::SnapshotError> {
                let fields = walk.record(mirror)?;
                $(
                    walk.enter($crate::Segment::Field(::core::stringify!($index)), |walk| {
                        $crate::restorable!(@restore walk, fields, &mut self.$index, $index $(, $attr)?)
                    })?;
                )*
                ::core::result::Result::Ok(())
            }
        }
    };

    () => {};

    (
        struct $name:ident $(<$($param:ident),+ $(,)?>)? {
            $($(#[$attr:ident])? $field:ident),* $(,)?
        }
        $($rest:tt)*
    ) => {
        #[allow(unused_variables)]
        impl$(<$($param: $crate::Restorable),+>)? $crate::Restorable for $name$(<$($param),+>)? {
            const KIND: $crate::Kind = $crate::Kind::Record;

            fn capture(
                &self,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<$crate::Mirror, $crate::SnapshotError> {
                ::core::result::Result::Ok($crate::Mirror::Record(::std::vec![$(
                    (
                        ::core::stringify!($field),
                        walk.enter($crate::Segment::Field(::core::stringify!($field)), |walk| {
                            $crate::restorable!(@capture walk, &self.$field $(, $attr)?)
                        })?,
                    ),
                )*]))
            }

            fn rebuild(
                mirror: &$crate::Mirror,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<Self, $crate::SnapshotError> {
                let fields = walk.record(mirror)?;
                ::core::result::Result::Ok(Self {$(
                    $field: walk.enter($crate::Segment::Field(::core::stringify!($field)), |walk| {
                        $crate::restorable!(@rebuild walk, fields, $field $(, $attr)?)
                    })?,
                )*})
            }

            fn restore(
                &mut self,
                mirror: &$crate::Mirror,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<(), $crate::SnapshotError> {
                let fields = walk.record(mirror)?;
                $(
                    walk.enter($crate::Segment::Field(::core::stringify!($field)), |walk| {
                        $crate::restorable!(@restore walk, fields, &mut self.$field, $field $(, $attr)?)
                    })?;
                )*
                ::core::result::Result::Ok(())
            }
        }

        $crate::restorable!($($rest)*);
    };

    (
        struct $name:ident $(<$($param:ident),+ $(,)?>)? ($($fields:tt)*);
        $($rest:tt)*
    ) => {
        $crate::restorable!(@tuple $name [$(<$($param),+>)?] [] $($fields)*);
        $crate::restorable!($($rest)*);
    };

    (
        enum $name:ident $(<$($param:ident),+ $(,)?>)? {
            $(
                $variant:ident
                $({ $($(#[$fattr:ident])? $field:ident),* $(,)? })?
                $(( $($(#[$tattr:ident])? $bind:ident),* $(,)? ))?
            ),* $(,)?
        }
        $($rest:tt)*
    ) => {
        #[allow(unused_variables)]
        impl$(<$($param: $crate::Restorable),+>)? $crate::Restorable for $name$(<$($param),+>)? {
            const KIND: $crate::Kind = $crate::Kind::Variant;

            fn capture(
                &self,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<$crate::Mirror, $crate::SnapshotError> {
                match self {$(
                    Self::$variant $({ $($field),* })? $(( $($bind),* ))? => {
                        let fields = walk.enter($crate::Segment::Variant(::core::stringify!($variant)), |walk| {
                            ::core::result::Result::Ok(::std::vec![
                                $($((
                                    ::core::stringify!($field),
                                    walk.enter($crate::Segment::Field(::core::stringify!($field)), |walk| {
                                        $crate::restorable!(@capture walk, $field $(, $fattr)?)
                                    })?,
                                ),)*)?
                                $($((
                                    ::core::stringify!($bind),
                                    walk.enter($crate::Segment::Field(::core::stringify!($bind)), |walk| {
                                        $crate::restorable!(@capture walk, $bind $(, $tattr)?)
                                    })?,
                                ),)*)?
                            ])
                        })?;
                        ::core::result::Result::Ok($crate::Mirror::Variant {
                            name: ::core::stringify!($variant),
                            fields,
                        })
                    }
                )*}
            }

            fn rebuild(
                mirror: &$crate::Mirror,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<Self, $crate::SnapshotError> {
                let (name, fields) = match mirror {
                    $crate::Mirror::Variant { name, fields } => (*name, fields.as_slice()),
                    other => {
                        return ::core::result::Result::Err(
                            walk.mismatch($crate::Kind::Variant, other),
                        );
                    }
                };
                $(
                    if name == ::core::stringify!($variant) {
                        return walk.enter($crate::Segment::Variant(::core::stringify!($variant)), |walk| {
                            ::core::result::Result::Ok(Self::$variant
                                $({$(
                                    $field: walk.enter($crate::Segment::Field(::core::stringify!($field)), |walk| {
                                        $crate::restorable!(@rebuild walk, fields, $field $(, $fattr)?)
                                    })?,
                                )*})?
                                $(($(
                                    walk.enter($crate::Segment::Field(::core::stringify!($bind)), |walk| {
                                        $crate::restorable!(@rebuild walk, fields, $bind $(, $tattr)?)
                                    })?,
                                )*))?
                            )
                        });
                    }
                )*
                ::core::result::Result::Err(walk.invalid(
                    ::core::concat!("a variant of ", ::core::stringify!($name)),
                    ::std::format!("variant `{name}`"),
                ))
            }

            fn restore(
                &mut self,
                mirror: &$crate::Mirror,
                walk: &mut $crate::Walk<'_>,
            ) -> ::core::result::Result<(), $crate::SnapshotError> {
                // Same variant: restore its fields in place. Otherwise the
                // value is replaced by a rebuilt one.
                if let $crate::Mirror::Variant { name, fields } = mirror {
                    match self {
                        $(
                            Self::$variant $({ $($field),* })? $(( $($bind),* ))?
                                if *name == ::core::stringify!($variant) =>
                            {
                                return walk.enter($crate::Segment::Variant(::core::stringify!($variant)), |walk| {
                                    $($(
                                        walk.enter($crate::Segment::Field(::core::stringify!($field)), |walk| {
                                            $crate::restorable!(@restore walk, fields, $field, $field $(, $fattr)?)
                                        })?;
                                    )*)?
                                    $($(
                                        walk.enter($crate::Segment::Field(::core::stringify!($bind)), |walk| {
                                            $crate::restorable!(@restore walk, fields, $bind, $bind $(, $tattr)?)
                                        })?;
                                    )*)?
                                    ::core::result::Result::Ok(())
                                });
                            }
                        )*
                        _ => {}
                    }
                }
                *self = <Self as $crate::Restorable>::rebuild(mirror, walk)?;
                ::core::result::Result::Ok(())
            }
        }

        $crate::restorable!($($rest)*);
    };
}
