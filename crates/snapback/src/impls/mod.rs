//! `Restorable` for std types.

mod collections;
mod opaque;
mod reference;
mod scalar;
