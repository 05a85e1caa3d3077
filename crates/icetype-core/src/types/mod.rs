//! Static type registry for the field language.
//!
//! Pure lookup tables: primitive, parametric, and generic type names,
//! case-insensitive aliases, and the per-dialect SQL type mapping hook.

mod registry;

pub use registry::{
    classify, dialect_type, lookup, resolve_alias, TypeClass, GENERIC_TYPES, PARAMETRIC_TYPES,
    PRIMITIVE_TYPES, TYPE_ALIASES,
};
