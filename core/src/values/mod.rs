//! Runtime values, entity names and the flat variable store.

mod name;
mod store;
mod value;

pub use name::{IndexKey, Interner, Name, Symbol};
pub use store::Store;
pub use value::{Label, TypeMask, Value, ValueType};

use ecow::EcoString;

/// Locale-invariant float formatting shared by display, casts and index keys.
///
/// Whole numbers print without a fractional part (`2.0` prints as `2`).
pub fn format_float(value: f64) -> EcoString {
    ecow::eco_format!("{}", value)
}

#[cfg(test)]
mod display_test;
