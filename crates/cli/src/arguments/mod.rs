//! Turning command-line values into template arguments.
//!
//! Values can be provided in two ways, and both may be used together:
//! - **Positional values**: trailing arguments, available to templates from `{1}` on
//!   (`{0}` is always the color palette)
//! - **Named values**: `-p key=value` flags, available as `{key}`
//!
//! Values that parse as integers or floats are passed as numbers, so format specs like
//! `{1:>8.2f}` work on them.

pub mod processing;

pub use processing::{build_args, parse_value};
