//! A mini string-formatting engine for curly-brace templates.
//!
//! Templates are compiled once into a [`Template`] tree and rendered against [`Args`] any number
//! of times. Fields can name positional or keyword arguments, reach into them with `.attribute`
//! and `[key]` accessors, apply a `!s` or `!r` conversion, and carry a format spec that may
//! itself contain fields:
//!
//! ```
//! use promptline_core::strformat::{compile, Args};
//!
//! let template = compile("{name:>{width}}|{0!r}")?;
//! let args = Args::new().arg("x").kwarg("name", "Fred").kwarg("width", 6);
//! assert_eq!(template.render(&args)?, "  Fred|\"x\"");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Values that are not built in take part through the [`Object`] trait, and can interpret their
//! own format spec by exposing [`Formattable`].

mod ast;
mod error;
mod parser;
mod render;
mod spec;
mod value;

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use log::debug;

pub use ast::{Accessor, Conversion, Field, FieldPath, FieldRoot, IndexKey, Segment, Template};
pub use error::{NumberingMode, ParseError, RenderError};
pub use parser::{compile, MAX_NESTING_DEPTH};
pub use spec::{format_text, format_value, Align, Sign, StandardSpec};
pub use value::{Args, Formattable, Object, Value};

static TEMPLATE_CACHE: OnceLock<DashMap<String, Arc<Template>>> = OnceLock::new();

/// Compiles `text`, reusing an earlier compile of the same text when there is one.
///
/// The cache is process-wide and is never evicted: every distinct template text stays in memory
/// for the life of the process. Callers formatting many one-off templates, such as text read
/// from users, should call [`compile`] and keep or drop the result themselves.
pub fn compile_cached(text: &str) -> Result<Arc<Template>, ParseError> {
    let cache = TEMPLATE_CACHE.get_or_init(DashMap::new);
    if let Some(template) = cache.get(text) {
        return Ok(Arc::clone(template.value()));
    }

    debug!("Compiling format string {:?}", text);
    let template = Arc::new(compile(text)?);
    cache.insert(text.to_string(), Arc::clone(&template));
    Ok(template)
}

/// Compiles (memoized) and renders in one step.
pub fn fmt(text: &str, args: &Args) -> crate::error::Result<String> {
    let template = compile_cached(text)?;
    Ok(template.render(args)?)
}
