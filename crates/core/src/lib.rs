//! Promptline Core Library
//!
//! This crate provides the core functionality for promptline, a toolkit for
//! talking to the user over the console: formatting output, colorizing it, and
//! converting and validating the answers the user types.
//!
//! # Key Features
//!
//! - **String Formatting**: A compile-once, render-many engine for curly-brace templates
//! - **Color Effects**: Terminal effects addressable from templates, with YAML color schemes
//! - **Answers**: Typed conversion and validation of user input, with prefix completion
//! - **List Display**: Rows, inline sentences and column layouts
//! - **Error Handling**: Error types for every failure mode
//!
//! # Examples
//!
//! Formatting with a palette:
//!
//! ```
//! use promptline_core::colors::Effects;
//! use promptline_core::strformat::{fmt, Args};
//!
//! let args = Args::new().arg(Effects::plain()).kwarg("name", "Fred");
//! let text = fmt("Hello {0.bold:{name}}!", &args)?;
//! assert_eq!(text, "Hello \x1b[1mFred\x1b[0m!");
//! # Ok::<(), promptline_core::error::Error>(())
//! ```

pub mod answers;
pub mod colors;
pub mod config;
pub mod error;
pub mod file_handling;
pub mod listdisplay;
pub mod strformat;
pub mod text;
pub mod trie;
