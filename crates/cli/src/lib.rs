//! Promptline CLI Library
//!
//! This crate provides the interactive side of promptline: a [`console::Console`] that says
//! formatted, colorized text and asks questions whose answers are converted and validated by
//! the core crate's answer types.
//!
//! # Key Features
//!
//! - **Formatted Output**: Every message is a template with the color palette as `{0}`,
//!   wrapped to the terminal width and paged when it runs long
//! - **Questions**: Defaults, confirmation, masked input, length limits, single key replies
//! - **Menus**: Numbered or lettered choices, prefix completion, help topics and shell loops
//! - **Gathering**: The same question asked a number of times, until a sentinel, or per key
//!
//! # Architecture
//!
//! - [`console`]: The console and its output and question loops
//! - [`input`]: Where replies are read from, terminal or in-memory
//! - [`question`], [`menu`], [`gather`]: What can be asked
//! - [`cli_args`], [`arguments`]: The `pl` binary's command line
//!
//! # Examples
//!
//! Driving a console from in-memory input:
//!
//! ```
//! use promptline_cli::console::Console;
//! use promptline_cli::input::ReaderInput;
//! use promptline_cli::question::Question;
//! use promptline_core::answers::Int;
//!
//! let mut console = Console::new(ReaderInput::from_text("abc\n42\n"), Vec::new()).colors(false);
//! let age = console.ask(&mut Question::new("Age?  ", Int::new()))?;
//! assert_eq!(age, 42);
//! assert_eq!(
//!     String::from_utf8(console.into_output()).unwrap(),
//!     "Age?  You must enter a valid integer\n? "
//! );
//! # Ok::<(), promptline_core::error::Error>(())
//! ```
//!
//! The `pl` binary exposes the same pieces from the shell:
//!
//! ```bash
//! pl say '{0.bold:{1}} has {count} new messages' Fred -p count=3
//! pl ask 'Favorite color? ' --choice red --choice green --default red
//! pl choose apples oranges pears --header 'Pick a fruit'
//! pl compile '{name:>{width}}'
//! ```

pub mod arguments;
pub mod cli_args;
pub mod console;
pub mod gather;
pub mod input;
pub mod menu;
pub mod question;
