//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure of the `pl` binary
//! using the `clap` crate.

use clap::{Parser, Subcommand};

/// Command-line arguments for the `pl` tool.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use promptline_cli::cli_args::{Args, Command};
///
/// let args = Args::parse_from(["pl", "say", "Hello {1}", "world"]);
/// assert!(matches!(args.command, Command::Say { .. }));
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    /// Path to the color scheme YAML file.
    ///
    /// If not provided, defaults to `~/.promptline/colors.yml`. A missing file
    /// leaves only the built-in effects available.
    #[arg(long, short = 'c', global = true)]
    pub color_scheme: Option<String>,

    /// Leave escape codes out of all output.
    #[arg(long, short = 'n', global = true, action)]
    pub no_colors: bool,

    /// Wrap output at this many columns instead of the terminal width.
    #[arg(long, short = 'w', global = true)]
    pub wrap_at: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Format a template and print it.
    ///
    /// The color palette is `{0}` (or `{colors}`), so positional values start at `{1}`.
    ///
    /// # Examples
    /// ```bash
    /// pl say '{0.bold:{1}} has {count} messages' Fred -p count=3
    /// ```
    Say {
        template: String,

        /// Named values in the format key=value.
        #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
        parameters: Vec<String>,

        /// Positional values for the template.
        #[arg(trailing_var_arg = true)]
        arguments: Vec<String>,
    },

    /// Compile a template and print its structure as YAML.
    Compile { template: String },

    /// Ask a question and print the answer.
    Ask {
        prompt: String,

        /// Answer used when the reply is empty.
        #[arg(long, short = 'd')]
        default: Option<String>,

        /// Restrict the answer to these choices; abbreviations are completed.
        #[arg(long = "choice", action = clap::ArgAction::Append)]
        choices: Vec<String>,

        /// Require an integer answer.
        #[arg(long, short = 'i', action, conflicts_with = "choices")]
        integer: bool,
    },

    /// Ask a yes or no question. Exits with failure on "no".
    Agree {
        prompt: String,

        /// Answer with a single key instead of a line.
        #[arg(long, action)]
        character: bool,
    },

    /// Show a menu and print the chosen item.
    Choose {
        #[arg(required = true)]
        items: Vec<String>,

        /// Text shown above the menu.
        #[arg(long)]
        header: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["pl", "compile", "{0}"]);

        assert!(args.color_scheme.is_none());
        assert!(!args.no_colors);
        assert!(args.wrap_at.is_none());
        assert_eq!(
            args.command,
            Command::Compile {
                template: "{0}".to_string()
            }
        );
    }

    #[test]
    fn test_args_global_flags_after_subcommand() {
        let args = Args::parse_from([
            "pl",
            "say",
            "hi",
            "--no-colors",
            "-c",
            "/custom/colors.yml",
            "--wrap-at",
            "40",
        ]);

        assert!(args.no_colors);
        assert_eq!(args.color_scheme, Some("/custom/colors.yml".to_string()));
        assert_eq!(args.wrap_at, Some(40));
    }

    #[test]
    fn test_say_parameters_and_arguments() {
        let args = Args::parse_from([
            "pl", "say", "-p", "count=3", "--param", "x=y", "{1} {count}", "Fred", "Barney",
        ]);

        assert_eq!(
            args.command,
            Command::Say {
                template: "{1} {count}".to_string(),
                parameters: vec!["count=3".to_string(), "x=y".to_string()],
                arguments: vec!["Fred".to_string(), "Barney".to_string()],
            }
        );
    }

    #[test]
    fn test_ask_options() {
        let args = Args::parse_from([
            "pl", "ask", "Color? ", "--choice", "red", "--choice", "blue", "-d", "red",
        ]);

        assert_eq!(
            args.command,
            Command::Ask {
                prompt: "Color? ".to_string(),
                default: Some("red".to_string()),
                choices: vec!["red".to_string(), "blue".to_string()],
                integer: false,
            }
        );
    }

    #[test]
    fn test_ask_integer_conflicts_with_choices() {
        let result = Args::try_parse_from(["pl", "ask", "N? ", "--integer", "--choice", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_choose_requires_items() {
        assert!(Args::try_parse_from(["pl", "choose"]).is_err());

        let args = Args::parse_from(["pl", "choose", "a", "b", "--header", "Pick"]);
        assert_eq!(
            args.command,
            Command::Choose {
                items: vec!["a".to_string(), "b".to_string()],
                header: Some("Pick".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Args::try_parse_from(["pl"]).is_err());
    }
}
