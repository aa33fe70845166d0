//! Configuration path utilities and console defaults.
//!
//! This module provides the color scheme path resolution and the defaults the
//! console falls back to when it is not attached to a terminal.

/// Default path for the color scheme file
const DEFAULT_COLOR_SCHEME_PATH: &str = "~/.promptline/colors.yml";

/// Dimensions assumed when output is not attached to a terminal
pub const DEFAULT_COLUMNS: u16 = 80;
pub const DEFAULT_ROWS: u16 = 24;

/// Prompt shown between pages of long output
pub const PAGE_PROMPT: &str = "-- press enter/return to continue or q to stop -- ";

/// Resolves the color scheme file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// color scheme path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use promptline_core::config::get_color_scheme_path;
///
/// // Use default path
/// let default_path = get_color_scheme_path(&None);
///
/// // Use custom path
/// let custom_path = get_color_scheme_path(&Some("/path/to/colors.yml".to_string()));
/// assert_eq!(custom_path, "/path/to/colors.yml");
/// ```
pub fn get_color_scheme_path(color_scheme_path_arg: &Option<String>) -> String {
    let color_scheme_path = match color_scheme_path_arg {
        Some(color_scheme_path) => color_scheme_path,
        None => DEFAULT_COLOR_SCHEME_PATH,
    };

    shellexpand::tilde(color_scheme_path).to_string()
}
