//! Reading color schemes from disk.

use std::fs::File;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};

use crate::colors::{ColorScheme, SchemeEntry};
use crate::error::{Error, Result};

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

/// Loads a color scheme from a YAML file mapping alias names to effects.
///
/// Each entry is a space separated string of effect names, a list of effect
/// names, or a mapping with `foreground`, `background` and `effects` keys.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is malformed or doesn't match the expected structure
/// - An entry names an unknown effect or an invalid color
///
/// # Examples
///
/// ```no_run
/// use promptline_core::file_handling::get_color_scheme;
///
/// let scheme = get_color_scheme("/home/me/.promptline/colors.yml")?;
/// # Ok::<(), promptline_core::error::Error>(())
/// ```
pub fn get_color_scheme(color_scheme_path: &str) -> Result<ColorScheme> {
    let reader = get_reader("color scheme", color_scheme_path)?;

    let entries: IndexMap<String, SchemeEntry> =
        serde_yaml::from_reader(reader).map_err(|e| {
            Error::yaml_error(
                "reading".to_string(),
                "color scheme".to_string(),
                color_scheme_path.to_string(),
                e,
            )
        })?;

    debug!(
        "Read {} color alias(es) from {}",
        entries.len(),
        color_scheme_path
    );
    ColorScheme::from_entries(entries)
}

/// Like [`get_color_scheme`], but a missing file yields the empty scheme.
pub fn get_optional_color_scheme(color_scheme_path: &str) -> Result<ColorScheme> {
    if !Path::exists(Path::new(color_scheme_path)) {
        info!(
            "No color scheme at {}, using built-in effects",
            color_scheme_path
        );
        return Ok(ColorScheme::new());
    }

    get_color_scheme(color_scheme_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn scheme_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_get_color_scheme_valid_yaml() {
        let temp_file = scheme_file(
            r#"
warning: "yellow on_black"
title: [bold, underline]
"#,
        );
        let temp_path = temp_file.path().to_str().unwrap();

        let scheme = get_color_scheme(temp_path).unwrap();
        assert_eq!(scheme.lookup("warning").unwrap().len(), 2);
        assert_eq!(scheme.lookup("title").unwrap().len(), 2);
        assert_eq!(scheme.lookup("red").unwrap().len(), 1);
    }

    #[test]
    fn test_get_color_scheme_unknown_effect() {
        let temp_file = scheme_file("warning: yellow sparkly\n");
        let temp_path = temp_file.path().to_str().unwrap();

        let result = get_color_scheme(temp_path);
        assert!(matches!(result, Err(Error::UnknownEffect { .. })));
    }

    #[test]
    fn test_get_color_scheme_invalid_yaml() {
        let temp_file = scheme_file("invalid: yaml: content: [");
        let temp_path = temp_file.path().to_str().unwrap();

        let result = get_color_scheme(temp_path);
        assert!(matches!(result, Err(Error::Yaml { .. })));
    }

    #[test]
    fn test_get_color_scheme_file_not_found() {
        let result = get_color_scheme("/this/path/does/not/exist.yml");
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_get_optional_color_scheme_missing_file() {
        let scheme = get_optional_color_scheme("/this/path/does/not/exist.yml").unwrap();
        assert!(scheme.is_empty());
    }

    #[test]
    fn test_get_color_scheme_multiple_color_types() {
        let temp_file = scheme_file(
            r#"
loud:
  foreground:
    ansi: 9
    name: red
"#,
        );
        let temp_path = temp_file.path().to_str().unwrap();

        let result = get_color_scheme(temp_path);
        assert!(matches!(result, Err(Error::MultipleColorTypes)));
    }
}
