//! Conversion and validation of the text a user typed in reply to a question.

use std::fs::{File, OpenOptions};
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use regex::Regex;
use thiserror::Error;

use crate::listdisplay::inline_simple;
use crate::trie::{Trie, TrieError};

/// Why an answer was rejected. The message is what the user gets to see.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnswerError {
    #[error("Answer could not be processed: {}", .0)]
    Invalid(String),

    #[error("Your answer isn't within the expected range: {}", .0)]
    OutOfRange(String),

    #[error("{}", .0)]
    BadChoice(String),

    #[error("{}", .0)]
    BadType(String),

    #[error("No match for that input")]
    NoMatch,

    #[error("Ambiguous match: could be any of {}", inline_simple(.0, ", ", " or "))]
    Ambiguous(Vec<String>),
}

impl From<TrieError> for AnswerError {
    fn from(error: TrieError) -> Self {
        match error {
            TrieError::NotAPrefix(_) => AnswerError::NoMatch,
            TrieError::NotAUniquePrefix { completions, .. } => AnswerError::Ambiguous(completions),
        }
    }
}

/// Turns the chosen text into a typed result.
///
/// When `candidates` returns a list, the entered text is first completed against it and
/// `chosen` is the completed candidate; otherwise `chosen` and `entered` are the same text.
pub trait Answer {
    type Output;

    fn candidates(&self) -> Option<Vec<String>> {
        None
    }

    fn convert(&self, chosen: &str, entered: &str) -> Result<Self::Output, AnswerError>;

    /// Completes `entered` against the candidates, then converts.
    fn resolve(&self, entered: &str) -> Result<Self::Output, AnswerError> {
        match self.candidates() {
            Some(candidates) => {
                let trie: Trie = candidates.iter().collect();
                let chosen = trie.complete(entered)?;
                debug!("Completed answer `{}` to `{}`", entered, chosen);
                self.convert(&chosen, entered)
            }
            None => self.convert(entered, entered),
        }
    }
}

/// Free text, optionally required to match a pattern at its start.
#[derive(Debug, Clone, Default)]
pub struct Text {
    pattern: Option<Regex>,
}

impl Text {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(pattern: Regex) -> Self {
        Self {
            pattern: Some(pattern),
        }
    }
}

impl Answer for Text {
    type Output = String;

    fn convert(&self, chosen: &str, _entered: &str) -> Result<String, AnswerError> {
        match &self.pattern {
            Some(pattern) if !pattern.find(chosen).is_some_and(|m| m.start() == 0) => Err(
                AnswerError::Invalid(format!("expected text matching `{pattern}`")),
            ),
            _ => Ok(chosen.to_string()),
        }
    }
}

/// Exclusive bounds: `below` is an upper limit, `above` a lower one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds<T> {
    pub below: Option<T>,
    pub above: Option<T>,
}

impl<T: PartialOrd + std::fmt::Display + Copy> Bounds<T> {
    fn check(&self, value: T) -> Result<T, AnswerError> {
        let fits_below = self.below.map_or(true, |below| value < below);
        let fits_above = self.above.map_or(true, |above| value > above);
        if fits_below && fits_above {
            Ok(value)
        } else {
            Err(AnswerError::OutOfRange(self.explain()))
        }
    }

    fn explain(&self) -> String {
        let mut parts = Vec::new();
        if let Some(below) = self.below {
            parts.push(format!("below {below}"));
        }
        if let Some(above) = self.above {
            parts.push(format!("above {above}"));
        }
        parts.join(" and ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Int {
    pub bounds: Bounds<i64>,
}

impl Int {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn below(mut self, below: i64) -> Self {
        self.bounds.below = Some(below);
        self
    }

    pub fn above(mut self, above: i64) -> Self {
        self.bounds.above = Some(above);
        self
    }
}

impl Answer for Int {
    type Output = i64;

    fn convert(&self, chosen: &str, _entered: &str) -> Result<i64, AnswerError> {
        let value = chosen
            .parse()
            .map_err(|_| AnswerError::BadType("You must enter a valid integer".to_string()))?;
        self.bounds.check(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Float {
    pub bounds: Bounds<f64>,
}

impl Float {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn below(mut self, below: f64) -> Self {
        self.bounds.below = Some(below);
        self
    }

    pub fn above(mut self, above: f64) -> Self {
        self.bounds.above = Some(above);
        self
    }
}

impl Answer for Float {
    type Output = f64;

    fn convert(&self, chosen: &str, _entered: &str) -> Result<f64, AnswerError> {
        let value = chosen.parse().map_err(|_| {
            AnswerError::BadType("You must enter a floating-point number".to_string())
        })?;
        self.bounds.check(value)
    }
}

/// One of a fixed list of strings; abbreviations complete to the full choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choice {
    choices: Vec<String>,
}

impl Choice {
    pub fn new<S: Into<String>>(choices: impl IntoIterator<Item = S>) -> Self {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Answer for Choice {
    type Output = String;

    fn candidates(&self) -> Option<Vec<String>> {
        Some(self.choices.clone())
    }

    fn convert(&self, chosen: &str, _entered: &str) -> Result<String, AnswerError> {
        if self.choices.iter().any(|choice| choice == chosen) {
            Ok(chosen.to_string())
        } else {
            Err(AnswerError::BadChoice(format!(
                "answer must be one of {}",
                inline_simple(&self.choices, "; ", " or ")
            )))
        }
    }
}

/// An existing path inside `directory`, completed from the entries matching `pattern`.
#[derive(Debug, Clone)]
pub struct Pathname {
    directory: PathBuf,
    pattern: String,
}

impl Pathname {
    /// Entries of the current directory.
    pub fn new() -> Self {
        let directory = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::in_directory(directory)
    }

    pub fn in_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            pattern: "*".to_string(),
        }
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = pattern.to_string();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn matching_entries(&self, files_only: bool) -> Option<Vec<String>> {
        let pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&self.directory.to_string_lossy()),
            self.pattern
        );
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid pathname pattern `{}`: {}", pattern, e);
                return None;
            }
        };

        Some(
            paths
                .filter_map(|entry| entry.ok())
                .filter(|path| !files_only || path.is_file())
                .filter_map(|path| {
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                })
                .collect(),
        )
    }
}

impl Default for Pathname {
    fn default() -> Self {
        Self::new()
    }
}

impl Answer for Pathname {
    type Output = PathBuf;

    fn candidates(&self) -> Option<Vec<String>> {
        self.matching_entries(false)
    }

    fn convert(&self, chosen: &str, _entered: &str) -> Result<PathBuf, AnswerError> {
        let path = self.directory.join(chosen);
        if path.exists() {
            Ok(path)
        } else {
            Err(AnswerError::Invalid(
                "File or directory does not exist.".to_string(),
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    Read,
    Write,
    Append,
    ReadWrite,
}

impl FileMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            FileMode::Read => options.read(true),
            FileMode::Write => options.write(true).create(true).truncate(true),
            FileMode::Append => options.append(true).create(true),
            FileMode::ReadWrite => options.read(true).write(true),
        };
        options
    }
}

/// A file inside a directory, opened in the requested mode.
#[derive(Debug, Clone)]
pub struct FileAnswer {
    location: Pathname,
    mode: FileMode,
}

impl FileAnswer {
    pub fn new(location: Pathname, mode: FileMode) -> Self {
        Self { location, mode }
    }
}

impl Answer for FileAnswer {
    type Output = File;

    fn candidates(&self) -> Option<Vec<String>> {
        match self.mode {
            FileMode::Read | FileMode::ReadWrite => self.location.matching_entries(true),
            FileMode::Write | FileMode::Append => None,
        }
    }

    fn convert(&self, chosen: &str, _entered: &str) -> Result<File, AnswerError> {
        let directory = normalize(self.location.directory());
        let path = normalize(&directory.join(chosen));
        if !path.starts_with(&directory) {
            return Err(AnswerError::Invalid(
                "Cannot enter parent directory".to_string(),
            ));
        }

        self.mode
            .options()
            .open(&path)
            .map_err(|e| AnswerError::Invalid(e.to_string()))
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Conversion through a caller-supplied function.
pub struct FromFn<F> {
    convert: F,
}

impl<F> FromFn<F> {
    pub fn new(convert: F) -> Self {
        Self { convert }
    }
}

impl<F, T> Answer for FromFn<F>
where
    F: Fn(&str) -> Result<T, AnswerError>,
{
    type Output = T;

    fn convert(&self, chosen: &str, _entered: &str) -> Result<T, AnswerError> {
        (self.convert)(chosen)
    }
}

/// `y`/`yes` or `n`/`no`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Agree {
    /// Single key input, where only `y` and `n` can be typed.
    pub character: bool,
}

impl Answer for Agree {
    type Output = bool;

    fn convert(&self, chosen: &str, _entered: &str) -> Result<bool, AnswerError> {
        match chosen {
            "y" | "yes" => Ok(true),
            "n" | "no" => Ok(false),
            _ if self.character => Err(AnswerError::BadChoice("Please answer y or n".to_string())),
            _ => Err(AnswerError::BadChoice(
                "Please answer y, n, yes, or no".to_string(),
            )),
        }
    }
}
