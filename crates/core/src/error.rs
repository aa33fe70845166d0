use thiserror::Error;

use crate::answers::AnswerError;
use crate::strformat::{ParseError, RenderError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error parsing format string: {}", .0)]
    Parse(#[from] ParseError),

    #[error("Error rendering format string: {}", .0)]
    Render(#[from] RenderError),

    #[error("{}", .0)]
    Answer(#[from] AnswerError),

    #[error("A color scheme color may set only one of `rgb`, `ansi` or `name`")]
    MultipleColorTypes,

    #[error("Unknown color `{}` in color scheme; use one of the 16 terminal color names", _0)]
    UnknownColorName(String),

    #[error("Unknown effect `{}` in color scheme entry `{}`", .effect, .alias)]
    UnknownEffect { alias: String, effect: String },

    #[error("Invalid parameter `{}`: expected the form key=value", .0)]
    ParameterFormat(String),

    #[error("Input ended before the question was answered.")]
    EndOfInput,

    #[error("Input was interrupted.")]
    Interrupted,

    #[error("Misc error: {}", .0)]
    Misc(String),

    #[error("STDIO error: {}", .0)]
    Stdio(#[from] std::io::Error),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn unknown_effect(alias: &str, effect: &str) -> Self {
        Self::UnknownEffect {
            alias: alias.to_string(),
            effect: effect.to_string(),
        }
    }
}
