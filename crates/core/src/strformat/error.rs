use thiserror::Error;

/// Structural problems found while compiling a format string.
///
/// Every variant carries the byte offset into the original template at which the problem was
/// detected, including for fields inside nested format specs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unmatched '{{' in format string (at {})", .position)]
    UnmatchedOpenBrace { position: usize },

    #[error("single '}}' encountered in format string (at {})", .position)]
    UnmatchedCloseBrace { position: usize },

    #[error("cannot switch from {} to {} (at {})", .from, .to, .position)]
    NumberingModeConflict {
        from: NumberingMode,
        to: NumberingMode,
        position: usize,
    },

    #[error("unknown conversion specifier '{}' (at {})", .conversion, .position)]
    UnknownConversion { conversion: char, position: usize },

    #[error("max format spec nesting depth exceeded (at {})", .position)]
    RecursionExceeded { position: usize },

    #[error("missing ']' in format string (at {})", .position)]
    MissingCloseBracket { position: usize },

    #[error("empty attribute in format string (at {})", .position)]
    EmptyAttribute { position: usize },

    #[error("expected ':' or '}}' but found '{}' (at {})", .found, .position)]
    ExpectedFieldEnd { found: char, position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            Self::UnmatchedOpenBrace { position }
            | Self::UnmatchedCloseBrace { position }
            | Self::NumberingModeConflict { position, .. }
            | Self::UnknownConversion { position, .. }
            | Self::RecursionExceeded { position }
            | Self::MissingCloseBracket { position }
            | Self::EmptyAttribute { position }
            | Self::ExpectedFieldEnd { position, .. } => *position,
        }
    }

    /// Whether the error is one of the brace-matching kinds.
    pub fn is_brace_mismatch(&self) -> bool {
        matches!(
            self,
            Self::UnmatchedOpenBrace { .. }
                | Self::UnmatchedCloseBrace { .. }
                | Self::MissingCloseBracket { .. }
        )
    }
}

/// The two ways a positional field may be numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingMode {
    Automatic,
    Manual,
}

impl std::fmt::Display for NumberingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberingMode::Automatic => f.write_str("automatic field numbering"),
            NumberingMode::Manual => f.write_str("manual field specification"),
        }
    }
}

/// Failures while rendering a compiled template against a set of arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("replacement index {} out of range for positional args tuple of length {}", .index, .count)]
    IndexOutOfRange { index: usize, count: usize },

    #[error("no keyword argument named '{}'", .key)]
    KeyNotFound { key: String },

    #[error("'{}' object has no attribute '{}'", .type_name, .attribute)]
    AttributeNotFound { type_name: String, attribute: String },

    #[error("'{}' object has no item {}", .type_name, .key)]
    IndexNotFound { type_name: String, key: String },

    #[error("invalid format spec '{}': {}", .spec, .reason)]
    InvalidFormatSpec { spec: String, reason: String },
}

impl RenderError {
    pub fn invalid_spec(spec: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormatSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}
