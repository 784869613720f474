//! Error types shared by the parser and the translator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse classification a driver can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedCommand,
    InvalidSegment,
    InvalidIndex,
    InvalidSymbol,
    UndeclaredLabel,
    DuplicateLabel,
    DuplicateFunction,
    ReservedName,
    ProgramTooLarge,
    InvalidConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized command `{0}`")]
    MalformedCommand(String),
    #[error("invalid memory segment `{0}`")]
    InvalidSegment(String),
    #[error("`pop constant` has no destination")]
    PopConstant,
    #[error("index `{0}` is not a non-negative integer")]
    InvalidIndex(String),
    #[error("index {index} is out of range for `{field}` (max {max})")]
    IndexOutOfRange { field: String, index: u16, max: u16 },
    #[error("`{0}` is not a valid symbol")]
    InvalidSymbol(String),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::MalformedCommand(_) => ErrorKind::MalformedCommand,
            ParseError::InvalidSegment(_) | ParseError::PopConstant => ErrorKind::InvalidSegment,
            ParseError::InvalidIndex(_) | ParseError::IndexOutOfRange { .. } => ErrorKind::InvalidIndex,
            ParseError::InvalidSymbol(_) => ErrorKind::InvalidSymbol,
        }
    }
}

/// Module name plus 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePos {
    pub module: String,
    pub line: usize,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.vm:{}", self.module, self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    #[error("{pos}: {source}\n    {text}")]
    Parse {
        pos: SourcePos,
        text: String,
        #[source]
        source: ParseError,
    },
    #[error("{pos}: label `{label}` is never declared in `{scope}`")]
    UndeclaredLabel { pos: SourcePos, label: String, scope: String },
    #[error("{pos}: label `{label}` is already declared in `{scope}`")]
    DuplicateLabel { pos: SourcePos, label: String, scope: String },
    #[error("{pos}: function `{name}` is already defined at {first}")]
    DuplicateFunction { pos: SourcePos, name: String, first: SourcePos },
    #[error("{pos}: function name `{name}` {reason}")]
    ReservedName { pos: SourcePos, name: String, reason: &'static str },
    #[error("program needs {words} instruction words, the target holds {limit}")]
    ProgramTooLarge { words: usize, limit: usize },
    #[error("invalid translator config: {0}")]
    InvalidConfig(String),
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::Parse { source, .. } => source.kind(),
            TranslateError::UndeclaredLabel { .. } => ErrorKind::UndeclaredLabel,
            TranslateError::DuplicateLabel { .. } => ErrorKind::DuplicateLabel,
            TranslateError::DuplicateFunction { .. } => ErrorKind::DuplicateFunction,
            TranslateError::ReservedName { .. } => ErrorKind::ReservedName,
            TranslateError::ProgramTooLarge { .. } => ErrorKind::ProgramTooLarge,
            TranslateError::InvalidConfig(_) => ErrorKind::InvalidConfig,
        }
    }

    /// Where the error was found, when it has a source location.
    pub fn pos(&self) -> Option<&SourcePos> {
        match self {
            TranslateError::Parse { pos, .. }
            | TranslateError::UndeclaredLabel { pos, .. }
            | TranslateError::DuplicateLabel { pos, .. }
            | TranslateError::DuplicateFunction { pos, .. }
            | TranslateError::ReservedName { pos, .. } => Some(pos),
            TranslateError::ProgramTooLarge { .. } | TranslateError::InvalidConfig(_) => None,
        }
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;
