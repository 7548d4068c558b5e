use crate::position::Position;
use std::fmt::{Display, Formatter};

/// Stable, numerically-ordered error classification, matching the external ABI order
/// described by the format's interface contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnexpectedChar = 0,
    UnterminatedString = 1,
    UnexpectedToken = 2,
    UnexpectedEof = 3,
    InvalidSyntax = 4,
    IntOutOfRange = 5,
    StringTooLong = 6,
    TypeMismatch = 7,
    InvalidTypeHint = 8,
    DuplicateKey = 9,
    NullPointer = 10,
    Io = 11,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::UnexpectedChar => "UnexpectedChar",
            ErrorKind::UnterminatedString => "UnterminatedString",
            ErrorKind::UnexpectedToken => "UnexpectedToken",
            ErrorKind::UnexpectedEof => "UnexpectedEof",
            ErrorKind::InvalidSyntax => "InvalidSyntax",
            ErrorKind::IntOutOfRange => "IntOutOfRange",
            ErrorKind::StringTooLong => "StringTooLong",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::InvalidTypeHint => "InvalidTypeHint",
            ErrorKind::DuplicateKey => "DuplicateKey",
            ErrorKind::NullPointer => "NullPointer",
            ErrorKind::Io => "Io",
        };
        f.write_str(name)
    }
}

/// A structured GBLN diagnostic: what went wrong, where, and optionally how to fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GblnError {
    pub kind: ErrorKind,
    pub message: String,
    pub suggestion: Option<String>,
    pub position: Option<Position>,
}

impl GblnError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            suggestion: None,
            position: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }
}

impl Display for GblnError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(position) => write!(f, "{}: {} @ {}", self.kind, self.message, position)?,
            None => write!(f, "{}: {}", self.kind, self.message)?,
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for GblnError {}
