//! Font loading and parsing errors.

use std::fmt;

/// Errors that can occur when parsing a font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontError {
    /// The blob is not a usable TrueType font: header too short, table
    /// directory inconsistent, a table extends past the file, or a
    /// required table is missing.
    Invalid,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid font data"),
        }
    }
}

impl std::error::Error for FontError {}
