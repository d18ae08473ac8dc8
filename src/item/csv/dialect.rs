use std::{fmt, str::FromStr};

use csv::Terminator;

use crate::error::ParserError;

/// Default field separator.
pub const DEFAULT_DELIMITER: &str = ",";

/// Default enclosure (quoting) character.
pub const DEFAULT_ENCLOSURE: &str = "\"";

/// Default escape character: none.
pub const DEFAULT_ESCAPE: &str = "";

/// A record terminator.
///
/// The writer accepts all three variants. The reader only accepts
/// [`LineBreak::Lf`] and [`LineBreak::CrLf`] even though sniffing can
/// return [`LineBreak::Cr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineBreak {
    /// Unix `\n`
    #[default]
    Lf,
    /// Windows `\r\n`
    CrLf,
    /// Classic Mac `\r`
    Cr,
}

impl LineBreak {
    /// Every line break, in sniffing preference order.
    pub const ALL: [LineBreak; 3] = [LineBreak::CrLf, LineBreak::Cr, LineBreak::Lf];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// The line break with its control characters escaped, e.g. `\r\n`.
    pub fn as_text(&self) -> &'static str {
        match self {
            LineBreak::Lf => "\\n",
            LineBreak::CrLf => "\\r\\n",
            LineBreak::Cr => "\\r",
        }
    }

    /// Writer-side terminator producing exactly this line break.
    pub(crate) fn terminator(&self) -> Terminator {
        match self {
            LineBreak::Lf => Terminator::Any(b'\n'),
            LineBreak::CrLf => Terminator::CRLF,
            LineBreak::Cr => Terminator::Any(b'\r'),
        }
    }

    fn allowed() -> Vec<&'static str> {
        Self::ALL.iter().map(LineBreak::as_str).collect()
    }
}

impl fmt::Display for LineBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

impl FromStr for LineBreak {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineBreak::ALL
            .into_iter()
            .find(|line_break| line_break.as_str() == s)
            .ok_or_else(|| ParserError::UnsupportedLineBreak {
                value: s.to_string(),
                allowed: LineBreak::allowed(),
            })
    }
}

/// Validates a field delimiter: exactly one single-byte character.
pub fn validate_delimiter(delimiter: &str) -> Result<u8, ParserError> {
    match delimiter.as_bytes() {
        [] => Err(ParserError::InvalidParameter(
            "Delimiter cannot be empty.".to_string(),
        )),
        [byte] => Ok(*byte),
        _ => Err(ParserError::InvalidParameter(format!(
            "Delimiter must be a single character. {delimiter:?} received"
        ))),
    }
}

/// Validates an enclosure: at most one single-byte character.
///
/// An empty enclosure is allowed and disables quoting: the writer then emits
/// fields bare and the reader treats quote characters as ordinary content.
pub fn validate_enclosure(enclosure: &str) -> Result<Option<u8>, ParserError> {
    match enclosure.as_bytes() {
        [] => Ok(None),
        [byte] => Ok(Some(*byte)),
        _ => Err(ParserError::InvalidParameter(format!(
            "Enclosure must be a single character. {enclosure:?} received"
        ))),
    }
}

/// Validates an escape character: at most one single-byte character.
pub fn validate_escape(escape: &str) -> Result<Option<u8>, ParserError> {
    match escape.as_bytes() {
        [] => Ok(None),
        [byte] => Ok(Some(*byte)),
        _ => Err(ParserError::InvalidParameter(format!(
            "Escape character must be a single character. {escape:?} received"
        ))),
    }
}

/// Rejects the line breaks the reader cannot split on.
pub fn validate_reader_line_break(line_break: LineBreak) -> Result<LineBreak, ParserError> {
    match line_break {
        LineBreak::Lf | LineBreak::CrLf => Ok(line_break),
        LineBreak::Cr => Err(ParserError::InvalidParameter(
            "Invalid line break. Please use unix \\n or win \\r\\n line breaks.".to_string(),
        )),
    }
}
