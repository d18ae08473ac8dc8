use std::{io, path::PathBuf};

use thiserror::Error;

/// The three failure classes every reader and writer reports through,
/// plus low-level I/O failures that fit none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A path could not be opened in the requested mode.
    FileNotExists,
    /// A delimiter, enclosure, escape character or line break was rejected.
    InvalidParameter,
    /// A value could not be encoded or the stream refused the bytes.
    WriteError,
    /// Sampling, seeking or renaming failed.
    Io,
}

#[derive(Error, Debug)]
/// Parser error
pub enum ParserError {
    #[error("Cannot open file {path:?}: {source}")]
    FileNotExists {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Invalid line break: {value:?}, allowed line breaks: {allowed:?}")]
    UnsupportedLineBreak {
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("Cannot write data into column: {value}")]
    UnwritableValue { value: String },

    #[error("Cannot write to CSV file {target}: to write {to_write} bytes, written {written}")]
    ShortWrite {
        target: String,
        to_write: usize,
        written: usize,
        #[source]
        source: Option<io::Error>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ParserError {
    /// Returns the taxonomy class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParserError::FileNotExists { .. } => ErrorKind::FileNotExists,
            ParserError::InvalidParameter(_) | ParserError::UnsupportedLineBreak { .. } => {
                ErrorKind::InvalidParameter
            }
            ParserError::UnwritableValue { .. } | ParserError::ShortWrite { .. } => {
                ErrorKind::WriteError
            }
            ParserError::Csv(_) | ParserError::Io(_) => ErrorKind::Io,
        }
    }

    /// Numeric code of the error class: 1 for a missing file, 2 for an invalid
    /// parameter, 3 for a write error and 0 for anything else.
    pub fn code(&self) -> u8 {
        match self.kind() {
            ErrorKind::FileNotExists => 1,
            ErrorKind::InvalidParameter => 2,
            ErrorKind::WriteError => 3,
            ErrorKind::Io => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::{ErrorKind, ParserError};

    #[test]
    fn kinds_and_codes_follow_taxonomy() {
        let missing = ParserError::FileNotExists {
            path: "missing.csv".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(missing.kind(), ErrorKind::FileNotExists);
        assert_eq!(missing.code(), 1);

        let invalid = ParserError::InvalidParameter("Delimiter cannot be empty.".to_string());
        assert_eq!(invalid.kind(), ErrorKind::InvalidParameter);
        assert_eq!(invalid.code(), 2);

        let line_break = ParserError::UnsupportedLineBreak {
            value: "\t".to_string(),
            allowed: vec!["\r\n", "\r", "\n"],
        };
        assert_eq!(line_break.code(), 2);

        let short = ParserError::ShortWrite {
            target: "out.csv".to_string(),
            to_write: 14,
            written: 0,
            source: None,
        };
        assert_eq!(short.kind(), ErrorKind::WriteError);
        assert_eq!(short.code(), 3);

        let io = ParserError::from(io::Error::other("boom"));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(io.code(), 0);
    }

    #[test]
    fn messages_carry_offending_values() {
        let short = ParserError::ShortWrite {
            target: "out.csv".to_string(),
            to_write: 14,
            written: 3,
            source: None,
        };
        assert_eq!(
            short.to_string(),
            "Cannot write to CSV file out.csv: to write 14 bytes, written 3"
        );

        let line_break = ParserError::UnsupportedLineBreak {
            value: "\t".to_string(),
            allowed: vec!["\r\n", "\r", "\n"],
        };
        assert_eq!(
            line_break.to_string(),
            "Invalid line break: \"\\t\", allowed line breaks: [\"\\r\\n\", \"\\r\", \"\\n\"]"
        );

        let value = ParserError::UnwritableValue {
            value: "[\"nested\"]".to_string(),
        };
        assert_eq!(
            value.to_string(),
            "Cannot write data into column: [\"nested\"]"
        );
    }
}
