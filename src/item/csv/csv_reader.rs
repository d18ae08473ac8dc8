use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use csv::{ByteRecord, Position, ReaderBuilder, Terminator};
use log::{debug, error};

use super::{
    Record,
    dialect::{
        DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, DEFAULT_ESCAPE, LineBreak, validate_delimiter,
        validate_enclosure, validate_escape, validate_reader_line_break,
    },
    line_break::detect_line_break,
    source::RecordSource,
    stream::StreamHandle,
};
use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::ParserError,
};

/// A forward-only CSV cursor over a seekable byte stream.
///
/// On construction the reader sniffs the line break, caches the first record
/// as the header and positions itself on the first data record. Records are
/// decoded lazily, one per [`advance`](CsvReader::advance), so arbitrarily
/// large files are never loaded whole.
///
/// The cursor never fails once built: the end of the stream, and any I/O
/// failure met while iterating, simply end the sequence. [`rewind`](CsvReader::rewind)
/// restarts it from the first data record.
///
/// # Examples
///
/// ```
/// use csv_parser_rs::item::csv::csv_reader::CsvReaderBuilder;
/// use std::io::Cursor;
///
/// let data = "name,qty\nHP Envy,1\n\"Dell, XPS\",2\n";
///
/// let mut reader = CsvReaderBuilder::new()
///     .from_reader(Cursor::new(data))
///     .unwrap();
///
/// assert_eq!(reader.header(), ["name", "qty"]);
/// assert_eq!(reader.current_row().unwrap(), &["HP Envy", "1"]);
///
/// reader.advance();
/// assert_eq!(reader.row_index(), 1);
/// assert_eq!(reader.current_row().unwrap(), &["Dell, XPS", "2"]);
///
/// reader.advance();
/// assert!(reader.at_end());
/// ```
pub struct CsvReader<'a, R: Read + Seek> {
    records: csv::Reader<RecordSource<'a, R>>,
    buffer: ByteRecord,
    header: Record,
    current: Option<Record>,
    row_index: usize,
    line_break: LineBreak,
    delimiter: u8,
    enclosure: Option<u8>,
    escape: Option<u8>,
    skip_lines: usize,
    line: u64,
    blank_lines: u64,
    held: Option<Record>,
}

impl<'a, R: Read + Seek> CsvReader<'a, R> {
    fn new(
        mut stream: StreamHandle<'a, R>,
        delimiter: u8,
        enclosure: Option<u8>,
        escape: Option<u8>,
        skip_lines: usize,
    ) -> Result<Self, ParserError> {
        let line_break = validate_reader_line_break(detect_line_break(&mut stream)?)?;
        debug!("Detected line break: {}", line_break);

        // The source turns \r\n into \n and keeps escape characters
        let records = ReaderBuilder::new()
            .delimiter(delimiter)
            .quoting(enclosure.is_some())
            .quote(enclosure.unwrap_or(b'"'))
            .double_quote(true)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .flexible(true)
            .from_reader(RecordSource::new(stream, delimiter, enclosure, escape));

        let mut reader = CsvReader {
            records,
            buffer: ByteRecord::new(),
            header: Vec::new(),
            current: None,
            row_index: 0,
            line_break,
            delimiter,
            enclosure,
            escape,
            skip_lines,
            line: 1,
            blank_lines: 0,
            held: None,
        };

        reader.header = reader.read_record().unwrap_or_default();
        reader.try_rewind()?;

        Ok(reader)
    }

    /// Decodes the next record, or `None` at the end of the stream.
    ///
    /// A blank line is a record holding one empty field.
    fn read_record(&mut self) -> Option<Record> {
        if self.blank_lines > 0 {
            self.blank_lines -= 1;
            return Some(vec![String::new()]);
        }
        if let Some(record) = self.held.take() {
            return Some(record);
        }

        let record = match self.records.read_byte_record(&mut self.buffer) {
            Ok(true) => Some(
                self.buffer
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).into_owned())
                    .collect(),
            ),
            Ok(false) => None,
            Err(error) => {
                error!("Stopping CSV iteration after read failure: {}", error);
                return None;
            }
        };

        // The decoder skips blank lines; recover them from the line count
        let line = self.records.position().line();
        let consumed = line.saturating_sub(self.line);
        self.line = line;

        let spanned = match record {
            Some(_) => self.embedded_line_breaks() + u64::from(self.is_terminated()),
            None => 0,
        };
        let blank_lines = consumed.saturating_sub(spanned);
        if blank_lines == 0 {
            return record;
        }

        self.held = record;
        self.blank_lines = blank_lines - 1;
        Some(vec![String::new()])
    }

    fn embedded_line_breaks(&self) -> u64 {
        self.buffer
            .as_slice()
            .iter()
            .filter(|byte| **byte == b'\n')
            .count() as u64
    }

    /// `false` only for a last record running up to the end of the stream.
    fn is_terminated(&self) -> bool {
        let source = self.records.get_ref();
        let at_end = source.is_finished() && self.records.position().byte() >= source.produced();
        !at_end || source.last_byte() == Some(b'\n')
    }

    fn try_rewind(&mut self) -> Result<(), ParserError> {
        self.records.seek_raw(SeekFrom::Start(0), Position::new())?;
        self.line = 1;
        self.blank_lines = 0;
        self.held = None;

        // The header row is always the first record
        for _ in 0..=self.skip_lines {
            if self.read_record().is_none() {
                break;
            }
        }

        self.current = self.read_record();
        self.row_index = 0;
        Ok(())
    }

    /// The cached header row, empty if the stream had no records.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of fields in the header row.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// The record under the cursor, `None` once the end is reached.
    pub fn current_row(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// Moves the cursor to the next record.
    pub fn advance(&mut self) {
        self.current = self.read_record();
        self.row_index += 1;
    }

    /// Zero-based index of the current record among the returned rows.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    /// Seeks back to the start of the stream, skips the header and the
    /// configured number of lines, and reloads the first data record.
    ///
    /// A stream that cannot be seeked leaves the cursor at its end.
    pub fn rewind(&mut self) {
        debug!("Rewinding CSV reader");
        if let Err(error) = self.try_rewind() {
            error!("Cannot rewind CSV reader: {}", error);
            self.current = None;
            self.row_index = 0;
        }
    }

    pub fn line_break(&self) -> LineBreak {
        self.line_break
    }

    /// The line break with its control characters escaped, e.g. `\r\n`.
    pub fn line_break_as_text(&self) -> &'static str {
        self.line_break.as_text()
    }

    pub fn delimiter(&self) -> char {
        char::from(self.delimiter)
    }

    pub fn enclosure(&self) -> Option<char> {
        self.enclosure.map(char::from)
    }

    pub fn escape_char(&self) -> Option<char> {
        self.escape.map(char::from)
    }

    pub fn skip_lines(&self) -> usize {
        self.skip_lines
    }

    /// Releases the reader. An owned stream is returned to the caller and
    /// closes when dropped; a borrowed one stays with its owner.
    pub fn close(self) -> Option<R> {
        self.records.into_inner().into_inner().into_owned()
    }
}

impl<R: Read + Seek> Iterator for CsvReader<'_, R> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        let row = self.current.take()?;
        self.advance();
        Some(row)
    }
}

impl<R: Read + Seek> ItemReader<Record> for CsvReader<'_, R> {
    fn read(&mut self) -> ItemReaderResult<Record> {
        Ok(self.next())
    }
}

/// A builder for configuring CSV reading.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Enclosure: double quote (")
/// - Escape character: none
/// - Lines skipped after the header: 0
///
/// Settings are validated when the reader is built.
///
/// # Examples
///
/// ```
/// use csv_parser_rs::item::csv::csv_reader::CsvReaderBuilder;
///
/// let reader = CsvReaderBuilder::new()
///     .delimiter(";")
///     .escape_char("\\")
///     .from_reader(std::io::Cursor::new("a;b\r\n1;2\r\n"))
///     .unwrap();
///
/// assert_eq!(reader.line_break_as_text(), "\\r\\n");
/// ```
pub struct CsvReaderBuilder {
    delimiter: String,
    enclosure: String,
    escape: String,
    skip_lines: usize,
}

impl Default for CsvReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvReaderBuilder {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            enclosure: DEFAULT_ENCLOSURE.to_string(),
            escape: DEFAULT_ESCAPE.to_string(),
            skip_lines: 0,
        }
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Sets the enclosure. An empty string disables quoting.
    pub fn enclosure(mut self, enclosure: &str) -> Self {
        self.enclosure = enclosure.to_string();
        self
    }

    /// Sets the escape character honoured inside enclosed fields. An empty
    /// string disables escaping.
    pub fn escape_char(mut self, escape: &str) -> Self {
        self.escape = escape.to_string();
        self
    }

    /// Number of records skipped after the header before the first data row.
    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    fn validate(&self) -> Result<(u8, Option<u8>, Option<u8>), ParserError> {
        Ok((
            validate_delimiter(&self.delimiter)?,
            validate_enclosure(&self.enclosure)?,
            validate_escape(&self.escape)?,
        ))
    }

    /// Opens `path` for reading and builds a reader that owns the file.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvReader<'static, File>, ParserError> {
        let (delimiter, enclosure, escape) = self.validate()?;

        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ParserError::FileNotExists {
            path: path.to_path_buf(),
            source,
        })?;

        CsvReader::new(
            StreamHandle::Owned(file),
            delimiter,
            enclosure,
            escape,
            self.skip_lines,
        )
    }

    /// Builds a reader that takes ownership of `rdr`.
    pub fn from_reader<R: Read + Seek>(self, rdr: R) -> Result<CsvReader<'static, R>, ParserError> {
        let (delimiter, enclosure, escape) = self.validate()?;
        CsvReader::new(
            StreamHandle::Owned(rdr),
            delimiter,
            enclosure,
            escape,
            self.skip_lines,
        )
    }

    /// Builds a reader over a stream the caller keeps ownership of.
    pub fn from_borrowed_reader<R: Read + Seek>(
        self,
        rdr: &mut R,
    ) -> Result<CsvReader<'_, R>, ParserError> {
        let (delimiter, enclosure, escape) = self.validate()?;
        CsvReader::new(
            StreamHandle::Borrowed(rdr),
            delimiter,
            enclosure,
            escape,
            self.skip_lines,
        )
    }
}
