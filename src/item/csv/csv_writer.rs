use std::{
    cell::RefCell,
    fs::File,
    io::{self, Write},
    path::Path,
};

use csv::{QuoteStyle, WriterBuilder};
use log::{debug, error};
use serde::Serialize;
use serde_json::{Number, Value};

use super::{
    dialect::{DEFAULT_DELIMITER, DEFAULT_ENCLOSURE, LineBreak, validate_delimiter, validate_enclosure},
    stream::StreamHandle,
};
use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::ParserError,
};

/// Target name reported for streams that were not opened from a path.
const STREAM_TARGET: &str = "stream";

/// Floats from this magnitude on keep their own formatting.
const WHOLE_FLOAT_LIMIT: f64 = 1e15;

/// A CSV writer that encodes one record per call.
///
/// Every field is wrapped in the enclosure, whether or not it contains a
/// delimiter, an enclosure or a line break; literal enclosures are doubled.
/// Each encoded row reaches the stream in a single `write` call, and a write
/// that accepts fewer bytes than the row holds is reported as
/// [`ParserError::ShortWrite`].
///
/// Rows are any `Serialize` value that serializes as a sequence: slices,
/// vectors, tuples or tuple structs. Each element must be a scalar (string,
/// number, boolean, unit/`None`) or a type that serializes itself as a string.
///
/// # Examples
///
/// ```
/// use csv_parser_rs::item::csv::csv_writer::CsvWriterBuilder;
///
/// let mut buffer = Vec::new();
/// {
///     let writer = CsvWriterBuilder::new()
///         .from_borrowed_writer(&mut buffer)
///         .unwrap();
///
///     writer.write_row(&["Brand", "Number"]).unwrap();
///     writer.write_row(&("HP \"Envy\"", 2)).unwrap();
/// } // writer is dropped here, releasing the borrow
///
/// assert_eq!(
///     String::from_utf8(buffer).unwrap(),
///     "\"Brand\",\"Number\"\n\"HP \"\"Envy\"\"\",\"2\"\n"
/// );
/// ```
pub struct CsvWriter<'a, W: Write> {
    stream: RefCell<StreamHandle<'a, W>>,
    target: String,
    encoder: WriterBuilder,
    delimiter: u8,
    enclosure: Option<u8>,
    line_break: LineBreak,
}

impl<'a, W: Write> CsvWriter<'a, W> {
    fn new(
        stream: StreamHandle<'a, W>,
        target: String,
        delimiter: u8,
        enclosure: Option<u8>,
        line_break: LineBreak,
    ) -> Self {
        let mut encoder = WriterBuilder::new();
        encoder
            .delimiter(delimiter)
            .quote(enclosure.unwrap_or(b'"'))
            .quote_style(QuoteStyle::Always)
            .double_quote(true)
            .terminator(line_break.terminator())
            .flexible(true)
            .has_headers(false);

        Self {
            stream: RefCell::new(stream),
            target,
            encoder,
            delimiter,
            enclosure,
            line_break,
        }
    }

    /// Encodes `row` exactly as [`write_row`](CsvWriter::write_row) would
    /// write it, terminator included.
    pub fn encode_row<R: Serialize + ?Sized>(&self, row: &R) -> Result<Vec<u8>, ParserError> {
        let fields = to_fields(row)?;

        // An empty row is a bare line break, and without an enclosure fields
        // are joined as they are
        if fields.is_empty() || self.enclosure.is_none() {
            let mut bytes = fields
                .iter()
                .map(String::as_bytes)
                .collect::<Vec<_>>()
                .join(&self.delimiter);
            bytes.extend_from_slice(self.line_break.as_bytes());
            return Ok(bytes);
        }

        let mut wtr = self.encoder.from_writer(Vec::new());
        wtr.write_record(&fields)?;
        wtr.into_inner()
            .map_err(|error| ParserError::Io(error.into_error()))
    }

    /// Encodes `row` and writes it to the stream in one write call.
    pub fn write_row<R: Serialize + ?Sized>(&self, row: &R) -> Result<(), ParserError> {
        let bytes = self.encode_row(row)?;
        debug!("Writing {} bytes to {}", bytes.len(), self.target);

        let result = self.stream.borrow_mut().write(&bytes);
        let (written, source) = match result {
            Ok(written) => (written, None),
            Err(error) => (0, Some(error)),
        };

        if written < bytes.len() {
            let error = ParserError::ShortWrite {
                target: self.target.clone(),
                to_write: bytes.len(),
                written,
                source,
            };
            error!("{}", error);
            return Err(error);
        }

        Ok(())
    }

    /// Flushes the underlying stream.
    pub fn flush(&self) -> Result<(), ParserError> {
        self.stream.borrow_mut().flush()?;
        Ok(())
    }

    pub fn delimiter(&self) -> char {
        char::from(self.delimiter)
    }

    pub fn enclosure(&self) -> Option<char> {
        self.enclosure.map(char::from)
    }

    pub fn line_break(&self) -> LineBreak {
        self.line_break
    }

    /// The path this writer was opened on, or `stream`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Flushes and releases the writer. An owned stream is returned to the
    /// caller and closes when dropped; a borrowed one stays with its owner.
    pub fn close(self) -> Result<Option<W>, ParserError> {
        self.flush()?;
        Ok(self.stream.into_inner().into_owned())
    }
}

impl<W: Write, R: Serialize + ?Sized> ItemWriter<R> for CsvWriter<'_, W> {
    fn write(&self, item: &R) -> ItemWriterResult {
        self.write_row(item)
    }

    /// Flush the underlying stream.
    ///
    /// Rows are never buffered by the writer itself, so this only matters
    /// for streams that buffer on their own.
    fn flush(&self) -> ItemWriterResult {
        CsvWriter::flush(self)
    }
}

/// Turns a serializable row into the textual value of each field.
fn to_fields<R: Serialize + ?Sized>(row: &R) -> Result<Vec<String>, ParserError> {
    let value = serde_json::to_value(row).map_err(|error| ParserError::UnwritableValue {
        value: error.to_string(),
    })?;

    match value {
        Value::Array(values) => values.into_iter().map(to_field).collect(),
        other => Err(ParserError::UnwritableValue {
            value: other.to_string(),
        }),
    }
}

fn to_field(value: Value) -> Result<String, ParserError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok(String::new()),
        Value::Number(number) => Ok(number_to_text(&number)),
        Value::String(text) => Ok(text),
        other @ (Value::Array(_) | Value::Object(_)) => Err(ParserError::UnwritableValue {
            value: other.to_string(),
        }),
    }
}

/// Whole floats lose their fraction, so `1.0` is written as `1`.
fn number_to_text(number: &Number) -> String {
    match number.as_f64() {
        Some(float)
            if number.is_f64() && float.fract() == 0.0 && float.abs() < WHOLE_FLOAT_LIMIT =>
        {
            format!("{float:.0}")
        }
        _ => number.to_string(),
    }
}

/// A builder for configuring CSV writing.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Enclosure: double quote (")
/// - Line break: `\n`
///
/// Settings are validated when the writer is built.
pub struct CsvWriterBuilder {
    delimiter: String,
    enclosure: String,
    line_break: String,
}

impl Default for CsvWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvWriterBuilder {
    pub fn new() -> CsvWriterBuilder {
        CsvWriterBuilder {
            delimiter: DEFAULT_DELIMITER.to_string(),
            enclosure: DEFAULT_ENCLOSURE.to_string(),
            line_break: LineBreak::default().as_str().to_string(),
        }
    }

    pub fn delimiter(mut self, delimiter: &str) -> CsvWriterBuilder {
        self.delimiter = delimiter.to_string();
        self
    }

    /// Sets the enclosure. An empty string writes fields bare.
    pub fn enclosure(mut self, enclosure: &str) -> CsvWriterBuilder {
        self.enclosure = enclosure.to_string();
        self
    }

    /// Sets the record terminator: one of `\n`, `\r\n` or `\r`.
    pub fn line_break(mut self, line_break: &str) -> CsvWriterBuilder {
        self.line_break = line_break.to_string();
        self
    }

    fn validate(&self) -> Result<(u8, Option<u8>, LineBreak), ParserError> {
        Ok((
            validate_delimiter(&self.delimiter)?,
            validate_enclosure(&self.enclosure)?,
            self.line_break.parse()?,
        ))
    }

    /// Creates (or truncates) the file at `path` and builds a writer that owns it.
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<CsvWriter<'static, File>, ParserError> {
        let (delimiter, enclosure, line_break) = self.validate()?;

        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ParserError::FileNotExists {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(CsvWriter::new(
            StreamHandle::Owned(file),
            path.display().to_string(),
            delimiter,
            enclosure,
            line_break,
        ))
    }

    /// Builds a writer that takes ownership of `wtr`.
    pub fn from_writer<W: io::Write>(self, wtr: W) -> Result<CsvWriter<'static, W>, ParserError> {
        let (delimiter, enclosure, line_break) = self.validate()?;
        Ok(CsvWriter::new(
            StreamHandle::Owned(wtr),
            STREAM_TARGET.to_string(),
            delimiter,
            enclosure,
            line_break,
        ))
    }

    /// Builds a writer over a stream the caller keeps ownership of.
    pub fn from_borrowed_writer<W: io::Write>(
        self,
        wtr: &mut W,
    ) -> Result<CsvWriter<'_, W>, ParserError> {
        let (delimiter, enclosure, line_break) = self.validate()?;
        Ok(CsvWriter::new(
            StreamHandle::Borrowed(wtr),
            STREAM_TARGET.to_string(),
            delimiter,
            enclosure,
            line_break,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::{error::Error, fmt};

    use serde::{Serialize, Serializer};
    use serde_json::json;

    use super::CsvWriterBuilder;
    use crate::{
        core::item::ItemWriter,
        error::{ErrorKind, ParserError},
        item::csv::dialect::LineBreak,
    };

    fn encode<R: Serialize + ?Sized>(builder: CsvWriterBuilder, row: &R) -> String {
        let writer = builder.from_writer(Vec::new()).unwrap();
        String::from_utf8(writer.encode_row(row).unwrap()).unwrap()
    }

    struct Sku(u32);

    impl fmt::Display for Sku {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "SKU-{:05}", self.0)
        }
    }

    impl Serialize for Sku {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_str(self)
        }
    }

    #[test]
    fn every_field_is_enclosed() {
        assert_eq!(
            encode(CsvWriterBuilder::new(), &["col1", "col2"]),
            "\"col1\",\"col2\"\n"
        );
    }

    #[test]
    fn enclosure_is_doubled() {
        assert_eq!(
            encode(
                CsvWriterBuilder::new(),
                &["column with enclosure \", and comma inside text", "enclosure in text \""]
            ),
            "\"column with enclosure \"\", and comma inside text\",\"enclosure in text \"\"\"\n"
        );
    }

    #[test]
    fn scalars_are_converted() {
        let row = json!(["text", null, 42, -1.5, true, false]);
        assert_eq!(
            encode(CsvWriterBuilder::new(), &row),
            "\"text\",\"\",\"42\",\"-1.5\",\"1\",\"\"\n"
        );
    }

    #[test]
    fn options_and_tuples_are_rows() {
        let row: (&str, Option<u32>, Option<u32>) = ("a", Some(7), None);
        assert_eq!(
            encode(CsvWriterBuilder::new(), &row),
            "\"a\",\"7\",\"\"\n"
        );
    }

    #[test]
    fn types_with_textual_representation_are_accepted() {
        assert_eq!(
            encode(CsvWriterBuilder::new(), &[Sku(42), Sku(7)]),
            "\"SKU-00042\",\"SKU-00007\"\n"
        );
    }

    #[test]
    fn nested_values_are_rejected() {
        let writer = CsvWriterBuilder::new().from_writer(Vec::new()).unwrap();

        let err = writer.write_row(&json!(["1", ["nested"]])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteError);
        assert_eq!(err.to_string(), "Cannot write data into column: [\"nested\"]");

        let err = writer.write_row(&json!(["1", {"key": "value"}])).unwrap_err();
        assert!(matches!(err, ParserError::UnwritableValue { .. }));

        let output = writer.close().unwrap().unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn non_sequence_row_is_rejected() {
        let writer = CsvWriterBuilder::new().from_writer(Vec::new()).unwrap();
        let err = writer.write_row("just a string").unwrap_err();
        assert!(matches!(err, ParserError::UnwritableValue { .. }));
    }

    #[test]
    fn custom_dialect() {
        let builder = CsvWriterBuilder::new()
            .delimiter(";")
            .enclosure("'")
            .line_break("\r\n");
        assert_eq!(encode(builder, &["it's", "b;c"]), "'it''s';'b;c'\r\n");
    }

    #[test]
    fn carriage_return_line_break_is_allowed() {
        let writer = CsvWriterBuilder::new()
            .line_break("\r")
            .from_writer(Vec::new())
            .unwrap();
        assert_eq!(writer.line_break(), LineBreak::Cr);

        writer.write_row(&["a", "b"]).unwrap();
        writer.write_row(&["c", "d"]).unwrap();
        let output = writer.close().unwrap().unwrap();

        assert_eq!(output, b"\"a\",\"b\"\r\"c\",\"d\"\r");
    }

    #[test]
    fn empty_enclosure_writes_fields_bare() {
        let builder = CsvWriterBuilder::new().enclosure("");
        assert_eq!(encode(builder, &["a \"b\"", "c"]), "a \"b\",c\n");
    }

    #[test]
    fn empty_enclosure_with_single_empty_field_writes_only_line_break() {
        assert_eq!(encode(CsvWriterBuilder::new().enclosure(""), &[""]), "\n");
        assert_eq!(
            encode(CsvWriterBuilder::new().enclosure("").delimiter(";"), &["", ""]),
            ";\n"
        );
    }

    #[test]
    fn empty_row_is_only_line_break() {
        let empty: Vec<String> = Vec::new();
        assert_eq!(encode(CsvWriterBuilder::new(), &empty), "\n");
        assert_eq!(
            encode(CsvWriterBuilder::new().line_break("\r\n"), &json!([])),
            "\r\n"
        );

        // A single empty field is still enclosed
        assert_eq!(encode(CsvWriterBuilder::new(), &[""]), "\"\"\n");
    }

    #[test]
    fn whole_floats_lose_their_fraction() {
        let row = json!([1.0, -3.0, 0.0, 1.5, 42]);
        assert_eq!(
            encode(CsvWriterBuilder::new(), &row),
            "\"1\",\"-3\",\"0\",\"1.5\",\"42\"\n"
        );
        assert_eq!(encode(CsvWriterBuilder::new(), &(2.0f64, 7u8)), "\"2\",\"7\"\n");
    }

    #[test]
    fn invalid_line_break_is_rejected() {
        let result = CsvWriterBuilder::new().line_break("\t").from_writer(Vec::new());
        match result {
            Err(ParserError::UnsupportedLineBreak { value, allowed }) => {
                assert_eq!(value, "\t");
                assert_eq!(allowed, vec!["\r\n", "\r", "\n"]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("invalid line break accepted"),
        }
    }

    #[test]
    fn accessors() {
        let writer = CsvWriterBuilder::new().from_writer(Vec::new()).unwrap();
        assert_eq!(writer.delimiter(), ',');
        assert_eq!(writer.enclosure(), Some('"'));
        assert_eq!(writer.line_break(), LineBreak::Lf);
        assert_eq!(writer.target(), "stream");
    }

    #[test]
    fn item_writer_delegates_to_write_row() -> Result<(), Box<dyn Error>> {
        let mut buffer = Vec::new();
        {
            let writer = CsvWriterBuilder::new().from_borrowed_writer(&mut buffer)?;
            ItemWriter::write(&writer, &["Boston", "United States"])?;
            ItemWriter::<[&str; 2]>::flush(&writer)?;
        }

        assert_eq!(String::from_utf8(buffer)?, "\"Boston\",\"United States\"\n");
        Ok(())
    }
}
