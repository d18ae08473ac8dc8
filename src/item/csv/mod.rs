//! CSV support for reading and writing delimited records.
//!
//! This module provides a streaming reader and an always-quoting writer with
//! configurable delimiter, enclosure, escape character and line break.
//!
//! # Module Architecture
//!
//! 1. **CsvReader**: a forward-only cursor decoding one record at a time from
//!    any `Read + Seek` source. It sniffs the line break from the first
//!    10,000 bytes, caches the header row and supports `rewind`.
//!
//! 2. **CsvWriter**: encodes one record per call, wrapping every field in the
//!    enclosure and doubling embedded enclosures, and writes each row with a
//!    single write call.
//!
//! Both components follow the builder pattern for configuration; invalid
//! settings are rejected before any byte is read or written.
//!
//! # Ownership
//!
//! A reader or writer built from a path, or handed a stream by value, owns
//! that stream and closes it when dropped. Built with `from_borrowed_*`, it
//! only borrows the stream, which stays open and usable afterwards.
//!
//! # Examples
//!
//! ## Round trip
//!
//! ```
//! use csv_parser_rs::item::csv::{csv_reader::CsvReaderBuilder, csv_writer::CsvWriterBuilder};
//! use std::io::Cursor;
//!
//! let mut buffer = Vec::new();
//! {
//!     let writer = CsvWriterBuilder::new()
//!         .line_break("\r\n")
//!         .from_borrowed_writer(&mut buffer)
//!         .unwrap();
//!
//!     writer.write_row(&["product", "note"]).unwrap();
//!     writer.write_row(&["Logitech Mouse", "says \"click\", twice"]).unwrap();
//!     writer.write_row(&["HP Laptop X", "two\nlines"]).unwrap();
//! }
//!
//! let reader = CsvReaderBuilder::new()
//!     .from_reader(Cursor::new(buffer))
//!     .unwrap();
//!
//! assert_eq!(reader.header(), ["product", "note"]);
//!
//! let rows: Vec<Vec<String>> = reader.collect();
//! assert_eq!(rows[0], ["Logitech Mouse", "says \"click\", twice"]);
//! assert_eq!(rows[1], ["HP Laptop X", "two\nlines"]);
//! ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;

/// Dialect defaults, validation and the line break type.
pub mod dialect;

/// Line break sniffing.
pub mod line_break;

mod source;

/// Owned or borrowed streams.
pub mod stream;

/// One decoded record: its fields, in order.
pub type Record = Vec<String>;
