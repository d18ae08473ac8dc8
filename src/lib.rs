#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # CSV Parser for Rust

 A streaming CSV codec: a reader that lazily decodes records from a seekable
 byte stream, and a writer that encodes records back into a correctly quoted
 byte stream.

 ## Core Concepts

- **CsvReader:** A forward-only cursor over a `Read + Seek` source. It sniffs the line break from the first 10,000 bytes, caches the header row, and decodes one record per `advance`. `rewind` restarts it from the first data record.
- **CsvWriter:** Encodes one record per call. Every field is wrapped in the enclosure and embedded enclosures are doubled, whether or not the field needs it. Each row reaches the stream in a single write; a short write is an error.
- **Dialect:** Delimiter, enclosure, escape character and line break. Delimiters are exactly one character, enclosures and escape characters at most one.
- **ParserError:** Failures classified as `FileNotExists`, `InvalidParameter` or `WriteError`.
- **Tasklet:** A single unit of work run inside a step, which turns failures into accumulated messages and a success flag.

 ## Features

| **Feature**   | **Description**                                                        |
|---------------|------------------------------------------------------------------------|
| brand-count   | Enables the tasklet counting products per brand into a brands CSV file |
| full          | Enables all available features                                         |

 ## Getting Started

```rust
# use csv_parser_rs::{
#     error::ParserError,
#     item::csv::{csv_reader::CsvReaderBuilder, csv_writer::CsvWriterBuilder},
# };
# use std::io::Cursor;
fn main() -> Result<(), ParserError> {
    let csv = "year,make,model,description\r\n\
               1948,Porsche,356,Luxury sports car\r\n\
               1967,Ford,\"Mustang fastback 1967\",\"American car, \"\"pony\"\" class\"\r\n";

    let reader = CsvReaderBuilder::new().from_reader(Cursor::new(csv))?;
    assert_eq!(reader.column_count(), 4);

    let mut output = Vec::new();
    {
        let writer = CsvWriterBuilder::new()
            .delimiter(";")
            .from_borrowed_writer(&mut output)?;

        writer.write_row(reader.header())?;
        for row in reader {
            writer.write_row(&row)?;
        }
    }

    let output = String::from_utf8(output).unwrap();
    assert!(output.ends_with("\"1967\";\"Ford\";\"Mustang fastback 1967\";\"American car, \"\"pony\"\" class\"\n"));

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for readers, writers and steps
pub mod core;

/// Error types for parsing and writing
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers (for example: csv reader and writer)
pub mod item;

/// Set of tasklets built on the readers and writers
pub mod tasklet;
