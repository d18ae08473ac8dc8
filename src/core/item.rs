use crate::error::ParserError;

/// Represents the result of reading an item from the reader.
///
/// `Ok(None)` signals the end of the source.
pub type ItemReaderResult<I> = Result<Option<I>, ParserError>;

/// Represents the result of writing items.
pub type ItemWriterResult = Result<(), ParserError>;

/// A source of items consumed one at a time, in order.
pub trait ItemReader<I> {
    /// Reads the next item, or `Ok(None)` once the source is exhausted.
    fn read(&mut self) -> ItemReaderResult<I>;
}

/// A sink accepting one item per call.
pub trait ItemWriter<O: ?Sized> {
    /// Writes a single item.
    fn write(&self, item: &O) -> ItemWriterResult;

    /// Flushes anything the writer or its target still buffers.
    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }
}
