use std::io::{self, Read, Seek, SeekFrom};

use super::stream::StreamHandle;

const CHUNK_SIZE: usize = 8 * 1024;

/// Where the scanner stands relative to the field being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldState {
    Start,
    Unquoted,
    Quoted,
    Escaped,
    QuoteInQuoted,
}

/// Byte source handed to the `csv` decoder, which splits records on `\n`.
///
/// Outside an enclosed field, a `\r` directly before `\n` is dropped, so
/// `\r\n` and `\n` end records alike while a `\r` inside an enclosure stays
/// content. A `\r` ending the stream is dropped too.
///
/// Inside an enclosed field, an escape character keeps the byte that follows
/// it literal and stays in the decoded value. An escaped enclosure is passed
/// on doubled, so the decoder reads it as content instead of the field end.
///
/// The source also counts the bytes it produced and notes when the stream
/// ended, which tells the reader whether the last record was terminated.
pub(crate) struct RecordSource<'a, R> {
    inner: StreamHandle<'a, R>,
    delimiter: u8,
    enclosure: Option<u8>,
    escape: Option<u8>,
    state: FieldState,
    held_return: bool,
    chunk: Vec<u8>,
    pending: Vec<u8>,
    offset: usize,
    produced: u64,
    last: Option<u8>,
    finished: bool,
}

impl<'a, R> RecordSource<'a, R> {
    pub(crate) fn new(
        inner: StreamHandle<'a, R>,
        delimiter: u8,
        enclosure: Option<u8>,
        escape: Option<u8>,
    ) -> Self {
        // Escaping needs an enclosure, and an escape equal to it is just the enclosure
        let escape = escape.filter(|escape| enclosure.is_some_and(|quote| quote != *escape));

        Self {
            inner,
            delimiter,
            enclosure,
            escape,
            state: FieldState::Start,
            held_return: false,
            chunk: vec![0; CHUNK_SIZE],
            pending: Vec::with_capacity(CHUNK_SIZE),
            offset: 0,
            produced: 0,
            last: None,
            finished: false,
        }
    }

    /// Bytes handed to the decoder since the last seek.
    pub(crate) fn produced(&self) -> u64 {
        self.produced
    }

    /// `true` once the underlying stream reported its end.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn last_byte(&self) -> Option<u8> {
        self.last
    }

    pub(crate) fn into_inner(self) -> StreamHandle<'a, R> {
        self.inner
    }

    fn translate(&mut self, len: usize) {
        self.pending.clear();
        self.offset = 0;

        for index in 0..len {
            let byte = self.chunk[index];
            self.feed(byte);
        }
    }

    fn feed(&mut self, byte: u8) {
        if self.held_return {
            self.held_return = false;
            if byte != b'\n' {
                self.step(b'\r');
            }
        }

        if byte == b'\r' && !matches!(self.state, FieldState::Quoted | FieldState::Escaped) {
            self.held_return = true;
            return;
        }

        self.step(byte);
    }

    fn step(&mut self, byte: u8) {
        self.pending.push(byte);

        let is_enclosure = self.enclosure == Some(byte);
        let is_separator = byte == self.delimiter || byte == b'\n';
        let state = self.state;

        self.state = match state {
            FieldState::Start if is_enclosure => FieldState::Quoted,
            FieldState::Start | FieldState::Unquoted | FieldState::QuoteInQuoted
                if is_separator =>
            {
                FieldState::Start
            }
            FieldState::Start | FieldState::Unquoted => FieldState::Unquoted,
            FieldState::Quoted if self.escape == Some(byte) => FieldState::Escaped,
            FieldState::Quoted if is_enclosure => FieldState::QuoteInQuoted,
            FieldState::Quoted => FieldState::Quoted,
            FieldState::Escaped => {
                if is_enclosure {
                    self.pending.push(byte);
                }
                FieldState::Quoted
            }
            FieldState::QuoteInQuoted if is_enclosure => FieldState::Quoted,
            FieldState::QuoteInQuoted => FieldState::Unquoted,
        };
    }

    fn reset(&mut self) {
        self.state = FieldState::Start;
        self.held_return = false;
        self.pending.clear();
        self.offset = 0;
        self.produced = 0;
        self.last = None;
        self.finished = false;
    }
}

impl<R: Read> Read for RecordSource<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset == self.pending.len() {
            let len = self.inner.read(&mut self.chunk)?;
            if len == 0 {
                self.held_return = false;
                self.finished = true;
                return Ok(0);
            }
            self.translate(len);
        }

        let available = &self.pending[self.offset..];
        let count = available.len().min(buf.len());
        buf[..count].copy_from_slice(&available[..count]);

        self.offset += count;
        self.produced += count as u64;
        self.last = Some(buf[count - 1]);
        Ok(count)
    }
}

impl<R: Seek> Seek for RecordSource<'_, R> {
    /// `produced` restarts from zero, so it stays exact for seeks to the start.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = self.inner.seek(pos)?;
        self.reset();
        Ok(position)
    }
}
