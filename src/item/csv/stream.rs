use std::io::{self, Read, Seek, SeekFrom, Write};

/// The byte stream behind a reader or writer.
///
/// `Owned` streams were opened by the component (or handed over by value) and
/// are closed when the component is dropped. `Borrowed` streams belong to the
/// caller, who keeps them open and usable after the component is gone.
#[derive(Debug)]
pub enum StreamHandle<'a, S> {
    Owned(S),
    Borrowed(&'a mut S),
}

impl<S> StreamHandle<'_, S> {
    /// `true` if dropping this handle closes the stream.
    pub fn is_owned(&self) -> bool {
        matches!(self, StreamHandle::Owned(_))
    }

    pub fn get_ref(&self) -> &S {
        match self {
            StreamHandle::Owned(stream) => stream,
            StreamHandle::Borrowed(stream) => stream,
        }
    }

    pub fn get_mut(&mut self) -> &mut S {
        match self {
            StreamHandle::Owned(stream) => stream,
            StreamHandle::Borrowed(stream) => stream,
        }
    }

    /// Gives an owned stream back; a borrowed one yields `None`.
    pub fn into_owned(self) -> Option<S> {
        match self {
            StreamHandle::Owned(stream) => Some(stream),
            StreamHandle::Borrowed(_) => None,
        }
    }
}

impl<S: Read> Read for StreamHandle<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.get_mut().read(buf)
    }
}

impl<S: Seek> Seek for StreamHandle<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.get_mut().seek(pos)
    }
}

impl<S: Write> Write for StreamHandle<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.get_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.get_mut().flush()
    }
}
