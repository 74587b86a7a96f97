use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use bytes::Bytes;

/// A readable, sized-if-known byte source supplied by the host transport.
///
/// Dropping a stream closes it.
pub trait ByteStream {
    /// Read up to `buf.len()` bytes. Returns `Ok(0)` at end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Total size of the stream, if the transport knows it.
    fn size(&self) -> Option<u64> {
        None
    }

    /// Whether end of stream has been observed.
    fn is_eof(&self) -> bool;
}

impl<S: ByteStream + ?Sized> ByteStream for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn size(&self) -> Option<u64> {
        (**self).size()
    }

    fn is_eof(&self) -> bool {
        (**self).is_eof()
    }
}

/// Stream over a local file.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    size: Option<u64>,
    eof: bool,
}

impl FileStream {
    /// Open a file for reading.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata().ok().map(|m| m.len());
        Ok(Self {
            file,
            size,
            eof: false,
        })
    }
}

impl ByteStream for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.eof = true;
        }
        Ok(n)
    }

    fn size(&self) -> Option<u64> {
        self.size
    }

    fn is_eof(&self) -> bool {
        self.eof
    }
}

/// Stream over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct MemoryStream {
    data: Bytes,
    pos: usize,
    report_size: bool,
}

impl MemoryStream {
    /// Stream that reports its size.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            report_size: true,
        }
    }

    /// Stream that hides its size, like a pipe or chunked HTTP body.
    pub fn without_size(data: impl Into<Bytes>) -> Self {
        Self {
            report_size: false,
            ..Self::new(data)
        }
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl ByteStream for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn size(&self) -> Option<u64> {
        self.report_size.then_some(self.data.len() as u64)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }
}
