//! Positioned byte reader the decoder consumes its input through.
//!
//! The reader wraps any `Read + Seek` source and performs typed reads
//! honoring a configurable byte order. Failing reads carry the offset and
//! size of the attempted access so callers can report precise file ranges.

use std::io::{self, Read, Seek, SeekFrom};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

/// Byte order applied to multi-byte reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endianness {
    Little,
    Big,
}

/// The `{offset, size}` of a failing read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadOperation {
    pub offset: u64,
    pub size: u64,
}

/// Failure classes a [`Reader`] can report.
#[derive(thiserror::Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReadErrorCode {
    #[error("unknown error")]
    Unknown,
    #[error("memory allocation failure")]
    MemoryAllocationFailure,
    #[error("file not found")]
    FileNotFound,
    #[error("i/o error")]
    IoError,
}

/// Error raised by [`Reader`] operations. The operation is present when the
/// failure happened during a typed read.
#[derive(thiserror::Error, Clone, Copy, Debug, Eq, PartialEq)]
#[error("{code}")]
pub struct ReadError {
    pub code: ReadErrorCode,
    pub operation: Option<ReadOperation>,
}

impl ReadError {
    pub(crate) fn from_io(err: io::Error, operation: Option<ReadOperation>) -> ReadError {
        let code = match err.kind() {
            io::ErrorKind::NotFound => ReadErrorCode::FileNotFound,
            io::ErrorKind::OutOfMemory => ReadErrorCode::MemoryAllocationFailure,
            _ => ReadErrorCode::IoError,
        };

        ReadError { code, operation }
    }
}

/// Positioned reader over a `Read + Seek` source.
pub struct Reader<R> {
    inner: R,
    endianness: Endianness,
}

impl<R: Read + Seek> Reader<R> {
    /// Wrap a source. Multi-byte reads start out little-endian; callers
    /// commit the actual byte order with [`Reader::set_endianness`].
    pub fn new(inner: R) -> Reader<R> {
        Reader {
            inner,
            endianness: Endianness::Little,
        }
    }

    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> Result<(), ReadError> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|e| ReadError::from_io(e, None))
    }

    /// Absolute offset of the cursor.
    pub fn offset(&mut self) -> Result<u64, ReadError> {
        self.inner
            .stream_position()
            .map_err(|e| ReadError::from_io(e, None))
    }

    pub fn u8(&mut self) -> Result<u8, ReadError> {
        let offset = self.offset()?;
        self.inner
            .read_u8()
            .map_err(|e| ReadError::from_io(e, Some(ReadOperation { offset, size: 1 })))
    }

    pub fn u16(&mut self) -> Result<u16, ReadError> {
        let offset = self.offset()?;
        match self.endianness {
            Endianness::Little => self.inner.read_u16::<LittleEndian>(),
            Endianness::Big => self.inner.read_u16::<BigEndian>(),
        }
        .map_err(|e| ReadError::from_io(e, Some(ReadOperation { offset, size: 2 })))
    }

    pub fn u32(&mut self) -> Result<u32, ReadError> {
        let offset = self.offset()?;
        match self.endianness {
            Endianness::Little => self.inner.read_u32::<LittleEndian>(),
            Endianness::Big => self.inner.read_u32::<BigEndian>(),
        }
        .map_err(|e| ReadError::from_io(e, Some(ReadOperation { offset, size: 4 })))
    }

    pub fn i32(&mut self) -> Result<i32, ReadError> {
        let offset = self.offset()?;
        match self.endianness {
            Endianness::Little => self.inner.read_i32::<LittleEndian>(),
            Endianness::Big => self.inner.read_i32::<BigEndian>(),
        }
        .map_err(|e| ReadError::from_io(e, Some(ReadOperation { offset, size: 4 })))
    }
}
