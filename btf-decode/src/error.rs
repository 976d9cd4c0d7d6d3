use crate::reader::{ReadError, ReadErrorCode};

pub type Result<T> = std::result::Result<T, BtfError>;

/// Byte range of the input the error relates to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileRange {
    /// Absolute file offset of the first byte.
    pub offset: u64,
    /// Length of the range in bytes.
    pub size: u64,
}

/// Failure classes reported while decoding BTF data.
#[derive(thiserror::Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Unclassified failure.
    #[error("unknown error")]
    Unknown,
    #[error("memory allocation failure")]
    MemoryAllocationFailure,
    #[error("file not found")]
    FileNotFound,
    #[error("i/o error")]
    IoError,
    /// The header magic matches neither byte order.
    #[error("invalid magic value")]
    InvalidMagicValue,
    /// The kind value is not in the supported set.
    #[error("invalid BTF kind")]
    InvalidBtfKind,
    #[error("invalid int type encoding")]
    InvalidIntEncoding,
    #[error("invalid ptr type encoding")]
    InvalidPtrEncoding,
    #[error("invalid array type encoding")]
    InvalidArrayEncoding,
    #[error("invalid typedef type encoding")]
    InvalidTypedefEncoding,
    #[error("invalid enum type encoding")]
    InvalidEnumEncoding,
    #[error("invalid func proto type encoding")]
    InvalidFuncProtoEncoding,
    #[error("invalid volatile type encoding")]
    InvalidVolatileEncoding,
    #[error("invalid fwd type encoding")]
    InvalidFwdEncoding,
    #[error("invalid func type encoding")]
    InvalidFuncEncoding,
}

/// Error type returned by all decoding operations: a failure class plus the
/// file range it was detected on, when one is known.
#[derive(thiserror::Error, Clone, Copy, Debug, Eq, PartialEq)]
#[error("{}", describe(.code, .range))]
pub struct BtfError {
    pub code: ErrorCode,
    pub range: Option<FileRange>,
}

impl BtfError {
    pub(crate) fn new(code: ErrorCode, range: Option<FileRange>) -> BtfError {
        BtfError { code, range }
    }
}

/// Reader failures convert with their code preserved and the failing read
/// operation, if any, carried over as the file range.
impl From<ReadError> for BtfError {
    fn from(err: ReadError) -> BtfError {
        BtfError {
            code: match err.code {
                ReadErrorCode::Unknown => ErrorCode::Unknown,
                ReadErrorCode::MemoryAllocationFailure => ErrorCode::MemoryAllocationFailure,
                ReadErrorCode::FileNotFound => ErrorCode::FileNotFound,
                ReadErrorCode::IoError => ErrorCode::IoError,
            },
            range: err.operation.map(|op| FileRange {
                offset: op.offset,
                size: op.size,
            }),
        }
    }
}

fn describe(code: &ErrorCode, range: &Option<FileRange>) -> String {
    match range {
        Some(range) => format!(
            "{code} (file range: offset {:#x}, {} bytes)",
            range.offset, range.size
        ),
        None => code.to_string(),
    }
}
