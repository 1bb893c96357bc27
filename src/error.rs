use crate::prelude::*;

/// The error type for index operations.
///
/// Missing keys are not errors: lookups return `Option` and mutations on an
/// absent key are no-ops. Everything that reaches this type is fatal for the
/// operation that produced it.
#[derive(Debug)]
pub struct Error {
    repr: Repr,
}

impl Error {
    /// Returns the corresponding `ErrorKind` for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match &self.repr {
            Repr::Inner(k) => k.clone(),
            _ => ErrorKind::Other,
        }
    }

    pub(crate) fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self {
            repr: Repr::Other(error.into()),
        }
    }

    pub(crate) fn validation(kind: ValidationErrorKind, cause: impl Into<String>) -> Self {
        ErrorKind::Validation {
            kind,
            cause: cause.into(),
        }
        .into()
    }

    pub(crate) fn size_mismatch(expected: u64, actual: u64) -> Self {
        ErrorKind::SizeMismatch { expected, actual }.into()
    }

    pub(crate) fn invalid_key(cause: impl Into<String>) -> Self {
        ErrorKind::InvalidKey(cause.into()).into()
    }

    pub(crate) fn wrong_config(cause: impl Into<String>) -> Self {
        ErrorKind::WrongConfig(cause.into()).into()
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            Repr::Inner(_) => None,
            Repr::Other(src) => Some(src.as_ref()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.repr {
            Repr::Inner(kind) => Display::fmt(kind, f),
            Repr::Other(e) => Display::fmt(e, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            repr: Repr::Inner(kind),
        }
    }
}

impl From<IOError> for Error {
    fn from(e: IOError) -> Self {
        ErrorKind::Io(e.to_string()).into()
    }
}

impl From<Box<bincode::ErrorKind>> for Error {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        ErrorKind::Bincode(e.to_string()).into()
    }
}

impl From<TryFromIntError> for Error {
    fn from(e: TryFromIntError) -> Self {
        ErrorKind::Conversion(e.to_string()).into()
    }
}

#[derive(Debug)]
enum Repr {
    Inner(ErrorKind),
    Other(Box<dyn error::Error + 'static + Send + Sync>),
}

/// A list specifying categories of index error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// std::io::Error
    #[error("io error: {0}")]
    Io(String),
    /// Bincode serialization deserialization error
    #[error("bincode error: {0}")]
    Bincode(String),
    /// Offset or counter does not fit the on-disk integer width
    #[error("conversion error: {0}")]
    Conversion(String),
    /// The index file is structurally inconsistent
    #[error("{kind} validation failed: {cause}")]
    Validation {
        /// What part of the file failed
        kind: ValidationErrorKind,
        /// Human readable details
        cause: String,
    },
    /// Serialized record size differs from the fixed layout of the index
    #[error("record size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size dictated by the layout
        expected: u64,
        /// Size actually produced by the serializer
        actual: u64,
    },
    /// Key could not be converted into its canonical form
    #[error("invalid key: {0}")]
    InvalidKey(String),
    /// Input configuration is wrong
    #[error("wrong config: {0}")]
    WrongConfig(String),
    /// Other error
    #[error("other error")]
    Other,
}

/// Which structure of the index file failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Header at offset zero is malformed
    IndexHeader,
    /// A handle points outside of the file
    DanglingHandle,
    /// `prev`/`next` links disagree or the chain does not end at the header's last segment
    BrokenChain,
    /// Keys are not strictly ascending
    Ordering,
    /// A segment holds more entries than the split size allows
    Occupancy,
}

impl Display for ValidationErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::IndexHeader => "index header",
            Self::DanglingHandle => "handle",
            Self::BrokenChain => "segment chain",
            Self::Ordering => "key order",
            Self::Occupancy => "segment occupancy",
        };
        f.write_str(name)
    }
}
