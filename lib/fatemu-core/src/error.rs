use std::fmt;

use crate::BlockRef;

/// Why a chain walk stopped short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainBreak {
    /// A referenced block record does not exist.
    MissingBlock,
    /// The walk went on for longer than the configured hop limit
    /// (the chain most likely loops back on itself).
    TooManyHops,
}

#[derive(Debug)]
pub enum FatError {
    /// Caller input violates a precondition; nothing was written.
    Validation(String),
    /// A directory entry or record does not exist.
    NotFound(String),
    /// A chain traversal hit a missing or cyclic link.
    BrokenChain {
        /// The last block that was read successfully, if any.
        last_good: Option<BlockRef>,
        /// The reference the walk could not follow.
        missing: BlockRef,
        cause: ChainBreak,
    },
    /// A persisted record could not be decoded.
    Format { record: String, reason: String },
    /// The record store itself failed.
    Store(std::io::Error),
}

pub type Result<T> = std::result::Result<T, FatError>;

impl FatError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn format(record: &str, reason: impl fmt::Display) -> Self {
        Self::Format {
            record: record.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Maps a store error on `record` to NotFound when appropriate.
    pub(crate) fn from_store(record: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(record.to_owned())
        } else {
            Self::Store(err)
        }
    }
}

impl fmt::Display for FatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatError::Validation(msg) => write!(f, "invalid input: {msg}"),
            FatError::NotFound(name) => write!(f, "'{name}' not found"),
            FatError::BrokenChain {
                last_good,
                missing,
                cause,
            } => {
                let last_good = last_good.as_ref().map(BlockRef::as_str).unwrap_or("<head>");
                match cause {
                    ChainBreak::MissingBlock => write!(
                        f,
                        "broken chain: block '{missing}' (linked from '{last_good}') is missing"
                    ),
                    ChainBreak::TooManyHops => write!(
                        f,
                        "broken chain: hop limit reached at '{missing}' (linked from '{last_good}')"
                    ),
                }
            }
            FatError::Format { record, reason } => {
                write!(f, "record '{record}' is malformed: {reason}")
            }
            FatError::Store(err) => write!(f, "record store error: {err}"),
        }
    }
}

impl std::error::Error for FatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FatError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FatError {
    fn from(err: std::io::Error) -> Self {
        FatError::Store(err)
    }
}

pub fn to_ioerror(err: FatError) -> std::io::Error {
    use std::io::Error;
    use std::io::ErrorKind;

    match err {
        FatError::Validation(msg) => Error::new(ErrorKind::InvalidInput, msg),
        FatError::NotFound(name) => Error::new(ErrorKind::NotFound, name),
        err @ FatError::BrokenChain { .. } => Error::new(ErrorKind::InvalidData, err.to_string()),
        err @ FatError::Format { .. } => Error::new(ErrorKind::InvalidData, err.to_string()),
        FatError::Store(err) => err,
    }
}
