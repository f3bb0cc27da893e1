//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

use crate::types::Tag;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`tempfile::PersistError`]
    #[error(transparent)]
    PersistError(#[from] tempfile::PersistError),

    /// file is not a valid m3 container
    #[error("file is not a valid m3 container: {reason}")]
    #[diagnostic(code(m3::corrupt_container))]
    CorruptContainer { reason: String },

    /// a declared offset or count runs past the available data
    #[error("{what} extends to {end} but only {len} are available")]
    #[diagnostic(code(m3::truncated_data))]
    TruncatedData { what: String, end: u64, len: u64 },

    /// no layout is known for the requested tag and version
    #[error("no layout for {tag} version {version}")]
    #[diagnostic(
        code(m3::unsupported_version),
        help("documented versions of {tag}: {documented}")
    )]
    UnsupportedVersion {
        tag: Tag,
        version: u32,
        documented: String,
    },

    /// a reference or index points outside its target
    #[error("{record}.{field} refers to index {index} of {target}")]
    #[diagnostic(code(m3::dangling_reference))]
    DanglingReference {
        record: String,
        field: String,
        index: u32,
        target: String,
    },

    /// a section is reachable from itself
    #[error("section {tag} at offset {offset:#x} is reachable from itself")]
    #[diagnostic(code(m3::cyclic_reference))]
    CyclicReference { tag: Tag, offset: u32 },

    /// keyframe times are not strictly ascending
    #[error("{field}: keyframe {position} at time {time} does not follow time {previous}")]
    #[diagnostic(code(m3::invalid_key_order))]
    InvalidKeyOrder {
        field: String,
        position: usize,
        previous: i32,
        time: i32,
    },

    /// a field holds a value of the wrong kind for its schema
    #[error("{tag}.{field} holds {found} where {expected} was expected")]
    #[diagnostic(code(m3::invalid_field))]
    InvalidField {
        tag: Tag,
        field: String,
        expected: String,
        found: String,
    },

    /// a session was driven out of order
    #[error("cannot {action} a session in the {stage} stage")]
    #[diagnostic(code(m3::invalid_transition))]
    InvalidTransition {
        stage: &'static str,
        action: &'static str,
    },
}

/// Coarse classification of [`Error`], cheap to copy and compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::derive::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorKind {
    Io,
    CorruptContainer,
    TruncatedData,
    UnsupportedVersion,
    DanglingReference,
    CyclicReference,
    InvalidKeyOrder,
    InvalidField,
    InvalidTransition,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IOError(_) | Error::PersistError(_) => ErrorKind::Io,
            Error::BinRWError(binrw::Error::Io(_)) => ErrorKind::Io,
            Error::BinRWError(_) => ErrorKind::CorruptContainer,
            Error::CorruptContainer { .. } => ErrorKind::CorruptContainer,
            Error::TruncatedData { .. } => ErrorKind::TruncatedData,
            Error::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            Error::DanglingReference { .. } => ErrorKind::DanglingReference,
            Error::CyclicReference { .. } => ErrorKind::CyclicReference,
            Error::InvalidKeyOrder { .. } => ErrorKind::InvalidKeyOrder,
            Error::InvalidField { .. } => ErrorKind::InvalidField,
            Error::InvalidTransition { .. } => ErrorKind::InvalidTransition,
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Error, ErrorKind};
    use crate::types::tags;

    #[test]
    fn kind_follows_variant() {
        let err = Error::CyclicReference {
            tag: tags::BONE,
            offset: 0x40,
        };
        assert_eq!(err.kind(), ErrorKind::CyclicReference);
        assert_eq!(
            err.to_string(),
            "section BONE at offset 0x40 is reachable from itself"
        );

        let io = Error::from(std::io::Error::other("disk"));
        assert_eq!(io.kind(), ErrorKind::Io);
    }
}
