//! Error types for locking operations

use serde::{Deserialize, Serialize};
use store::StoreError;
use thiserror::Error;

/// Which way a codec was running when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecDirection {
    /// Reading the input document
    Decode,
    /// Writing the locked document
    Encode,
}

impl std::fmt::Display for CodecDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecDirection::Decode => f.write_str("decoding"),
            CodecDirection::Encode => f.write_str("encoding"),
        }
    }
}

/// Errors surfaced to the caller of a lock request
#[derive(Debug, Error)]
pub enum LockError {
    /// The document or workbook content cannot be understood
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The declared document type is not handled
    #[error("Unsupported document kind: {0}")]
    UnsupportedKind(String),

    /// The package or grid codec failed
    #[error("Codec failure while {direction} the document: {source}")]
    CodecFailure {
        direction: CodecDirection,
        #[source]
        source: StoreError,
    },
}

impl LockError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            LockError::MalformedInput(_) => "malformed_input",
            LockError::UnsupportedKind(_) => "unsupported_kind",
            LockError::CodecFailure { .. } => "codec_failure",
        }
    }

    /// Wrap a failure from reading the input.
    ///
    /// Unreadable part content is malformed input; container and reader
    /// failures are decode failures.
    pub(crate) fn decode(err: StoreError) -> Self {
        if err.is_malformed_content() {
            LockError::MalformedInput(err.to_string())
        } else {
            LockError::CodecFailure {
                direction: CodecDirection::Decode,
                source: err,
            }
        }
    }

    /// Wrap a failure from writing the output
    pub(crate) fn encode(err: StoreError) -> Self {
        LockError::CodecFailure {
            direction: CodecDirection::Encode,
            source: err,
        }
    }

    /// Wrap a failure from mutating the decoded model
    pub(crate) fn transform(err: impl std::fmt::Display) -> Self {
        LockError::MalformedInput(format!("cannot lock document: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_classification() {
        let err = LockError::decode(StoreError::XmlParse("unexpected end".to_string()));
        assert!(matches!(err, LockError::MalformedInput(_)));
        assert_eq!(err.kind(), "malformed_input");

        let zip_failure = store::PartMap::extract(b"not a zip").unwrap_err();
        let err = LockError::decode(zip_failure);
        assert!(matches!(
            err,
            LockError::CodecFailure {
                direction: CodecDirection::Decode,
                ..
            }
        ));
        assert!(err.to_string().contains("decoding"));
    }

    #[test]
    fn test_encode_is_codec_failure() {
        let err = LockError::encode(StoreError::Io(std::io::Error::other("disk full")));
        assert_eq!(err.kind(), "codec_failure");
        assert!(err.to_string().contains("encoding"));
    }
}
