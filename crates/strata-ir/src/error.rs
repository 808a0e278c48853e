use thiserror::Error;

/// Stable machine-readable code for every [`FormatError`].
///
/// Codes are part of the interchange contract: tools match on them, so they
/// never change once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Malformed,
    BadMagic,
    VersionMismatch,
    MissingViewport,
    MissingLayers,
    MissingChecksum,
    ChecksumMismatch,
    Schema,
    Encode,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Malformed => "E_MALFORMED",
            ErrorCode::BadMagic => "E_MAGIC",
            ErrorCode::VersionMismatch => "E_VERSION",
            ErrorCode::MissingViewport => "E_VIEWPORT",
            ErrorCode::MissingLayers => "E_LAYERS",
            ErrorCode::MissingChecksum => "E_CHECKSUM_MISSING",
            ErrorCode::ChecksumMismatch => "E_CHECKSUM",
            ErrorCode::Schema => "E_SCHEMA",
            ErrorCode::Encode => "E_ENCODE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to encode or decode an interchange document.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("document is not valid JSON: {0}")]
    Malformed(String),

    #[error("unrecognized document magic {found:?}")]
    BadMagic { found: Option<String> },

    #[error("schema version {found} is incompatible with {supported}")]
    VersionMismatch { found: String, supported: &'static str },

    #[error("viewport metadata missing or invalid: `{field}`")]
    MissingViewport { field: &'static str },

    #[error("document has no layer list")]
    MissingLayers,

    #[error("document carries no checksum")]
    MissingChecksum,

    #[error("checksum mismatch: document says {expected}, content hashes to {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("document does not match the layer schema: {0}")]
    Schema(String),

    #[error("cannot serialize document: {0}")]
    Encode(String),
}

impl FormatError {
    #[inline]
    pub fn code(&self) -> ErrorCode {
        match self {
            FormatError::Malformed(_) => ErrorCode::Malformed,
            FormatError::BadMagic { .. } => ErrorCode::BadMagic,
            FormatError::VersionMismatch { .. } => ErrorCode::VersionMismatch,
            FormatError::MissingViewport { .. } => ErrorCode::MissingViewport,
            FormatError::MissingLayers => ErrorCode::MissingLayers,
            FormatError::MissingChecksum => ErrorCode::MissingChecksum,
            FormatError::ChecksumMismatch { .. } => ErrorCode::ChecksumMismatch,
            FormatError::Schema(_) => ErrorCode::Schema,
            FormatError::Encode(_) => ErrorCode::Encode,
        }
    }
}
