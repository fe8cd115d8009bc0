use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("Decompression error")]
    Decompression,

    #[error("Corrupted slice")]
    Corrupted,

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    #[error("Slice version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
}

impl PersistError {
    /// Whether the session open can salvage around this failure by
    /// substituting defaults for the slice.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PersistError::Io(_) => true,
            PersistError::Corrupted => true,
            PersistError::ChecksumMismatch => true,
            PersistError::Decompression => true,
            PersistError::Deserialization(_) => true,
            PersistError::Serialization(_) => false,
            PersistError::VersionMismatch { .. } => false,
        }
    }
}
