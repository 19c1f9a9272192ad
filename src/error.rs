//! use chainkit::error::ChainKitError;

use thiserror::Error;
use time::OffsetDateTime;

use crate::tier::CertificateTier;

/// Represents errors that can occur while building or exporting a chain.
///
/// The `String` payloads carry the message of the underlying library error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainKitError {
    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The key provider could not produce a key pair.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Clamping the desired window to the issuer's window left nothing.
    #[error("Invalid validity window: not before {not_before} is after not after {not_after}")]
    InvalidValidityWindow {
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    },

    /// Encoding or signing the certificate failed.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Bundle serialization or the file write failed.
    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<der::Error> for ChainKitError {
    /// Converts a `der::Error` into a `ChainKitError`.
    fn from(err: der::Error) -> Self {
        ChainKitError::EncodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for ChainKitError {
    fn from(err: pkcs8::Error) -> Self {
        ChainKitError::EncodingError(err.to_string())
    }
}

impl From<std::io::Error> for ChainKitError {
    fn from(err: std::io::Error) -> Self {
        ChainKitError::ExportError(err.to_string())
    }
}

/// A chain build failure, tagged with the tier that was being issued.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("failed to build {tier} certificate: {source}")]
pub struct ChainConstructionError {
    pub tier: CertificateTier,
    #[source]
    pub source: ChainKitError,
}

impl ChainConstructionError {
    pub fn new(tier: CertificateTier, source: ChainKitError) -> Self {
        Self { tier, source }
    }
}

pub type Result<T> = std::result::Result<T, ChainKitError>;
