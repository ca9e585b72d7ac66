//! Error types for group provider operations.
//!
//! Construction-time failures (key loading, pattern compilation, missing
//! configuration) are fatal and abort provider construction. Listing
//! failures are recoverable: [`crate::provider::OktaGroupProvider::get_groups`]
//! absorbs them and degrades to an empty group set.

use std::path::PathBuf;

/// Errors that can occur while loading a private key file.
///
/// All variants carry the attempted path so startup logs point at the
/// offending file. These are fatal: a provider is never constructed
/// without a usable signing key.
#[derive(Debug, thiserror::Error)]
pub enum KeyLoadError {
    /// The key file could not be read.
    #[error("Failed to read private key file {path}: {source}")]
    Read {
        /// The attempted file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The cleaned file content is not valid base64.
    #[error("Private key file {path} is not valid base64 after stripping PEM markers: {source}")]
    InvalidBase64 {
        /// The attempted file path.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded bytes could not be re-encoded for the JWT library.
    #[error("Failed to prepare signing key from {path}: {message}")]
    InvalidKey {
        /// The attempted file path.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The decoded bytes are not an unencrypted PKCS#8 key of a supported
    /// algorithm (RSA or P-384).
    #[error(
        "Private key file {path} does not contain an unencrypted PKCS#8 RSA or P-384 key \
         (note: PKCS#1 \"BEGIN RSA PRIVATE KEY\" payloads are not supported)"
    )]
    UnsupportedKey {
        /// The attempted file path.
        path: PathBuf,
    },
}

/// Error returned when a group name pattern fails to compile.
///
/// Fatal at construction time, like [`KeyLoadError`].
#[derive(Debug, thiserror::Error)]
#[error("Invalid group name pattern {pattern:?}: {source}")]
pub struct PatternError {
    /// The pattern string as configured.
    pub pattern: String,
    /// The underlying regex compilation error.
    #[source]
    pub source: regex::Error,
}

/// Errors that can occur while listing a user's groups from Okta.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The token endpoint rejected the client-credentials request.
    #[error("Token request failed: {0}")]
    TokenRequestFailed(String),

    /// Okta returned an OAuth error body.
    #[error("OAuth error from Okta: {error} - {description}")]
    OAuth {
        /// The OAuth error code.
        error: String,
        /// Optional error description.
        description: String,
    },

    /// Signing the client assertion failed.
    #[error("Failed to sign client assertion: {0}")]
    Assertion(#[from] jsonwebtoken::errors::Error),

    /// The groups endpoint returned a non-success status.
    #[error("Group listing failed: {0}")]
    ListingFailed(String),

    /// A response body could not be decoded.
    #[error("Malformed response from Okta: {0}")]
    MalformedResponse(String),

    /// The configured Okta domain does not form a valid URL.
    #[error("Invalid Okta org URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ListingError {
    /// Creates an `OAuth` error from a decoded error body.
    #[must_use]
    pub fn oauth(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }
}

/// Errors produced while reading provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required configuration property is absent.
    #[error("Missing required configuration property: {0}")]
    MissingProperty(&'static str),

    /// A configuration property has an unusable value.
    #[error("Invalid value for configuration property {key}: {message}")]
    InvalidProperty {
        /// The property key.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// Construction-time errors for [`crate::provider::OktaGroupProvider`].
///
/// Any of these aborts construction; a partially-built provider is never
/// exposed.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The private key could not be loaded.
    #[error(transparent)]
    Key(#[from] KeyLoadError),

    /// The group name pattern could not be compiled.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// The configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The Okta client could not be built.
    #[error(transparent)]
    Client(#[from] ListingError),
}
