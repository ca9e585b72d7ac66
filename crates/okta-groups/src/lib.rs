//! # okta-groups
//!
//! Okta-backed authorization group resolution for SQL query engines.
//!
//! A host engine (Trino-style) asks on each request: "which authorization
//! groups does this authenticated user belong to?" This crate answers by
//! listing the user's groups from Okta and translating provider-side names
//! into engine-facing names with a configurable, case-insensitive,
//! whole-string pattern.
//!
//! ## Modules
//!
//! - [`config`] - Provider configuration (files and flat `okta.*` properties)
//! - [`key`] - Private key loading for client authentication
//! - [`pattern`] - Group name extraction
//! - [`client`] - Okta API client and the [`GroupListing`] backend seam
//! - [`provider`] - Per-request group resolution
//! - [`error`] - Error taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use okta_groups::{OktaGroupProvider, OktaProviderConfig};
//!
//! let config = OktaProviderConfig::new(
//!     "dev-123456.okta.com",
//!     "0oabc123",
//!     "/etc/trino/okta.key",
//! )
//! .with_group_pattern("trino_group_(.*)");
//!
//! let provider = OktaGroupProvider::new(&config)?;
//! let groups = provider.get_groups("alice@example.com").await;
//! ```
//!
//! ## Failure policy
//!
//! Construction fails fast: an unusable key file or an invalid pattern
//! aborts startup. Per-request listing failures are absorbed: the user gets
//! an empty group set for that call and the error is logged, keeping the
//! engine's request pipeline available.

pub mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod pattern;
pub mod provider;

pub use client::{GroupListing, GroupProfile, OktaClient, OktaGroup};
pub use config::OktaProviderConfig;
pub use error::{ConfigError, KeyLoadError, ListingError, PatternError, ProviderError};
pub use key::{SigningKey, load_signing_key};
pub use pattern::GroupPattern;
pub use provider::OktaGroupProvider;
