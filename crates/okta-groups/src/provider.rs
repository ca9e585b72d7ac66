//! Group resolution orchestration.
//!
//! [`OktaGroupProvider`] is what a host query engine calls on each request
//! needing access-control groups: it lists the user's groups from the
//! identity provider and folds each name through the configured
//! [`GroupPattern`] into a unique set.
//!
//! Listing failures never propagate out of [`OktaGroupProvider::get_groups`].
//! A user whose lookup fails receives no extra groups for that call; the
//! request pipeline stays available at the cost of group completeness.

use std::collections::HashSet;
use std::sync::Arc;

use crate::client::{GroupListing, OktaClient};
use crate::config::OktaProviderConfig;
use crate::error::ProviderError;
use crate::key;
use crate::pattern::GroupPattern;

/// Resolves a user identity to a set of authorization group names.
///
/// All internal state is read-only after construction, so one instance can
/// serve concurrent resolution calls without coordination.
pub struct OktaGroupProvider {
    listing: Arc<dyn GroupListing>,
    pattern: GroupPattern,
}

impl std::fmt::Debug for OktaGroupProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OktaGroupProvider")
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl OktaGroupProvider {
    /// Builds a provider from configuration.
    ///
    /// Loads the private key, compiles the group pattern, and constructs the
    /// Okta client, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when any construction step fails. There is
    /// no retry and no partially-constructed provider: without a valid key
    /// and pattern the provider is unusable.
    pub fn new(config: &OktaProviderConfig) -> Result<Self, ProviderError> {
        let signing_key = key::load_signing_key(&config.private_key_path)?;
        let pattern = GroupPattern::compile(&config.group_pattern)?;
        let client = OktaClient::new(config, signing_key)?;

        Ok(Self {
            listing: Arc::new(client),
            pattern,
        })
    }

    /// Builds a provider around any [`GroupListing`] backend.
    ///
    /// This is the seam for alternative backends and for tests.
    #[must_use]
    pub fn with_listing(listing: Arc<dyn GroupListing>, pattern: GroupPattern) -> Self {
        Self { listing, pattern }
    }

    /// The compiled group name pattern in use.
    #[must_use]
    pub fn pattern(&self) -> &GroupPattern {
        &self.pattern
    }

    /// Resolves the authorization groups for a user.
    ///
    /// Every raw group from the listing is evaluated independently; names
    /// that are absent or fall outside the pattern are omitted, and
    /// duplicate output names collapse.
    ///
    /// Any listing failure is logged with the user and full cause, then
    /// converted to an empty set. Callers must treat an empty set as a
    /// valid, if degraded, outcome rather than a sentinel error.
    pub async fn get_groups(&self, user: &str) -> HashSet<String> {
        let raw_groups = match self.listing.list_user_groups(user).await {
            Ok(groups) => groups,
            Err(error) => {
                tracing::error!(
                    "Error retrieving groups for user {} from Okta: {}",
                    user,
                    error
                );
                return HashSet::new();
            }
        };

        raw_groups
            .iter()
            .filter_map(|group| group.name())
            .filter_map(|name| self.pattern.extract(name))
            .collect()
    }
}
