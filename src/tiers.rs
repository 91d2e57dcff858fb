//! Access-Tier Resolver.
//!
//! Maps a user identity to an effective subscription tier and answers
//! which capabilities that tier grants. The grant table is a total
//! `match`: adding a tier or capability without updating it is a
//! compile error, never a runtime surprise.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::SubscriptionStore;

/// Subscription tier, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Team,
    Enterprise,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
            Tier::Team => write!(f, "team"),
            Tier::Enterprise => write!(f, "enterprise"),
        }
    }
}

/// A paid capability a tier may grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Invoking tools over the MCP gateway (`tools/call`).
    ToolInvocation,
}

impl Tier {
    /// Whether this tier grants a capability.
    pub fn grants(self, capability: Capability) -> bool {
        self >= required_tier(capability)
    }
}

/// The minimum tier that grants a capability.
pub fn required_tier(capability: Capability) -> Tier {
    match capability {
        Capability::ToolInvocation => Tier::Pro,
    }
}

/// Resolves a user's effective tier from the billing collaborator.
pub struct TierResolver {
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl TierResolver {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>) -> Self {
        Self { subscriptions }
    }

    /// Look up the user's effective subscription and return its tier.
    ///
    /// Policy, not accident: every lookup failure maps to `Tier::Free`.
    /// Free-tier availability must never depend on the subscription
    /// provider being reachable, and paid capabilities fail closed.
    pub async fn resolve(&self, user_id: &str) -> Tier {
        match self.subscriptions.effective_subscription(user_id).await {
            Ok(Some(subscription)) => subscription.tier,
            Ok(None) => Tier::Free,
            Err(e) => {
                warn!(user = %user_id, error = %e, "subscription lookup failed, treating as free");
                Tier::Free
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreError, Subscription, SubscriptionStatus};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl SubscriptionStore for Unreachable {
        async fn effective_subscription(
            &self,
            _user_id: &str,
        ) -> Result<Option<Subscription>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn grant_table() {
        assert!(!Tier::Free.grants(Capability::ToolInvocation));
        assert!(Tier::Pro.grants(Capability::ToolInvocation));
        assert!(Tier::Team.grants(Capability::ToolInvocation));
        assert!(Tier::Enterprise.grants(Capability::ToolInvocation));
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Free < Tier::Pro);
        assert!(Tier::Pro < Tier::Team);
        assert!(Tier::Team < Tier::Enterprise);
    }

    #[tokio::test]
    async fn missing_record_resolves_to_free() {
        let resolver = TierResolver::new(Arc::new(crate::store::MemoryStore::new()));
        assert_eq!(resolver.resolve("user-1").await, Tier::Free);
    }

    #[tokio::test]
    async fn effective_record_grants_its_tier() {
        let store = crate::store::MemoryStore::new().with_subscription(Subscription {
            user_id: "user-1".to_string(),
            tier: Tier::Team,
            status: SubscriptionStatus::Active,
        });
        let resolver = TierResolver::new(Arc::new(store));
        assert_eq!(resolver.resolve("user-1").await, Tier::Team);
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_to_free() {
        let resolver = TierResolver::new(Arc::new(Unreachable));
        assert_eq!(resolver.resolve("user-1").await, Tier::Free);
    }
}
