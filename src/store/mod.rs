//! Persistence-layer boundary.
//!
//! The document store that owns projects, transcripts, rules, and
//! subscription records is an external collaborator. This module defines
//! the typed records and the two read seams the core consumes:
//! [`ContentStore`] for project-scoped documents and [`SubscriptionStore`]
//! for the billing-owned subscription record. Records are validated when
//! they are deserialized at this boundary; a document that does not fit
//! the shape is reported as not-found rather than leaking partial data
//! into handler logic.

pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tiers::Tier;

pub use memory::MemoryStore;

/// Errors produced at the persistence boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced document does not exist, does not belong to the
    /// caller, or was malformed. The three cases are deliberately
    /// indistinguishable.
    #[error("not found")]
    NotFound,

    /// The store could not be reached or answered with a failure.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A project owned by one user, addressed by id or by its URL-safe slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub slug: String,
}

/// A processed video transcript. Immutable once processing completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub id: String,
    pub project_id: String,
    pub title: String,
    /// External media identifier (hosting provider's id).
    pub media_id: String,
    /// Playback reference for the source video.
    pub playback_url: String,
    /// Raw transcript text.
    pub text: String,
}

/// Subscription lifecycle state as reported by the billing provider.
/// Anything the provider sends beyond the named states lands on
/// `Other` and is simply not effective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    #[serde(other)]
    Other,
}

impl SubscriptionStatus {
    /// Only active and trialing records grant their tier.
    pub fn is_effective(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Trialing => write!(f, "trialing"),
            SubscriptionStatus::PastDue => write!(f, "past_due"),
            SubscriptionStatus::Canceled => write!(f, "canceled"),
            SubscriptionStatus::Other => write!(f, "other"),
        }
    }
}

/// A user's subscription record, owned by the billing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    pub tier: Tier,
    pub status: SubscriptionStatus,
}

/// A brand/styling rule attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub project_id: String,
    /// Transcript the rule was derived from, when any.
    #[serde(default)]
    pub transcript_id: Option<String>,
    pub name: String,
    pub content: String,
    pub category: String,
    /// Display ordering only; higher sorts first.
    #[serde(default)]
    pub priority: i64,
}

/// Read access to project-scoped documents.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve a project by internal id or slug, scoped to its owner.
    ///
    /// A project that exists but belongs to another user is reported as
    /// [`StoreError::NotFound`], identical to a nonexistent one.
    async fn project_for_owner(
        &self,
        owner_id: &str,
        id_or_slug: &str,
    ) -> Result<Project, StoreError>;

    /// All transcripts in a project, in insertion order.
    async fn transcripts(&self, project_id: &str) -> Result<Vec<Transcript>, StoreError>;

    /// All rules in a project, in insertion order.
    async fn rules(&self, project_id: &str) -> Result<Vec<Rule>, StoreError>;
}

/// Read access to the billing provider's subscription records.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The user's effective subscription (status active or trialing),
    /// or `None` when the user has no effective record.
    async fn effective_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, StoreError>;
}

/// Open a store from a connection URL.
///
/// `file://` loads the seedable in-memory store; the hosted
/// document-store driver is an external collaborator plugged in behind
/// the same traits, so any other scheme is a startup diagnostic here.
pub fn open(
    db_url: &str,
) -> Result<(MemoryStore, std::collections::HashMap<String, String>), StoreError> {
    match db_url.strip_prefix("file://") {
        Some(path) => MemoryStore::load(std::path::Path::new(path)),
        None => Err(StoreError::Unavailable(format!(
            "unsupported store scheme in {}: expected file://",
            db_url
        ))),
    }
}
