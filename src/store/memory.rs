//! Seedable in-memory store.
//!
//! Backs local development and tests: the whole dataset is loaded once
//! from a JSON seed file (the `file://` DB URL scheme) and served
//! read-only behind the same traits the hosted document store implements.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    ContentStore, Project, Rule, StoreError, Subscription, SubscriptionStore, Transcript,
};

/// On-disk seed shape for [`MemoryStore::load`].
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    /// Bearer token -> user id, consumed by the auth provider.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub transcripts: Vec<Transcript>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Read-only in-memory implementation of both store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: Vec<Project>,
    transcripts: Vec<Transcript>,
    subscriptions: Vec<Subscription>,
    rules: Vec<Rule>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a parsed seed.
    pub fn from_seed(seed: Seed) -> Self {
        Self {
            projects: seed.projects,
            transcripts: seed.transcripts,
            subscriptions: seed.subscriptions,
            rules: seed.rules,
        }
    }

    /// Load a seed file from disk, returning the store and the seed's
    /// bearer-token table. A malformed file is a startup diagnostic,
    /// not a silently-empty store.
    pub fn load(path: &Path) -> Result<(Self, HashMap<String, String>), StoreError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let mut seed: Seed = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let tokens = std::mem::take(&mut seed.tokens);
        Ok((Self::from_seed(seed), tokens))
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcripts.push(transcript);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn project_for_owner(
        &self,
        owner_id: &str,
        id_or_slug: &str,
    ) -> Result<Project, StoreError> {
        self.projects
            .iter()
            .find(|p| p.owner_id == owner_id && (p.id == id_or_slug || p.slug == id_or_slug))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn transcripts(&self, project_id: &str) -> Result<Vec<Transcript>, StoreError> {
        Ok(self
            .transcripts
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn rules(&self, project_id: &str) -> Result<Vec<Rule>, StoreError> {
        Ok(self
            .rules
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn effective_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<Subscription>, StoreError> {
        Ok(self
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.status.is_effective())
            .cloned())
    }
}
