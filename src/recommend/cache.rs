use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::Result;
use crate::recommend::corpus::{build_corpus, Corpus};
use crate::recommend::source::DataSource;
use crate::recommend::vector::VectorModel;

/// An immutable corpus together with the model fitted on it
#[derive(Debug)]
pub struct Snapshot {
    pub corpus: Corpus,
    pub model: VectorModel,
    pub built_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(corpus: Corpus) -> Self {
        let model = VectorModel::fit(&corpus);
        Self {
            corpus,
            model,
            built_at: Utc::now(),
        }
    }

    pub async fn load(source: &(impl DataSource + ?Sized)) -> Result<Self> {
        let corpus = build_corpus(source).await?;
        Ok(Self::new(corpus))
    }
}

/// When a cached snapshot may be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachePolicy {
    /// Rebuild on every request
    Disabled,
    /// Reuse until [`SnapshotCache::invalidate`] is called
    UntilInvalidated,
    /// Reuse for at most this long, or until invalidated
    Ttl(Duration),
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::UntilInvalidated
    }
}

struct CachedSnapshot {
    snapshot: Arc<Snapshot>,
    loaded_at: Instant,
}

pub struct SnapshotCache {
    policy: CachePolicy,
    slot: RwLock<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            slot: RwLock::new(None),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn is_fresh(&self, cached: &CachedSnapshot) -> bool {
        match self.policy {
            CachePolicy::Disabled => false,
            CachePolicy::UntilInvalidated => true,
            CachePolicy::Ttl(ttl) => cached.loaded_at.elapsed() < ttl,
        }
    }

    /// Return the cached snapshot, loading a new one when none is usable
    pub async fn get_or_load(&self, source: &(impl DataSource + ?Sized)) -> Result<Arc<Snapshot>> {
        if self.policy == CachePolicy::Disabled {
            return Ok(Arc::new(Snapshot::load(source).await?));
        }

        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref().filter(|c| self.is_fresh(c)) {
                debug!("Snapshot cache hit");
                return Ok(cached.snapshot.clone());
            }
        }

        let mut slot = self.slot.write().await;
        // Another request may have reloaded while we waited for the lock
        if let Some(cached) = slot.as_ref().filter(|c| self.is_fresh(c)) {
            return Ok(cached.snapshot.clone());
        }

        debug!("Snapshot cache miss, loading corpus");
        let snapshot = Arc::new(Snapshot::load(source).await?);
        info!(
            "Loaded recipe snapshot: {} recipes, {} ingredient terms",
            snapshot.corpus.len(),
            snapshot.model.vocabulary_len()
        );
        *slot = Some(CachedSnapshot {
            snapshot: snapshot.clone(),
            loaded_at: Instant::now(),
        });

        Ok(snapshot)
    }

    /// Drop the cached snapshot so the next request reloads the store
    pub async fn invalidate(&self) {
        let mut slot = self.slot.write().await;
        if slot.take().is_some() {
            info!("Recipe snapshot invalidated");
        }
    }

    /// The currently cached snapshot, without loading
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.slot
            .read()
            .await
            .as_ref()
            .map(|cached| cached.snapshot.clone())
    }
}
