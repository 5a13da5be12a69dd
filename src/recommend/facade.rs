use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::recommend::cache::{CachePolicy, Snapshot, SnapshotCache};
use crate::recommend::filter::{filter, Constraint, RecipeFacts, UnknownTagPolicy};
use crate::recommend::normalize::normalize_all;
use crate::recommend::ranking::{rank, ScoredRecipe};
use crate::recommend::source::DataSource;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommenderOptions {
    pub cache_policy: CachePolicy,
    pub unknown_tag_policy: UnknownTagPolicy,
}

/// Turns raw ingredient guesses into a filtered, ranked list of recipes
pub struct Recommender<S> {
    source: S,
    cache: SnapshotCache,
    unknown_tag_policy: UnknownTagPolicy,
}

impl<S: DataSource> Recommender<S> {
    pub fn new(source: S, options: RecommenderOptions) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(options.cache_policy),
            unknown_tag_policy: options.unknown_tag_policy,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ranked recipe ids for the given ingredients and constraint
    pub async fn recommend<I>(&self, raw_tokens: I, constraint: &Constraint) -> Result<Vec<i64>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let scored = self.recommend_scored(raw_tokens, constraint).await?;
        Ok(scored.into_iter().map(|r| r.recipe_id).collect())
    }

    /// Like [`Recommender::recommend`], keeping the match statistics
    pub async fn recommend_scored<I>(
        &self,
        raw_tokens: I,
        constraint: &Constraint,
    ) -> Result<Vec<ScoredRecipe>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        constraint.validate()?;

        let query = normalize_all(raw_tokens);
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        debug!("Recommendation query: {:?}", query);

        let snapshot = self.cache.get_or_load(&self.source).await?;
        let ranked = rank(&snapshot.corpus, &snapshot.model, &query);

        let facts = self.load_facts(&ranked, constraint).await?;
        let filtered = filter(ranked, constraint, &facts, self.unknown_tag_policy)?;

        info!(
            "Recommended {} recipes for {} ingredients",
            filtered.len(),
            query.len()
        );

        Ok(filtered)
    }

    async fn load_facts(
        &self,
        ranked: &[ScoredRecipe],
        constraint: &Constraint,
    ) -> Result<RecipeFacts> {
        let ids: Vec<i64> = ranked.iter().map(|r| r.recipe_id).collect();

        let calories = self.source.get_calories_for_recipes(&ids).await?;
        let (tags, known_tags) = if constraint.required_tags().is_empty() {
            Default::default()
        } else {
            (
                self.source.get_tags_for_recipes(&ids).await?,
                self.source.list_tag_names().await?,
            )
        };

        Ok(RecipeFacts {
            tags,
            calories,
            known_tags,
        })
    }

    /// Drop the cached snapshot; call when the store's associations change
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    /// The snapshot a request would use right now, loading it if needed
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.cache.get_or_load(&self.source).await
    }

    pub async fn cached_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cache.current().await
    }
}
