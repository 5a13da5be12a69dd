// Ingredient matching and ranking engine
// Raw ingredient tokens in, filtered and ranked recipe ids out

pub mod cache;
pub mod corpus;
pub mod facade;
pub mod filter;
pub mod normalize;
pub mod ranking;
pub mod source;
pub mod vector;

// Re-exports
pub use cache::{CachePolicy, Snapshot, SnapshotCache};
pub use corpus::{build_corpus, Corpus, RecipeDocument};
pub use facade::{Recommender, RecommenderOptions};
pub use filter::{filter, Constraint, RecipeFacts, UnknownTagPolicy};
pub use normalize::{normalize, normalize_all, IngredientToken};
pub use ranking::{rank, ScoredRecipe};
pub use source::{DataSource, InMemorySource, IngredientRow};
pub use vector::{cosine, SparseVector, VectorModel};
