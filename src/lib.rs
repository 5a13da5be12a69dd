pub mod config;
pub mod db;
pub mod error;

// Matching and ranking engine
pub mod recommend;

// HTTP interface
pub mod api;

// Command-line interface
pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
pub use recommend::{Constraint, Recommender, RecommenderOptions, ScoredRecipe};
