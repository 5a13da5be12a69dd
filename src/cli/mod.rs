// Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "foodscope")]
#[command(about = "FoodScope - Recipe recommendations from the ingredients you have", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the recommendation server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Run database migrations
    Migrate,

    /// Ask a running server for recommendations
    Recommend {
        /// Ingredients you have (e.g. eggs flour "green beans")
        #[arg(required = true)]
        ingredients: Vec<String>,

        /// Comma-separated health labels, any of which must match
        #[arg(long)]
        tags: Option<String>,

        /// Minimum calories per serving
        #[arg(long)]
        min_calories: Option<f64>,

        /// Maximum calories per serving
        #[arg(long)]
        max_calories: Option<f64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recommend() {
        let cli = Cli::try_parse_from([
            "foodscope",
            "recommend",
            "eggs",
            "green beans",
            "--tags",
            "vegan,gluten_free",
            "--max-calories",
            "500",
        ])
        .unwrap();

        match cli.command {
            Commands::Recommend {
                ingredients,
                tags,
                min_calories,
                max_calories,
            } => {
                assert_eq!(ingredients, vec!["eggs", "green beans"]);
                assert_eq!(tags.as_deref(), Some("vegan,gluten_free"));
                assert_eq!(min_calories, None);
                assert_eq!(max_calories, Some(500.0));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_recommend_requires_ingredients() {
        assert!(Cli::try_parse_from(["foodscope", "recommend"]).is_err());
    }
}
