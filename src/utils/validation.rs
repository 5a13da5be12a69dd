// Validation utilities
use crate::config::LimitsConfig;
use crate::error::{Error, Result};
use tracing::warn;

/// Upper bound on requested tags; well above the number of labels in use
const MAX_TAGS: usize = 32;

/// Validate the raw ingredient tokens of a request before normalization
pub fn validate_ingredient_tokens(tokens: &[String], limits: &LimitsConfig) -> Result<()> {
    if tokens.len() > limits.max_query_tokens {
        warn!(
            "Rejected query with {} ingredient tokens (limit {})",
            tokens.len(),
            limits.max_query_tokens
        );
        return Err(Error::Validation(format!(
            "Too many ingredients: {} (maximum {})",
            tokens.len(),
            limits.max_query_tokens
        )));
    }

    if let Some(token) = tokens
        .iter()
        .find(|t| t.chars().count() > limits.max_token_length)
    {
        return Err(Error::Validation(format!(
            "Ingredient name too long ({} characters, maximum {})",
            token.chars().count(),
            limits.max_token_length
        )));
    }

    if tokens.iter().any(|t| t.chars().any(char::is_control)) {
        return Err(Error::Validation(
            "Ingredient names must not contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate requested tag names
pub fn validate_tag_names(tags: &[String], limits: &LimitsConfig) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(Error::Validation(format!(
            "Too many health labels: {} (maximum {MAX_TAGS})",
            tags.len()
        )));
    }

    if tags.iter().any(|t| t.chars().count() > limits.max_token_length) {
        return Err(Error::Validation("Health label too long".to_string()));
    }

    Ok(())
}
