use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Anything that is not a letter, digit, whitespace, hyphen or apostrophe
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s'\-]+").unwrap());

/// Plural forms that suffix rules get wrong
const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("halves", "half"),
    ("calves", "calf"),
    ("knives", "knife"),
    ("wolves", "wolf"),
    ("shelves", "shelf"),
    ("tomatoes", "tomato"),
    ("potatoes", "potato"),
    ("mangoes", "mango"),
    ("avocadoes", "avocado"),
    ("echoes", "echo"),
    ("heroes", "hero"),
    ("cookies", "cookie"),
    ("brownies", "brownie"),
    ("smoothies", "smoothie"),
    ("veggies", "veggie"),
    ("pies", "pie"),
    ("movies", "movie"),
    ("calories", "calorie"),
];

/// Words whose plural and singular are the same
const UNCOUNTABLE: &[&str] = &[
    "rice",
    "fish",
    "sheep",
    "deer",
    "salmon",
    "trout",
    "shrimp",
    "squid",
    "tuna",
    "cod",
    "flour",
    "milk",
    "water",
    "molasses",
    "hummus",
    "couscous",
    "asparagus",
    "series",
    "species",
    "news",
    "swiss",
    "basis",
    "pastis",
    "anis",
    "oasis",
    "iris",
    "tennis",
];

/// Singulars ending in `-che`, so their plurals only lose the `s`
const CHE_SINGULARS: &[&str] = &[
    "quiche",
    "brioche",
    "ganache",
    "panache",
    "tranche",
    "mache",
    "ceviche",
    "cloche",
    "cache",
    "niche",
    "creche",
    "pastiche",
];

/// A normalized ingredient name: singular, lower-cased, single-spaced.
///
/// Only [`normalize`] constructs tokens, so two tokens compare equal exactly
/// when their raw inputs name the same ingredient.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientToken(String);

impl IngredientToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for IngredientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for IngredientToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for IngredientToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw ingredient name
///
/// Returns `None` when nothing usable remains after cleanup.
pub fn normalize(raw: &str) -> Option<IngredientToken> {
    let lowered = raw.trim().to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, " ");

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    let last = words.pop()?;
    let singular = singularize(last);

    let mut token = words.join(" ");
    if !token.is_empty() {
        token.push(' ');
    }
    token.push_str(&singular);

    Some(IngredientToken(token))
}

/// Normalize every token of a query, deduplicating into a set
pub fn normalize_all<I>(raw: I) -> BTreeSet<IngredientToken>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|t| normalize(t.as_ref()))
        .collect()
}

/// Convert a single lower-case English word to its singular form
///
/// Unknown shapes are returned unchanged. Every output is a fixed point.
fn singularize(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return (*singular).to_string();
    }

    if UNCOUNTABLE.contains(&word) || word.chars().count() <= 3 {
        return word.to_string();
    }

    if word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix('s') {
        if CHE_SINGULARS.contains(&stem) {
            return stem.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("ies") {
        if stem.chars().count() >= 2 {
            return format!("{stem}y");
        }
    }

    for suffix in ["ches", "shes", "sses", "zzes", "xes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    match word.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => word.to_string(),
    }
}
