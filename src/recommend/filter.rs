use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::recommend::ranking::ScoredRecipe;

pub const DEFAULT_MIN_CALORIES: f64 = 0.0;
pub const DEFAULT_MAX_CALORIES: f64 = 10_000.0;

/// Normalize a tag name the way the store keeps it
pub fn normalize_tag(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Dietary and calorie requirements for one request.
///
/// Built only through [`Constraint::new`], so tags are always normalized and
/// the calorie range is always valid, including when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ConstraintFields")]
pub struct Constraint {
    required_tags: BTreeSet<String>,
    calorie_min: f64,
    calorie_max: f64,
}

#[derive(Deserialize)]
struct ConstraintFields {
    #[serde(default)]
    required_tags: Vec<String>,
    #[serde(default = "default_min_calories")]
    calorie_min: f64,
    #[serde(default = "default_max_calories")]
    calorie_max: f64,
}

fn default_min_calories() -> f64 {
    DEFAULT_MIN_CALORIES
}

fn default_max_calories() -> f64 {
    DEFAULT_MAX_CALORIES
}

impl TryFrom<ConstraintFields> for Constraint {
    type Error = Error;

    fn try_from(fields: ConstraintFields) -> Result<Self> {
        Constraint::new(fields.required_tags, fields.calorie_min, fields.calorie_max)
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            required_tags: BTreeSet::new(),
            calorie_min: DEFAULT_MIN_CALORIES,
            calorie_max: DEFAULT_MAX_CALORIES,
        }
    }
}

impl Constraint {
    pub fn new<I>(tags: I, calorie_min: f64, calorie_max: f64) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let constraint = Self {
            required_tags: tags
                .into_iter()
                .map(|t| normalize_tag(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
            calorie_min,
            calorie_max,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    pub fn required_tags(&self) -> &BTreeSet<String> {
        &self.required_tags
    }

    pub fn calorie_min(&self) -> f64 {
        self.calorie_min
    }

    pub fn calorie_max(&self) -> f64 {
        self.calorie_max
    }

    pub fn validate(&self) -> Result<()> {
        if !self.calorie_min.is_finite() || !self.calorie_max.is_finite() {
            return Err(Error::InvalidConstraint(
                "calorie bounds must be finite numbers".to_string(),
            ));
        }
        if self.calorie_min > self.calorie_max {
            return Err(Error::InvalidConstraint(format!(
                "calorie_min ({}) is greater than calorie_max ({})",
                self.calorie_min, self.calorie_max
            )));
        }
        Ok(())
    }

    pub fn accepts_calories(&self, calories: f64) -> bool {
        self.calorie_min <= calories && calories <= self.calorie_max
    }

    pub fn accepts_tags(&self, recipe_tags: &BTreeSet<String>) -> bool {
        self.required_tags.is_empty() || self.required_tags.iter().any(|t| recipe_tags.contains(t))
    }
}

/// What to do with a requested tag the store has never heard of
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTagPolicy {
    /// The tag matches no recipes; the other tags still apply
    #[default]
    Skip,
    /// Fail the request with `InvalidConstraint`
    Reject,
}

impl FromStr for UnknownTagPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            other => Err(Error::Config(format!(
                "Unknown tag policy '{other}', expected 'skip' or 'reject'"
            ))),
        }
    }
}

/// Tag and calorie data for the recipes being filtered
#[derive(Debug, Clone, Default)]
pub struct RecipeFacts {
    pub tags: HashMap<i64, BTreeSet<String>>,
    pub calories: HashMap<i64, f64>,
    pub known_tags: BTreeSet<String>,
}

/// Keep ranked recipes that carry any required tag and fall inside the
/// calorie range. Relative order is preserved.
pub fn filter(
    ranked: Vec<ScoredRecipe>,
    constraint: &Constraint,
    facts: &RecipeFacts,
    policy: UnknownTagPolicy,
) -> Result<Vec<ScoredRecipe>> {
    constraint.validate()?;

    let unknown: Vec<&str> = constraint
        .required_tags
        .iter()
        .filter(|t| !facts.known_tags.contains(*t))
        .map(String::as_str)
        .collect();

    if !unknown.is_empty() {
        match policy {
            UnknownTagPolicy::Reject => {
                return Err(Error::InvalidConstraint(format!(
                    "unknown tags: {}",
                    unknown.join(", ")
                )));
            }
            UnknownTagPolicy::Skip => {
                warn!("Skipping unknown tags: {}", unknown.join(", "));
            }
        }
    }

    let no_tags = BTreeSet::new();
    let before = ranked.len();
    let kept: Vec<ScoredRecipe> = ranked
        .into_iter()
        .filter(|r| {
            let tags = facts.tags.get(&r.recipe_id).unwrap_or(&no_tags);
            constraint.accepts_tags(tags)
        })
        .filter(|r| {
            facts
                .calories
                .get(&r.recipe_id)
                .is_some_and(|&kcal| constraint.accepts_calories(kcal))
        })
        .collect();

    debug!("Constraint filter kept {} of {} recipes", kept.len(), before);
    Ok(kept)
}
