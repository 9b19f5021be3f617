use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RecipeError;

/// Minimal recipe identity, as listed by a search or saved as a favourite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "image", default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(rename = "imageType", default, skip_serializing_if = "Option::is_none")]
    pub image_format: Option<String>,
    #[serde(
        rename = "readyInMinutes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ready_in_minutes: Option<u32>,
}

impl RecipeSummary {
    pub fn new(id: i64, title: impl Into<String>, image_url: impl Into<String>) -> Self {
        RecipeSummary {
            id,
            title: title.into(),
            image_url: image_url.into(),
            image_format: None,
            ready_in_minutes: None,
        }
    }
}

/// One page of `complexSearch` results
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub results: Vec<RecipeSummary>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
}

/// Physical consistency of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Consistency {
    Solid,
    Liquid,
    #[default]
    Other,
}

// The catalog has sent both "SOLID" and "solid" over time
impl<'de> Deserialize<'de> for Consistency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some(value) if value.eq_ignore_ascii_case("solid") => Consistency::Solid,
            Some(value) if value.eq_ignore_ascii_case("liquid") => Consistency::Liquid,
            _ => Consistency::Other,
        })
    }
}

/// Amount of an ingredient expressed in one measurement system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub amount: f64,
    #[serde(rename = "unitShort", default, deserialize_with = "null_as_default")]
    pub unit_short: String,
    #[serde(rename = "unitLong", default, deserialize_with = "null_as_default")]
    pub unit_long: String,
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.unit_long)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    #[serde(default)]
    pub us: Measure,
    #[serde(default)]
    pub metric: Measure,
}

impl Measures {
    pub fn for_unit(&self, unit: MeasurementUnit) -> &Measure {
        match unit {
            MeasurementUnit::Metric => &self.metric,
            MeasurementUnit::Us => &self.us,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aisle: String,
    #[serde(rename = "image", default, deserialize_with = "null_as_default")]
    pub image_file: String,
    #[serde(default)]
    pub consistency: Consistency,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "nameClean", default, deserialize_with = "null_as_default")]
    pub clean_name: String,
    #[serde(rename = "original", default, deserialize_with = "null_as_default")]
    pub original_text: String,
    #[serde(rename = "originalName", default, deserialize_with = "null_as_default")]
    pub original_name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit: String,
    #[serde(default)]
    pub measures: Measures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionStep {
    pub number: u32,
    #[serde(rename = "step", default, deserialize_with = "null_as_default")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructionGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<InstructionStep>,
}

/// Full recipe record from the `/recipes/{id}/information` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "image", default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default)]
    pub servings: u32,
    #[serde(rename = "readyInMinutes", default)]
    pub ready_in_minutes: u32,
    #[serde(rename = "extendedIngredients", default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(rename = "analyzedInstructions", default)]
    pub instruction_groups: Vec<InstructionGroup>,
    #[serde(rename = "instructions", default, deserialize_with = "null_as_default")]
    pub raw_instructions: String,
}

impl RecipeDetail {
    /// Whether the view has to fall back to `raw_instructions`
    pub fn uses_raw_instructions(&self) -> bool {
        self.instruction_groups.is_empty()
    }

    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            ready_in_minutes: Some(self.ready_in_minutes),
            ..RecipeSummary::new(self.id, self.title.clone(), self.image_url.clone())
        }
    }
}

/// Display system for ingredient amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnit {
    #[default]
    Metric,
    Us,
}

impl MeasurementUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementUnit::Metric => "metric",
            MeasurementUnit::Us => "us",
        }
    }
}

impl fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasurementUnit {
    type Err = RecipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            value if value.eq_ignore_ascii_case("metric") => Ok(MeasurementUnit::Metric),
            value if value.eq_ignore_ascii_case("us") => Ok(MeasurementUnit::Us),
            other => Err(RecipeError::InvalidPreference(other.to_string())),
        }
    }
}

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
