use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use validator::Validate;

/// One ingredient line required by a planned meal.
///
/// Produced by the recipe/meal-plan collaborator and immutable once attached
/// to a meal plan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub is_main: bool,
}

/// Quantity of an ingredient needed beyond what the pantry currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Shortfall {
    #[validate(length(min = 1, message = "ingredient name is required"))]
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: Option<IngredientCategory>,
}

#[derive(
    EnumString,
    Display,
    AsRefStr,
    VariantArray,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
pub enum IngredientCategory {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Frozen,
    Pantry,
    Bakery,
    #[default]
    Other,
}

/// Case-insensitive key under which an ingredient is stored and matched.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
