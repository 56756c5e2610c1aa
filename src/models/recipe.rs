use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Default base servings when the backend omits the field.
/// Older backend builds do not include `servings` in the detail payload.
const DEFAULT_SERVINGS: u32 = 2;

fn default_servings() -> u32 {
    DEFAULT_SERVINGS
}

/// A recipe as it appears in result lists (generated, discover, favorites,
/// suggestions). The generation endpoint also reports which substitutions it
/// made to reach the match; list endpoints send an empty map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub name: String,
    /// Match score from the generation endpoint, absent on list endpoints
    #[serde(default)]
    pub similarity: Option<f64>,
    pub difficulty: Option<String>,
    pub cook_time: Option<u32>,
    pub cuisine: Option<String>,
    pub image_url: Option<String>,
    /// required ingredient -> pantry ingredient used in its place
    #[serde(default)]
    pub substitutions: BTreeMap<String, String>,
}

impl RecipeSummary {
    pub fn has_substitutions(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

/// Full recipe detail from `GET /recipe/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub name: String,
    /// ingredient name (lowercase) -> amount in grams for the base servings
    pub ingredients: BTreeMap<String, f64>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<BTreeMap<String, f64>>,
    pub difficulty: Option<String>,
    pub cook_time: Option<u32>,
    pub cuisine: Option<String>,
    pub image_url: Option<String>,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default)]
    pub diet_type: Option<String>,
}

impl RecipeDetail {
    /// Scale an ingredient amount from the recipe's base servings to the
    /// requested servings, rounded to the nearest gram.
    pub fn scaled_amount(&self, amount: f64, servings: u32) -> f64 {
        let base = self.servings.max(1) as f64;
        (amount / base * servings as f64).round()
    }

    /// Ingredients with amounts scaled to the requested servings,
    /// in the stored (alphabetical) order.
    pub fn scaled_ingredients(&self, servings: u32) -> Vec<(String, f64)> {
        self.ingredients
            .iter()
            .map(|(name, &amount)| (name.clone(), self.scaled_amount(amount, servings)))
            .collect()
    }

    /// Required ingredients the user does not have. An ingredient counts as
    /// covered when it is in the pantry or when it is the pantry-side target
    /// of a substitution the generator already made.
    pub fn missing_ingredients(
        &self,
        pantry: &BTreeSet<String>,
        substitutions: &BTreeMap<String, String>,
    ) -> Vec<(String, f64)> {
        self.ingredients
            .iter()
            .filter(|(name, _)| {
                !pantry.contains(name.as_str())
                    && !substitutions.values().any(|sub| sub == name.as_str())
            })
            .map(|(name, &amount)| (name.clone(), amount))
            .collect()
    }
}

// ============================================================================
// Generation Filters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietFilter {
    #[default]
    All,
    Veg,
    NonVeg,
}

impl DietFilter {
    pub fn next(&self) -> Self {
        match self {
            DietFilter::All => DietFilter::Veg,
            DietFilter::Veg => DietFilter::NonVeg,
            DietFilter::NonVeg => DietFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DietFilter::All => "All",
            DietFilter::Veg => "Veg",
            DietFilter::NonVeg => "Non-veg",
        }
    }

    /// Query-parameter value, `None` when the filter is inactive
    fn param(&self) -> Option<&'static str> {
        match self {
            DietFilter::All => None,
            DietFilter::Veg => Some("veg"),
            DietFilter::NonVeg => Some("non-veg"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

impl DifficultyFilter {
    pub fn next(&self) -> Self {
        match self {
            DifficultyFilter::All => DifficultyFilter::Easy,
            DifficultyFilter::Easy => DifficultyFilter::Medium,
            DifficultyFilter::Medium => DifficultyFilter::Hard,
            DifficultyFilter::Hard => DifficultyFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DifficultyFilter::All => "All",
            DifficultyFilter::Easy => "Easy",
            DifficultyFilter::Medium => "Medium",
            DifficultyFilter::Hard => "Hard",
        }
    }

    fn param(&self) -> Option<&'static str> {
        match self {
            DifficultyFilter::All => None,
            DifficultyFilter::Easy => Some("Easy"),
            DifficultyFilter::Medium => Some("Medium"),
            DifficultyFilter::Hard => Some("Hard"),
        }
    }
}

/// Max cook time presets cycled in the pantry form
const MAX_TIME_PRESETS: [Option<u32>; 5] = [None, Some(15), Some(30), Some(45), Some(60)];

/// Filters applied to recipe generation. Inactive filters are simply
/// omitted from the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeFilters {
    pub dietary: DietFilter,
    pub difficulty: DifficultyFilter,
    pub max_time: Option<u32>,
}

impl RecipeFilters {
    pub fn cycle_dietary(&mut self) {
        self.dietary = self.dietary.next();
    }

    pub fn cycle_difficulty(&mut self) {
        self.difficulty = self.difficulty.next();
    }

    pub fn cycle_max_time(&mut self) {
        let pos = MAX_TIME_PRESETS
            .iter()
            .position(|p| *p == self.max_time)
            .unwrap_or(0);
        self.max_time = MAX_TIME_PRESETS[(pos + 1) % MAX_TIME_PRESETS.len()];
    }

    pub fn max_time_label(&self) -> String {
        match self.max_time {
            Some(m) => format!("≤{} min", m),
            None => "Any".to_string(),
        }
    }

    /// Query parameters for `POST /generate`
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(dietary) = self.dietary.param() {
            params.push(("dietary", dietary.to_string()));
        }
        if let Some(difficulty) = self.difficulty.param() {
            params.push(("difficulty", difficulty.to_string()));
        }
        if let Some(max_time) = self.max_time {
            params.push(("max_time", max_time.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detail() -> RecipeDetail {
        let json = r#"{
            "name": "Tomato Pasta",
            "ingredients": {"tomato": 200.0, "pasta": 150.0, "garlic": 10.0},
            "steps": ["Boil pasta.", "Make sauce.", "Combine."],
            "nutrition": {"calories": 450.0, "protein": 15.0},
            "difficulty": "Easy",
            "cook_time": 20,
            "cuisine": "Italian",
            "image_url": null,
            "servings": 2,
            "diet_type": "veg"
        }"#;
        serde_json::from_str(json).expect("Failed to parse sample recipe detail")
    }

    #[test]
    fn test_parse_recipe_detail() {
        let recipe = sample_detail();
        assert_eq!(recipe.name, "Tomato Pasta");
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients["pasta"], 150.0);
        assert_eq!(recipe.steps.len(), 3);
        assert_eq!(recipe.servings, 2);
    }

    #[test]
    fn test_parse_detail_without_servings_uses_default() {
        let json = r#"{
            "name": "Scrambled Eggs",
            "ingredients": {"egg": 3.0},
            "steps": ["Whisk.", "Cook."]
        }"#;
        let recipe: RecipeDetail = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.servings, DEFAULT_SERVINGS);
        assert!(recipe.nutrition.is_none());
    }

    #[test]
    fn test_scaled_ingredients() {
        let recipe = sample_detail();
        // Base is 2 servings; 4 servings doubles everything
        let scaled = recipe.scaled_ingredients(4);
        let pasta = scaled.iter().find(|(n, _)| n == "pasta").unwrap();
        assert_eq!(pasta.1, 300.0);
        // 3 servings: 150 / 2 * 3 = 225
        assert_eq!(recipe.scaled_amount(150.0, 3), 225.0);
        // Rounding: 10 / 2 * 3 = 15, 10 / 2 * 1 = 5
        assert_eq!(recipe.scaled_amount(10.0, 1), 5.0);
    }

    #[test]
    fn test_missing_ingredients_excludes_pantry_and_substitutes() {
        let recipe = sample_detail();
        let pantry: BTreeSet<String> = ["tomato".to_string()].into_iter().collect();
        let mut substitutions = BTreeMap::new();
        // Generator swapped "noodles" for the user's "pasta"
        substitutions.insert("noodles".to_string(), "pasta".to_string());

        let missing = recipe.missing_ingredients(&pantry, &substitutions);
        let names: Vec<&str> = missing.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["garlic"]);
    }

    #[test]
    fn test_summary_defaults() {
        let json = r#"{"name": "Greek Salad", "difficulty": "Easy", "cook_time": 10,
                       "cuisine": "Mediterranean", "image_url": null}"#;
        let summary: RecipeSummary = serde_json::from_str(json).unwrap();
        assert!(summary.substitutions.is_empty());
        assert!(!summary.has_substitutions());
        assert!(summary.similarity.is_none());
    }

    #[test]
    fn test_filter_query_params() {
        let mut filters = RecipeFilters::default();
        assert!(filters.query_params().is_empty());

        filters.cycle_dietary(); // Veg
        filters.max_time = Some(30);
        let params = filters.query_params();
        assert_eq!(
            params,
            vec![
                ("dietary", "veg".to_string()),
                ("max_time", "30".to_string())
            ]
        );
    }

    #[test]
    fn test_max_time_presets_cycle() {
        let mut filters = RecipeFilters::default();
        assert_eq!(filters.max_time, None);
        filters.cycle_max_time();
        assert_eq!(filters.max_time, Some(15));
        for _ in 0..4 {
            filters.cycle_max_time();
        }
        assert_eq!(filters.max_time, None);
    }
}
