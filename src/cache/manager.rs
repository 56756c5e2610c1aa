use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{RecipeDetail, RecipeSummary};

/// Consider cache stale after 1 hour.
/// The recipe catalog changes rarely; favorites and suggestions are
/// refreshed on demand anyway.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew (negative ages) as well
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// File-backed cache of fetched data so the app renders instantly on
/// restart. Display convenience only - never a substitute for a valid
/// session.
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    /// File-name-safe key for per-recipe cache entries
    fn recipe_slug(recipe_name: &str) -> String {
        recipe_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    // ===== Ingredient catalog =====

    pub fn load_ingredients(&self) -> Result<Option<CachedData<Vec<String>>>> {
        self.load("ingredients")
    }

    pub fn save_ingredients(&self, ingredients: &[String]) -> Result<()> {
        self.save("ingredients", &ingredients)
    }

    // ===== Discover (full catalog) =====

    pub fn load_discover(&self) -> Result<Option<CachedData<Vec<RecipeSummary>>>> {
        self.load("discover")
    }

    pub fn save_discover(&self, recipes: &[RecipeSummary]) -> Result<()> {
        self.save("discover", &recipes)
    }

    // ===== Favorites =====

    pub fn load_favorites(&self) -> Result<Option<CachedData<Vec<RecipeSummary>>>> {
        self.load("favorites")
    }

    pub fn save_favorites(&self, recipes: &[RecipeSummary]) -> Result<()> {
        self.save("favorites", &recipes)
    }

    // ===== Suggestions =====

    pub fn load_suggestions(&self) -> Result<Option<CachedData<Vec<RecipeSummary>>>> {
        self.load("suggestions")
    }

    pub fn save_suggestions(&self, recipes: &[RecipeSummary]) -> Result<()> {
        self.save("suggestions", &recipes)
    }

    // ===== Individual recipe details =====

    pub fn load_recipe(&self, recipe_name: &str) -> Result<Option<CachedData<RecipeDetail>>> {
        self.load(&format!("recipe_{}", Self::recipe_slug(recipe_name)))
    }

    pub fn save_recipe(&self, recipe: &RecipeDetail) -> Result<()> {
        self.save(&format!("recipe_{}", Self::recipe_slug(&recipe.name)), recipe)
    }

    // ===== Cache Age Information =====

    /// Helper to load cache and log errors without failing
    fn load_age<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> Option<String> {
        match loader() {
            Ok(Some(cached)) => Some(cached.age_display()),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for age display");
                None
            }
        }
    }

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            ingredients: self.load_age("ingredients", || self.load_ingredients()),
            discover: self.load_age("discover", || self.load_discover()),
            favorites: self.load_age("favorites", || self.load_favorites()),
        }
    }

    /// Helper to check staleness and log errors without failing
    fn is_cache_stale<T>(
        &self,
        name: &str,
        loader: impl FnOnce() -> Result<Option<CachedData<T>>>,
    ) -> bool {
        match loader() {
            Ok(Some(cached)) => cached.is_stale(),
            Ok(None) => true, // No cache = stale
            Err(e) => {
                debug!(cache = name, error = %e, "Failed to load cache for staleness check");
                true // Error reading = treat as stale
            }
        }
    }

    /// Check if any of the core cached data is stale
    pub fn any_stale(&self) -> bool {
        let stale_checks = [
            self.is_cache_stale("ingredients", || self.load_ingredients()),
            self.is_cache_stale("discover", || self.load_discover()),
            self.is_cache_stale("favorites", || self.load_favorites()),
        ];
        stale_checks.iter().any(|&stale| stale)
    }
}

#[derive(Debug, Default)]
pub struct CacheAges {
    pub ingredients: Option<String>,
    pub discover: Option<String>,
    pub favorites: Option<String>,
}

impl CacheAges {
    /// Returns the most recent update time across all cache types
    pub fn last_updated(&self) -> String {
        let ages = [&self.ingredients, &self.discover, &self.favorites];

        for a in ages.iter().copied().flatten() {
            return a.clone();
        }

        "never".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_stale() {
        let fresh = CachedData::new(vec![1]);
        assert!(!fresh.is_stale());

        let mut old = CachedData::new(vec![1]);
        old.cached_at = Utc::now() - Duration::minutes(61);
        assert!(old.is_stale());
    }

    #[test]
    fn test_age_display_rounding() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::minutes(70);
        assert_eq!(cached.age_display(), "1h ago");
    }

    #[test]
    fn test_recipe_slug() {
        assert_eq!(CacheManager::recipe_slug("Tomato Pasta"), "tomato_pasta");
        assert_eq!(
            CacheManager::recipe_slug("Lentil Soup (Dal)"),
            "lentil_soup__dal_"
        );
        assert_eq!(CacheManager::recipe_slug("Shepherd's Pie"), "shepherd_s_pie");
    }

    #[test]
    fn test_cache_ages_last_updated_with_values() {
        let ages = CacheAges {
            ingredients: Some("5m ago".to_string()),
            discover: None,
            favorites: None,
        };
        assert_eq!(ages.last_updated(), "5m ago");
    }

    #[test]
    fn test_cache_ages_last_updated_empty() {
        let ages = CacheAges::default();
        assert_eq!(ages.last_updated(), "never");
    }
}
