//! Data models for the recipe service.
//!
//! This module contains the data structures exchanged with the backend:
//!
//! - `RecipeSummary`: list-view entries from generate/discover/favorites
//! - `RecipeDetail`: full recipe with ingredients, steps and nutrition
//! - `RatingSummary`: aggregate and per-user star ratings
//! - `RecipeFilters`: dietary/difficulty/time constraints for generation

pub mod rating;
pub mod recipe;

pub use rating::RatingSummary;
pub use recipe::{DietFilter, DifficultyFilter, RecipeDetail, RecipeFilters, RecipeSummary};
