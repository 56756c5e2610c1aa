//! API client for communicating with the recipe service REST API.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! API requests: recipe generation, discovery, favorites, ratings and
//! image-based ingredient recognition.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, multipart, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::auth::{claims, SessionData};
use crate::models::{RatingSummary, RecipeDetail, RecipeFilters, RecipeSummary};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix for all service endpoints
const API_PREFIX: &str = "/api";

/// HTTP request timeout in seconds.
/// Recipe generation can take a few seconds server-side; 30s fails fast
/// enough that a dead server doesn't leave the UI loading forever.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct IngredientsResponse {
    ingredients: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecipesResponse {
    recipes: Vec<RecipeSummary>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    recognized_ingredients: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

/// API client for the recipe service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given server base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Authorization header for the current session.
    /// Content-Type is deliberately not set here: JSON requests get it from
    /// `RequestBuilder::json`, and the multipart upload must let the
    /// transport pick the boundary-bearing content type itself.
    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning a typed error with the
    /// server's message if not. 401/403 map to the session-ending variants;
    /// nothing is ever retried.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Authentication =====

    /// Log in with email and password, returning session data with the
    /// issued bearer token. A 401 here means bad credentials, not an
    /// expired session.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionData> {
        let url = self.url("/auth/login");

        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let auth: TokenResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        // The token payload carries display identity (name, email, dietary
        // preference). It is decoded, never verified - that is the server's
        // job on every subsequent request.
        let identity = claims::decode(&auth.token)
            .context("Server issued a token whose payload could not be decoded")?;

        let expires_at = identity.expires_at();
        Ok(SessionData {
            token: auth.token,
            email: identity.email.unwrap_or_else(|| email.to_string()),
            name: identity.name,
            dietary_preference: identity.dietary_preference,
            expires_at,
            created_at: Utc::now(),
        })
    }

    /// Register a new account. A 409 means the email is already taken.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        dietary_preference: &str,
    ) -> Result<String> {
        let url = self.url("/auth/register");

        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "dietary_preference": dietary_preference,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send registration request")?;

        let response = Self::check_response(response).await?;
        let parsed: MessageResponse = response
            .json()
            .await
            .context("Failed to parse registration response")?;
        Ok(parsed.message)
    }

    // ===== Data Fetching Methods =====

    /// Fetch the catalog of ingredient names the service knows about.
    /// Names come back lowercased.
    pub async fn fetch_ingredients(&self) -> Result<Vec<String>> {
        let response: IngredientsResponse = self.get("/ingredients").await?;
        Ok(response.ingredients)
    }

    /// Generate recipe matches for the given pantry contents.
    /// Filters become query parameters; inactive ones are omitted.
    pub async fn generate(
        &self,
        pantry: &BTreeMap<String, f64>,
        filters: &RecipeFilters,
    ) -> Result<Vec<RecipeSummary>> {
        let url = self.url("/generate");
        let body = serde_json::json!({ "ingredients": pantry });

        debug!(ingredients = pantry.len(), "Requesting recipe generation");

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .query(&filters.query_params())
            .json(&body)
            .send()
            .await
            .context("Failed to send generate request")?;

        let response = Self::check_response(response).await?;
        let parsed: RecipesResponse = response
            .json()
            .await
            .context("Failed to parse generate response")?;
        Ok(parsed.recipes)
    }

    /// Fetch the full recipe catalog, alphabetically ordered by the server
    pub async fn fetch_all_recipes(&self) -> Result<Vec<RecipeSummary>> {
        let response: RecipesResponse = self.get("/all").await?;
        Ok(response.recipes)
    }

    /// Fetch personalized suggestions. An empty list is a valid answer
    /// (the user has not rated enough recipes yet).
    pub async fn fetch_suggestions(&self) -> Result<Vec<RecipeSummary>> {
        let response: RecipesResponse = self.get("/suggestions").await?;
        Ok(response.recipes)
    }

    /// Fetch the user's favorite recipes
    pub async fn fetch_favorites(&self) -> Result<Vec<RecipeSummary>> {
        let response: RecipesResponse = self.get("/favorites").await?;
        Ok(response.recipes)
    }

    /// Add a recipe to the user's favorites, returning the server's
    /// confirmation message. Duplicates come back as a 409 Conflict.
    pub async fn add_favorite(&self, recipe_name: &str) -> Result<String> {
        let body = serde_json::json!({ "recipe_name": recipe_name });
        let parsed: MessageResponse = self.post("/favorites", &body).await?;
        Ok(parsed.message)
    }

    /// Fetch full detail for a single recipe
    pub async fn fetch_recipe(&self, recipe_name: &str) -> Result<RecipeDetail> {
        self.get(&format!("/recipe/{}", recipe_name)).await
    }

    /// Fetch the rating summary for a recipe
    pub async fn fetch_ratings(&self, recipe_name: &str) -> Result<RatingSummary> {
        self.get(&format!("/recipe/{}/ratings", recipe_name)).await
    }

    /// Submit a 1-5 star rating for a recipe
    pub async fn submit_rating(&self, recipe_name: &str, rating: u8) -> Result<()> {
        let body = serde_json::json!({
            "recipe_name": recipe_name,
            "rating": rating,
        });
        let _: MessageResponse = self.post("/rate", &body).await?;
        Ok(())
    }

    /// Upload a photo and get back the ingredient names recognized in it.
    /// The body is multipart - no explicit content type may be set, or the
    /// boundary the transport generates would be lost.
    pub async fn recognize_ingredients(&self, image_path: &Path) -> Result<Vec<String>> {
        let bytes = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("Failed to read image file {}", image_path.display()))?;

        let file_name = image_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form =
            multipart::Form::new().part("image", multipart::Part::bytes(bytes).file_name(file_name));

        let url = self.url("/recognize-ingredients");
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await
            .context("Failed to upload image")?;

        let response = Self::check_response(response).await?;
        let parsed: RecognizeResponse = response
            .json()
            .await
            .context("Failed to parse recognition response")?;

        debug!(count = parsed.recognized_ingredients.len(), "Ingredients recognized");
        Ok(parsed.recognized_ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building_strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/ingredients"), "http://localhost:5000/api/ingredients");

        let client = ApiClient::new("https://recipes.example.com").unwrap();
        assert_eq!(
            client.url("/recipe/Tomato Pasta/ratings"),
            "https://recipes.example.com/api/recipe/Tomato Pasta/ratings"
        );
    }

    #[test]
    fn test_auth_headers_with_and_without_token() {
        let mut client = ApiClient::new("http://localhost:5000").unwrap();
        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());

        client.set_token("abc.def.ghi".to_string());
        let headers = client.auth_headers().unwrap();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer abc.def.ghi"
        );

        client.clear_token();
        assert!(client.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_recipes_response_parsing() {
        let json = r#"{"recipes": [
            {"name": "Tomato Pasta", "similarity": 0.83, "difficulty": "Easy",
             "cook_time": 20, "cuisine": "Italian", "image_url": null,
             "steps_snippet": "Boil pasta.",
             "substitutions": {"butter": "olive oil"}},
            {"name": "Greek Salad", "difficulty": "Easy", "cook_time": 10,
             "cuisine": "Mediterranean", "image_url": null, "substitutions": {}}
        ]}"#;
        let parsed: RecipesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.recipes.len(), 2);
        assert!(parsed.recipes[0].has_substitutions());
        assert_eq!(parsed.recipes[0].similarity, Some(0.83));
        assert!(!parsed.recipes[1].has_substitutions());
    }

    #[test]
    fn test_ingredients_response_parsing() {
        let parsed: IngredientsResponse =
            serde_json::from_str(r#"{"ingredients": ["egg", "flour"]}"#).unwrap();
        assert_eq!(parsed.ingredients, vec!["egg", "flour"]);
    }
}
