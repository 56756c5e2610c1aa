//! Application state management for PantryChef.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, the pantry form, fetched recipe data, session management
//! and background task coordination.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{CredentialStore, Session};
use crate::cache::manager::CacheAges;
use crate::cache::CacheManager;
use crate::config::Config;
use crate::models::{RatingSummary, RecipeDetail, RecipeFilters, RecipeSummary};
use crate::utils::title_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh produces a handful of results; 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email and name inputs
const MAX_TEXT_LENGTH: usize = 64;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a typed ingredient name
const MAX_INGREDIENT_LENGTH: usize = 40;

/// Maximum length for the image path prompt
const MAX_PATH_LENGTH: usize = 256;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Delay between the session-expired notice and the forced return to the
/// login view. Long enough to read the notice, short enough not to strand
/// the user on a dead session.
const LOGOUT_DELAY: Duration = Duration::from_secs(2);

/// How long a transient status message stays in the status bar
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(4);

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Pantry,
    Discover,
    Suggestions,
    Favorites,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Pantry => "Pantry",
            Tab::Discover => "Discover",
            Tab::Suggestions => "Suggestions",
            Tab::Favorites => "Favorites",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Pantry => Tab::Discover,
            Tab::Discover => Tab::Suggestions,
            Tab::Suggestions => Tab::Favorites,
            Tab::Favorites => Tab::Pantry,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Pantry => Tab::Favorites,
            Tab::Discover => Tab::Pantry,
            Tab::Suggestions => Tab::Discover,
            Tab::Favorites => Tab::Suggestions,
        }
    }
}

/// Current UI focus area (pantry/list panel or results/detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    LoggingIn,
    Registering,
    EnteringIngredient,
    EnteringImagePath,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
    RegisterLink,
}

/// Registration form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterFocus {
    Name,
    Email,
    Password,
    Dietary,
    Button,
}

/// Dietary preference selected at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietPreference {
    #[default]
    NonVeg,
    Veg,
}

impl DietPreference {
    pub fn toggle(&self) -> Self {
        match self {
            DietPreference::NonVeg => DietPreference::Veg,
            DietPreference::Veg => DietPreference::NonVeg,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DietPreference::NonVeg => "Non-vegetarian",
            DietPreference::Veg => "Vegetarian",
        }
    }

    /// Wire value expected by the registration endpoint
    pub fn param(&self) -> &'static str {
        match self {
            DietPreference::NonVeg => "non-veg",
            DietPreference::Veg => "veg",
        }
    }
}

// ============================================================================
// Pantry Validation
// ============================================================================

/// Reasons a typed ingredient is rejected before any network call is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PantryRejection {
    Empty,
    Unknown(String),
    Duplicate(String),
}

impl PantryRejection {
    pub fn message(&self) -> String {
        match self {
            PantryRejection::Empty => "Please enter an ingredient name.".to_string(),
            PantryRejection::Unknown(name) => {
                format!("'{}' is not a valid ingredient.", name)
            }
            PantryRejection::Duplicate(name) => {
                format!("'{}' has been added more than once.", name)
            }
        }
    }
}

/// Validate a typed ingredient against the known catalog and the entries
/// already in the pantry. Comparison is case-insensitive; the accepted
/// entry comes back title-cased for display.
pub fn validate_pantry_entry(
    known: &[String],
    pantry: &[String],
    input: &str,
) -> Result<String, PantryRejection> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PantryRejection::Empty);
    }
    if !known.iter().any(|k| k.eq_ignore_ascii_case(trimmed)) {
        return Err(PantryRejection::Unknown(trimmed.to_string()));
    }
    if pantry.iter().any(|p| p.eq_ignore_ascii_case(trimmed)) {
        return Err(PantryRejection::Duplicate(trimmed.to_string()));
    }
    Ok(title_case(&trimmed.to_lowercase()))
}

/// Title-cased display list for the ingredient catalog ("egg" -> "Egg")
fn display_ingredients(raw: &[String]) -> Vec<String> {
    raw.iter().map(|i| title_case(i)).collect()
}

// ============================================================================
// Forced Logout Scheduling
// ============================================================================

/// One-shot timer for the forced logout after a 401/403.
/// Several in-flight requests can fail together; only the first failure
/// arms the timer, so the logout and redirect happen exactly once.
#[derive(Debug, Default)]
struct LogoutSchedule {
    deadline: Option<Instant>,
}

impl LogoutSchedule {
    /// Arm the timer. Returns false when a logout is already pending.
    fn schedule(&mut self, delay: Duration) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(Instant::now() + delay);
        true
    }

    /// True exactly once, when the armed deadline has passed.
    fn take_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background API tasks.
///
/// These variants are sent through an MPSC channel from spawned tasks back
/// to the main application loop.
enum RefreshResult {
    /// Known-ingredient catalog (raw lowercase names)
    Ingredients(Vec<String>),
    /// Recipes generated from the pantry contents
    Generated(Vec<RecipeSummary>),
    /// Full recipe catalog for the Discover tab
    AllRecipes(Vec<RecipeSummary>),
    /// Personalized suggestions
    Suggestions(Vec<RecipeSummary>),
    /// The user's favorite recipes
    Favorites(Vec<RecipeSummary>),
    /// Full detail for the recipe being viewed
    RecipeDetail(Box<RecipeDetail>),
    /// Rating summary for a recipe (name, summary)
    Ratings(String, RatingSummary),
    /// Ratings could not be loaded for a recipe (non-fatal)
    RatingsUnavailable(String),
    /// Ingredient names recognized in an uploaded photo
    Recognized(Vec<String>),
    /// A transient confirmation message to show in the status bar
    Status(String),
    /// The server rejected the session (401/403) - forced logout path
    SessionExpired,
    /// An error occurred in a background task
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,
    pub cache: CacheManager,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Registration form state
    pub register_name: String,
    pub register_email: String,
    pub register_password: String,
    pub register_diet: DietPreference,
    pub register_focus: RegisterFocus,
    pub register_error: Option<String>,

    // Pantry form state
    pub known_ingredients: Vec<String>,
    pub pantry: Vec<String>,
    pub pantry_selection: usize,
    pub pantry_input: String,
    pub image_path_input: String,
    pub filters: RecipeFilters,
    /// Pantry snapshot (lowercase) taken at the last generate call; used
    /// for the "you will also need" section of the detail view
    last_generated_pantry: BTreeSet<String>,

    // Fetched recipe lists
    pub generated: Vec<RecipeSummary>,
    pub discover: Vec<RecipeSummary>,
    pub suggestions: Vec<RecipeSummary>,
    pub favorites: Vec<RecipeSummary>,

    // Selection indices (into the search-filtered visible lists)
    pub generated_selection: usize,
    pub discover_selection: usize,
    pub suggestions_selection: usize,
    pub favorites_selection: usize,

    // Detail panel state
    pub selected_recipe: Option<RecipeDetail>,
    pub selected_substitutions: BTreeMap<String, String>,
    pub selected_ratings: Option<RatingSummary>,
    pub ratings_error: bool,
    pub servings: u32,

    // Loading flags
    pub loading_generate: bool,
    pub loading_detail: bool,
    pub loading_discover: bool,
    pub loading_suggestions: bool,
    pub loading_favorites: bool,
    pub recognizing: bool,

    // Background task channel
    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    refresh_tx: mpsc::Sender<RefreshResult>,

    // Transient status message
    pub status_message: Option<String>,
    status_posted_at: Option<Instant>,

    // Forced logout after 401/403
    logout: LogoutSchedule,

    // Cache ages for status bar
    pub cache_ages: CacheAges,
}

impl App {
    /// Create a new application instance
    pub async fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        // Load session from disk if it exists
        let mut session = Session::new(cache_dir.clone());
        let load_result = session.load();
        debug!(?load_result, has_data = session.data.is_some(), "Session loaded");

        let mut api = ApiClient::new(config.server_url())?;

        // If we have a valid session, set the token on the API client
        if let Some(ref data) = session.data {
            if !data.is_expired() {
                api.set_token(data.token.clone());
                debug!("Token set on API client");
            }
        }

        let cache = CacheManager::new(cache_dir)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login email from env var or config
        let login_email = std::env::var("PANTRYCHEF_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            cache,

            state: AppState::Normal,
            current_tab: Tab::Pantry,
            focus: Focus::List,
            search_query: String::new(),

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_error: None,

            register_name: String::new(),
            register_email: String::new(),
            register_password: String::new(),
            register_diet: DietPreference::default(),
            register_focus: RegisterFocus::Name,
            register_error: None,

            known_ingredients: Vec::new(),
            pantry: Vec::new(),
            pantry_selection: 0,
            pantry_input: String::new(),
            image_path_input: String::new(),
            filters: RecipeFilters::default(),
            last_generated_pantry: BTreeSet::new(),

            generated: Vec::new(),
            discover: Vec::new(),
            suggestions: Vec::new(),
            favorites: Vec::new(),

            generated_selection: 0,
            discover_selection: 0,
            suggestions_selection: 0,
            favorites_selection: 0,

            selected_recipe: None,
            selected_substitutions: BTreeMap::new(),
            selected_ratings: None,
            ratings_error: false,
            servings: 1,

            loading_generate: false,
            loading_detail: false,
            loading_discover: false,
            loading_suggestions: false,
            loading_favorites: false,
            recognizing: false,

            refresh_rx: Some(rx),
            refresh_tx: tx,

            status_message: None,
            status_posted_at: None,

            logout: LogoutSchedule::default(),

            cache_ages: Default::default(),
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Check if the user is authenticated with a valid session
    pub fn is_authenticated(&self) -> bool {
        self.session.is_valid()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Switch to the registration form
    pub fn start_register(&mut self) {
        self.state = AppState::Registering;
        self.register_focus = RegisterFocus::Name;
        self.register_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(session_data) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session.update(session_data);
                if let Err(e) = self.session.save() {
                    warn!(error = %e, "Failed to save session");
                }

                if let Some(ref data) = self.session.data {
                    self.api.set_token(data.token.clone());
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");

                self.refresh_all_background();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let user_message = match e.downcast_ref::<ApiError>() {
                    // A 401 at login means bad credentials, not an expired
                    // session - shown inline, no logout machinery involved.
                    Some(ApiError::Unauthorized) => "Invalid email or password".to_string(),
                    Some(ApiError::NetworkError(inner)) if inner.is_timeout() => {
                        "Connection timed out. Please try again.".to_string()
                    }
                    Some(ApiError::NetworkError(_)) => {
                        "Unable to connect to server. Check your internet connection.".to_string()
                    }
                    _ => format!("Login failed: {}", e),
                };
                self.login_error = Some(user_message);
                Err(e)
            }
        }
    }

    /// Attempt registration with the values from the registration form
    pub async fn attempt_register(&mut self) -> Result<()> {
        let name = self.register_name.trim().to_string();
        let email = self.register_email.trim().to_string();
        let password = self.register_password.clone();

        if name.is_empty() || email.is_empty() || password.is_empty() {
            self.register_error = Some("All fields are required".to_string());
            return Err(anyhow::anyhow!("All fields are required"));
        }

        self.register_error = None;

        match self
            .api
            .register(&name, &email, &password, self.register_diet.param())
            .await
        {
            Ok(_) => {
                info!("Registration successful");
                self.set_status("Registration successful! Please log in.");
                self.login_email = email;
                self.register_password.clear();
                self.start_login();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                let user_message = match e.downcast_ref::<ApiError>() {
                    Some(ApiError::Conflict(msg)) => msg.clone(),
                    Some(ApiError::NetworkError(_)) => {
                        "Unable to connect to server. Check your internet connection.".to_string()
                    }
                    _ => format!("Registration failed: {}", e),
                };
                self.register_error = Some(user_message);
                Err(e)
            }
        }
    }

    /// Log out immediately: remove the stored token and return to login
    pub fn logout_now(&mut self) {
        info!("Logging out");
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove stored session");
        }
        self.api.clear_token();
        self.clear_user_data();
        self.start_login();
    }

    /// Drop data tied to the old session
    fn clear_user_data(&mut self) {
        self.favorites.clear();
        self.suggestions.clear();
        self.generated.clear();
        self.close_detail();
    }

    // =========================================================================
    // Status & Timers
    // =========================================================================

    /// Show a transient message in the status bar
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_posted_at = Some(Instant::now());
    }

    /// Advance time-based state. Called once per event-loop iteration:
    /// expires the transient status message and performs the deferred
    /// logout once its delay has elapsed.
    pub fn tick(&mut self) {
        if self.logout.take_due() {
            self.logout_now();
        }

        if let Some(posted_at) = self.status_posted_at {
            if posted_at.elapsed() >= STATUS_MESSAGE_TTL {
                self.status_message = None;
                self.status_posted_at = None;
            }
        }
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Load all data from cache for instant first paint
    pub fn load_from_cache(&mut self) {
        if let Ok(Some(cached)) = self.cache.load_ingredients() {
            self.known_ingredients = display_ingredients(&cached.data);
        }

        if let Ok(Some(cached)) = self.cache.load_discover() {
            self.discover = cached.data;
        }

        if let Ok(Some(cached)) = self.cache.load_favorites() {
            self.favorites = cached.data;
        }

        if let Ok(Some(cached)) = self.cache.load_suggestions() {
            self.suggestions = cached.data;
        }

        self.cache_ages = self.cache.get_cache_ages();
    }

    /// Check if any cache data is stale
    pub fn is_cache_stale(&self) -> bool {
        self.cache.any_stale()
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<RefreshResult>, result: RefreshResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Convert a failed API call into the right channel message: 401/403
    /// become the session-expiry signal, everything else a user-readable
    /// error notice. Nothing is retried.
    fn failure_result(context: &str, err: anyhow::Error) -> RefreshResult {
        match err.downcast_ref::<ApiError>() {
            Some(api_err) if api_err.is_auth_failure() => RefreshResult::SessionExpired,
            Some(ApiError::NetworkError(inner)) if inner.is_timeout() => {
                RefreshResult::Error("Connection timed out. Please try again.".to_string())
            }
            Some(ApiError::NetworkError(_)) => {
                RefreshResult::Error("Network error. Check your connection.".to_string())
            }
            // 404/409 carry a message written for the user - show it as-is
            Some(ApiError::NotFound(msg)) | Some(ApiError::Conflict(msg)) if !msg.is_empty() => {
                RefreshResult::Error(msg.clone())
            }
            Some(api_err) => RefreshResult::Error(format!("{}: {}", context, api_err)),
            None => RefreshResult::Error(format!("{}: {}", context, err)),
        }
    }

    /// Spawn a background task to refresh the ingredient catalog and every
    /// recipe list. Requests run sequentially - this client never overlaps
    /// its own API calls - and the task stops at the first session failure.
    pub fn refresh_all_background(&mut self) {
        if self.session.token().is_none() {
            warn!("No token available for refresh");
            return;
        }

        info!("Starting background refresh of all data");
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        self.loading_discover = true;
        self.loading_suggestions = true;
        self.loading_favorites = true;

        tokio::spawn(async move {
            match api.fetch_ingredients().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Ingredients(data)).await,
                Err(e) => {
                    let result = Self::failure_result("Ingredients", e);
                    let expired = matches!(result, RefreshResult::SessionExpired);
                    Self::send_result(&tx, result).await;
                    if expired {
                        return;
                    }
                }
            }

            match api.fetch_all_recipes().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::AllRecipes(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Recipes", e)).await,
            }

            match api.fetch_favorites().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Favorites(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Favorites", e)).await,
            }

            match api.fetch_suggestions().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Suggestions(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Suggestions", e)).await,
            }

            debug!("Background refresh complete");
        });

        self.set_status("Refreshing data...");
    }

    /// Switch tabs, fetching the tab's data when it has none yet
    pub fn select_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.focus = Focus::List;
        self.close_detail();

        match tab {
            Tab::Pantry => {}
            Tab::Discover => {
                if self.discover.is_empty() && !self.loading_discover {
                    self.fetch_discover();
                }
            }
            Tab::Suggestions => {
                if self.suggestions.is_empty() && !self.loading_suggestions {
                    self.fetch_suggestions();
                }
            }
            Tab::Favorites => {
                if self.favorites.is_empty() && !self.loading_favorites {
                    self.fetch_favorites();
                }
            }
        }
    }

    fn fetch_discover(&mut self) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        self.loading_discover = true;

        tokio::spawn(async move {
            match api.fetch_all_recipes().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::AllRecipes(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Recipes", e)).await,
            }
        });
    }

    fn fetch_suggestions(&mut self) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        self.loading_suggestions = true;

        tokio::spawn(async move {
            match api.fetch_suggestions().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Suggestions(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Suggestions", e)).await,
            }
        });
    }

    fn fetch_favorites(&mut self) {
        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        self.loading_favorites = true;

        tokio::spawn(async move {
            match api.fetch_favorites().await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Favorites(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Favorites", e)).await,
            }
        });
    }

    // =========================================================================
    // Pantry Form
    // =========================================================================

    /// Validate and add the typed ingredient to the pantry.
    /// Rejections never reach the network.
    pub fn add_pantry_entry(&mut self) -> bool {
        match validate_pantry_entry(&self.known_ingredients, &self.pantry, &self.pantry_input) {
            Ok(entry) => {
                self.pantry.push(entry);
                self.pantry_input.clear();
                self.pantry_selection = self.pantry.len() - 1;
                true
            }
            Err(rejection) => {
                self.set_status(rejection.message());
                false
            }
        }
    }

    /// Remove the selected pantry entry
    pub fn remove_selected_pantry_entry(&mut self) {
        if self.pantry_selection < self.pantry.len() {
            self.pantry.remove(self.pantry_selection);
            if self.pantry_selection >= self.pantry.len() && !self.pantry.is_empty() {
                self.pantry_selection = self.pantry.len() - 1;
            }
        }
    }

    /// Pantry contents as the generation endpoint expects them:
    /// lowercase name -> quantity (the service only cares about presence)
    fn pantry_map(&self) -> BTreeMap<String, f64> {
        self.pantry
            .iter()
            .map(|name| (name.to_lowercase(), 1.0))
            .collect()
    }

    /// Generate recipes from the current pantry. Requires at least one
    /// entry; the requirement is enforced locally.
    pub fn generate_recipes(&mut self) {
        if self.pantry.is_empty() {
            self.set_status("Please add at least one ingredient.");
            return;
        }

        let pantry = self.pantry_map();
        self.last_generated_pantry = pantry.keys().cloned().collect();

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        let filters = self.filters;

        self.loading_generate = true;
        self.close_detail();
        self.focus = Focus::Detail;

        tokio::spawn(async move {
            match api.generate(&pantry, &filters).await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Generated(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Generate", e)).await,
            }
        });
    }

    /// Upload a photo and merge the recognized ingredients into the pantry
    pub fn recognize_image(&mut self) {
        let path = PathBuf::from(self.image_path_input.trim());
        if path.as_os_str().is_empty() {
            self.set_status("Please enter an image path.");
            return;
        }

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();
        self.recognizing = true;

        tokio::spawn(async move {
            match api.recognize_ingredients(&path).await {
                Ok(data) => Self::send_result(&tx, RefreshResult::Recognized(data)).await,
                Err(e) => Self::send_result(&tx, Self::failure_result("Recognition", e)).await,
            }
        });

        self.set_status("Recognizing ingredients...");
    }

    /// Merge recognized ingredient names into the pantry, skipping ones
    /// already present
    fn merge_recognized(&mut self, names: Vec<String>) {
        let mut added = 0;
        for name in names {
            if validate_pantry_entry(&self.known_ingredients, &self.pantry, &name).is_ok() {
                self.pantry.push(title_case(&name.to_lowercase()));
                added += 1;
            }
        }
        if added > 0 {
            self.set_status("Ingredients added from image!");
        } else {
            self.set_status("No new ingredients recognized.");
        }
    }

    // =========================================================================
    // Recipe Lists & Detail
    // =========================================================================

    /// Recipes for a tab after applying the search filter
    pub fn visible_recipes(&self, tab: Tab) -> Vec<&RecipeSummary> {
        let list = match tab {
            Tab::Pantry => &self.generated,
            Tab::Discover => &self.discover,
            Tab::Suggestions => &self.suggestions,
            Tab::Favorites => &self.favorites,
        };

        if self.search_query.is_empty() {
            return list.iter().collect();
        }

        let query = self.search_query.to_lowercase();
        list.iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&query)
                    || r.cuisine
                        .as_deref()
                        .map(|c| c.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    pub fn selection(&self, tab: Tab) -> usize {
        match tab {
            Tab::Pantry => self.generated_selection,
            Tab::Discover => self.discover_selection,
            Tab::Suggestions => self.suggestions_selection,
            Tab::Favorites => self.favorites_selection,
        }
    }

    fn selection_mut(&mut self, tab: Tab) -> &mut usize {
        match tab {
            Tab::Pantry => &mut self.generated_selection,
            Tab::Discover => &mut self.discover_selection,
            Tab::Suggestions => &mut self.suggestions_selection,
            Tab::Favorites => &mut self.favorites_selection,
        }
    }

    /// Move the recipe-list selection on the current tab
    pub fn move_browse_selection(&mut self, delta: isize) {
        let len = self.visible_recipes(self.current_tab).len();
        if len == 0 {
            return;
        }
        let tab = self.current_tab;
        let selection = self.selection_mut(tab);
        let new = (*selection as isize + delta).clamp(0, len as isize - 1);
        *selection = new as usize;
    }

    /// Snap the current tab's selection back to the top (after the search
    /// filter changes the visible list)
    pub fn reset_browse_selection(&mut self) {
        let tab = self.current_tab;
        *self.selection_mut(tab) = 0;
    }

    /// Move the pantry-entry selection
    pub fn move_pantry_selection(&mut self, delta: isize) {
        if self.pantry.is_empty() {
            return;
        }
        let new = (self.pantry_selection as isize + delta).clamp(0, self.pantry.len() as isize - 1);
        self.pantry_selection = new as usize;
    }

    /// Open the detail view for the currently selected recipe.
    /// A fresh cached copy paints immediately; the fetch still runs so the
    /// ratings are current.
    pub fn open_selected_recipe(&mut self) {
        let tab = self.current_tab;
        let selection = self.selection(tab);
        let Some(recipe) = self.visible_recipes(tab).get(selection).copied() else {
            return;
        };

        let name = recipe.name.clone();
        let substitutions = recipe.substitutions.clone();

        self.selected_substitutions = substitutions;
        self.selected_recipe = None;
        self.selected_ratings = None;
        self.ratings_error = false;
        self.loading_detail = true;
        self.focus = Focus::Detail;

        if let Ok(Some(cached)) = self.cache.load_recipe(&name) {
            if !cached.is_stale() {
                self.servings = cached.data.servings.max(1);
                self.selected_recipe = Some(cached.data);
                self.loading_detail = false;
            }
        }

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.fetch_recipe(&name).await {
                Ok(detail) => {
                    Self::send_result(&tx, RefreshResult::RecipeDetail(Box::new(detail))).await;
                }
                Err(e) => {
                    Self::send_result(&tx, Self::failure_result("Recipe", e)).await;
                    return;
                }
            }

            // Ratings load after the detail, never alongside it
            match api.fetch_ratings(&name).await {
                Ok(summary) => {
                    Self::send_result(&tx, RefreshResult::Ratings(name, summary)).await;
                }
                Err(e) => {
                    let result = Self::failure_result("Ratings", e);
                    if matches!(result, RefreshResult::SessionExpired) {
                        Self::send_result(&tx, result).await;
                    } else {
                        Self::send_result(&tx, RefreshResult::RatingsUnavailable(name)).await;
                    }
                }
            }
        });
    }

    /// Close the detail panel, returning to the list
    pub fn close_detail(&mut self) {
        self.selected_recipe = None;
        self.selected_ratings = None;
        self.selected_substitutions.clear();
        self.ratings_error = false;
        self.loading_detail = false;
    }

    /// Adjust the servings display; ingredient amounts rescale from the
    /// recipe's base servings
    pub fn adjust_servings(&mut self, delta: i32) {
        let new = (self.servings as i32 + delta).max(1) as u32;
        self.servings = new;
    }

    /// Pantry snapshot used for the missing-ingredient section
    pub fn generated_pantry(&self) -> &BTreeSet<String> {
        &self.last_generated_pantry
    }

    /// Add the recipe in the detail panel to favorites, then refresh the
    /// favorites list so the tab stays current
    pub fn favorite_selected(&mut self) {
        let Some(ref recipe) = self.selected_recipe else {
            return;
        };
        let name = recipe.name.clone();

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.add_favorite(&name).await {
                Ok(message) => {
                    let message = if message.is_empty() {
                        "Recipe added to favorites!".to_string()
                    } else {
                        message
                    };
                    Self::send_result(&tx, RefreshResult::Status(message)).await;

                    match api.fetch_favorites().await {
                        Ok(data) => {
                            Self::send_result(&tx, RefreshResult::Favorites(data)).await;
                        }
                        Err(e) => {
                            Self::send_result(&tx, Self::failure_result("Favorites", e)).await;
                        }
                    }
                }
                Err(e) => Self::send_result(&tx, Self::failure_result("Favorite", e)).await,
            }
        });
    }

    /// Submit a star rating for the recipe in the detail panel. The star
    /// display updates immediately; the saved summary replaces it when the
    /// server answers.
    pub fn rate_selected(&mut self, stars: u8) {
        let Some(ref recipe) = self.selected_recipe else {
            return;
        };
        let name = recipe.name.clone();
        let stars = stars.clamp(1, 5);

        let summary = self.selected_ratings.get_or_insert_with(RatingSummary::default);
        summary.user_rating = Some(stars);

        let api = self.api.clone();
        let tx = self.refresh_tx.clone();

        tokio::spawn(async move {
            match api.submit_rating(&name, stars).await {
                Ok(()) => {
                    Self::send_result(
                        &tx,
                        RefreshResult::Status("Your rating has been saved!".to_string()),
                    )
                    .await;

                    match api.fetch_ratings(&name).await {
                        Ok(summary) => {
                            Self::send_result(&tx, RefreshResult::Ratings(name, summary)).await;
                        }
                        Err(_) => {
                            Self::send_result(&tx, RefreshResult::RatingsUnavailable(name)).await;
                        }
                    }
                }
                Err(e) => {
                    let result = Self::failure_result("Rating", e);
                    let message = match result {
                        RefreshResult::SessionExpired => RefreshResult::SessionExpired,
                        _ => RefreshResult::Error("Failed to save your rating.".to_string()),
                    };
                    Self::send_result(&tx, message).await;
                }
            }
        });
    }

    // =========================================================================
    // Background Task Processing
    // =========================================================================

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let results: Vec<RefreshResult> = {
            if let Some(ref mut rx) = self.refresh_rx {
                let mut results = Vec::new();
                while let Ok(result) = rx.try_recv() {
                    results.push(result);
                }
                results
            } else {
                Vec::new()
            }
        };

        for result in results {
            self.process_refresh_result(result);
        }
    }

    /// Process a single result from a background task, updating app state
    /// and the on-disk cache.
    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Ingredients(raw) => {
                if let Err(e) = self.cache.save_ingredients(&raw) {
                    warn!(error = %e, "Failed to cache ingredient catalog");
                }
                self.known_ingredients = display_ingredients(&raw);
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::Generated(data) => {
                self.loading_generate = false;
                self.generated = data;
                self.generated_selection = 0;
            }
            RefreshResult::AllRecipes(data) => {
                self.loading_discover = false;
                if let Err(e) = self.cache.save_discover(&data) {
                    warn!(error = %e, "Failed to cache recipe catalog");
                }
                self.discover = data;
                self.discover_selection = 0;
                self.cache_ages = self.cache.get_cache_ages();
            }
            RefreshResult::Suggestions(data) => {
                self.loading_suggestions = false;
                if let Err(e) = self.cache.save_suggestions(&data) {
                    warn!(error = %e, "Failed to cache suggestions");
                }
                self.suggestions = data;
                self.suggestions_selection = 0;
            }
            RefreshResult::Favorites(data) => {
                self.loading_favorites = false;
                if let Err(e) = self.cache.save_favorites(&data) {
                    warn!(error = %e, "Failed to cache favorites");
                }
                self.favorites = data;
                if self.favorites_selection >= self.favorites.len() {
                    self.favorites_selection = self.favorites.len().saturating_sub(1);
                }
            }
            RefreshResult::RecipeDetail(detail) => {
                self.loading_detail = false;
                if let Err(e) = self.cache.save_recipe(&detail) {
                    warn!(error = %e, "Failed to cache recipe detail");
                }
                self.servings = detail.servings.max(1);
                self.selected_recipe = Some(*detail);
            }
            RefreshResult::Ratings(name, summary) => {
                if self
                    .selected_recipe
                    .as_ref()
                    .map(|r| r.name == name)
                    .unwrap_or(false)
                {
                    self.selected_ratings = Some(summary);
                    self.ratings_error = false;
                }
            }
            RefreshResult::RatingsUnavailable(name) => {
                if self
                    .selected_recipe
                    .as_ref()
                    .map(|r| r.name == name)
                    .unwrap_or(false)
                {
                    self.ratings_error = true;
                }
            }
            RefreshResult::Recognized(names) => {
                self.recognizing = false;
                self.merge_recognized(names);
            }
            RefreshResult::Status(message) => {
                self.set_status(message);
            }
            RefreshResult::SessionExpired => {
                self.clear_loading_flags();
                // Already back on the login view - nothing left to end
                if matches!(self.state, AppState::LoggingIn | AppState::Registering) {
                    return;
                }
                if self.logout.schedule(LOGOUT_DELAY) {
                    warn!("Session rejected by server, forcing logout");
                    self.set_status("Session expired. Please log in again.");
                }
            }
            RefreshResult::Error(message) => {
                error!(error = %message, "Background task error");
                self.clear_loading_flags();
                self.set_status(message);
            }
        }
    }

    fn clear_loading_flags(&mut self) {
        self.loading_generate = false;
        self.loading_detail = false;
        self.loading_discover = false;
        self.loading_suggestions = false;
        self.loading_favorites = false;
        self.recognizing = false;
    }

    // =========================================================================
    // Input Limits
    // =========================================================================

    pub fn can_add_text_char(value: &str) -> bool {
        value.len() < MAX_TEXT_LENGTH
    }

    pub fn can_add_password_char(value: &str) -> bool {
        value.len() < MAX_PASSWORD_LENGTH
    }

    pub fn can_add_ingredient_char(value: &str) -> bool {
        value.len() < MAX_INGREDIENT_LENGTH
    }

    pub fn can_add_path_char(value: &str) -> bool {
        value.len() < MAX_PATH_LENGTH
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        display_ingredients(&[
            "egg".to_string(),
            "flour".to_string(),
            "olive oil".to_string(),
        ])
    }

    #[test]
    fn test_display_ingredients_title_cases_catalog() {
        let list = display_ingredients(&["egg".to_string(), "flour".to_string()]);
        assert_eq!(list, vec!["Egg".to_string(), "Flour".to_string()]);
    }

    #[test]
    fn test_unknown_ingredient_rejected_locally() {
        let result = validate_pantry_entry(&known(), &[], "dragonfruit");
        assert_eq!(
            result,
            Err(PantryRejection::Unknown("dragonfruit".to_string()))
        );
        assert_eq!(
            result.unwrap_err().message(),
            "'dragonfruit' is not a valid ingredient."
        );
    }

    #[test]
    fn test_duplicate_ingredient_rejected_locally() {
        let pantry = vec!["Egg".to_string()];
        let result = validate_pantry_entry(&known(), &pantry, "egg");
        assert_eq!(result, Err(PantryRejection::Duplicate("egg".to_string())));
        assert_eq!(
            result.unwrap_err().message(),
            "'egg' has been added more than once."
        );
    }

    #[test]
    fn test_valid_ingredient_accepted_case_insensitively() {
        assert_eq!(validate_pantry_entry(&known(), &[], "EGG"), Ok("Egg".to_string()));
        assert_eq!(
            validate_pantry_entry(&known(), &[], "  olive oil "),
            Ok("Olive Oil".to_string())
        );
    }

    #[test]
    fn test_empty_ingredient_rejected() {
        assert_eq!(
            validate_pantry_entry(&known(), &[], "   "),
            Err(PantryRejection::Empty)
        );
    }

    #[test]
    fn test_logout_schedule_fires_exactly_once() {
        let mut logout = LogoutSchedule::default();
        assert!(!logout.is_pending());
        assert!(!logout.take_due());

        // First 401 arms the timer; concurrent failures do not re-arm it
        assert!(logout.schedule(Duration::ZERO));
        assert!(!logout.schedule(Duration::ZERO));
        assert!(logout.is_pending());

        // Fires once, then never again until re-armed
        assert!(logout.take_due());
        assert!(!logout.take_due());
        assert!(!logout.is_pending());
    }

    #[test]
    fn test_logout_schedule_waits_for_deadline() {
        let mut logout = LogoutSchedule::default();
        assert!(logout.schedule(Duration::from_secs(60)));
        assert!(!logout.take_due());
        assert!(logout.is_pending());
    }

    #[test]
    fn test_diet_preference_wire_values() {
        assert_eq!(DietPreference::Veg.param(), "veg");
        assert_eq!(DietPreference::NonVeg.param(), "non-veg");
        assert_eq!(DietPreference::Veg.toggle(), DietPreference::NonVeg);
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Pantry.next(), Tab::Discover);
        assert_eq!(Tab::Favorites.next(), Tab::Pantry);
        assert_eq!(Tab::Pantry.prev(), Tab::Favorites);
        assert_eq!(Tab::Discover.prev(), Tab::Pantry);
    }
}
