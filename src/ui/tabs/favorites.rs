//! The Favorites tab: recipes the user saved.

use ratatui::{layout::Rect, Frame};

use crate::app::App;
use crate::ui::tabs::detail;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    detail::render_browse(
        frame,
        app,
        area,
        "Your Favorite Recipes",
        "No favorites yet. Open a recipe and press [f] to save it.",
        app.loading_favorites,
    );
}
