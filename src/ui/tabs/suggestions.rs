//! The Suggestions tab: personalized recipe picks.

use ratatui::{layout::Rect, Frame};

use crate::app::App;
use crate::ui::tabs::detail;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    detail::render_browse(
        frame,
        app,
        area,
        "Suggested For You",
        "Rate more recipes with 3+ stars to get personalized suggestions!",
        app.loading_suggestions,
    );
}
