//! The Discover tab: the full recipe catalog.

use ratatui::{layout::Rect, Frame};

use crate::app::App;
use crate::ui::tabs::detail;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    detail::render_browse(
        frame,
        app,
        area,
        "Discover Recipes",
        "No recipes available.",
        app.loading_discover,
    );
}
