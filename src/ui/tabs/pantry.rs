//! The Pantry tab: ingredient entry, generation filters and results.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, Focus};
use crate::ui::styles;
use crate::ui::tabs::detail;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_pantry_panel(frame, app, chunks[0]);
    render_results_panel(frame, app, chunks[1]);
}

fn render_pantry_panel(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Ingredient list
            Constraint::Length(3), // Input line
            Constraint::Length(4), // Filters
            Constraint::Length(3), // Hints
        ])
        .split(area);

    render_ingredient_list(frame, app, chunks[0]);
    render_ingredient_input(frame, app, chunks[1]);
    render_filters(frame, app, chunks[2]);
    render_hints(frame, app, chunks[3]);
}

fn render_ingredient_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);
    let block = Block::default()
        .title(format!(" Your Ingredients ({}) ", app.pantry.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if app.pantry.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                "No ingredients yet.",
                styles::muted_style(),
            )),
            Line::from(Span::styled(
                "Press [a] to add one, or [i] to recognize them from a photo.",
                styles::muted_style(),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = app
        .pantry
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let style = if i == app.pantry_selection && focused {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(format!("  {}", name))).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(app.pantry_selection));

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_ingredient_input(frame: &mut Frame, app: &App, area: Rect) {
    let entering = matches!(app.state, AppState::EnteringIngredient);
    let entering_path = matches!(app.state, AppState::EnteringImagePath);

    let line = if entering {
        Line::from(vec![
            Span::styled("Add: ", styles::highlight_style()),
            Span::raw(app.pantry_input.clone()),
            Span::styled("▌", styles::highlight_style()),
        ])
    } else if entering_path {
        Line::from(vec![
            Span::styled("Image: ", styles::highlight_style()),
            Span::raw(app.image_path_input.clone()),
            Span::styled("▌", styles::highlight_style()),
        ])
    } else if app.recognizing {
        Line::from(Span::styled("Recognizing ingredients...", styles::muted_style()))
    } else {
        Line::from(Span::styled(
            "Press [a] to type an ingredient",
            styles::muted_style(),
        ))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(entering || entering_path));
    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled("[v] Diet: ", styles::muted_style()),
            Span::styled(app.filters.dietary.label(), styles::highlight_style()),
            Span::styled("   [c] Difficulty: ", styles::muted_style()),
            Span::styled(app.filters.difficulty.label(), styles::highlight_style()),
        ]),
        Line::from(vec![
            Span::styled("[t] Max time: ", styles::muted_style()),
            Span::styled(app.filters.max_time_label(), styles::highlight_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Filters ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

fn render_hints(frame: &mut Frame, _app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled("[g]", styles::help_key_style()),
        Span::styled(" generate  ", styles::muted_style()),
        Span::styled("[x]", styles::help_key_style()),
        Span::styled(" remove  ", styles::muted_style()),
        Span::styled("[i]", styles::help_key_style()),
        Span::styled(" from image", styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_results_panel(frame: &mut Frame, app: &App, area: Rect) {
    if app.selected_recipe.is_some() || app.loading_detail {
        detail::render_recipe_detail(frame, app, area);
        return;
    }

    if app.loading_generate {
        let block = Block::default()
            .title(" Generated Recipes ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(matches!(app.focus, Focus::Detail)));
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Generating recipes...",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let recipes = app.visible_recipes(crate::app::Tab::Pantry);
    detail::render_recipe_list(
        frame,
        area,
        "Generated Recipes",
        &recipes,
        app.generated_selection,
        matches!(app.focus, Focus::Detail),
        "No matching recipes found. Try different ingredients or filters!",
    );
}
