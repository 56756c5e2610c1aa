//! Shared rendering for recipe lists and the recipe detail panel.
//!
//! Every tab shows recipes the same way: a selectable list of recipe
//! cards on one side and, once a recipe is opened, the full detail on
//! the other.

use std::collections::BTreeSet;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::RecipeSummary;
use crate::ui::styles;
use crate::utils::{format_cook_time, format_grams, title_case, truncate_string};

/// Render a selectable list of recipe cards
pub fn render_recipe_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    recipes: &[&RecipeSummary],
    selection: usize,
    focused: bool,
    empty_message: &str,
) {
    let block = Block::default()
        .title(format!(" {} ({}) ", title, recipes.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if recipes.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            empty_message.to_string(),
            styles::muted_style(),
        )))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = recipes
        .iter()
        .enumerate()
        .map(|(i, recipe)| {
            let mut spans = vec![Span::raw(truncate_string(&recipe.name, 28))];

            let mut meta = Vec::new();
            if let Some(ref cuisine) = recipe.cuisine {
                meta.push(cuisine.clone());
            }
            if let Some(ref difficulty) = recipe.difficulty {
                meta.push(difficulty.clone());
            }
            if recipe.cook_time.is_some() {
                meta.push(format_cook_time(recipe.cook_time));
            }
            if !meta.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", meta.join(" · ")),
                    styles::muted_style(),
                ));
            }
            if let Some(similarity) = recipe.similarity {
                spans.push(Span::styled(
                    format!("  {:.0}% match", similarity * 100.0),
                    styles::success_style(),
                ));
            }
            if recipe.has_substitutions() {
                spans.push(Span::styled("  [subs]", styles::badge_style()));
            }

            let style = if i == selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let list = List::new(items).block(block);

    let mut state = ListState::default();
    state.select(Some(selection));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the detail panel for the currently opened recipe
pub fn render_recipe_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = true;

    if app.loading_detail && app.selected_recipe.is_none() {
        let block = Block::default()
            .title(" Recipe ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused));
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Loading recipe...",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let Some(ref recipe) = app.selected_recipe else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();

    // Meta line
    let mut meta = Vec::new();
    if let Some(ref cuisine) = recipe.cuisine {
        meta.push(cuisine.clone());
    }
    if let Some(ref difficulty) = recipe.difficulty {
        meta.push(format!("Difficulty: {}", difficulty));
    }
    if recipe.cook_time.is_some() {
        meta.push(format!("Cook Time: {}", format_cook_time(recipe.cook_time)));
    }
    if !meta.is_empty() {
        lines.push(Line::from(Span::styled(
            meta.join("  ·  "),
            styles::muted_style(),
        )));
    }
    if let Some(ref url) = recipe.image_url {
        lines.push(Line::from(Span::styled(
            truncate_string(url, area.width.saturating_sub(4) as usize),
            styles::muted_style(),
        )));
    }
    lines.push(Line::from(""));

    // Servings adjuster
    lines.push(Line::from(vec![
        Span::styled("Servings: ", styles::highlight_style()),
        Span::styled(format!("◂ {} ▸", app.servings), styles::list_item_style()),
        Span::styled("  ([-]/[+])", styles::muted_style()),
    ]));
    lines.push(Line::from(""));

    // Rating section
    let (stars, summary_text) = match (&app.selected_ratings, app.ratings_error) {
        (Some(summary), _) => (summary.star_row(), summary.summary_line()),
        (None, true) => ("☆☆☆☆☆".to_string(), "Could not load rating.".to_string()),
        (None, false) => ("☆☆☆☆☆".to_string(), "Loading rating...".to_string()),
    };
    lines.push(Line::from(vec![
        Span::styled(stars, styles::star_style()),
        Span::raw("  "),
        Span::styled(summary_text, styles::muted_style()),
        Span::styled("  rate with [1]-[5]", styles::muted_style()),
    ]));
    lines.push(Line::from(""));

    // Ingredients, scaled to the chosen servings
    lines.push(Line::from(Span::styled("Ingredients", styles::title_style())));
    for (name, amount) in recipe.scaled_ingredients(app.servings) {
        let mut spans = vec![
            Span::raw("  "),
            Span::raw(title_case(&name)),
        ];
        // Note which pantry ingredient this one stands in for
        for (original, substitute) in app.selected_substitutions.iter() {
            if substitute == &name {
                spans.push(Span::styled(
                    format!(" (for {})", title_case(original)),
                    styles::highlight_style(),
                ));
            }
        }
        spans.push(Span::styled(
            format!("  {}", format_grams(amount)),
            styles::muted_style(),
        ));
        lines.push(Line::from(spans));
    }

    // Ingredients the user still needs to get
    let missing = missing_for_display(app, recipe.missing_ingredients(
        app.generated_pantry(),
        &app.selected_substitutions,
    ));
    if !missing.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "You Will Also Need",
            styles::title_style(),
        )));
        for (name, amount) in missing {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::raw(title_case(&name)),
                Span::styled(format!("  {}", format_grams(amount)), styles::muted_style()),
            ]));
        }
    }

    // Nutrition
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Nutrition", styles::title_style())));
    match recipe.nutrition {
        Some(ref nutrition) if !nutrition.is_empty() => {
            for (key, value) in nutrition {
                let unit = if key.eq_ignore_ascii_case("calories") { "" } else { "g" };
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(title_case(key), styles::highlight_style()),
                    Span::raw(format!("  {}{}", value, unit)),
                ]));
            }
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "  Not available",
                styles::muted_style(),
            )));
        }
    }

    // Steps
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Instructions", styles::title_style())));
    for (i, step) in recipe.steps.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}. ", i + 1), styles::highlight_style()),
            Span::raw(step.clone()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[f] add to favorites   [Esc] back to list",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(format!(" {} ", recipe.name))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Outside the pantry flow there is no "what the user has" snapshot, so
/// the missing section is suppressed rather than listing every ingredient.
fn missing_for_display(app: &App, missing: Vec<(String, f64)>) -> Vec<(String, f64)> {
    let pantry: &BTreeSet<String> = app.generated_pantry();
    if pantry.is_empty() {
        Vec::new()
    } else {
        missing
    }
}

/// Render a browse tab: recipe list on the left, detail on the right once
/// a recipe is opened
pub fn render_browse(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    title: &str,
    empty_message: &str,
    loading: bool,
) {
    use ratatui::layout::{Constraint, Direction, Layout};

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let recipes = app.visible_recipes(app.current_tab);
    let selection = app.selection(app.current_tab);

    let message = if loading && recipes.is_empty() {
        "Loading..."
    } else {
        empty_message
    };

    render_recipe_list(
        frame,
        chunks[0],
        title,
        &recipes,
        selection,
        matches!(app.focus, crate::app::Focus::List),
        message,
    );

    if app.selected_recipe.is_some() || app.loading_detail {
        render_recipe_detail(frame, app, chunks[1]);
    } else {
        let block = Block::default()
            .title(" Recipe ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        let paragraph = Paragraph::new(Line::from(Span::styled(
            "Select a recipe and press Enter",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, chunks[1]);
    }
}
