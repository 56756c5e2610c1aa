use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, DietPreference, LoginFocus, RegisterFocus, Tab};

use super::styles;
use super::tabs::{discover, favorites, pantry, suggestions};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::Registering) {
        render_register_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  PantryChef";
    let help_hint = "[?] Help";

    // Greet the logged-in user with the name from the token claims
    let user = app
        .session
        .data
        .as_ref()
        .map(|d| format!("{}  ", d.display_name()))
        .unwrap_or_default();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len() + user.len() + help_hint.len() + 4),
        )),
        Span::styled(user, styles::muted_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let main_tabs = vec![
        ("[1] Pantry", app.current_tab == Tab::Pantry),
        ("[2] Discover", app.current_tab == Tab::Discover),
        ("[3] Suggestions", app.current_tab == Tab::Suggestions),
        ("[4] Favorites", app.current_tab == Tab::Favorites),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Pantry => pantry::render(frame, app, area),
        Tab::Discover => discover::render(frame, app, area),
        Tab::Suggestions => suggestions::render(frame, app, area),
        Tab::Favorites => favorites::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [l]ogout | [q]uit";

    let left_text = if matches!(app.state, AppState::Searching) {
        format!(" Search: {}▌ ", app.search_query)
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if !app.search_query.is_empty() {
        format!(" Filter: {} (Esc clears) ", app.search_query)
    } else {
        format!(" Updated {} ", app.cache_ages.last_updated())
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let left_style = if matches!(app.state, AppState::Searching) {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 25, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  PantryChef", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-4       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", styles::help_key_style()),
            Span::styled("Prev/next tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", styles::help_key_style()),
            Span::styled("Switch focus (list ↔ results)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Open recipe", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Esc       ", styles::help_key_style()),
            Span::styled("Go back", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Pantry Tab", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  a / x     ", styles::help_key_style()),
            Span::styled("Add / remove ingredient", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  g         ", styles::help_key_style()),
            Span::styled("Generate recipes", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  i         ", styles::help_key_style()),
            Span::styled("Recognize ingredients from a photo", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  v/c/t     ", styles::help_key_style()),
            Span::styled("Cycle diet/difficulty/time filters", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Recipe View", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  +/-       ", styles::help_key_style()),
            Span::styled("Adjust servings", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  1-5       ", styles::help_key_style()),
            Span::styled("Rate the recipe", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  f         ", styles::help_key_style()),
            Span::styled("Add to favorites", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Render a `label: [value]` form field with a cursor when focused
fn form_field(label: &str, value: &str, focused: bool, mask: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown: String = if mask {
        "*".repeat(value.len().min(20))
    } else {
        value.chars().take(24).collect()
    };
    let display = format!("{:<24}", shown);
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:>9}: [", label), styles::muted_style()),
        Span::styled(format!("{}{}", display, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn form_button(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    if focused {
        Line::from(vec![
            Span::raw("             ["),
            Span::styled(format!(" ▶ {} ◀ ", label), style),
            Span::raw("]"),
        ])
    } else {
        Line::from(vec![
            Span::raw("             ["),
            Span::styled(format!("   {}   ", label), style),
            Span::raw("]"),
        ])
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(50, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("       PantryChef", styles::title_style())),
        Line::from(Span::styled(
            "       What's in your kitchen?",
            styles::muted_style(),
        )),
        Line::from(""),
    ];

    lines.push(form_field(
        "Email",
        &app.login_email,
        app.login_focus == LoginFocus::Email,
        false,
    ));
    lines.push(form_field(
        "Password",
        &app.login_password,
        app.login_focus == LoginFocus::Password,
        true,
    ));

    lines.push(Line::from(""));
    lines.push(form_button("Login", app.login_focus == LoginFocus::Button));

    let register_focused = app.login_focus == LoginFocus::RegisterLink;
    let register_style = if register_focused {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    lines.push(Line::from(vec![
        Span::raw("      "),
        Span::styled("Need an account? ", styles::muted_style()),
        Span::styled("Register", register_style),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_register_overlay(frame: &mut Frame, app: &App) {
    let height = if app.register_error.is_some() { 16 } else { 14 };
    let area = centered_rect_fixed(50, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("       Create an account", styles::title_style())),
        Line::from(""),
    ];

    lines.push(form_field(
        "Name",
        &app.register_name,
        app.register_focus == RegisterFocus::Name,
        false,
    ));
    lines.push(form_field(
        "Email",
        &app.register_email,
        app.register_focus == RegisterFocus::Email,
        false,
    ));
    lines.push(form_field(
        "Password",
        &app.register_password,
        app.register_focus == RegisterFocus::Password,
        true,
    ));

    // Dietary preference toggles with ←/→
    let diet_focused = app.register_focus == RegisterFocus::Dietary;
    let diet_style = if diet_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let marker = match app.register_diet {
        DietPreference::Veg => "Vegetarian ◂▸",
        DietPreference::NonVeg => "Non-vegetarian ◂▸",
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:>9}: ", "Diet"), styles::muted_style()),
        Span::styled(marker, diet_style),
    ]));

    lines.push(Line::from(""));
    lines.push(form_button(
        "Register",
        app.register_focus == RegisterFocus::Button,
    ));
    lines.push(Line::from(Span::styled(
        "       Esc returns to login",
        styles::muted_style(),
    )));

    if let Some(ref error) = app.register_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 8, frame.area());

    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("     PantryChef", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
