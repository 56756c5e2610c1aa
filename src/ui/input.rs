//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Focus, LoginFocus, RegisterFocus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle registration overlay
    if matches!(app.state, AppState::Registering) {
        return handle_register_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Handle the ingredient entry prompt
    if matches!(app.state, AppState::EnteringIngredient) {
        return handle_ingredient_input(app, key);
    }

    // Handle the image path prompt
    if matches!(app.state, AppState::EnteringImagePath) {
        return handle_image_path_input(app, key);
    }

    // Keys that act on the open recipe take precedence: digits rate the
    // recipe instead of switching tabs while the detail panel is open.
    if app.selected_recipe.is_some() {
        match key.code {
            KeyCode::Char(c @ '1'..='5') => {
                app.rate_selected(c as u8 - b'0');
                return Ok(false);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                app.adjust_servings(1);
                return Ok(false);
            }
            KeyCode::Char('-') => {
                app.adjust_servings(-1);
                return Ok(false);
            }
            KeyCode::Char('f') => {
                app.favorite_selected();
                return Ok(false);
            }
            KeyCode::Esc => {
                app.close_detail();
                return Ok(false);
            }
            _ => {}
        }
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => app.select_tab(Tab::Pantry),
        KeyCode::Char('2') => app.select_tab(Tab::Discover),
        KeyCode::Char('3') => app.select_tab(Tab::Suggestions),
        KeyCode::Char('4') => app.select_tab(Tab::Favorites),
        KeyCode::Left => {
            let prev = app.current_tab.prev();
            app.select_tab(prev);
        }
        KeyCode::Right => {
            let next = app.current_tab.next();
            app.select_tab(next);
        }
        KeyCode::Char('u') => {
            app.refresh_all_background();
        }
        KeyCode::Char('l') => {
            app.logout_now();
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.search_query.clear();
        }
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.search_query.clear();
            } else {
                app.focus = Focus::List;
            }
        }
        _ => {
            // Tab-specific input
            match app.current_tab {
                Tab::Pantry => handle_pantry_input(app, key),
                Tab::Discover | Tab::Suggestions | Tab::Favorites => {
                    handle_browse_input(app, key)
                }
            }
        }
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            // Selection resets when the filter changes
            app.reset_browse_selection();
        }
        _ => {}
    }
    Ok(false)
}

fn handle_ingredient_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.pantry_input.clear();
        }
        KeyCode::Enter => {
            // Stay in entry mode after a rejection so the typo can be fixed
            if app.add_pantry_entry() {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Backspace => {
            app.pantry_input.pop();
        }
        KeyCode::Char(c) => {
            if App::can_add_ingredient_char(&app.pantry_input) {
                app.pantry_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_image_path_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.image_path_input.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.recognize_image();
            app.image_path_input.clear();
        }
        KeyCode::Backspace => {
            app.image_path_input.pop();
        }
        KeyCode::Char(c) => {
            if App::can_add_path_char(&app.image_path_input) {
                app.image_path_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::RegisterLink,
                LoginFocus::RegisterLink => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::RegisterLink,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
                LoginFocus::RegisterLink => LoginFocus::Button,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // Errors surface inline on the form
                let _ = app.attempt_login().await;
            }
            LoginFocus::RegisterLink => app.start_register(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            _ => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if App::can_add_text_char(&app.login_email) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if App::can_add_password_char(&app.login_password) {
                    app.login_password.push(c);
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.start_login();
            return Ok(false);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Name => RegisterFocus::Email,
                RegisterFocus::Email => RegisterFocus::Password,
                RegisterFocus::Password => RegisterFocus::Dietary,
                RegisterFocus::Dietary => RegisterFocus::Button,
                RegisterFocus::Button => RegisterFocus::Name,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Name => RegisterFocus::Button,
                RegisterFocus::Email => RegisterFocus::Name,
                RegisterFocus::Password => RegisterFocus::Email,
                RegisterFocus::Dietary => RegisterFocus::Password,
                RegisterFocus::Button => RegisterFocus::Dietary,
            };
        }
        KeyCode::Left | KeyCode::Right => {
            if app.register_focus == RegisterFocus::Dietary {
                app.register_diet = app.register_diet.toggle();
            }
        }
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Name => app.register_focus = RegisterFocus::Email,
            RegisterFocus::Email => app.register_focus = RegisterFocus::Password,
            RegisterFocus::Password => app.register_focus = RegisterFocus::Dietary,
            RegisterFocus::Dietary | RegisterFocus::Button => {
                let _ = app.attempt_register().await;
            }
        },
        KeyCode::Backspace => match app.register_focus {
            RegisterFocus::Name => {
                app.register_name.pop();
            }
            RegisterFocus::Email => {
                app.register_email.pop();
            }
            RegisterFocus::Password => {
                app.register_password.pop();
            }
            _ => {}
        },
        KeyCode::Char(' ') if app.register_focus == RegisterFocus::Dietary => {
            app.register_diet = app.register_diet.toggle();
        }
        KeyCode::Char(c) => match app.register_focus {
            RegisterFocus::Name => {
                if App::can_add_text_char(&app.register_name) {
                    app.register_name.push(c);
                }
            }
            RegisterFocus::Email => {
                if App::can_add_text_char(&app.register_email) {
                    app.register_email.push(c);
                }
            }
            RegisterFocus::Password => {
                if App::can_add_password_char(&app.register_password) {
                    app.register_password.push(c);
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_pantry_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') => {
            app.state = AppState::EnteringIngredient;
            app.pantry_input.clear();
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            if matches!(app.focus, Focus::List) {
                app.remove_selected_pantry_entry();
            }
        }
        KeyCode::Char('g') => {
            app.generate_recipes();
        }
        KeyCode::Char('i') => {
            app.state = AppState::EnteringImagePath;
            app.image_path_input.clear();
        }
        KeyCode::Char('v') => {
            app.filters.cycle_dietary();
        }
        KeyCode::Char('c') => {
            app.filters.cycle_difficulty();
        }
        KeyCode::Char('t') => {
            app.filters.cycle_max_time();
        }
        KeyCode::Up => match app.focus {
            Focus::List => app.move_pantry_selection(-1),
            Focus::Detail => app.move_browse_selection(-1),
        },
        KeyCode::Down => match app.focus {
            Focus::List => app.move_pantry_selection(1),
            Focus::Detail => app.move_browse_selection(1),
        },
        KeyCode::PageUp => match app.focus {
            Focus::List => app.move_pantry_selection(-(PAGE_SCROLL_SIZE as isize)),
            Focus::Detail => app.move_browse_selection(-(PAGE_SCROLL_SIZE as isize)),
        },
        KeyCode::PageDown => match app.focus {
            Focus::List => app.move_pantry_selection(PAGE_SCROLL_SIZE as isize),
            Focus::Detail => app.move_browse_selection(PAGE_SCROLL_SIZE as isize),
        },
        KeyCode::Enter => {
            if matches!(app.focus, Focus::Detail) {
                app.open_selected_recipe();
            } else {
                app.focus = Focus::Detail;
            }
        }
        _ => {}
    }
}

fn handle_browse_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.move_browse_selection(-1),
        KeyCode::Down => app.move_browse_selection(1),
        KeyCode::PageUp => app.move_browse_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_browse_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Enter => app.open_selected_recipe(),
        _ => {}
    }
}
