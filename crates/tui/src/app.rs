//! Main TUI application

use std::io::{self, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::TableState, Terminal};
use tracing::{info, warn};

use moviefinder_core::{
    view::favorite_rows, DriverEvent, Key, SearchDriver, SubscriptionId, ViewModel,
};

use crate::input::{Action, InputHandler};
use crate::ui::{self, contains_point, favorites_row_at, DropdownHit, Focus, Rendered, Screen, Status};

/// TUI configuration
pub struct TuiConfig {
    /// How long to wait for input before running a tick
    pub tick_rate: Duration,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(50),
        }
    }
}

/// Main TUI application
pub struct TuiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    input: InputHandler,
    driver: SearchDriver,
    focus: Focus,
    /// Selection and offset of the favorites table
    table_state: TableState,
    /// Dropdown scroll offset in lines
    scroll: usize,
    follow_selection: bool,
    /// Item count when the sentinel row was last reported visible
    sentinel_seen_at: Option<usize>,
    status: Option<Status>,
    /// Geometry of the last frame
    rendered: Rendered,
    favorites_changed: Arc<AtomicBool>,
    subscription: SubscriptionId,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(driver: SearchDriver, config: TuiConfig) -> io::Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let favorites_changed = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&favorites_changed);
        let subscription = driver
            .controller()
            .favorites()
            .subscribe(move |_| flag.store(true, Ordering::SeqCst));

        Ok(Self {
            terminal,
            input: InputHandler::new(config.tick_rate),
            driver,
            focus: Focus::Search,
            table_state: TableState::default(),
            scroll: 0,
            follow_selection: false,
            sentinel_seen_at: None,
            status: None,
            rendered: Rendered::default(),
            favorites_changed,
            subscription,
            should_quit: false,
        })
    }

    /// Run the TUI event loop
    pub async fn run(mut self) -> io::Result<()> {
        loop {
            self.sync_favorites();
            self.draw()?;

            // Handle input (blocking with timeout)
            let input = self.input;
            let action = tokio::task::spawn_blocking(move || input.next_action())
                .await
                .map_err(io::Error::other)??;

            self.handle_action(action);

            // Apply finished fetches and due debounced queries
            self.driver.drain();
            self.collect_events();

            if self.should_quit {
                break;
            }
        }

        info!("Exiting");
        self.cleanup()?;
        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let controller = self.driver.controller();
        let view = ViewModel::build(controller);
        let favorites = favorite_rows(&controller.favorites().favorites());
        let screen = Screen {
            view: &view,
            favorites: &favorites,
            focus: self.focus,
            scroll: self.scroll,
            follow_selection: self.follow_selection,
            status: self.status.as_ref(),
        };

        let table_state = &mut self.table_state;
        let mut rendered = Rendered::default();
        self.terminal
            .draw(|frame| rendered = ui::render(frame, &screen, table_state))?;

        self.scroll = rendered.dropdown.as_ref().map_or(0, |d| d.scroll);
        self.follow_selection = false;
        let sentinel_visible = rendered
            .dropdown
            .as_ref()
            .is_some_and(|d| d.sentinel_visible());
        self.rendered = rendered;

        let items = self.driver.controller().item_count();
        if sentinel_edge(&mut self.sentinel_seen_at, sentinel_visible, items) {
            self.driver.dispatch(|c, _| c.sentinel_visible());
        }
        Ok(())
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {}
            Action::SwitchFocus => {
                let next = match self.focus {
                    Focus::Search => Focus::Favorites,
                    Focus::Favorites => Focus::Search,
                };
                self.set_focus(next);
            }
            Action::Click(x, y) => self.handle_click(x, y),
            Action::MouseScroll(x, y, delta) => self.handle_scroll(x, y, delta),
            _ => match self.focus {
                Focus::Search => self.handle_search_action(action),
                Focus::Favorites => self.handle_favorites_action(action),
            },
        }
    }

    fn handle_search_action(&mut self, action: Action) {
        match action {
            Action::Key(key) => {
                self.driver.handle_key(key);
                self.follow_selection = true;
            }
            // Space favorites the selected movie, otherwise it is typed
            Action::Char(' ') if self.driver.handle_key(Key::Space) => {}
            Action::Char(c) => {
                let text = format!("{}{}", self.driver.controller().input(), c);
                self.edit_input(&text);
            }
            Action::Backspace => {
                let mut text = self.driver.controller().input().to_string();
                text.pop();
                self.edit_input(&text);
            }
            Action::ClearInput => self.edit_input(""),
            Action::OpenDetails => self.driver.dispatch(|c, _| {
                c.selected()
                    .map(|index| c.open_details(index))
                    .unwrap_or_default()
            }),
            _ => {}
        }
    }

    fn handle_favorites_action(&mut self, action: Action) {
        match action {
            Action::Key(Key::Down) => self.move_favorite_selection(1),
            Action::Key(Key::Up) => self.move_favorite_selection(-1),
            Action::Key(Key::Enter) | Action::OpenDetails => self.open_selected_favorite(),
            Action::Key(Key::Escape) => self.set_focus(Focus::Search),
            Action::Delete => self.remove_selected_favorite(),
            // Typing goes back to the search box
            Action::Char(_) | Action::Backspace | Action::ClearInput => {
                self.set_focus(Focus::Search);
                self.handle_search_action(action);
            }
            _ => {}
        }
    }

    fn handle_click(&mut self, x: u16, y: u16) {
        if let Some(hit) = self.rendered.dropdown.as_ref().and_then(|d| d.hit(x, y)) {
            match hit {
                DropdownHit::Item(index) => self.driver.dispatch(|c, _| c.click_item(index)),
                DropdownHit::Star(index) => self.driver.dispatch(|c, _| {
                    c.toggle_favorite_at(index);
                    Vec::new()
                }),
                DropdownHit::Other => {}
            }
            return;
        }

        let areas = self.rendered.areas;
        if contains_point(areas.input, x, y) {
            self.set_focus(Focus::Search);
            return;
        }

        self.close_dropdown();
        let len = self.driver.controller().favorites().len();
        if let Some(row) = favorites_row_at(areas.favorites, &self.table_state, len, x, y) {
            self.focus = Focus::Favorites;
            self.table_state.select(Some(row));
        }
    }

    fn handle_scroll(&mut self, x: u16, y: u16, delta: i32) {
        if let Some(dropdown) = self.rendered.dropdown.as_mut().filter(|d| d.contains(x, y)) {
            let scroll = (dropdown.scroll as i64 + delta as i64).clamp(0, dropdown.max_scroll() as i64);
            dropdown.scroll = scroll as usize;
            self.scroll = dropdown.scroll;
            self.follow_selection = false;

            let metrics = dropdown.metrics();
            self.driver.dispatch(|c, _| c.scrolled(metrics));
        } else if contains_point(self.rendered.areas.favorites, x, y) {
            self.move_favorite_selection(delta);
        }
    }

    fn edit_input(&mut self, text: &str) {
        self.driver.set_input(text);
        self.scroll = 0;
        self.status = None;
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::Search => self.driver.dispatch(|c, _| {
                c.focus();
                Vec::new()
            }),
            // The dropdown would cover the table
            Focus::Favorites => self.close_dropdown(),
        }
    }

    fn close_dropdown(&mut self) {
        self.driver.dispatch(|c, _| {
            c.click_outside();
            Vec::new()
        });
    }

    fn move_favorite_selection(&mut self, delta: i32) {
        let len = self.driver.controller().favorites().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i64;
        let next = (current + delta as i64).clamp(0, len as i64 - 1);
        self.table_state.select(Some(next as usize));
    }

    fn open_selected_favorite(&mut self) {
        let favorites = self.driver.controller().favorites().favorites();
        if let Some(favorite) = self.table_state.selected().and_then(|i| favorites.get(i)) {
            self.driver.open_favorite(favorite);
        }
    }

    fn remove_selected_favorite(&mut self) {
        let favorites = self.driver.controller().favorites();
        let Some(favorite) = self
            .table_state
            .selected()
            .and_then(|i| favorites.favorites().get(i).cloned())
        else {
            return;
        };

        if let Err(e) = favorites.remove(favorite.id) {
            warn!(movie_id = favorite.id, "Failed to remove favorite: {}", e);
            self.status = Some(Status {
                text: format!("Não foi possível remover \"{}\": {}", favorite.title, e),
                is_error: true,
            });
        }
    }

    /// Keep the table selection valid after favorites change
    fn sync_favorites(&mut self) {
        if !self.favorites_changed.swap(false, Ordering::SeqCst) {
            return;
        }
        let len = self.driver.controller().favorites().len();
        let selected = match len {
            0 => None,
            _ => Some(self.table_state.selected().unwrap_or(0).min(len - 1)),
        };
        self.table_state.select(selected);
    }

    fn collect_events(&mut self) {
        for event in self.driver.take_events() {
            self.status = Some(match event {
                DriverEvent::MovieChosen(movie) => Status {
                    text: format!("Filme escolhido: {}", movie.title),
                    is_error: false,
                },
                DriverEvent::LinkOpened(url) => Status {
                    text: format!("Aberto: {}", url),
                    is_error: false,
                },
                DriverEvent::LinkFailed { url, message } => Status {
                    text: format!("Não foi possível abrir {}: {}", url, message),
                    is_error: true,
                },
            });
        }
    }

    /// Cleanup terminal state
    fn cleanup(&mut self) -> io::Result<()> {
        self.driver.controller().favorites().unsubscribe(self.subscription);
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Reports the sentinel once per appearance, or again once more items loaded
/// while it stayed on screen.
fn sentinel_edge(seen_at: &mut Option<usize>, visible: bool, items: usize) -> bool {
    if !visible {
        *seen_at = None;
        return false;
    }
    let fire = *seen_at != Some(items);
    *seen_at = Some(items);
    fire
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        // Best effort cleanup on drop
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
