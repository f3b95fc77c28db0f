//! Terminal events mapped to application actions

use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use moviefinder_core::Key;

/// Actions that can be triggered by user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// A navigation key for the focused widget
    Key(Key),
    /// A printable character (space included)
    Char(char),
    /// Delete the last character of the search input
    Backspace,
    /// Clear the search input
    ClearInput,
    /// Remove the selected favorite
    Delete,
    /// Move focus between the search box and the favorites table
    SwitchFocus,
    /// Open the detail page of the selected dropdown movie
    OpenDetails,
    /// Mouse click at position
    Click(u16, u16),
    /// Mouse wheel at position, positive is down
    MouseScroll(u16, u16, i32),
    /// No input before the tick elapsed
    Tick,
}

/// Input handler that converts terminal events to actions
#[derive(Debug, Clone, Copy)]
pub struct InputHandler {
    tick_rate: Duration,
}

impl InputHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Poll for the next action (blocks until event or timeout)
    pub fn next_action(&self) -> std::io::Result<Action> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                Event::Key(key) => Ok(self.handle_key(key)),
                Event::Mouse(mouse) => Ok(self.handle_mouse(mouse)),
                _ => Ok(Action::Tick),
            }
        } else {
            Ok(Action::Tick)
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::Tick;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => Action::Quit,
                KeyCode::Char('u') => Action::ClearInput,
                KeyCode::Char('o') => Action::OpenDetails,
                _ => Action::Tick,
            };
        }

        match key.code {
            KeyCode::Down => Action::Key(Key::Down),
            KeyCode::Up => Action::Key(Key::Up),
            KeyCode::Right => Action::Key(Key::Right),
            KeyCode::Left => Action::Key(Key::Left),
            KeyCode::Enter => Action::Key(Key::Enter),
            KeyCode::Esc => Action::Key(Key::Escape),
            KeyCode::Tab | KeyCode::BackTab => Action::SwitchFocus,
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Delete => Action::Delete,
            KeyCode::Char(c) => Action::Char(c),
            _ => Action::Tick,
        }
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Action {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Action::Click(mouse.column, mouse.row),
            MouseEventKind::ScrollUp => Action::MouseScroll(mouse.column, mouse.row, -1),
            MouseEventKind::ScrollDown => Action::MouseScroll(mouse.column, mouse.row, 1),
            _ => Action::Tick,
        }
    }
}
