//! Key handling for ChatView.
//!
//! Key presses mutate view state directly; anything that needs the network
//! is returned as a [`Command`] for the main loop to await.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{ChatView, Focus, Screen};

/// Follow-up work for the main loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    None,
    Quit,
    /// Send the composed input
    Submit,
    NewThread,
    /// Accept the token typed on the identity screen
    SubmitToken,
}

const SCROLL_STEP: u16 = 5;

impl ChatView {
    pub fn handle_key(&mut self, key: KeyEvent) -> Command {
        self.mark_dirty();

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return Command::Quit;
        }

        if self.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.dismiss_alert();
            }
            return Command::None;
        }

        match self.screen() {
            Screen::IdentityRequired => self.handle_identity_key(key),
            Screen::Chat => self.handle_chat_key(key),
        }
    }

    fn handle_identity_key(&mut self, key: KeyEvent) -> Command {
        match key.code {
            KeyCode::Esc => Command::Quit,
            KeyCode::Enter => Command::SubmitToken,
            KeyCode::Backspace => {
                self.token_input.pop();
                Command::None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.token_input.push(c);
                Command::None
            }
            _ => Command::None,
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent) -> Command {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('n') if ctrl => return Command::NewThread,
            KeyCode::Char('b') if ctrl => {
                self.toggle_sidebar();
                return Command::None;
            }
            KeyCode::Tab if self.sidebar_visible => {
                self.focus = match self.focus {
                    Focus::Input => Focus::Threads,
                    Focus::Threads => Focus::Input,
                };
                return Command::None;
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(SCROLL_STEP);
                return Command::None;
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(SCROLL_STEP);
                return Command::None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Threads => match key.code {
                KeyCode::Up | KeyCode::Char('k') => self.select_previous_thread(),
                KeyCode::Down | KeyCode::Char('j') => self.select_next_thread(),
                KeyCode::Enter | KeyCode::Esc => self.focus = Focus::Input,
                _ => {}
            },
            Focus::Input => match key.code {
                KeyCode::Enter => return Command::Submit,
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Esc => self.input.clear(),
                KeyCode::Char(c) if !ctrl => self.input.push(c),
                _ => {}
            },
        }
        Command::None
    }
}
