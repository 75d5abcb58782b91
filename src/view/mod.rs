//! Chat view state
//!
//! [`ChatView`] owns everything the terminal UI shows: the thread list, the
//! selected thread, the input line and the transient alert/status. Async work
//! that outlives a key press (runs, background registration) reports back
//! through [`AppMessage`]s on the view's channel; the main loop feeds them to
//! [`ChatView::handle_message`].

mod handlers;
mod keys;
mod messages;
mod send;
mod threads;

pub use keys::Command;
pub use messages::AppMessage;
pub use send::{ChannelSink, SendPlan};

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::LocalCache;
use crate::meter::TokenMeter;
use crate::models::Thread;
use crate::provider::AssistantProvider;
use crate::run::RunDriver;
use crate::sync::ThreadSynchronizer;

/// Collaborators the view calls into
pub struct ChatServices {
    pub cache: LocalCache,
    pub provider: Arc<dyn AssistantProvider>,
    pub sync: ThreadSynchronizer,
    pub meter: Arc<TokenMeter>,
    pub driver: Arc<RunDriver>,
}

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No user token yet; nothing else is reachable
    IdentityRequired,
    Chat,
}

/// Which pane receives key presses on the chat screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Threads,
}

pub struct ChatView {
    pub services: Arc<ChatServices>,
    pub user_token: Option<String>,
    pub threads: Vec<Thread>,
    pub current_thread_id: Option<String>,
    pub focus: Focus,
    /// Text being composed
    pub input: String,
    /// Text typed on the identity screen
    pub token_input: String,
    /// Cleared while a run is streaming
    pub input_enabled: bool,
    pub sidebar_visible: bool,
    pub loading: bool,
    /// Blocking alert; must be dismissed before anything else
    pub alert: Option<String>,
    /// Non-blocking notice in the status line
    pub status: Option<String>,
    /// Remaining tokens, for display
    pub quota: Option<i64>,
    /// Lines scrolled up from the bottom of the message list
    pub scroll_offset: u16,
    pub needs_redraw: bool,
    pub should_quit: bool,
    pub message_tx: mpsc::UnboundedSender<AppMessage>,
    pub message_rx: Option<mpsc::UnboundedReceiver<AppMessage>>,
}

impl ChatView {
    pub fn new(services: Arc<ChatServices>, user_token: Option<String>, sidebar_visible: bool) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            services,
            user_token,
            threads: Vec::new(),
            current_thread_id: None,
            focus: Focus::default(),
            input: String::new(),
            token_input: String::new(),
            input_enabled: true,
            sidebar_visible,
            loading: false,
            alert: None,
            status: None,
            quota: None,
            scroll_offset: 0,
            needs_redraw: true,
            should_quit: false,
            message_tx,
            message_rx: Some(message_rx),
        }
    }

    pub fn screen(&self) -> Screen {
        if self.user_token.is_some() {
            Screen::Chat
        } else {
            Screen::IdentityRequired
        }
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
        self.mark_dirty();
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.mark_dirty();
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
        if !self.sidebar_visible {
            self.focus = Focus::Input;
        }
        self.mark_dirty();
    }

    /// Accept the token typed on the identity screen.
    ///
    /// Returns true when the view switched to the chat screen and needs a
    /// [`ChatView::load`].
    pub fn submit_token(&mut self) -> bool {
        let token = self.token_input.trim().to_string();
        if token.is_empty() {
            return false;
        }
        self.token_input.clear();
        self.provide_user_token(token);
        true
    }

    pub fn provide_user_token(&mut self, token: String) {
        if let Err(e) = self.services.cache.set_user_token(&token) {
            tracing::warn!("Could not persist user token: {}", e);
        }
        self.user_token = Some(token);
        self.mark_dirty();
    }
}

/// Pick the user token: an explicit argument beats the cached one. An
/// explicit token is remembered for later launches.
pub fn resolve_user_token(explicit: Option<String>, cache: &LocalCache) -> Option<String> {
    if let Some(token) = explicit.filter(|t| !t.trim().is_empty()) {
        if let Err(e) = cache.set_user_token(&token) {
            tracing::warn!("Could not persist user token: {}", e);
        }
        return Some(token);
    }
    match cache.user_token() {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Could not read cached user token: {}", e);
            None
        }
    }
}
