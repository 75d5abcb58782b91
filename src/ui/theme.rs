//! Color theme constants for the chat UI

use ratatui::style::Color;

/// Pane borders
pub const COLOR_BORDER: Color = Color::DarkGray;

/// Focused pane border and selection highlight
pub const COLOR_ACCENT: Color = Color::White;

/// Secondary text (timestamps, hints)
pub const COLOR_DIM: Color = Color::DarkGray;

/// Role label for the user's messages
pub const COLOR_USER: Color = Color::LightCyan;

/// Role label for assistant messages
pub const COLOR_ASSISTANT: Color = Color::LightGreen;

/// Code-interpreter input and code-looking history
pub const COLOR_CODE: Color = Color::Rgb(0, 122, 204); // blue #007ACC

/// Alerts and failed runs
pub const COLOR_ERROR: Color = Color::Red;

/// Background of the code message body
pub const COLOR_CODE_BG: Color = Color::Rgb(20, 20, 30);
