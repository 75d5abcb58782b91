use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
///
/// `Code` is a display hint, not something the provider reports: streamed
/// code-interpreter input is tagged explicitly, and hydrated history goes
/// through [`classify_role`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Code,
}

/// A single rendered entry in a thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub text: String,
    /// Set when `text` is pre-rendered markup rather than Markdown
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_html: bool,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            is_html: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn code(text: impl Into<String>) -> Self {
        Self::new(Role::Code, text)
    }
}

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```").expect("valid regex"));

static CODE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(def |class |import |from \S+ import |function |const |let |fn |pub fn |#include|SELECT |print\()",
    )
    .expect("valid regex")
});

/// Best-effort guess of whether assistant text is code.
///
/// Looks for a fenced block or a line that opens with a common language
/// keyword. Misclassification only changes how the text is displayed.
pub fn classify_role(text: &str) -> Role {
    if CODE_FENCE.is_match(text) || CODE_KEYWORD.is_match(text) {
        Role::Code
    } else {
        Role::Assistant
    }
}
