//! Command-line argument parsing.
//!
//! ```text
//! assistant-chat [--user-token TOKEN] [--sidebar true|false]
//! assistant-chat serve
//! assistant-chat --version
//! ```

/// Options for the chat screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatArgs {
    /// Identity token; takes precedence over the cached one
    pub user_token: Option<String>,
    /// Show the thread list
    pub sidebar: bool,
}

impl Default for ChatArgs {
    fn default() -> Self {
        Self {
            user_token: None,
            sidebar: true,
        }
    }
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Run the HTTP proxy
    Serve,
    /// Run the terminal chat (default)
    Chat(ChatArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("--sidebar expects true or false, got {0:?}")]
    InvalidSidebar(String),
    #[error("unknown argument {0:?}")]
    Unknown(String),
}

fn parse_bool(value: &str) -> Result<bool, ArgsError> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ArgsError::InvalidSidebar(other.to_string())),
    }
}

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use assistant_chat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["assistant-chat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut chat = ChatArgs::default();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };

        match flag.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "serve" => return Ok(CliCommand::Serve),
            "--user-token" => {
                let value = inline
                    .or_else(|| args.next())
                    .ok_or(ArgsError::MissingValue("--user-token"))?;
                chat.user_token = Some(value);
            }
            "--sidebar" => {
                let value = inline
                    .or_else(|| args.next())
                    .ok_or(ArgsError::MissingValue("--sidebar"))?;
                chat.sidebar = parse_bool(&value)?;
            }
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }
    Ok(CliCommand::Chat(chat))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand, ArgsError> {
        let mut all = vec!["assistant-chat".to_string()];
        all.extend(args.iter().map(|a| a.to_string()));
        parse_args(all.into_iter())
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&[]), Ok(CliCommand::Chat(ChatArgs::default())));
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]), Ok(CliCommand::Version));
        assert_eq!(parse(&["-V"]), Ok(CliCommand::Version));
    }

    #[test]
    fn test_parse_serve() {
        assert_eq!(parse(&["serve"]), Ok(CliCommand::Serve));
    }

    #[test]
    fn test_parse_user_token_and_sidebar() {
        assert_eq!(
            parse(&["--user-token", "abc", "--sidebar", "false"]),
            Ok(CliCommand::Chat(ChatArgs {
                user_token: Some("abc".to_string()),
                sidebar: false,
            }))
        );
    }

    #[test]
    fn test_parse_inline_values() {
        assert_eq!(
            parse(&["--user-token=abc", "--sidebar=0"]),
            Ok(CliCommand::Chat(ChatArgs {
                user_token: Some("abc".to_string()),
                sidebar: false,
            }))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse(&["--user-token"]),
            Err(ArgsError::MissingValue("--user-token"))
        );
        assert_eq!(
            parse(&["--sidebar", "maybe"]),
            Err(ArgsError::InvalidSidebar("maybe".to_string()))
        );
        assert_eq!(
            parse(&["--unknown"]),
            Err(ArgsError::Unknown("--unknown".to_string()))
        );
    }
}
