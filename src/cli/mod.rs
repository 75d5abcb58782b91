//! CLI module.
//!
//! The dispatcher is called early in main() so `--version` works without
//! any configuration:
//!
//! ```ignore
//! use assistant_chat::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! if run_cli_command(&command) {
//!     return Ok(());
//! }
//! // Serve or Chat: continue with configuration
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ArgsError, ChatArgs, CliCommand};
pub use version::{handle_version_command, VERSION};

/// Run a command that needs no runtime. Returns true if it was handled.
pub fn run_cli_command(command: &CliCommand) -> bool {
    match command {
        CliCommand::Version => {
            handle_version_command();
            true
        }
        CliCommand::Serve | CliCommand::Chat(_) => false,
    }
}
