// Library interface for pollenchat-cli so integration tests can reach the
// command parser and renderer. main.rs declares the same files, hence #[path].

#[path = "commands.rs"]
pub mod commands;

#[path = "render.rs"]
pub mod render;

pub use commands::{handle_command, CommandResult, ExportFormat};
