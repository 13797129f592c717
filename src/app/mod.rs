// Application layer: turns parsed CLI commands into calls on the core modules.

pub mod commands;

pub use commands::{execute, execute_with_runner, Outcome};
