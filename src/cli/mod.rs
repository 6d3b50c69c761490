//! CLI module for the rest timer.
//!
//! This module provides the terminal host:
//! - `commands`: Command definitions using clap derive
//! - `config`: Config file loading
//! - `display`: Overlay rendering
//! - `terminal`: Reverse-video flash surface and stdin key reader

pub mod commands;
pub mod config;
pub mod display;
pub mod terminal;

pub use commands::{parse_set, Cli, Commands, StartArgs};
pub use config::{default_config_path, load_config};
pub use display::Display;
pub use terminal::{forward_actions, parse_action, spawn_stdin_reader, TerminalFlash};
