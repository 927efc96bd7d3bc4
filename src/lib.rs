//! A right-aligned status line for terminal consoles.
//!
//! The status text is either appended to every console surface as a
//! trailing annotation, or shown in small floating windows pinned to the
//! bottom-right corner of each host window. [`StatusBar`] drives either
//! renderer against any [`host::Host`]; [`host::Screen`] is a ready-made
//! in-memory host rendered with ratatui.

pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod host;
pub mod layout;
pub mod measure;
pub mod renderer;
pub mod schedule;
pub mod status_bar;
pub mod text;
pub mod tracing_sub;
pub mod ui;

pub use config::StatusBarConfig;
pub use error::{ConfigError, HostError};
pub use status_bar::{StatusBar, StatusBarState, TextSource};
pub use text::{StatusText, StyledText};
