//! The two ways status text reaches the screen: trailing annotations on
//! console surfaces, or small floating windows pinned to each host window.

pub mod floating;
pub mod inline;

pub use floating::{FloatingReport, FloatingWindowRenderer};
pub use inline::{InlineAnnotationRenderer, InlineReport, STATUS_OWNER};
