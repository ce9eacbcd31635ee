//! CLI surface: global options, rendering and the shared entry point.
//!
//! The routing core never formats prose; everything a user reads is produced
//! here from an [`Outcome`](crate::app::Outcome).

pub mod colors;
pub mod entrypoint;
pub mod global;
pub mod render;

pub use colors::{ColorMode, Painter};
pub use entrypoint::{EntryOptions, run, run_with_args};
pub use global::{GlobalOptions, extract_global_options};
pub use render::{RenderOptions, Rendered, render};
