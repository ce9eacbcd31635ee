//! Routing: from raw argv words to a resolved method, or to the options that
//! were available where resolution stopped.
//!
//! - [`tokenizer`] - route terms, flags and the help marker
//! - [`matcher`] - greedy walk of the module tree
//! - [`suggest`] - suggestion sets and help for failed or help routes

pub mod matcher;
pub mod suggest;
pub mod tokenizer;

pub use matcher::{Matched, match_route};
pub use suggest::{Entry, Help, MethodHelp, ParamHelp, Suggestion, help, suggest, suggest_for};
pub use tokenizer::{HELP_MARKERS, ParamMap, Route, is_help_marker, split_flag, tokenize};
