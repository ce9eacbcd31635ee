//! # cmdtree
//!
//! **Module-tree command routing** - turns argv words into a call on a nested
//! tree of modules and methods, with typed parameter binding and actionable
//! suggestions when a route does not resolve.
//!
//! ```text
//!   argv ──► tokenizer ──► matcher ──► binder ──► dispatcher ──► Outcome
//!               │             │           │            │
//!          MatchFailure  MatchFailure  BindingError  ExecutionError
//!               └──────┬──────┘
//!                  suggestions
//! ```
//!
//! ## Features
//!
//! - **Greedy routing** - module terms first, the method as the final term
//! - **Prefix suggestions** - a failed route lists the methods and sub modules
//!   of the deepest module reached, never a full tree dump
//! - **Typed binding** - scalars, nullables, enums, dates, GUIDs, sequences and
//!   JSON maps, with every parameter error reported at once
//! - **Uniform failures** - resolver and handler errors (and panics) surface as
//!   one [`ExecutionError`] naming the method
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust
//! use cmdtree::{App, MethodBuilder, ModuleBuilder, ModuleTree, Outcome, ParamBuilder, ParamType};
//!
//! let tree = ModuleTree::builder()
//!     .module(
//!         ModuleBuilder::new("math").method(
//!             MethodBuilder::new("sum")
//!                 .param(ParamBuilder::new("numbers", ParamType::sequence(ParamType::int())).alias("n"))
//!                 .handler(|_, args| {
//!                     let total: i64 = args.list("numbers")?.iter().filter_map(|v| v.as_i64()).sum();
//!                     Ok(total)
//!                 }),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let app = App::new(tree);
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let outcome = runtime.block_on(app.run(["math", "sum", "-n", "3", "-n", "4"]));
//! assert!(matches!(outcome, Outcome::Success { ref value, .. } if value == 7));
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! cmdtree                               # Top-level modules
//! cmdtree math sum -n 3 -n 4            # Invoke a method
//! cmdtree calendar day --day=Wednesday  # Inline value
//! cmdtree math sum --help               # Parameters of a method
//! cmdtree store put -k stock --dicto { "a": 1 }   # JSON-shaped parameter
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// Module tree: modules, methods, parameters and the registration builder.
pub mod tree;

/// Routing: tokenizer, matcher and suggestion engine.
///
/// # Submodules
///
/// - [`route::tokenizer`] - route terms, flags and help markers
/// - [`route::matcher`] - greedy tree walk
/// - [`route::suggest`] - suggestion sets and help
pub mod route;

/// Parameter binding and value conversion.
pub mod bind;

/// Execution of a bound method.
pub mod dispatch;

/// Error taxonomy shared by every stage.
pub mod error;

/// One invocation end to end.
pub mod app;

// ============================================================================
// Support Modules
// ============================================================================

/// `.cmdtree/config.toml` loading.
pub mod config;

/// Global options, rendering and the shared binary entry point.
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use app::{App, Outcome, Resolved};
pub use bind::{ArgValue, BoundArgs};
pub use error::{BindingError, BindingErrorKind, CliError, ExecutionError, MatchFailure};
pub use route::{Help, Suggestion};
pub use tree::{
    EnumSpec, MethodBuilder, ModuleBuilder, ModuleTree, ParamBuilder, ParamType, ScalarKind,
    TreeError, receiver,
};
