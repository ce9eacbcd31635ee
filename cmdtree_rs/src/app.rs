//! Orchestration of one invocation: tokenize, match, bind, execute.
//!
//! [`App::run`] never fails: every path ends in an [`Outcome`] the output
//! sink can render. [`App::resolve`] and [`App::execute`] expose the same
//! pipeline as plain `Result`s for hosts that handle errors themselves.

use serde::Serialize;
use tracing::debug;

use crate::bind::{BoundArgs, bind};
use crate::dispatch;
use crate::error::{BindingError, CliError, ExecutionError, MatchFailure};
use crate::route::match_route;
use crate::route::suggest::{Help, Suggestion, help, suggest, suggest_for};
use crate::route::tokenizer::{is_flag, is_help_marker, split_flag, tokenize};
use crate::tree::{MethodDescriptor, ModuleTree};

/// Exit status for a successful run or a help request.
pub const EXIT_OK: u8 = 0;
/// Exit status when the method itself failed.
pub const EXIT_EXECUTION: u8 = 1;
/// Exit status when the route or its parameters were invalid.
pub const EXIT_USAGE: u8 = 2;

/// A route resolved and bound, ready to execute.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub route: Vec<String>,
    pub method: &'a MethodDescriptor,
    pub args: BoundArgs,
}

/// Result of one invocation, as seen by the output sink.
#[derive(Debug)]
pub enum Outcome {
    Success {
        route: Vec<String>,
        value: serde_json::Value,
    },
    Help(Help),
    RouteNotFound {
        failure: MatchFailure,
        suggestion: Suggestion,
    },
    InvalidArguments(BindingError),
    ExecutionFailed(ExecutionError),
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Success { .. } | Outcome::Help(_) => EXIT_OK,
            Outcome::ExecutionFailed(_) => EXIT_EXECUTION,
            Outcome::RouteNotFound { .. } | Outcome::InvalidArguments(_) => EXIT_USAGE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Machine-readable view of an [`Outcome`], used for `--json` output.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeReport<'a> {
    Success {
        route: &'a [String],
        value: &'a serde_json::Value,
    },
    Help {
        help: &'a Help,
    },
    RouteNotFound {
        error: String,
        suggestion: &'a Suggestion,
    },
    InvalidArguments {
        errors: Vec<ParamReport>,
    },
    ExecutionFailed {
        method: &'a str,
        causes: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
pub struct ParamReport {
    pub parameter: String,
    pub error: String,
}

impl Outcome {
    pub fn report(&self) -> OutcomeReport<'_> {
        match self {
            Outcome::Success { route, value } => OutcomeReport::Success { route, value },
            Outcome::Help(help) => OutcomeReport::Help { help },
            Outcome::RouteNotFound {
                failure,
                suggestion,
            } => OutcomeReport::RouteNotFound {
                error: failure.to_string(),
                suggestion,
            },
            Outcome::InvalidArguments(err) => OutcomeReport::InvalidArguments {
                errors: err
                    .errors
                    .iter()
                    .map(|error| ParamReport {
                        parameter: error.reference.clone(),
                        error: error.kind.to_string(),
                    })
                    .collect(),
            },
            Outcome::ExecutionFailed(err) => OutcomeReport::ExecutionFailed {
                method: &err.method,
                causes: err.cause_chain(),
            },
        }
    }
}

/// Runs invocations against one immutable module tree.
#[derive(Debug, Clone)]
pub struct App {
    tree: ModuleTree,
}

impl App {
    pub fn new(tree: ModuleTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &ModuleTree {
        &self.tree
    }

    /// Tokenize, match and bind without executing.
    pub fn resolve<I, S>(&self, tokens: I) -> Result<Resolved<'_>, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let route = tokenize(tokens)?;
        let matched = match_route(&route, &self.tree)?;
        let args = bind(matched.method, &route.params)?;
        Ok(Resolved {
            route: matched.path,
            method: matched.method,
            args,
        })
    }

    /// Resolve and execute, returning the method's JSON result.
    pub async fn execute<I, S>(&self, tokens: I) -> Result<serde_json::Value, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let resolved = self.resolve(tokens)?;
        Ok(dispatch::execute(resolved.method, resolved.args).await?)
    }

    /// Run one invocation end to end.
    ///
    /// A help marker anywhere in `tokens` yields help instead of invocation;
    /// an invocation without any tokens yields the root help.
    pub async fn run<I, S>(&self, tokens: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|token| token.as_ref().to_string())
            .filter(|token| !token.trim().is_empty())
            .collect();

        let route = match tokenize(&tokens) {
            Ok(route) => route,
            Err(failure) => return self.route_failed(&tokens, failure),
        };

        let matched = match match_route(&route, &self.tree) {
            Ok(matched) => matched,
            Err(failure) if route.is_help => {
                return Outcome::Help(help(&self.tree, &route, &failure));
            }
            Err(failure) => return self.not_found(failure),
        };

        let args = match bind(matched.method, &route.params) {
            Ok(args) => args,
            Err(err) => return Outcome::InvalidArguments(err),
        };

        match dispatch::execute(matched.method, args).await {
            Ok(value) => Outcome::Success {
                route: matched.path,
                value,
            },
            Err(err) => Outcome::ExecutionFailed(err),
        }
    }

    fn route_failed(&self, tokens: &[String], failure: MatchFailure) -> Outcome {
        let help_requested = tokens
            .iter()
            .any(|token| is_flag(token) && is_help_marker(split_flag(token).0));

        if tokens.is_empty() || help_requested {
            debug!("help requested before routing completed: {}", failure);
            return Outcome::Help(Help::Module(suggest(
                &self.tree,
                &failure.deepest_valid_terms,
            )));
        }
        self.not_found(failure)
    }

    fn not_found(&self, failure: MatchFailure) -> Outcome {
        let suggestion = suggest_for(&self.tree, &failure);
        Outcome::RouteNotFound {
            failure,
            suggestion,
        }
    }
}
