//! Route matcher: walks the module tree along the route terms.
//!
//! Greedy, left to right, no backtracking. A method is only reachable as the
//! final term of a non-help route; when the final term names both a method and
//! a sub module, the method wins unless help was requested.

use tracing::debug;

use super::tokenizer::Route;
use crate::error::{MatchFailure, MatchFailureReason};
use crate::tree::{MethodDescriptor, ModuleTree};

/// A route resolved to a method.
#[derive(Debug, Clone)]
pub struct Matched<'t> {
    /// Full path: module terms followed by the method name
    pub path: Vec<String>,
    pub method: &'t MethodDescriptor,
}

/// Resolve a route against the tree.
pub fn match_route<'t>(route: &Route, tree: &'t ModuleTree) -> Result<Matched<'t>, MatchFailure> {
    let Some(first) = route.terms.first() else {
        return Err(MatchFailure::unrouted(MatchFailureReason::NoRoute));
    };
    let Some(mut current) = tree.get(first) else {
        debug!("unknown top-level module '{}'", first);
        return Err(MatchFailure::unrouted(MatchFailureReason::UnknownModule(
            first.clone(),
        )));
    };

    let mut matched = vec![first.clone()];
    let last = route.terms.len() - 1;

    for (index, term) in route.terms.iter().enumerate().skip(1) {
        if index == last
            && !route.is_help
            && let Some(method) = current.method(term)
        {
            let mut path = matched;
            path.push(term.clone());
            debug!("route resolved to {:?}", path);
            return Ok(Matched { path, method });
        }

        if let Some(sub_module) = current.sub_module(term) {
            current = sub_module;
            matched.push(term.clone());
            continue;
        }

        let reason = if route.is_help {
            MatchFailureReason::HelpRequested
        } else if current.method(term).is_some() {
            MatchFailureReason::TrailingTerms(term.clone())
        } else {
            MatchFailureReason::UnknownTerm(term.clone())
        };
        debug!("route walk stopped at '{}' after {:?}", term, matched);
        return Err(MatchFailure::new(matched, reason));
    }

    let reason = if route.is_help {
        MatchFailureReason::HelpRequested
    } else {
        MatchFailureReason::Incomplete
    };
    Err(MatchFailure::new(matched, reason))
}
