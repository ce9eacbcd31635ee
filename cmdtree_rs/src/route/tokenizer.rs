//! Route tokenizer: classifies raw argv words into route terms and flags.
//!
//! Rules:
//! - blank tokens are dropped
//! - route terms are the tokens starting with a letter that come before the
//!   first flag; they start at index 0
//! - a token starting with `-` or `/` is a flag
//! - every other token after a flag is a value of the most recent flag, so
//!   `--n 3 --n 4` gives `--n` the values `3` and `4` and
//!   `--dicto { "a": 1 }` gives `--dicto` four value words
//! - a negative number following a flag (`--delta -5`) is a value
//! - a value may also be written inline after the earliest `=` or `:`
//!   (`--name=ada`, `/n:3`); a flag with no value at all has the empty value
//! - `-h`, `--help` and `/?` mark a help request and never reach the
//!   parameter map, nor do any words following them

use tracing::debug;

use crate::error::{MatchFailure, MatchFailureReason};

/// Reserved help markers.
pub const HELP_MARKERS: [&str; 3] = ["-h", "--help", "/?"];

/// Check if a flag name is one of the help markers.
pub fn is_help_marker(flag: &str) -> bool {
    HELP_MARKERS.contains(&flag)
}

/// Check if a token names a module or method.
pub fn is_route_term(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_alphabetic)
}

/// Check if a token introduces a parameter.
pub fn is_flag(token: &str) -> bool {
    token.starts_with('-') || token.starts_with('/')
}

fn is_negative_number(token: &str) -> bool {
    token
        .strip_prefix('-')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit() || c == '.'))
}

/// Split a flag token into its flag text and inline value.
///
/// ```rust
/// use cmdtree::route::tokenizer::split_flag;
///
/// assert_eq!(split_flag("--name=ada"), ("--name", "ada"));
/// assert_eq!(split_flag("/when:10:30"), ("/when", "10:30"));
/// assert_eq!(split_flag("--verbose"), ("--verbose", ""));
/// ```
pub fn split_flag(token: &str) -> (&str, &str) {
    match token.find(['=', ':']) {
        Some(at) => (&token[..at], &token[at + 1..]),
        None => (token, ""),
    }
}

/// Raw flag values grouped by flag text, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, Vec<String>)>,
}

impl ParamMap {
    /// Record one occurrence of `flag`, preserving multiplicity.
    pub fn push(&mut self, flag: impl Into<String>, value: impl Into<String>) {
        let flag = flag.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == flag) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((flag, vec![value])),
        }
    }

    /// Attach a separate value word to `flag`. A bare occurrence still holding
    /// its empty value has that value replaced.
    fn attach(&mut self, flag: &str, value: &str, replace_empty: bool) {
        if let Some((_, values)) = self.entries.iter_mut().find(|(existing, _)| existing == flag) {
            match values.last_mut() {
                Some(last) if replace_empty => *last = value.to_string(),
                _ => values.push(value.to_string()),
            }
        }
    }

    pub fn get(&self, flag: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == flag)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.get(flag).is_some()
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(flag, _)| flag.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F, V> FromIterator<(F, V)> for ParamMap
where
    F: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (F, V)>>(iter: I) -> Self {
        let mut map = ParamMap::default();
        for (flag, value) in iter {
            map.push(flag, value);
        }
        map
    }
}

/// A tokenized invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    /// Module/method path segments in order
    pub terms: Vec<String>,
    /// Non-help flags with their raw values
    pub params: ParamMap,
    pub is_help: bool,
}

/// Tokenize raw argv words into a [`Route`].
///
/// Fails with a [`MatchFailure`] carrying the route terms seen before the
/// offending token.
pub fn tokenize<I, S>(tokens: I) -> Result<Route, MatchFailure>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tokens: Vec<S> = tokens
        .into_iter()
        .filter(|token| !token.as_ref().trim().is_empty())
        .collect();

    let mut route = Route::default();
    let mut in_flags = false;
    // Most recent non-help flag, and whether it still holds only its empty value
    let mut current: Option<(&str, bool)> = None;

    for (index, token) in tokens.iter().enumerate() {
        let token = token.as_ref();

        let is_value = in_flags && !is_flag(token) || current.is_some() && is_negative_number(token);
        if is_value {
            match current {
                Some((flag, bare)) => {
                    route.params.attach(flag, token, bare);
                    current = Some((flag, false));
                }
                None => debug!("ignoring '{}' after help marker", token),
            }
            continue;
        }

        if is_flag(token) {
            if index == 0 {
                return Err(MatchFailure::unrouted(MatchFailureReason::NoRoute));
            }
            in_flags = true;

            let (flag, value) = split_flag(token);
            if is_help_marker(flag) {
                route.is_help = true;
                current = None;
            } else {
                route.params.push(flag, value);
                current = Some((flag, flag.len() == token.len()));
            }
            continue;
        }

        if is_route_term(token) {
            route.terms.push(token.to_string());
            continue;
        }

        debug!("invalid token '{}' at index {}", token, index);
        return Err(MatchFailure::new(
            route.terms,
            MatchFailureReason::InvalidToken(token.to_string()),
        ));
    }

    if route.terms.is_empty() {
        return Err(MatchFailure::unrouted(MatchFailureReason::NoRoute));
    }

    debug!(
        "tokenized route {:?} with {} flags (help: {})",
        route.terms,
        route.params.len(),
        route.is_help
    );
    Ok(route)
}
