//! Suggestion engine: turns a failed match or a help request into the set of
//! options available at the deepest module reached.
//!
//! Purely a tree-prefix lookup. The suggestion set is the direct methods and
//! direct sub modules of that module, never a recursive dump, and no string
//! similarity is involved.

use serde::Serialize;

use super::tokenizer::Route;
use crate::bind::value::ArgValue;
use crate::error::MatchFailure;
use crate::tree::{MethodDescriptor, ModuleNode, ModuleTree};

/// A named option with its optional summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Options available at one module. An empty `route` means the root, whose
/// sub modules are the top-level modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub route: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub methods: Vec<Entry>,
    pub sub_modules: Vec<Entry>,
}

impl Suggestion {
    pub fn is_root(&self) -> bool {
        self.route.is_empty()
    }

    /// Every suggested name: methods first, then sub modules.
    pub fn options(&self) -> Vec<&str> {
        self.methods
            .iter()
            .chain(&self.sub_modules)
            .map(|entry| entry.name.as_str())
            .collect()
    }
}

/// Help for a single method: its visible parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodHelp {
    pub route: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub parameters: Vec<ParamHelp>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamHelp {
    pub flag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// What a help request resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Help {
    Module(Suggestion),
    Method(MethodHelp),
}

/// Walk `prefix` as far as it names modules. Returns the terms walked and
/// the module reached (`None` for the root).
fn walk<'t>(tree: &'t ModuleTree, prefix: &[String]) -> (Vec<String>, Option<&'t ModuleNode>) {
    let mut walked = Vec::new();
    let mut current: Option<&ModuleNode> = None;

    for term in prefix {
        let next = match current {
            None => tree.get(term),
            Some(node) => node.sub_module(term),
        };
        match next {
            Some(node) => {
                walked.push(term.clone());
                current = Some(node);
            }
            None => break,
        }
    }

    (walked, current)
}

fn entry(name: &str, summary: &Option<String>) -> Entry {
    Entry {
        name: name.to_string(),
        summary: summary.clone(),
    }
}

/// Suggestion set at the module named by `deepest_valid_terms`.
///
/// Terms that do not name a module (possible when the tokenizer failed before
/// the matcher ran) are ignored from the first miss onward.
pub fn suggest(tree: &ModuleTree, deepest_valid_terms: &[String]) -> Suggestion {
    let (route, node) = walk(tree, deepest_valid_terms);

    match node {
        None => Suggestion {
            route,
            summary: None,
            methods: Vec::new(),
            sub_modules: tree
                .roots()
                .values()
                .map(|module| entry(&module.name, &module.summary))
                .collect(),
        },
        Some(node) => Suggestion {
            route,
            summary: node.summary.clone(),
            methods: node
                .methods
                .values()
                .map(|method| entry(&method.name, &method.summary))
                .collect(),
            sub_modules: node
                .sub_modules
                .values()
                .map(|module| entry(&module.name, &module.summary))
                .collect(),
        },
    }
}

/// Suggestion set for a failed match.
pub fn suggest_for(tree: &ModuleTree, failure: &MatchFailure) -> Suggestion {
    suggest(tree, &failure.deepest_valid_terms)
}

/// Resolve a help request.
///
/// When the term right after the deepest module is the route's final term and
/// names one of that module's methods, the method's parameters are described;
/// otherwise the module's suggestion set is returned.
pub fn help(tree: &ModuleTree, route: &Route, failure: &MatchFailure) -> Help {
    let (walked, node) = walk(tree, &failure.deepest_valid_terms);

    if let Some(node) = node
        && walked.len() + 1 == route.terms.len()
        && route.terms[..walked.len()] == walked[..]
        && let Some(method) = node.method(&route.terms[walked.len()])
    {
        let mut path = walked;
        path.push(method.name.clone());
        return Help::Method(method_help(path, method));
    }

    Help::Module(suggest(tree, &walked))
}

fn method_help(route: Vec<String>, method: &MethodDescriptor) -> MethodHelp {
    MethodHelp {
        route,
        summary: method.summary.clone(),
        parameters: method
            .visible_parameters()
            .map(|param| ParamHelp {
                flag: param.primary_flag(),
                alias: param.alias_flag(),
                type_name: param.param_type.to_string(),
                required: !param.has_default(),
                default: param.default.clone(),
                summary: param.summary.clone(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::matcher::match_route;
    use crate::route::tokenizer::tokenize;
    use crate::tree::{MethodBuilder, ModuleBuilder, ParamBuilder, ParamType};

    fn noop(name: &str) -> MethodBuilder {
        MethodBuilder::new(name).handler(|_, _| Ok(()))
    }

    fn tree() -> ModuleTree {
        ModuleTree::builder()
            .module(
                ModuleBuilder::new("a")
                    .summary("Module a")
                    .module(
                        ModuleBuilder::new("b")
                            .method(noop("x").summary("Does x"))
                            .method(
                                noop("y")
                                    .param(ParamBuilder::new("count", ParamType::int()).alias("c"))
                                    .param(
                                        ParamBuilder::new("token", ParamType::string())
                                            .hidden()
                                            .default_value("t"),
                                    ),
                            ),
                    ),
            )
            .module(ModuleBuilder::new("z").summary("Module z"))
            .build()
            .expect("valid tree")
    }

    fn failure(tree: &ModuleTree, tokens: &[&str]) -> (Route, MatchFailure) {
        let route = tokenize(tokens).expect("valid tokens");
        let failure = match_route(&route, tree).unwrap_err();
        (route, failure)
    }

    #[test]
    fn test_suggests_direct_children_of_deepest_module() {
        let tree = tree();
        let (_, failure) = failure(&tree, &["a", "b", "c"]);
        let suggestion = suggest_for(&tree, &failure);

        assert_eq!(suggestion.route, vec!["a", "b"]);
        assert_eq!(suggestion.options(), vec!["x", "y"]);
        assert!(suggestion.sub_modules.is_empty());
        assert_eq!(suggestion.methods[0].summary.as_deref(), Some("Does x"));
    }

    #[test]
    fn test_empty_prefix_lists_top_level_modules() {
        let tree = tree();
        let suggestion = suggest(&tree, &[]);
        assert!(suggestion.is_root());
        assert!(suggestion.methods.is_empty());
        assert_eq!(suggestion.options(), vec!["a", "z"]);
    }

    #[test]
    fn test_not_recursive() {
        let tree = tree();
        let suggestion = suggest(&tree, &["a".to_string()]);
        assert_eq!(suggestion.options(), vec!["b"]);
        assert_eq!(suggestion.summary.as_deref(), Some("Module a"));
    }

    #[test]
    fn test_unvalidated_prefix_is_truncated() {
        let tree = tree();
        let prefix = vec!["a".to_string(), "nope".to_string(), "b".to_string()];
        let suggestion = suggest(&tree, &prefix);
        assert_eq!(suggestion.route, vec!["a"]);
    }

    #[test]
    fn test_help_on_module() {
        let tree = tree();
        let (route, failure) = failure(&tree, &["a", "b", "--help"]);
        match help(&tree, &route, &failure) {
            Help::Module(suggestion) => assert_eq!(suggestion.options(), vec!["x", "y"]),
            other => panic!("expected module help, got {other:?}"),
        }
    }

    #[test]
    fn test_help_on_method_hides_hidden_params() {
        let tree = tree();
        let (route, failure) = failure(&tree, &["a", "b", "y", "-h"]);
        match help(&tree, &route, &failure) {
            Help::Method(method) => {
                assert_eq!(method.route, vec!["a", "b", "y"]);
                assert_eq!(method.parameters.len(), 1);
                assert_eq!(method.parameters[0].flag, "--count");
                assert_eq!(method.parameters[0].alias.as_deref(), Some("-c"));
                assert!(method.parameters[0].required);
            }
            other => panic!("expected method help, got {other:?}"),
        }
    }

    #[test]
    fn test_help_with_unknown_term_falls_back_to_module() {
        let tree = tree();
        let (route, failure) = failure(&tree, &["a", "b", "q", "/?"]);
        assert!(matches!(help(&tree, &route, &failure), Help::Module(_)));
    }
}
