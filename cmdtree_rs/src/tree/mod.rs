//! The module tree: named modules that nest, each owning callable methods.
//!
//! The tree is produced once (see [`builder`]) and consulted read-only by the
//! matcher, the suggestion engine and the binder. Nothing in the routing
//! pipeline mutates it.
//!
//! - [`ModuleTree`] - top-level modules by name
//! - [`ModuleNode`] - a module with its methods and sub modules
//! - [`MethodDescriptor`] - a callable leaf with ordered parameters
//! - [`ParameterDescriptor`] - a parameter's flags, type and default

pub mod builder;
pub mod types;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::bind::value::{ArgValue, BoundArgs};

pub use builder::{MethodBuilder, ModuleBuilder, ParamBuilder, TreeBuilder, TreeError};
pub use types::{EnumSpec, ParamType, ScalarKind};

/// The instance a method runs against, if it has one.
pub type Receiver = Arc<dyn Any + Send + Sync>;

/// Produces the receiver for one invocation.
pub type Resolver = Arc<dyn Fn() -> anyhow::Result<Option<Receiver>> + Send + Sync>;

/// Runs the underlying call and normalizes its result to JSON.
pub type Invoker = Arc<
    dyn Fn(Option<Receiver>, BoundArgs) -> BoxFuture<'static, anyhow::Result<serde_json::Value>>
        + Send
        + Sync,
>;

/// Downcast a receiver to the concrete instance type a handler expects.
pub fn receiver<T: Any + Send + Sync>(receiver: Option<Receiver>) -> anyhow::Result<Arc<T>> {
    receiver
        .ok_or_else(|| anyhow::anyhow!("method has no receiver"))?
        .downcast::<T>()
        .map_err(|_| anyhow::anyhow!("receiver is not a {}", std::any::type_name::<T>()))
}

/// Top-level modules by name.
#[derive(Debug, Clone, Default)]
pub struct ModuleTree {
    roots: BTreeMap<String, ModuleNode>,
}

impl ModuleTree {
    pub fn builder() -> TreeBuilder {
        TreeBuilder::default()
    }

    pub(crate) fn from_roots(roots: BTreeMap<String, ModuleNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &BTreeMap<String, ModuleNode> {
        &self.roots
    }

    pub fn get(&self, name: &str) -> Option<&ModuleNode> {
        self.roots.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// A named group of methods and nested modules.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    pub name: String,
    pub summary: Option<String>,
    pub methods: BTreeMap<String, MethodDescriptor>,
    pub sub_modules: BTreeMap<String, ModuleNode>,
}

impl ModuleNode {
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn sub_module(&self, name: &str) -> Option<&ModuleNode> {
        self.sub_modules.get(name)
    }
}

/// A callable leaf of the tree.
#[derive(Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub summary: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub(crate) resolver: Resolver,
    pub(crate) invoker: Invoker,
}

impl MethodDescriptor {
    /// Parameters a caller may set by flag.
    pub fn visible_parameters(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().filter(|param| !param.hidden)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("summary", &self.summary)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Primary flag name, matched as `--name`
    pub name: String,
    /// Secondary flag, matched as `-alias`
    pub alias: Option<String>,
    pub param_type: ParamType,
    /// Never settable by flag; always bound to its default
    pub hidden: bool,
    pub default: Option<ArgValue>,
    pub summary: Option<String>,
}

impl ParameterDescriptor {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn primary_flag(&self) -> String {
        format!("--{}", self.name)
    }

    pub fn alias_flag(&self) -> Option<String> {
        self.alias.as_ref().map(|alias| format!("-{alias}"))
    }

    /// Every spelling a caller may use for this parameter.
    ///
    /// `/name` and `/alias` are accepted alongside the dash forms.
    pub fn flag_spellings(&self) -> Vec<String> {
        let mut spellings = vec![self.primary_flag(), format!("/{}", self.name)];
        if let Some(alias) = &self.alias {
            spellings.push(format!("-{alias}"));
            spellings.push(format!("/{alias}"));
        }
        spellings
    }

    /// Human-readable reference used as the key of binding errors,
    /// e.g. `--numbers (-n)`.
    pub fn reference(&self) -> String {
        match self.alias_flag() {
            Some(alias) => format!("{} ({})", self.primary_flag(), alias),
            None => self.primary_flag(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(name: &str, alias: Option<&str>) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.to_string(),
            alias: alias.map(str::to_string),
            param_type: ParamType::int(),
            hidden: false,
            default: None,
            summary: None,
        }
    }

    #[test]
    fn test_reference_with_alias() {
        assert_eq!(param("numbers", Some("n")).reference(), "--numbers (-n)");
        assert_eq!(param("name", None).reference(), "--name");
    }

    #[test]
    fn test_flag_spellings() {
        let spellings = param("numbers", Some("n")).flag_spellings();
        assert_eq!(spellings, vec!["--numbers", "/numbers", "-n", "/n"]);
    }

    #[test]
    fn test_receiver_downcast() {
        let instance: Receiver = Arc::new(42_u32);
        let value = receiver::<u32>(Some(instance.clone())).expect("u32 receiver");
        assert_eq!(*value, 42);
        assert!(receiver::<String>(Some(instance)).is_err());
        assert!(receiver::<u32>(None).is_err());
    }
}
