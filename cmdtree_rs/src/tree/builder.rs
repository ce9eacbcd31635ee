//! Declarative registration of the module tree.
//!
//! Hosts describe their modules with builders instead of runtime
//! introspection. Names are normalized to kebab-case at registration, so
//! `DayInfo` is routed as `day-info`; after that every comparison is exact.
//!
//! ```rust
//! use cmdtree::tree::{MethodBuilder, ModuleBuilder, ModuleTree, ParamBuilder, ParamType};
//!
//! let tree = ModuleTree::builder()
//!     .module(
//!         ModuleBuilder::new("math").method(
//!             MethodBuilder::new("add")
//!                 .param(ParamBuilder::new("a", ParamType::int()))
//!                 .param(ParamBuilder::new("b", ParamType::int()))
//!                 .handler(|_, args| Ok(args.int("a")? + args.int("b")?)),
//!         ),
//!     )
//!     .build()
//!     .unwrap();
//! assert!(tree.get("math").is_some());
//! ```

use std::any::Any;
use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use heck::ToKebabCase;
use serde::Serialize;
use thiserror::Error;

use super::types::ParamType;
use super::{Invoker, MethodDescriptor, ModuleNode, ModuleTree, ParameterDescriptor, Receiver, Resolver};
use crate::bind::value::{ArgValue, BoundArgs};
use crate::route::tokenizer::is_help_marker;

/// A registration mistake caught while building the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("duplicate {kind} '{name}' in '{parent}'")]
    Duplicate {
        kind: &'static str,
        name: String,
        parent: String,
    },

    #[error("invalid name '{0}': names must start with a letter")]
    InvalidName(String),

    #[error("hidden parameter '{param}' of '{method}' has no default value")]
    HiddenWithoutDefault { method: String, param: String },

    #[error("default value '{value}' of '{param}' in '{method}' is not a {expected}")]
    InvalidDefault {
        method: String,
        param: String,
        value: String,
        expected: String,
    },

    #[error("flag '{flag}' is used twice by '{method}'")]
    DuplicateFlag { method: String, flag: String },

    #[error("flag '{flag}' of '{method}' is reserved for help")]
    ReservedFlag { method: String, flag: String },

    #[error("method '{0}' has no handler")]
    MissingHandler(String),
}

/// Collects top-level modules into a [`ModuleTree`].
#[derive(Default)]
pub struct TreeBuilder {
    modules: Vec<ModuleBuilder>,
}

impl TreeBuilder {
    pub fn module(mut self, module: ModuleBuilder) -> Self {
        self.modules.push(module);
        self
    }

    /// Validate and freeze the tree. Fails on the first registration mistake.
    pub fn build(self) -> Result<ModuleTree, TreeError> {
        let roots = build_modules(self.modules, "<root>")?;
        tracing::debug!("module tree built with {} top-level modules", roots.len());
        Ok(ModuleTree::from_roots(roots))
    }
}

fn build_modules(
    modules: Vec<ModuleBuilder>,
    parent: &str,
) -> Result<BTreeMap<String, ModuleNode>, TreeError> {
    let mut built = BTreeMap::new();
    for module in modules {
        let node = module.build(parent)?;
        if built.contains_key(&node.name) {
            return Err(TreeError::Duplicate {
                kind: "module",
                name: node.name,
                parent: parent.to_string(),
            });
        }
        built.insert(node.name.clone(), node);
    }
    Ok(built)
}

fn normalize(name: &str) -> Result<String, TreeError> {
    let normalized = name.to_kebab_case();
    if !normalized.chars().next().is_some_and(char::is_alphabetic) {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(normalized)
}

/// Describes one module.
pub struct ModuleBuilder {
    name: String,
    summary: Option<String>,
    methods: Vec<MethodBuilder>,
    modules: Vec<ModuleBuilder>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
            methods: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    pub fn module(mut self, module: ModuleBuilder) -> Self {
        self.modules.push(module);
        self
    }

    fn build(self, parent: &str) -> Result<ModuleNode, TreeError> {
        let name = normalize(&self.name)?;
        let path = if parent == "<root>" {
            name.clone()
        } else {
            format!("{parent} {name}")
        };

        let mut methods = BTreeMap::new();
        for method in self.methods {
            let descriptor = method.build()?;
            if methods.contains_key(&descriptor.name) {
                return Err(TreeError::Duplicate {
                    kind: "method",
                    name: descriptor.name,
                    parent: path,
                });
            }
            methods.insert(descriptor.name.clone(), descriptor);
        }

        Ok(ModuleNode {
            name,
            summary: self.summary,
            methods,
            sub_modules: build_modules(self.modules, &path)?,
        })
    }
}

/// Describes one method: its parameters, receiver and handler.
pub struct MethodBuilder {
    name: String,
    summary: Option<String>,
    params: Vec<ParamBuilder>,
    resolver: Option<Resolver>,
    invoker: Option<Invoker>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
            params: Vec::new(),
            resolver: None,
            invoker: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn param(mut self, param: ParamBuilder) -> Self {
        self.params.push(param);
        self
    }

    /// Produce a fresh receiver on every invocation.
    pub fn resolver<F, T>(mut self, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
        T: Any + Send + Sync,
    {
        let resolver: Resolver = Arc::new(move || {
            let instance: Receiver = Arc::new(factory()?);
            Ok(Some(instance))
        });
        self.resolver = Some(resolver);
        self
    }

    /// Run every invocation against one shared instance.
    pub fn receiver<T: Any + Send + Sync>(mut self, instance: Arc<T>) -> Self {
        let instance: Receiver = instance;
        let resolver: Resolver = Arc::new(move || Ok(Some(Arc::clone(&instance))));
        self.resolver = Some(resolver);
        self
    }

    /// Synchronous handler. Its return value becomes the JSON result; `()`
    /// becomes `null`.
    pub fn handler<F, T>(mut self, handler: F) -> Self
    where
        F: Fn(Option<Receiver>, BoundArgs) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Serialize + 'static,
    {
        let invoker: Invoker = Arc::new(move |receiver: Option<Receiver>, args: BoundArgs| {
            let output = handler(receiver, args).and_then(into_output);
            futures::future::ready(output).boxed()
        });
        self.invoker = Some(invoker);
        self
    }

    /// Asynchronous handler, awaited by the dispatcher.
    pub fn async_handler<F, Fut, T>(mut self, handler: F) -> Self
    where
        F: Fn(Option<Receiver>, BoundArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Serialize + 'static,
    {
        let invoker: Invoker = Arc::new(move |receiver: Option<Receiver>, args: BoundArgs| {
            let call = handler(receiver, args);
            async move { into_output(call.await?) }.boxed()
        });
        self.invoker = Some(invoker);
        self
    }

    fn build(self) -> Result<MethodDescriptor, TreeError> {
        let name = normalize(&self.name)?;
        let invoker = self
            .invoker
            .ok_or_else(|| TreeError::MissingHandler(name.clone()))?;

        let mut parameters = Vec::with_capacity(self.params.len());
        let mut flags = HashSet::new();
        for param in self.params {
            let descriptor = param.build(&name)?;
            for flag in descriptor.flag_spellings() {
                if is_help_marker(&flag) {
                    return Err(TreeError::ReservedFlag {
                        method: name.clone(),
                        flag,
                    });
                }
                if !flags.insert(flag.clone()) {
                    return Err(TreeError::DuplicateFlag {
                        method: name.clone(),
                        flag,
                    });
                }
            }
            parameters.push(descriptor);
        }

        Ok(MethodDescriptor {
            name,
            summary: self.summary,
            parameters,
            resolver: self.resolver.unwrap_or_else(no_receiver),
            invoker,
        })
    }
}

fn no_receiver() -> Resolver {
    Arc::new(|| Ok(None))
}

fn into_output<T: Serialize>(value: T) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

/// Describes one method parameter.
pub struct ParamBuilder {
    name: String,
    alias: Option<String>,
    param_type: ParamType,
    hidden: bool,
    default: Option<ArgValue>,
    summary: Option<String>,
}

impl ParamBuilder {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            param_type,
            hidden: false,
            default: None,
            summary: None,
        }
    }

    /// Secondary flag, used as `-alias`. Not normalized.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    fn build(self, method: &str) -> Result<ParameterDescriptor, TreeError> {
        let name = normalize(&self.name)?;
        if let Some(alias) = &self.alias
            && !alias.chars().next().is_some_and(char::is_alphabetic)
        {
            return Err(TreeError::InvalidName(alias.clone()));
        }
        if self.hidden && self.default.is_none() {
            return Err(TreeError::HiddenWithoutDefault {
                method: method.to_string(),
                param: name,
            });
        }
        if let Some(default) = &self.default
            && !self.param_type.accepts(default)
        {
            return Err(TreeError::InvalidDefault {
                method: method.to_string(),
                param: name,
                value: default.to_string(),
                expected: self.param_type.to_string(),
            });
        }

        Ok(ParameterDescriptor {
            name,
            alias: self.alias,
            param_type: self.param_type,
            hidden: self.hidden,
            default: self.default,
            summary: self.summary,
        })
    }
}
