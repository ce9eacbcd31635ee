//! Parameter binding: raw flag values to typed arguments.
//!
//! Each declared parameter is looked up under every spelling of its flags,
//! converted by type shape, and either bound or recorded as an error. Binding
//! never stops at the first problem: the caller receives either a complete
//! argument list or every error at once, never a partial list.

pub mod convert;
pub mod value;

use std::collections::HashSet;

use tracing::debug;

use crate::error::{BindingError, BindingErrorKind, ParamError};
use crate::route::tokenizer::ParamMap;
use crate::tree::{MethodDescriptor, ParamType, ParameterDescriptor};

pub use convert::{convert_nullable, convert_scalar, convert_sequence, convert_structured};
pub use value::{ArgValue, BoundArgs};

/// Bind raw flag values to the method's parameters, in declaration order.
pub fn bind(method: &MethodDescriptor, params: &ParamMap) -> Result<BoundArgs, BindingError> {
    let mut args = BoundArgs::default();
    let mut errors = Vec::new();
    let mut consumed: HashSet<String> = HashSet::new();

    for param in &method.parameters {
        let present: Vec<(String, &[String])> = param
            .flag_spellings()
            .into_iter()
            .filter_map(|flag| params.get(&flag).map(|values| (flag, values)))
            .collect();
        consumed.extend(present.iter().map(|(flag, _)| flag.clone()));

        match present.as_slice() {
            [] => match &param.default {
                Some(default) => args.push(param.name.clone(), default.clone()),
                None => errors.push(ParamError {
                    reference: param.reference(),
                    kind: BindingErrorKind::Missing,
                }),
            },
            _ if param.hidden => {
                errors.extend(present.iter().map(|(flag, _)| ParamError {
                    reference: flag.clone(),
                    kind: BindingErrorKind::Unrecognised,
                }));
            }
            [(_, values)] => match convert(param, values) {
                Ok(value) => args.push(param.name.clone(), value),
                Err(kind) => errors.push(ParamError {
                    reference: param.reference(),
                    kind,
                }),
            },
            _ => errors.push(ParamError {
                reference: param.reference(),
                kind: BindingErrorKind::Duplicate,
            }),
        }
    }

    for flag in params.flags() {
        if !consumed.contains(flag) {
            errors.push(ParamError {
                reference: flag.to_string(),
                kind: BindingErrorKind::Unrecognised,
            });
        }
    }

    if errors.is_empty() {
        debug!("bound {} arguments for '{}'", args.len(), method.name);
        Ok(args)
    } else {
        debug!("{} binding errors for '{}'", errors.len(), method.name);
        Err(BindingError { errors })
    }
}

fn convert(param: &ParameterDescriptor, values: &[String]) -> Result<ArgValue, BindingErrorKind> {
    match &param.param_type {
        ParamType::Sequence(element) => convert_sequence(element, values),
        structured if structured.is_structured() => convert_structured(structured, values),
        _ if values.len() > 1 => Err(BindingErrorKind::NotArray),
        ParamType::Scalar(kind) => convert_scalar(kind, &values[0]),
        ParamType::Nullable(kind) => convert_nullable(kind, &values[0]),
        other => Err(BindingErrorKind::Unsupported(other.to_string())),
    }
}
