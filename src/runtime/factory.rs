//! Method factories - compiled bundle builders for one method
//!
//! Compilation inspects the method once: return type, then one handler per
//! parameter. Invocation is a plain walk over the handlers.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::bundle::Bundle;
use super::handler::ParameterHandler;
use super::listener::BundleListener;
use super::method::{MethodDescriptor, MethodId, ParameterDescriptor};
use super::value::Value;
use crate::catalog::{binding_annotations, is_required};
use crate::error::{BundleError, Result};
use crate::types::{TypeHierarchy, TypeRef, BUNDLE};

#[derive(Debug, Clone, PartialEq)]
pub struct MethodFactory {
    method: MethodId,
    handlers: Vec<ParameterHandler>,
}

impl MethodFactory {
    /// Validate `method` and build its handlers.
    pub fn compile(method: &MethodDescriptor, hierarchy: &dyn TypeHierarchy) -> Result<Self> {
        let id = method.id();
        if method.return_type != TypeRef::bundle() {
            return Err(BundleError::ReturnType {
                method: id,
                expected: BUNDLE.to_string(),
                actual: method.return_type.to_string(),
            });
        }

        let handlers = method
            .parameters
            .iter()
            .enumerate()
            .map(|(position, parameter)| parse_parameter(&id, position, parameter, hierarchy))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            method: id,
            handlers,
        })
    }

    pub fn method(&self) -> &MethodId {
        &self.method
    }

    pub fn handlers(&self) -> &[ParameterHandler] {
        &self.handlers
    }

    pub fn arity(&self) -> usize {
        self.handlers.len()
    }

    pub fn invoke(&self, args: &[Option<Value>]) -> Result<Bundle> {
        self.invoke_with(args, &[])
    }

    /// Fill a new bundle from `args`, notifying `listeners`.
    ///
    /// Every argument is checked before anything is written, so listeners
    /// only see invocations that succeed.
    pub fn invoke_with(
        &self,
        args: &[Option<Value>],
        listeners: &[Arc<dyn BundleListener>],
    ) -> Result<Bundle> {
        self.check_count(args.len())?;

        let prepared = self
            .handlers
            .iter()
            .zip(args)
            .map(|(handler, arg)| handler.prepare(arg.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut bundle = Bundle::new();
        for (handler, value) in self.handlers.iter().zip(prepared) {
            let Some(value) = value else { continue };
            for listener in listeners {
                listener.on_bundling(&self.method, &handler.key, &value, handler.required);
            }
            handler.write(&mut bundle, value);
        }
        for listener in listeners {
            listener.on_completed(&self.method, &bundle);
        }
        Ok(bundle)
    }

    /// Convert JSON arguments using each handler's kind; `null` is absent.
    pub fn arguments_from_json(&self, json: &[JsonValue]) -> Result<Vec<Option<Value>>> {
        self.check_count(json.len())?;
        self.handlers
            .iter()
            .zip(json)
            .map(|(handler, arg)| match arg {
                JsonValue::Null => Ok(None),
                other => Value::from_json(handler.kind, &handler.key, other).map(Some),
            })
            .collect()
    }

    fn check_count(&self, actual: usize) -> Result<()> {
        if actual != self.handlers.len() {
            return Err(BundleError::ArgumentCount {
                expected: self.handlers.len(),
                actual,
            });
        }
        Ok(())
    }
}

fn parse_parameter(
    method: &MethodId,
    position: usize,
    parameter: &ParameterDescriptor,
    hierarchy: &dyn TypeHierarchy,
) -> Result<ParameterHandler> {
    let found = binding_annotations(&parameter.annotations);
    let binding = match found.as_slice() {
        [] => {
            return Err(BundleError::MissingAnnotation {
                method: method.clone(),
                position,
            })
        }
        [binding] => binding,
        _ => {
            return Err(BundleError::MultipleAnnotations {
                method: method.clone(),
                position,
            })
        }
    };

    if !binding.kind.accepts_type(hierarchy, &parameter.declared_type) {
        return Err(BundleError::ParameterType {
            method: method.clone(),
            position,
            annotation: binding.kind.annotation_name(),
            expected: binding.kind.type_rule().to_string(),
            actual: parameter.declared_type.to_string(),
        });
    }

    let key = binding.key.ok_or_else(|| BundleError::MissingKey {
        method: method.clone(),
        position,
        annotation: binding.kind.annotation_name(),
    })?;

    Ok(ParameterHandler::new(
        position,
        binding.kind,
        key,
        is_required(&parameter.annotations),
    ))
}
