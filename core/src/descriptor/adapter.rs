use crate::descriptor::types::{MethodDescriptor, ParameterSpec};
use crate::errors::{InvokeError, InvokeResult};
use crate::reflect::{MethodInfo, TypeKind, TypeTag};

/// **METHOD DESCRIPTOR ADAPTER**
///
/// Normalize a reflective method handle into a [`MethodDescriptor`].
///
/// **FAILS** with `UnsupportedSignature` for open generic definitions,
/// variadic parameters, pointer or unit parameter types, pointer return
/// types, and parameter lists longer than `max_arity`.
pub fn describe_method(info: &MethodInfo, max_arity: usize) -> InvokeResult<MethodDescriptor> {
    let unsupported = |reason: String| InvokeError::UnsupportedSignature {
        method: info.qualified_name(),
        reason,
    };

    if info.generic_arity() > 0 {
        return Err(unsupported(format!(
            "open generic method definition with {} unbound type parameter(s)",
            info.generic_arity()
        )));
    }

    if info.parameters().len() > max_arity {
        return Err(unsupported(format!(
            "{} parameters exceed the maximum arity {}",
            info.parameters().len(),
            max_arity
        )));
    }

    let mut parameters = Vec::with_capacity(info.parameters().len());
    for (index, param) in info.parameters().iter().enumerate() {
        if param.variadic {
            return Err(unsupported(format!(
                "parameter {} ({}) is a variable-length parameter list",
                index, param.name
            )));
        }
        if let Some(reason) = unrepresentable(&param.ty) {
            return Err(unsupported(format!(
                "parameter {} ({}) has {}",
                index, param.name, reason
            )));
        }
        parameters.push(ParameterSpec {
            name: param.name.clone(),
            ty: param.ty,
            mode: param.mode,
        });
    }

    let return_type = match info.return_type() {
        Some(ty) if ty.kind() == TypeKind::Unit => None,
        Some(ty) if ty.kind() == TypeKind::Pointer => {
            return Err(unsupported(format!(
                "return type {} is not representable",
                ty.display_name()
            )));
        }
        other => other,
    };

    Ok(MethodDescriptor::new(
        info.owner().clone(),
        info.name().to_string(),
        parameters,
        return_type,
        info.is_static(),
    ))
}

fn unrepresentable(ty: &TypeTag) -> Option<String> {
    match ty.kind() {
        TypeKind::Value | TypeKind::Any => None,
        TypeKind::Pointer => Some(format!("pointer type {}", ty.display_name())),
        TypeKind::Unit => Some("the unit type".to_string()),
    }
}
