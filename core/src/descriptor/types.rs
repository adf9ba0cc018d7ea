use crate::reflect::{OwnerType, ParameterMode, TypeTag};
use serde::Serialize;
use std::any::TypeId;
use std::fmt::Write as _;

/// One normalized parameter slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSpec {
    pub name: String,
    pub ty: TypeTag,
    pub mode: ParameterMode,
}

/// **DESCRIPTOR IDENTITY**
///
/// Two descriptors with equal keys share one generated invoker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    owner: TypeId,
    /// Accepted target types of a capability owner.
    implementors: Vec<TypeId>,
    name: String,
    is_static: bool,
    parameters: Vec<(TypeTag, ParameterMode)>,
}

/// **NORMALIZED METHOD DESCRIPTION**
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    owner: OwnerType,
    name: String,
    parameters: Vec<ParameterSpec>,
    return_type: Option<TypeTag>,
    is_static: bool,
    key: MethodKey,
}

impl MethodDescriptor {
    pub(crate) fn new(
        owner: OwnerType,
        name: String,
        parameters: Vec<ParameterSpec>,
        return_type: Option<TypeTag>,
        is_static: bool,
    ) -> Self {
        let key = MethodKey {
            owner: owner.id(),
            implementors: owner.implementor_ids(),
            name: name.clone(),
            is_static,
            parameters: parameters.iter().map(|p| (p.ty, p.mode)).collect(),
        };
        Self {
            owner,
            name,
            parameters,
            return_type,
            is_static,
            key,
        }
    }

    pub fn owner(&self) -> &OwnerType {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// `None` for void methods.
    pub fn return_type(&self) -> Option<TypeTag> {
        self.return_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn key(&self) -> &MethodKey {
        &self.key
    }

    /// `Owner::name`
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner.display_name(), self.name)
    }

    /// Human-readable signature, e.g.
    /// `RefOutTestObject::do_it(i32 count, ref i32 reference, out String output) -> void`.
    pub fn signature(&self) -> String {
        let mut signature = String::new();
        if self.is_static {
            signature.push_str("static ");
        }
        signature.push_str(&self.qualified_name());
        signature.push('(');
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                signature.push_str(", ");
            }
            if param.mode != ParameterMode::In {
                let _ = write!(signature, "{} ", param.mode);
            }
            let _ = write!(signature, "{} {}", param.ty, param.name);
        }
        signature.push_str(") -> ");
        match self.return_type {
            Some(ty) => signature.push_str(&ty.display_name()),
            None => signature.push_str("void"),
        }
        signature
    }

    /// Serializable description for diagnostics.
    pub fn summary(&self) -> DescriptorSummary {
        DescriptorSummary {
            owner: self.owner.display_name(),
            name: self.name.clone(),
            is_static: self.is_static,
            parameters: self
                .parameters
                .iter()
                .map(|p| ParameterSummary {
                    name: p.name.clone(),
                    type_name: p.ty.display_name(),
                    mode: p.mode,
                })
                .collect(),
            returns: self.return_type.map(|ty| ty.display_name()),
            signature: self.signature(),
        }
    }
}

/// **DIAGNOSTIC SNAPSHOT OF A DESCRIPTOR**
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorSummary {
    pub owner: String,
    pub name: String,
    pub is_static: bool,
    pub parameters: Vec<ParameterSummary>,
    pub returns: Option<String>,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub mode: ParameterMode,
}
