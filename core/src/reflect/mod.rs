//! Minimal reflective metadata: the shape of a method as the surrounding
//! container knows it, plus the body that implements it.

pub mod method;
pub mod types;

pub use method::{MethodBody, MethodBuilder, MethodInfo, ParameterInfo};
pub use types::{Capability, OwnerCapability, OwnerType, ParameterMode, TypeKind, TypeTag};
