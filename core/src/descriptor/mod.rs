pub mod adapter;
pub mod types;

pub use adapter::describe_method;
pub use types::{DescriptorSummary, MethodDescriptor, MethodKey, ParameterSpec, ParameterSummary};
