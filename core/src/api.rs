pub use crate::config::InvokerConfig;
pub use crate::descriptor::{describe_method, MethodDescriptor, MethodKey, ParameterSpec};
pub use crate::errors::{FrameError, InvokeError, InvokeResult, MethodError};
pub use crate::invoker::{DynamicInvoker, DynamicMethod, DynamicMethodFactory, Frame};
pub use crate::reflect::{Capability, MethodBuilder, MethodInfo, ParameterMode, TypeTag};
pub use crate::types::{InvocationResult, Value};
