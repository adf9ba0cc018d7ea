use crate::config::InvokerConfig;
use crate::descriptor::MethodDescriptor;
use crate::errors::InvokeResult;
use crate::invoker::cache::InvokerCache;
use crate::invoker::generator::{CompiledInvoker, GeneratedInvoker, InvokerGenerator};
use crate::reflect::MethodInfo;
use crate::types::{InvocationResult, Value};
use std::any::Any;
use std::sync::Arc;

/// **UNIFORM CALLING CONTRACT**
///
/// `target, args -> result`, whatever the method's shape. `target` is ignored
/// by static methods. After `Ok`, Ref and Out slots of `args` hold the values
/// the method left in them.
pub trait DynamicInvoker: Send + Sync {
    fn invoke(
        &self,
        target: Option<&mut dyn Any>,
        args: &mut [Value],
    ) -> InvokeResult<InvocationResult>;

    /// Same as [`invoke`](DynamicInvoker::invoke), discarding the result.
    fn invoke_void(&self, target: Option<&mut dyn Any>, args: &mut [Value]) -> InvokeResult<()> {
        self.invoke(target, args).map(|_| ())
    }
}

impl DynamicInvoker for CompiledInvoker {
    fn invoke(
        &self,
        target: Option<&mut dyn Any>,
        args: &mut [Value],
    ) -> InvokeResult<InvocationResult> {
        CompiledInvoker::invoke(self, target, args)
    }
}

/// **DYNAMIC METHOD**
///
/// Façade over one cached invoker. Cheap to clone.
#[derive(Clone)]
pub struct DynamicMethod {
    invoker: GeneratedInvoker,
}

impl DynamicMethod {
    pub fn descriptor(&self) -> &MethodDescriptor {
        self.invoker.descriptor()
    }

    /// Whether both façades run the very same generated invoker.
    pub fn shares_invoker_with(&self, other: &DynamicMethod) -> bool {
        Arc::ptr_eq(&self.invoker, &other.invoker)
    }
}

impl DynamicInvoker for DynamicMethod {
    fn invoke(
        &self,
        target: Option<&mut dyn Any>,
        args: &mut [Value],
    ) -> InvokeResult<InvocationResult> {
        self.invoker.invoke(target, args)
    }
}

impl std::fmt::Debug for DynamicMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DynamicMethod")
            .field(&self.descriptor().signature())
            .finish()
    }
}

/// **DYNAMIC METHOD FACTORY**
///
/// Explicit context object owning the configuration, the generator and the
/// invoker cache. Share one factory (by reference or `Arc`) between every
/// component that creates dynamic methods.
#[derive(Debug, Default)]
pub struct DynamicMethodFactory {
    generator: InvokerGenerator,
    cache: InvokerCache,
}

impl DynamicMethodFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InvokerConfig) -> Self {
        Self {
            generator: InvokerGenerator::new(config),
            cache: InvokerCache::new(),
        }
    }

    pub fn config(&self) -> &InvokerConfig {
        self.generator.config()
    }

    pub fn cache(&self) -> &InvokerCache {
        &self.cache
    }

    /// Create the façade for `info`, reusing the cached invoker when one
    /// exists for the same descriptor.
    pub fn create(&self, info: &MethodInfo) -> InvokeResult<DynamicMethod> {
        let descriptor = self.generator.describe(info)?;
        let invoker = self.cache.get_or_create(&descriptor, || {
            Ok(self.generator.generate_from(descriptor.clone(), info.body()))
        })?;
        Ok(DynamicMethod { invoker })
    }
}
