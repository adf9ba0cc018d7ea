use crate::errors::{FrameError, MethodError};
use crate::invoker::Frame;
use crate::reflect::types::{Capability, OwnerType, ParameterMode, TypeTag};
use crate::types::Value;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// **METHOD BODY**
///
/// The native entry point of a method. Receives the (already checked) target
/// and a [`Frame`] over the marshalled argument slots.
pub trait MethodBody: Send + Sync {
    fn call(&self, target: Option<&mut dyn Any>, frame: &mut Frame) -> Result<Value, MethodError>;
}

struct InstanceBody<T, F> {
    body: F,
    _target: PhantomData<fn() -> T>,
}

impl<T, F> MethodBody for InstanceBody<T, F>
where
    T: Any,
    F: Fn(&mut T, &mut Frame) -> Result<Value, MethodError> + Send + Sync,
{
    fn call(&self, target: Option<&mut dyn Any>, frame: &mut Frame) -> Result<Value, MethodError> {
        let target = target
            .and_then(|target| target.downcast_mut::<T>())
            .ok_or(FrameError::Receiver {
                expected: std::any::type_name::<T>(),
            })?;
        (self.body)(target, frame)
    }
}

struct CapabilityBody<Tr: ?Sized + 'static, F> {
    capability: Arc<Capability<Tr>>,
    body: F,
}

impl<Tr, F> MethodBody for CapabilityBody<Tr, F>
where
    Tr: ?Sized + 'static,
    F: Fn(&mut Tr, &mut Frame) -> Result<Value, MethodError> + Send + Sync,
{
    fn call(&self, target: Option<&mut dyn Any>, frame: &mut Frame) -> Result<Value, MethodError> {
        let target = target
            .and_then(|target| self.capability.cast(target))
            .ok_or(FrameError::Receiver {
                expected: std::any::type_name::<Tr>(),
            })?;
        (self.body)(target, frame)
    }
}

struct StaticBody<F> {
    body: F,
}

impl<F> MethodBody for StaticBody<F>
where
    F: Fn(&mut Frame) -> Result<Value, MethodError> + Send + Sync,
{
    fn call(&self, _target: Option<&mut dyn Any>, frame: &mut Frame) -> Result<Value, MethodError> {
        (self.body)(frame)
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: TypeTag,
    pub mode: ParameterMode,
    /// Trailing variable-length parameter list.
    pub variadic: bool,
}

/// **REFLECTIVE METHOD HANDLE**
///
/// What the metadata layer knows about a method: owner, name, parameters,
/// return type, and the body that implements it.
#[derive(Clone)]
pub struct MethodInfo {
    owner: OwnerType,
    name: String,
    parameters: Vec<ParameterInfo>,
    return_type: Option<TypeTag>,
    is_static: bool,
    generic_arity: usize,
    body: Arc<dyn MethodBody>,
}

impl MethodInfo {
    pub fn owner(&self) -> &OwnerType {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn return_type(&self) -> Option<TypeTag> {
        self.return_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Number of unbound generic parameters; non-zero for open definitions.
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }

    pub fn body(&self) -> Arc<dyn MethodBody> {
        Arc::clone(&self.body)
    }

    /// `Owner::name`, used in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.owner.display_name(), self.name)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .field("is_static", &self.is_static)
            .field("generic_arity", &self.generic_arity)
            .finish_non_exhaustive()
    }
}

/// **METHOD INFO BUILDER**
///
/// Declare the signature first, then bind a body with one of the `on*`
/// finishers; the finisher fixes the owner and static-ness.
///
/// ```rust
/// use dynacall::reflect::{MethodBuilder, ParameterMode};
/// use dynacall::Value;
///
/// struct Counter;
///
/// let info = MethodBuilder::new("bump")
///     .param::<i32>("count", ParameterMode::Ref)
///     .on(|_: &mut Counter, frame| {
///         *frame.arg_mut::<i32>(0)? += 1;
///         Ok(Value::null())
///     });
/// assert_eq!(info.qualified_name(), "Counter::bump");
/// ```
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    parameters: Vec<ParameterInfo>,
    return_type: Option<TypeTag>,
    generic_arity: usize,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            generic_arity: 0,
        }
    }

    /// Parameter of concrete type `T`.
    pub fn param<T: Any>(self, name: impl Into<String>, mode: ParameterMode) -> Self {
        self.param_of(name, TypeTag::of::<T>(), mode)
    }

    /// Parameter of type `T` that also accepts null.
    pub fn nullable_param<T: Any>(self, name: impl Into<String>, mode: ParameterMode) -> Self {
        self.param_of(name, TypeTag::nullable::<T>(), mode)
    }

    /// Parameter accepting any value.
    pub fn any_param(self, name: impl Into<String>, mode: ParameterMode) -> Self {
        self.param_of(name, TypeTag::any(), mode)
    }

    pub fn param_of(mut self, name: impl Into<String>, ty: TypeTag, mode: ParameterMode) -> Self {
        self.parameters.push(ParameterInfo {
            name: name.into(),
            ty,
            mode,
            variadic: false,
        });
        self
    }

    /// Trailing variable-length parameter list of `T`.
    pub fn variadic_param<T: Any>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(ParameterInfo {
            name: name.into(),
            ty: TypeTag::of::<T>(),
            mode: ParameterMode::In,
            variadic: true,
        });
        self
    }

    pub fn returns<T: Any>(self) -> Self {
        self.returns_type(TypeTag::of::<T>())
    }

    pub fn returns_nullable<T: Any>(self) -> Self {
        self.returns_type(TypeTag::nullable::<T>())
    }

    pub fn returns_type(mut self, ty: TypeTag) -> Self {
        self.return_type = Some(ty);
        self
    }

    pub fn generic_arity(mut self, arity: usize) -> Self {
        self.generic_arity = arity;
        self
    }

    /// Bind an instance method of `T`.
    pub fn on<T, F>(self, body: F) -> MethodInfo
    where
        T: Any,
        F: Fn(&mut T, &mut Frame) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        self.finish(
            OwnerType::Type(TypeTag::of::<T>()),
            false,
            Arc::new(InstanceBody {
                body,
                _target: PhantomData,
            }),
        )
    }

    /// Bind an instance method declared on a capability.
    pub fn on_capability<Tr, F>(self, capability: &Arc<Capability<Tr>>, body: F) -> MethodInfo
    where
        Tr: ?Sized + 'static,
        F: Fn(&mut Tr, &mut Frame) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        let owner = OwnerType::Capability(capability.clone());
        self.finish(
            owner,
            false,
            Arc::new(CapabilityBody {
                capability: Arc::clone(capability),
                body,
            }),
        )
    }

    /// Bind a static method declared on `O`.
    pub fn on_static<O, F>(self, body: F) -> MethodInfo
    where
        O: Any,
        F: Fn(&mut Frame) -> Result<Value, MethodError> + Send + Sync + 'static,
    {
        self.finish(
            OwnerType::Type(TypeTag::of::<O>()),
            true,
            Arc::new(StaticBody { body }),
        )
    }

    /// Bind an arbitrary body.
    pub fn with_body(self, owner: OwnerType, is_static: bool, body: Arc<dyn MethodBody>) -> MethodInfo {
        self.finish(owner, is_static, body)
    }

    fn finish(self, owner: OwnerType, is_static: bool, body: Arc<dyn MethodBody>) -> MethodInfo {
        // A unit return type is the same as no return type.
        let return_type = self
            .return_type
            .filter(|ty| ty.id() != TypeId::of::<()>());
        MethodInfo {
            owner,
            name: self.name,
            parameters: self.parameters,
            return_type,
            is_static,
            generic_arity: self.generic_arity,
            body,
        }
    }
}
