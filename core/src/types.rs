//! # DYNACALL VALUE TYPES
//!
//! **CRITICAL**: Loosely-typed argument slots and invocation results.
//! **MANDATE**: Every argument array handed to an invoker is a `[Value]`.

use std::any::{Any, TypeId};
use std::fmt;

/// **ARGUMENT SLOT**
///
/// Either null or a boxed value that remembers its concrete type. Slots are
/// moved, never cloned, while an invocation runs.
#[derive(Default)]
pub struct Value {
    slot: Option<Boxed>,
}

struct Boxed {
    data: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Value {
    /// **CONSTRUCTOR** - Box a concrete value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            slot: Some(Boxed {
                data: Box::new(value),
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            }),
        }
    }

    /// **NULL CONSTRUCTOR**
    pub const fn null() -> Self {
        Self { slot: None }
    }

    pub fn is_null(&self) -> bool {
        self.slot.is_none()
    }

    /// Concrete type of the held value, `None` for null.
    pub fn type_id(&self) -> Option<TypeId> {
        self.slot.as_ref().map(|boxed| boxed.type_id)
    }

    /// Full type name of the held value, `"null"` for null.
    pub fn type_name(&self) -> &'static str {
        self.slot.as_ref().map_or("null", |boxed| boxed.type_name)
    }

    pub fn is<T: Any>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// Borrow the held value as `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.slot.as_ref()?.data.downcast_ref::<T>()
    }

    /// Mutably borrow the held value as `T`.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.slot.as_mut()?.data.downcast_mut::<T>()
    }

    /// Unbox the held value. Returns the slot unchanged when it is null or of
    /// another type.
    pub fn take<T: Any>(self) -> Result<T, Value> {
        match self.slot {
            Some(boxed) if boxed.type_id == TypeId::of::<T>() => {
                let Boxed {
                    data,
                    type_id,
                    type_name,
                } = boxed;
                data.downcast::<T>().map(|value| *value).map_err(|data| Value {
                    slot: Some(Boxed {
                        data,
                        type_id,
                        type_name,
                    }),
                })
            }
            slot => Err(Value { slot }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(boxed) => write!(f, "Value({})", boxed.type_name),
            None => f.write_str("Value(null)"),
        }
    }
}

/// **INVOCATION RESULT**
///
/// `Void` marks methods without a return type. A method that does declare a
/// return type may still return a null `Value`.
#[derive(Debug)]
pub enum InvocationResult {
    Void,
    Value(Value),
}

impl InvocationResult {
    pub fn is_void(&self) -> bool {
        matches!(self, InvocationResult::Void)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            InvocationResult::Value(value) => Some(value),
            InvocationResult::Void => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            InvocationResult::Value(value) => Some(value),
            InvocationResult::Void => None,
        }
    }

    /// Borrow the returned value as `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.value()?.get::<T>()
    }
}
