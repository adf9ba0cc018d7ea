use crate::errors::FrameError;
use crate::reflect::{ParameterMode, TypeTag};
use crate::types::Value;
use std::any::{Any, TypeId};

struct FrameSlot {
    ty: TypeTag,
    mode: ParameterMode,
    value: Value,
}

/// **TYPED VIEW OVER MARSHALLED ARGUMENTS**
///
/// Handed to a method body for the duration of one call. In slots are
/// read-only, Ref slots can be read, mutated and replaced, Out slots start
/// null and can be assigned.
pub struct Frame {
    slots: Vec<FrameSlot>,
}

impl Frame {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, ty: TypeTag, mode: ParameterMode, value: Value) {
        self.slots.push(FrameSlot { ty, mode, value });
    }

    /// Move every slot value out, leaving the frame empty.
    pub(crate) fn drain_values(&mut self) -> impl Iterator<Item = Value> + '_ {
        self.slots.drain(..).map(|slot| slot.value)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn mode(&self, index: usize) -> Result<ParameterMode, FrameError> {
        self.slot(index).map(|slot| slot.mode)
    }

    /// Raw slot value, for parameters typed as `any`.
    pub fn value(&self, index: usize) -> Result<&Value, FrameError> {
        self.slot(index).map(|slot| &slot.value)
    }

    /// Borrow a non-null argument as `T`.
    pub fn arg<T: Any>(&self, index: usize) -> Result<&T, FrameError> {
        self.opt_arg::<T>(index)?.ok_or(FrameError::Null { index })
    }

    /// Borrow an argument as `T`, `None` when the slot is null.
    pub fn opt_arg<T: Any>(&self, index: usize) -> Result<Option<&T>, FrameError> {
        let slot = self.slot(index)?;
        if slot.value.is_null() {
            return Ok(None);
        }
        slot.value
            .get::<T>()
            .map(Some)
            .ok_or_else(|| wrong_type::<T>(index, &slot.value))
    }

    /// Mutably borrow a Ref argument in place.
    pub fn arg_mut<T: Any>(&mut self, index: usize) -> Result<&mut T, FrameError> {
        let slot = self.writable_slot(index, "mutate")?;
        if slot.mode != ParameterMode::Ref {
            return Err(FrameError::WrongMode {
                index,
                mode: slot.mode.as_str(),
                operation: "mutate in place",
            });
        }
        if slot.value.is_null() {
            return Err(FrameError::Null { index });
        }
        if !slot.value.is::<T>() {
            return Err(wrong_type::<T>(index, &slot.value));
        }
        slot.value
            .get_mut::<T>()
            .ok_or(FrameError::Null { index })
    }

    /// Assign a Ref or Out argument.
    pub fn set<T: Any + Send + Sync>(&mut self, index: usize, value: T) -> Result<(), FrameError> {
        let slot = self.writable_slot(index, "assign")?;
        if !slot.ty.accepts_type(TypeId::of::<T>()) {
            return Err(FrameError::WrongType {
                index,
                requested: std::any::type_name::<T>(),
                actual: slot.ty.display_name(),
            });
        }
        slot.value = Value::new(value);
        Ok(())
    }

    /// Assign a Ref or Out argument from an untyped value.
    pub fn set_value(&mut self, index: usize, value: Value) -> Result<(), FrameError> {
        let slot = self.writable_slot(index, "assign")?;
        if !slot.ty.accepts(&value) {
            return Err(FrameError::WrongType {
                index,
                requested: value.type_name(),
                actual: slot.ty.display_name(),
            });
        }
        slot.value = value;
        Ok(())
    }

    fn slot(&self, index: usize) -> Result<&FrameSlot, FrameError> {
        let len = self.slots.len();
        self.slots
            .get(index)
            .ok_or(FrameError::OutOfRange { index, len })
    }

    fn writable_slot(
        &mut self,
        index: usize,
        operation: &'static str,
    ) -> Result<&mut FrameSlot, FrameError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(FrameError::OutOfRange { index, len })?;
        if !slot.mode.is_written() {
            return Err(FrameError::WrongMode {
                index,
                mode: slot.mode.as_str(),
                operation,
            });
        }
        Ok(slot)
    }
}

fn wrong_type<T: Any>(index: usize, value: &Value) -> FrameError {
    FrameError::WrongType {
        index,
        requested: std::any::type_name::<T>(),
        actual: value.type_name().to_string(),
    }
}
