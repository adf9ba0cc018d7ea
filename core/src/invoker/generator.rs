//! # INVOKER GENERATOR
//!
//! Turns a [`MethodDescriptor`] into a [`CompiledInvoker`]: a slot plan
//! computed once, plus the bound method body. Calls then run the plan without
//! consulting any metadata.

use crate::config::InvokerConfig;
use crate::descriptor::{describe_method, MethodDescriptor};
use crate::errors::{FrameError, InvokeError, InvokeResult};
use crate::invoker::frame::Frame;
use crate::reflect::types::short_type_name;
use crate::reflect::{MethodBody, MethodInfo, OwnerType, ParameterMode, TypeTag};
use crate::types::{InvocationResult, Value};
use std::any::Any;
use std::sync::Arc;

/// Shared handle to a generated invoker.
pub type GeneratedInvoker = Arc<CompiledInvoker>;

enum TargetPlan {
    /// Static method: whatever is passed is ignored.
    Ignore,
    /// Instance method: target must be assignable to the owner.
    Require(OwnerType),
}

#[derive(Clone, Copy)]
struct SlotPlan {
    ty: TypeTag,
    mode: ParameterMode,
}

enum ReturnPlan {
    Void,
    Value { verify: Option<TypeTag> },
}

struct InvocationPlan {
    target: TargetPlan,
    slots: Box<[SlotPlan]>,
    returns: ReturnPlan,
    /// Check Ref and Out slots against their declared types after the call.
    verify_slots: bool,
}

/// Moves frame values back into the caller's array when dropped, so the
/// array is restored even if the body unwinds.
struct WriteBack<'a> {
    args: &'a mut [Value],
    frame: Frame,
}

impl Drop for WriteBack<'_> {
    fn drop(&mut self) {
        for (arg, value) in self.args.iter_mut().zip(self.frame.drain_values()) {
            *arg = value;
        }
    }
}

/// **GENERATED INVOKER**
///
/// Immutable and stateless; safe for unlimited concurrent use.
pub struct CompiledInvoker {
    descriptor: MethodDescriptor,
    method: String,
    plan: InvocationPlan,
    body: Arc<dyn MethodBody>,
    log_invocations: bool,
}

impl CompiledInvoker {
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    /// Run the method against `target` with positional `args`.
    ///
    /// Arity, target and argument types are all checked before any slot is
    /// touched. On success Ref and Out slots hold the method's final values;
    /// In slots are always left as they were, also when the body panics.
    pub fn invoke(
        &self,
        target: Option<&mut dyn Any>,
        args: &mut [Value],
    ) -> InvokeResult<InvocationResult> {
        // **STEP 1**: Arity
        if args.len() != self.plan.slots.len() {
            return Err(InvokeError::ArityMismatch {
                method: self.method.clone(),
                expected: self.plan.slots.len(),
                actual: args.len(),
            });
        }

        // **STEP 2**: Target
        let target = match &self.plan.target {
            TargetPlan::Ignore => None,
            TargetPlan::Require(owner) => match target {
                Some(target) if owner.accepts(&*target) => Some(target),
                Some(_) => {
                    return Err(self.target_mismatch(owner, "an unrelated type"));
                }
                None => return Err(self.target_mismatch(owner, "no target")),
            },
        };

        // **STEP 3**: Argument types
        for (index, (slot, value)) in self.plan.slots.iter().zip(args.iter()).enumerate() {
            if slot.mode.is_read() && !slot.ty.accepts(value) {
                return Err(InvokeError::ArgumentTypeMismatch {
                    method: self.method.clone(),
                    index,
                    expected: slot.ty.display_name(),
                    actual: short_type_name(value.type_name()),
                });
            }
        }

        // **STEP 4**: Move slots into the frame; Out slots start null
        let mut frame = Frame::with_capacity(args.len());
        for (slot, value) in self.plan.slots.iter().zip(args.iter_mut()) {
            let value = std::mem::take(value);
            let value = if slot.mode.is_read() {
                value
            } else {
                Value::null()
            };
            frame.push(slot.ty, slot.mode, value);
        }
        let mut guard = WriteBack {
            args: &mut *args,
            frame,
        };

        if self.log_invocations {
            log::trace!("invoking {}", self.method);
        }

        // **STEP 5**: Call
        let outcome = self.body.call(target, &mut guard.frame);

        // **STEP 6**: Write back every slot; In slots come back unchanged
        drop(guard);

        // **STEP 7**: Return marshalling
        let returned = outcome.map_err(|source| {
            log::warn!("{} failed: {}", self.method, source);
            InvokeError::TargetInvocationFailure {
                method: self.method.clone(),
                source,
            }
        })?;

        if self.plan.verify_slots {
            self.verify_written_slots(args)?;
        }

        match &self.plan.returns {
            ReturnPlan::Void => Ok(InvocationResult::Void),
            ReturnPlan::Value { verify: Some(ty) } if !ty.accepts(&returned) => {
                Err(InvokeError::TargetInvocationFailure {
                    method: self.method.clone(),
                    source: Box::new(FrameError::ReturnType {
                        expected: ty.display_name(),
                        actual: short_type_name(returned.type_name()),
                    }),
                })
            }
            ReturnPlan::Value { .. } => Ok(InvocationResult::Value(returned)),
        }
    }

    fn verify_written_slots(&self, args: &[Value]) -> InvokeResult<()> {
        let written = self
            .plan
            .slots
            .iter()
            .zip(args)
            .enumerate()
            .filter(|(_, (slot, _))| slot.mode.is_written());
        for (index, (slot, value)) in written {
            if !slot.ty.accepts(value) {
                log::warn!("{} left slot {} as {}", self.method, index, value.type_name());
                return Err(InvokeError::TargetInvocationFailure {
                    method: self.method.clone(),
                    source: Box::new(FrameError::SlotType {
                        index,
                        expected: slot.ty.display_name(),
                        actual: short_type_name(value.type_name()),
                    }),
                });
            }
        }
        Ok(())
    }

    fn target_mismatch(&self, owner: &OwnerType, actual: &str) -> InvokeError {
        InvokeError::TargetTypeMismatch {
            method: self.method.clone(),
            expected: owner.display_name(),
            actual: actual.to_string(),
        }
    }
}

/// **INVOKER GENERATOR**
#[derive(Debug, Clone, Default)]
pub struct InvokerGenerator {
    config: InvokerConfig,
}

impl InvokerGenerator {
    pub fn new(config: InvokerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Describe and generate in one step, bypassing any cache.
    pub fn generate(&self, info: &MethodInfo) -> InvokeResult<GeneratedInvoker> {
        let descriptor = self.describe(info)?;
        Ok(self.generate_from(descriptor, info.body()))
    }

    /// Run the descriptor adapter with this generator's arity limit.
    pub fn describe(&self, info: &MethodInfo) -> InvokeResult<MethodDescriptor> {
        describe_method(info, self.config.max_arity).map_err(|err| {
            log::warn!("rejected {}: {}", info.qualified_name(), err);
            err
        })
    }

    /// Build the invoker for an already adapted descriptor.
    pub fn generate_from(
        &self,
        descriptor: MethodDescriptor,
        body: Arc<dyn MethodBody>,
    ) -> GeneratedInvoker {
        let target = if descriptor.is_static() {
            TargetPlan::Ignore
        } else {
            TargetPlan::Require(descriptor.owner().clone())
        };
        let slots = descriptor
            .parameters()
            .iter()
            .map(|param| SlotPlan {
                ty: param.ty,
                mode: param.mode,
            })
            .collect();
        let returns = match descriptor.return_type() {
            None => ReturnPlan::Void,
            Some(ty) => ReturnPlan::Value {
                verify: self.config.verify_return_type.then_some(ty),
            },
        };

        log::debug!("generated invoker for {}", descriptor.signature());

        Arc::new(CompiledInvoker {
            method: descriptor.qualified_name(),
            descriptor,
            plan: InvocationPlan {
                target,
                slots,
                returns,
                verify_slots: self.config.verify_return_type,
            },
            body,
            log_invocations: self.config.log_invocations,
        })
    }
}
