//! # DYNACALL CORE LIBRARY
//!
//! **DYNAMIC METHOD INVOCATION FOR THE DEPENDENCY-INJECTION CONTAINER**
//!
//! **ARCHITECTURE**: Descriptor adapter → invoker generator → invoker cache → uniform façade
//! **GUARANTEE**: One generated invoker per method signature, shared by all callers
//! **CONTRACT**: `invoke(target, args)` with positional ref/out write-back into `args`
//!
//! ## USAGE
//!
//! ```rust
//! use dynacall::api::*;
//!
//! struct MethodTarget;
//!
//! let factory = DynamicMethodFactory::new();
//! let info = MethodBuilder::new("method_with_ref_parameter")
//!     .param::<String>("lower_upper", ParameterMode::Ref)
//!     .param::<i32>("square", ParameterMode::Ref)
//!     .on(|_: &mut MethodTarget, frame| {
//!         let upper = frame.arg::<String>(0)?.to_uppercase();
//!         frame.set(0, upper)?;
//!         let square = frame.arg_mut::<i32>(1)?;
//!         *square *= *square;
//!         Ok(Value::null())
//!     });
//!
//! let method = factory.create(&info)?;
//! let mut args = vec![Value::new("aleks".to_string()), Value::new(5i32)];
//! method.invoke(Some(&mut MethodTarget), &mut args)?;
//!
//! assert_eq!(args[0].get::<String>().map(String::as_str), Some("ALEKS"));
//! assert_eq!(args[1].get::<i32>(), Some(&25));
//! # Ok::<(), InvokeError>(())
//! ```

pub mod api;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod invoker;
pub mod reflect;
pub mod types;

pub use config::InvokerConfig;
pub use errors::{InvokeError, InvokeResult};
pub use types::{InvocationResult, Value};

#[cfg(test)]
mod tests {
    use crate::api::*;

    struct Greeter {
        greeting: String,
    }

    fn greet_method() -> MethodInfo {
        MethodBuilder::new("greet")
            .param::<String>("name", ParameterMode::In)
            .returns::<String>()
            .on(|greeter: &mut Greeter, frame| {
                let name = frame.arg::<String>(0)?;
                Ok(Value::new(format!("{}, {}!", greeter.greeting, name)))
            })
    }

    // **END-TO-END THROUGH THE PUBLIC API**
    #[test]
    fn test_invoke_matches_direct_call() {
        let factory = DynamicMethodFactory::new();
        let method = factory.create(&greet_method()).unwrap();
        let mut greeter = Greeter {
            greeting: "Hello".to_string(),
        };
        let mut args = vec![Value::new("world".to_string())];

        let result = method.invoke(Some(&mut greeter), &mut args).unwrap();
        assert_eq!(
            result.get::<String>().map(String::as_str),
            Some("Hello, world!")
        );
        assert_eq!(args[0].get::<String>().map(String::as_str), Some("world"));
    }

    #[test]
    fn test_invoke_void_discards_result() {
        let factory = DynamicMethodFactory::new();
        let method = factory.create(&greet_method()).unwrap();
        let mut greeter = Greeter {
            greeting: "Hi".to_string(),
        };
        let mut args = vec![Value::new("there".to_string())];
        assert!(method.invoke_void(Some(&mut greeter), &mut args).is_ok());
    }

    #[test]
    fn test_factory_respects_configured_arity() {
        let factory = DynamicMethodFactory::with_config(InvokerConfig::default().with_max_arity(0));
        let err = factory.create(&greet_method()).unwrap_err();
        assert_eq!(err.code(), "RUST_CORE_INVOKE_UNSUPPORTED_SIGNATURE");
        assert_eq!(err.method(), "Greeter::greet");
    }

    #[test]
    fn test_error_messages_name_the_method() {
        let factory = DynamicMethodFactory::new();
        let method = factory.create(&greet_method()).unwrap();
        let err = method.invoke(None, &mut []).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ARITY MISMATCH"));
        assert!(message.contains("Greeter::greet"));
    }
}
