use dynacall::api::*;
use dynacall::errors::error_codes;
use rayon::prelude::*;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Date {
    year: i32,
    month: u32,
    day: u32,
}

impl Date {
    fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

#[derive(Debug, Clone)]
struct Inventor {
    name: String,
    born: Date,
}

impl Inventor {
    fn new(name: &str, born: Date) -> Self {
        Self {
            name: name.to_string(),
            born,
        }
    }

    fn age_at(&self, on: Date) -> i32 {
        let mut age = on.year - self.born.year;
        if (on.month, on.day) < (self.born.month, self.born.day) {
            age -= 1;
        }
        age
    }
}

fn tesla() -> Inventor {
    Inventor::new("Nikola Tesla", Date::new(1856, 7, 9))
}

fn age_at_method() -> MethodInfo {
    MethodBuilder::new("age_at")
        .param::<Date>("on", ParameterMode::In)
        .returns::<i32>()
        .on(|inventor: &mut Inventor, frame| Ok(Value::new(inventor.age_at(*frame.arg::<Date>(0)?))))
}

struct MethodTarget;

impl MethodTarget {
    fn method_returning_string(&self, _count: i32, _on: Date, _tags: &[String], inventor: &Inventor) -> String {
        inventor.name.clone()
    }

    fn method_with_out_parameter(&self, lower: &str, upper: &mut Option<String>) {
        *upper = Some(lower.to_uppercase());
    }

    fn method_with_ref_parameter(&self, lower_upper: &mut String, square: &mut i32) {
        *lower_upper = lower_upper.to_uppercase();
        *square *= *square;
    }

    /// Typed wrapper that drives `do_it` through a dynamic method.
    fn do_it_caller(
        &self,
        factory: &DynamicMethodFactory,
        count: i32,
        reference: &mut i32,
    ) -> InvokeResult<String> {
        let method = factory.create(&do_it_method(&ref_out_capability()))?;
        let mut target = RefOutTestObject;
        let mut args = vec![Value::new(count), Value::new(*reference), Value::null()];
        method.invoke_void(Some(&mut target), &mut args)?;

        *reference = args[1].get::<i32>().copied().unwrap_or(*reference);
        Ok(args[2].get::<String>().cloned().unwrap_or_default())
    }
}

fn method_returning_string() -> MethodInfo {
    MethodBuilder::new("method_returning_string")
        .param::<i32>("count", ParameterMode::In)
        .param::<Date>("on", ParameterMode::In)
        .param::<Vec<String>>("tags", ParameterMode::In)
        .param::<Inventor>("inventor", ParameterMode::In)
        .returns::<String>()
        .on(|target: &mut MethodTarget, frame| {
            Ok(Value::new(target.method_returning_string(
                *frame.arg::<i32>(0)?,
                *frame.arg::<Date>(1)?,
                frame.arg::<Vec<String>>(2)?,
                frame.arg::<Inventor>(3)?,
            )))
        })
}

fn method_with_ref_parameter() -> MethodInfo {
    MethodBuilder::new("method_with_ref_parameter")
        .param::<String>("lower_upper", ParameterMode::Ref)
        .param::<i32>("square", ParameterMode::Ref)
        .on(|target: &mut MethodTarget, frame| {
            let mut lower_upper = frame.arg::<String>(0)?.clone();
            let mut square = *frame.arg::<i32>(1)?;
            target.method_with_ref_parameter(&mut lower_upper, &mut square);
            frame.set(0, lower_upper)?;
            frame.set(1, square)?;
            Ok(Value::null())
        })
}

fn method_with_out_parameter() -> MethodInfo {
    MethodBuilder::new("method_with_out_parameter")
        .param::<String>("lower", ParameterMode::In)
        .nullable_param::<String>("upper", ParameterMode::Out)
        .on(|target: &mut MethodTarget, frame| {
            let mut upper = None;
            target.method_with_out_parameter(frame.arg::<String>(0)?, &mut upper);
            if let Some(upper) = upper {
                frame.set(1, upper)?;
            }
            Ok(Value::null())
        })
}

trait RefOut {
    fn do_it(&mut self, count: i32, reference: &mut i32, output: &mut Option<String>);
}

struct RefOutTestObject;

impl RefOut for RefOutTestObject {
    fn do_it(&mut self, _count: i32, reference: &mut i32, output: &mut Option<String>) {
        *output = Some("done".to_string());
        *reference += 1;
    }
}

fn as_ref_out(target: &mut RefOutTestObject) -> &mut (dyn RefOut + 'static) {
    target
}

fn ref_out_capability() -> Arc<Capability<dyn RefOut>> {
    Arc::new(Capability::<dyn RefOut>::new("RefOut").implemented_by(as_ref_out))
}

fn do_it_method(capability: &Arc<Capability<dyn RefOut>>) -> MethodInfo {
    MethodBuilder::new("do_it")
        .param::<i32>("count", ParameterMode::In)
        .param::<i32>("reference", ParameterMode::Ref)
        .nullable_param::<String>("output", ParameterMode::Out)
        .on_capability(capability, |target: &mut (dyn RefOut + 'static), frame| {
            let count = *frame.arg::<i32>(0)?;
            let mut reference = *frame.arg::<i32>(1)?;
            let mut output = None;
            target.do_it(count, &mut reference, &mut output);
            frame.set(1, reference)?;
            if let Some(output) = output {
                frame.set(2, output)?;
            }
            Ok(Value::null())
        })
}

struct StringUtils;

fn is_null_or_empty() -> MethodInfo {
    MethodBuilder::new("is_null_or_empty")
        .nullable_param::<String>("value", ParameterMode::In)
        .returns::<bool>()
        .on_static::<StringUtils, _>(|frame| {
            let empty = frame.opt_arg::<String>(0)?.map_or(true, String::is_empty);
            Ok(Value::new(empty))
        })
}

#[test]
fn test_instance_methods_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let today = Date::new(2026, 10, 18);

    let mut tesla = tesla();
    let expected_age = tesla.age_at(today);
    let age_at = factory.create(&age_at_method()).unwrap();
    let result = age_at
        .invoke(Some(&mut tesla), &mut [Value::new(today)])
        .unwrap();
    assert_eq!(result.get::<i32>(), Some(&expected_age));

    let method = factory.create(&method_returning_string()).unwrap();
    let mut args = vec![
        Value::new(5i32),
        Value::new(today),
        Value::new(vec!["xyz".to_string(), "abc".to_string()]),
        Value::new(tesla.clone()),
    ];
    let result = method.invoke(Some(&mut MethodTarget), &mut args).unwrap();
    assert_eq!(result.get::<String>(), Some(&tesla.name));
}

#[test]
fn test_instance_method_mutates_target_integration() {
    init_logging();
    let remove_at = MethodBuilder::new("remove_at")
        .param::<usize>("index", ParameterMode::In)
        .on(|list: &mut Vec<String>, frame| {
            let index = *frame.arg::<usize>(0)?;
            if index >= list.len() {
                return Err(format!("index {} out of range for length {}", index, list.len()).into());
            }
            list.remove(index);
            Ok(Value::null())
        });

    let factory = DynamicMethodFactory::new();
    let remove_at = factory.create(&remove_at).unwrap();
    let mut list = vec!["one".to_string(), "two".to_string(), "three".to_string()];

    remove_at
        .invoke_void(Some(&mut list), &mut [Value::new(1usize)])
        .unwrap();
    assert_eq!(list, vec!["one".to_string(), "three".to_string()]);

    let err = remove_at
        .invoke_void(Some(&mut list), &mut [Value::new(7usize)])
        .unwrap_err();
    assert_eq!(err.code(), error_codes::TARGET_INVOCATION_FAILURE);
    assert_eq!(list.len(), 2);
}

#[test]
fn test_static_methods_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let method = factory.create(&is_null_or_empty()).unwrap();

    let check = |arg: Value| -> bool {
        let result = method.invoke(None, &mut [arg]).unwrap();
        *result.get::<bool>().unwrap()
    };
    assert!(check(Value::null()));
    assert!(check(Value::new(String::new())));
    assert!(!check(Value::new("Ana Maria".to_string())));

    // Targets are ignored by static methods.
    let mut ignored = tesla();
    let result = method
        .invoke(Some(&mut ignored), &mut [Value::new("x".to_string())])
        .unwrap();
    assert_eq!(result.get::<bool>(), Some(&false));
}

#[test]
fn test_ref_out_methods_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let mut target = MethodTarget;

    let ref_method = factory.create(&method_with_ref_parameter()).unwrap();
    let mut args = vec![Value::new("aleks".to_string()), Value::new(5i32)];
    let result = ref_method.invoke(Some(&mut target), &mut args).unwrap();
    assert!(result.is_void());
    assert_eq!(args[0].get::<String>().map(String::as_str), Some("ALEKS"));
    assert_eq!(args[1].get::<i32>(), Some(&25));

    let out_method = factory.create(&method_with_out_parameter()).unwrap();
    let mut args = vec![Value::new("aleks".to_string()), Value::null()];
    out_method.invoke(Some(&mut target), &mut args).unwrap();
    assert_eq!(args[0].get::<String>().map(String::as_str), Some("aleks"));
    assert_eq!(args[1].get::<String>().map(String::as_str), Some("ALEKS"));

    let capability = ref_out_capability();
    let ref_out_method = factory.create(&do_it_method(&capability)).unwrap();
    let mut ref_out_target = RefOutTestObject;
    let mut args = vec![Value::new(0i32), Value::new(1i32), Value::null()];

    ref_out_method.invoke(Some(&mut ref_out_target), &mut args).unwrap();
    assert_eq!(args[1].get::<i32>(), Some(&2));
    assert_eq!(args[2].get::<String>().map(String::as_str), Some("done"));

    ref_out_method.invoke(Some(&mut ref_out_target), &mut args).unwrap();
    assert_eq!(args[1].get::<i32>(), Some(&3));
    assert_eq!(args[2].get::<String>().map(String::as_str), Some("done"));

    let mut count = 0;
    let done = target.do_it_caller(&factory, 0, &mut count).unwrap();
    assert_eq!(count, 1);
    assert_eq!(done, "done");
}

#[test]
fn test_capability_rejects_unregistered_target_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let method = factory.create(&do_it_method(&ref_out_capability())).unwrap();
    let mut args = vec![Value::new(0i32), Value::new(1i32), Value::null()];

    let err = method.invoke(Some(&mut MethodTarget), &mut args).unwrap_err();
    assert!(matches!(err, InvokeError::TargetTypeMismatch { .. }));
    assert_eq!(args[1].get::<i32>(), Some(&1));
}

#[test]
fn test_arity_mismatch_leaves_args_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let method = factory.create(&method_with_ref_parameter()).unwrap();
    let mut args = vec![Value::new("aleks".to_string())];

    let err = method.invoke(Some(&mut MethodTarget), &mut args).unwrap_err();
    assert!(matches!(
        err,
        InvokeError::ArityMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
    assert_eq!(args[0].get::<String>().map(String::as_str), Some("aleks"));
}

#[test]
fn test_argument_type_mismatch_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let method = factory.create(&method_with_ref_parameter()).unwrap();
    let mut args = vec![Value::new("aleks".to_string()), Value::new(5i64)];

    let err = method.invoke(Some(&mut MethodTarget), &mut args).unwrap_err();
    assert_eq!(err.code(), error_codes::ARGUMENT_TYPE_MISMATCH);
    assert!(matches!(err, InvokeError::ArgumentTypeMismatch { index: 1, .. }));
    assert_eq!(args[0].get::<String>().map(String::as_str), Some("aleks"));
}

#[test]
fn test_concurrent_create_and_invoke_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    let info = method_with_ref_parameter();

    let methods: Vec<DynamicMethod> = (0..32)
        .into_par_iter()
        .map(|_| factory.create(&info).unwrap())
        .collect();
    assert!(methods.iter().all(|m| m.shares_invoker_with(&methods[0])));
    assert_eq!(factory.cache().len(), 1);

    let squares: Vec<i32> = (0..256i32)
        .into_par_iter()
        .map(|n| {
            let mut args = vec![Value::new(format!("n{}", n)), Value::new(n)];
            methods[n as usize % methods.len()]
                .invoke_void(Some(&mut MethodTarget), &mut args)
                .unwrap();
            *args[1].get::<i32>().unwrap()
        })
        .collect();
    for (n, square) in squares.iter().enumerate() {
        assert_eq!(*square, (n * n) as i32);
    }
}

#[test]
fn test_config_from_json_integration() {
    init_logging();
    let config = InvokerConfig::from_json(r#"{"max_arity": 2, "verify_return_type": false}"#).unwrap();
    let factory = DynamicMethodFactory::with_config(config);

    assert!(factory.create(&method_with_ref_parameter()).is_ok());
    let err = factory.create(&method_returning_string()).unwrap_err();
    assert!(matches!(err, InvokeError::UnsupportedSignature { .. }));
    assert!(err.to_string().contains("method_returning_string"));
}

#[test]
fn test_cache_snapshot_integration() {
    init_logging();
    let factory = DynamicMethodFactory::new();
    factory.create(&method_with_out_parameter()).unwrap();
    factory.create(&is_null_or_empty()).unwrap();

    let snapshot = factory.cache().snapshot();
    let signatures: Vec<&str> = snapshot.iter().map(|s| s.signature.as_str()).collect();
    assert_eq!(
        signatures,
        vec![
            "MethodTarget::method_with_out_parameter(String lower, out String? upper) -> void",
            "static StringUtils::is_null_or_empty(String? value) -> bool",
        ]
    );

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json[1]["is_static"], true);
    assert_eq!(json[0]["parameters"][1]["mode"], "out");
}
