pub mod cache;
pub mod facade;
pub mod frame;
pub mod generator;


pub use cache::InvokerCache;
pub use facade::{DynamicInvoker, DynamicMethod, DynamicMethodFactory};
pub use frame::Frame;
pub use generator::{CompiledInvoker, GeneratedInvoker, InvokerGenerator};
