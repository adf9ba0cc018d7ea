use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// ================================================================================================
// TYPE TAGS
// ================================================================================================

/// What a [`TypeTag`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A concrete `'static` Rust type.
    Value,
    /// Erased type: accepts any value (and null).
    Any,
    /// A raw pointer type. Cannot be carried by a [`Value`].
    Pointer,
    /// The unit type.
    Unit,
}

/// **SEMANTIC TYPE OF A PARAMETER OR RETURN VALUE**
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
    nullable: bool,
}

impl TypeTag {
    /// Non-nullable concrete type.
    pub fn of<T: Any>() -> Self {
        let id = TypeId::of::<T>();
        let kind = if id == TypeId::of::<()>() {
            TypeKind::Unit
        } else {
            TypeKind::Value
        };
        Self {
            id,
            name: std::any::type_name::<T>(),
            kind,
            nullable: false,
        }
    }

    /// Concrete type that also accepts null.
    pub fn nullable<T: Any>() -> Self {
        Self {
            nullable: true,
            ..Self::of::<T>()
        }
    }

    /// Erased type accepting any value, including null.
    pub fn any() -> Self {
        Self {
            id: TypeId::of::<dyn Any>(),
            name: "any",
            kind: TypeKind::Any,
            nullable: true,
        }
    }

    /// Raw pointer to `T`.
    pub fn pointer<T: Any>() -> Self {
        Self {
            id: TypeId::of::<*const T>(),
            name: std::any::type_name::<*const T>(),
            kind: TypeKind::Pointer,
            nullable: true,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Whether a value of this type can live in a [`Value`] slot.
    pub fn is_representable(&self) -> bool {
        matches!(self.kind, TypeKind::Value | TypeKind::Any)
    }

    /// Whether `value` may be bound to a slot of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match value.type_id() {
            None => self.nullable,
            Some(id) => self.kind == TypeKind::Any || id == self.id,
        }
    }

    /// Whether a value of concrete type `id` may be bound to this type.
    pub fn accepts_type(&self, id: TypeId) -> bool {
        self.kind == TypeKind::Any || id == self.id
    }

    /// Name without module paths, e.g. `Vec<String>`.
    pub fn display_name(&self) -> String {
        let mut name = short_type_name(self.name);
        if self.nullable && self.kind == TypeKind::Value {
            name.push('?');
        }
        name
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({})", self.display_name())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Strip module paths from every identifier of a type name.
pub(crate) fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(last_segment(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

// ================================================================================================
// PARAMETER MODES
// ================================================================================================

/// How an argument slot is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterMode {
    /// Read-only input.
    In,
    /// Read on entry, overwritten on return.
    Ref,
    /// Ignored on entry, populated on return.
    Out,
}

impl ParameterMode {
    /// Whether the entry value of the slot is passed to the method.
    pub fn is_read(self) -> bool {
        !matches!(self, ParameterMode::Out)
    }

    /// Whether the slot is written back after the call.
    pub fn is_written(self) -> bool {
        !matches!(self, ParameterMode::In)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParameterMode::In => "in",
            ParameterMode::Ref => "ref",
            ParameterMode::Out => "out",
        }
    }
}

impl fmt::Display for ParameterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ================================================================================================
// OWNING TYPES
// ================================================================================================

/// Type-erased view of a [`Capability`] used for target checks.
pub trait OwnerCapability: Send + Sync {
    fn name(&self) -> &'static str;

    /// Identity of the capability itself (the trait object type).
    fn id(&self) -> TypeId;

    fn is_implemented_by(&self, target: &dyn Any) -> bool;

    fn implementors(&self) -> &[&'static str];

    /// Registered implementor types, sorted.
    fn implementor_ids(&self) -> Vec<TypeId>;
}

trait ErasedCast<Tr: ?Sized>: Send + Sync {
    fn cast<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut Tr>;
}

struct Caster<T, Tr: ?Sized> {
    cast: fn(&mut T) -> &mut Tr,
}

impl<T: Any, Tr: ?Sized + 'static> ErasedCast<Tr> for Caster<T, Tr> {
    fn cast<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut Tr> {
        target.downcast_mut::<T>().map(self.cast)
    }
}

/// **CAPABILITY OWNER**
///
/// A method owner expressed as a trait (`Tr = dyn SomeTrait`). Targets are
/// assignable when their concrete type was registered with
/// [`implemented_by`](Capability::implemented_by). The upcast must name the
/// `'static` object bound explicitly.
///
/// ```rust
/// use dynacall::reflect::Capability;
///
/// trait Greeter {
///     fn greet(&mut self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&mut self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// fn as_greeter(target: &mut English) -> &mut (dyn Greeter + 'static) {
///     target
/// }
///
/// let greeter = Capability::<dyn Greeter>::new("Greeter").implemented_by(as_greeter);
/// let mut target = English;
/// assert_eq!(greeter.cast(&mut target).unwrap().greet(), "hello");
/// ```
pub struct Capability<Tr: ?Sized + 'static> {
    name: &'static str,
    casts: HashMap<TypeId, Box<dyn ErasedCast<Tr>>>,
    implementors: Vec<&'static str>,
}

impl<Tr: ?Sized + 'static> Capability<Tr> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            casts: HashMap::new(),
            implementors: Vec::new(),
        }
    }

    /// Register `T` as an implementor, with the upcast from `T` to `Tr`.
    pub fn implemented_by<T: Any>(mut self, cast: fn(&mut T) -> &mut Tr) -> Self {
        if self
            .casts
            .insert(TypeId::of::<T>(), Box::new(Caster { cast }))
            .is_none()
        {
            self.implementors.push(std::any::type_name::<T>());
        }
        self
    }

    /// View `target` through the capability.
    pub fn cast<'a>(&self, target: &'a mut dyn Any) -> Option<&'a mut Tr> {
        let id = (*target).type_id();
        self.casts.get(&id)?.cast(target)
    }
}

impl<Tr: ?Sized + 'static> OwnerCapability for Capability<Tr> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn id(&self) -> TypeId {
        TypeId::of::<Tr>()
    }

    fn is_implemented_by(&self, target: &dyn Any) -> bool {
        self.casts.contains_key(&(*target).type_id())
    }

    fn implementors(&self) -> &[&'static str] {
        &self.implementors
    }

    fn implementor_ids(&self) -> Vec<TypeId> {
        let mut ids: Vec<TypeId> = self.casts.keys().copied().collect();
        ids.sort();
        ids
    }
}

/// **OWNING TYPE OF A METHOD**
#[derive(Clone)]
pub enum OwnerType {
    /// A concrete type; targets must be exactly this type.
    Type(TypeTag),
    /// A capability; targets must be a registered implementor.
    Capability(Arc<dyn OwnerCapability>),
}

impl OwnerType {
    pub fn id(&self) -> TypeId {
        match self {
            OwnerType::Type(tag) => tag.id(),
            OwnerType::Capability(capability) => capability.id(),
        }
    }

    /// Types a capability owner accepts; empty for a concrete owner.
    pub fn implementor_ids(&self) -> Vec<TypeId> {
        match self {
            OwnerType::Type(_) => Vec::new(),
            OwnerType::Capability(capability) => capability.implementor_ids(),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            OwnerType::Type(tag) => tag.display_name(),
            OwnerType::Capability(capability) => capability.name().to_string(),
        }
    }

    /// Whether `target` is assignable to this owner.
    pub fn accepts(&self, target: &dyn Any) -> bool {
        match self {
            OwnerType::Type(tag) => (*target).type_id() == tag.id(),
            OwnerType::Capability(capability) => capability.is_implemented_by(target),
        }
    }
}

impl fmt::Debug for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerType::Type(tag) => write!(f, "OwnerType::Type({})", tag.display_name()),
            OwnerType::Capability(capability) => f
                .debug_struct("OwnerType::Capability")
                .field("name", &capability.name())
                .field("implementors", &capability.implementors())
                .finish(),
        }
    }
}
