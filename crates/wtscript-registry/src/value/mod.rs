//! Compile-time values.
//!
//! Every expression evaluates to a [`Value`]. The variant set is closed:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Any` | unknown, accepted anywhere it is expected |
//! | `Instance` | an instance of one interface or prototype |
//! | `LiteralInt` / `LiteralBool` / `LiteralString` | an instance narrowed to one exact value |
//! | `Function` | one or more overloads |
//! | `Class` | constructor overloads plus the interface they produce |
//! | `Enum` | the static side of an enum declaration |
//! | `Tuple` | fixed length items, either an array literal or a structural tuple |
//! | `Located` | another value, reported at a different source position |
//! | `This` | the receiver inside a class body |
//!
//! Values are immutable once produced and cheap to clone.

mod display;

use std::rc::Rc;

use wtscript_core::{Span, TypeHash, primitives};

/// One parameter/return shape of a function or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Overload {
    pub params: Vec<Value>,
    /// `None` means void.
    pub ret: Option<Value>,
}

impl Overload {
    pub fn new(params: Vec<Value>, ret: Option<Value>) -> Self {
        Self { params, ret }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionValue {
    pub overloads: Vec<Overload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassValue {
    /// The prototype instances of this class belong to.
    pub interface: TypeHash,
    /// Constructor argument lists.
    pub constructors: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleValue {
    pub items: Vec<Value>,
    /// An array literal rather than a structural tuple.
    pub literal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub interface: TypeHash,
    /// Type arguments, for `Array<T>` and `Promise<T>`. Empty means unconstrained.
    pub args: Rc<[Value]>,
}

impl Instance {
    pub fn new(interface: TypeHash) -> Self {
        Self {
            interface,
            args: Rc::from(Vec::new()),
        }
    }

    pub fn with_args(interface: TypeHash, args: Vec<Value>) -> Self {
        Self {
            interface,
            args: Rc::from(args),
        }
    }

    /// The first type argument, if any.
    pub fn arg(&self) -> Option<&Value> {
        self.args.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Any,
    Instance(Instance),
    LiteralInt(i64),
    LiteralBool(bool),
    LiteralString(Rc<str>),
    Function(Rc<FunctionValue>),
    Class(Rc<ClassValue>),
    Enum(TypeHash),
    Tuple(Rc<TupleValue>),
    Located(Rc<Value>, Span),
    This(TypeHash),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn instance(interface: TypeHash) -> Self {
        Value::Instance(Instance::new(interface))
    }

    pub fn generic(interface: TypeHash, args: Vec<Value>) -> Self {
        Value::Instance(Instance::with_args(interface, args))
    }

    pub fn int() -> Self {
        Self::instance(primitives::INT)
    }

    pub fn number() -> Self {
        Self::instance(primitives::NUMBER)
    }

    pub fn boolean() -> Self {
        Self::instance(primitives::BOOLEAN)
    }

    pub fn string() -> Self {
        Self::instance(primitives::STRING)
    }

    pub fn array(item: Value) -> Self {
        Self::generic(primitives::ARRAY, vec![item])
    }

    pub fn promise(item: Value) -> Self {
        Self::generic(primitives::PROMISE, vec![item])
    }

    pub fn literal_string(value: &str) -> Self {
        Value::LiteralString(Rc::from(value))
    }

    pub fn function(overloads: Vec<Overload>) -> Self {
        Value::Function(Rc::new(FunctionValue { overloads }))
    }

    /// A function with a single overload.
    pub fn simple_function(params: Vec<Value>, ret: Option<Value>) -> Self {
        Self::function(vec![Overload::new(params, ret)])
    }

    pub fn class(interface: TypeHash, constructors: Vec<Vec<Value>>) -> Self {
        Value::Class(Rc::new(ClassValue {
            interface,
            constructors,
        }))
    }

    /// An array literal.
    pub fn array_literal(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(TupleValue {
            items,
            literal: true,
        }))
    }

    /// A structural tuple.
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::new(TupleValue {
            items,
            literal: false,
        }))
    }

    /// Report this value at `span`.
    pub fn located(self, span: Span) -> Self {
        match self {
            Value::Located(inner, _) => Value::Located(inner, span),
            other => Value::Located(Rc::new(other), span),
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Strip position wrappers.
    pub fn peel(&self) -> &Value {
        match self {
            Value::Located(inner, _) => inner.peel(),
            other => other,
        }
    }

    /// The outermost source position attached to this value.
    pub fn location(&self) -> Option<Span> {
        match self {
            Value::Located(_, span) => Some(*span),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self.peel(), Value::Any)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.peel(),
            Value::LiteralInt(_) | Value::LiteralBool(_) | Value::LiteralString(_)
        )
    }

    /// The interface and type arguments this value is an instance of, with
    /// literals and receivers widened. `None` for non-instances.
    pub fn instance_of(&self) -> Option<Instance> {
        match self.peel() {
            Value::Instance(instance) => Some(instance.clone()),
            Value::LiteralInt(_) => Some(Instance::new(primitives::INT)),
            Value::LiteralBool(_) => Some(Instance::new(primitives::BOOLEAN)),
            Value::LiteralString(_) => Some(Instance::new(primitives::STRING)),
            Value::This(class) => Some(Instance::new(*class)),
            Value::Tuple(tuple) if tuple.literal => Some(tuple.as_array()),
            _ => None,
        }
    }

    pub fn interface(&self) -> Option<TypeHash> {
        self.instance_of().map(|instance| instance.interface)
    }

    /// Drop literal narrowing and position wrappers. Array literals become
    /// `Array` instances, the receiver becomes a plain instance.
    pub fn widen(&self) -> Value {
        match self.peel() {
            Value::LiteralInt(_)
            | Value::LiteralBool(_)
            | Value::LiteralString(_)
            | Value::This(_) => self.instance_of().map(Value::Instance).unwrap_or(Value::Any),
            Value::Tuple(tuple) if tuple.literal => Value::Instance(tuple.as_array()),
            other => other.clone(),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match self.peel() {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassValue> {
        match self.peel() {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Common value of a list, used as the item type of array literals.
    ///
    /// Identical widened values stay as they are, `Int` and `Number` mix to
    /// `Number`, anything else is `Any`.
    pub fn common(items: &[Value]) -> Option<Value> {
        let mut widened = items.iter().map(Value::widen);
        let first = widened.next()?;
        let mut common = first;
        for item in widened {
            if item == common {
                continue;
            }
            let numeric = |v: &Value| {
                matches!(v.interface(), Some(h) if h == primitives::INT || h == primitives::NUMBER)
            };
            if numeric(&item) && numeric(&common) {
                common = Value::number();
            } else {
                return Some(Value::Any);
            }
        }
        Some(common)
    }
}

impl TupleValue {
    /// The `Array` instance an array literal stands for.
    pub fn as_array(&self) -> Instance {
        match Value::common(&self.items) {
            Some(item) => Instance::with_args(primitives::ARRAY, vec![item]),
            None => Instance::new(primitives::ARRAY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_widen() {
        assert_eq!(Value::LiteralInt(3).widen(), Value::int());
        assert_eq!(Value::literal_string("a").widen(), Value::string());
        assert_eq!(Value::LiteralBool(true).widen(), Value::boolean());
        assert_eq!(Value::int().widen(), Value::int());
    }

    #[test]
    fn located_peels() {
        let v = Value::int().located(Span::new(2, 3, 1));
        assert_eq!(v.peel(), &Value::int());
        assert_eq!(v.location(), Some(Span::new(2, 3, 1)));

        let moved = v.located(Span::new(9, 9, 1));
        assert_eq!(moved.location(), Some(Span::new(9, 9, 1)));
        assert_eq!(moved.peel(), &Value::int());
    }

    #[test]
    fn array_literal_item_type() {
        let ints = Value::array_literal(vec![Value::LiteralInt(1), Value::LiteralInt(2)]);
        assert_eq!(ints.widen(), Value::array(Value::int()));

        let mixed_numbers = Value::array_literal(vec![Value::LiteralInt(1), Value::number()]);
        assert_eq!(mixed_numbers.widen(), Value::array(Value::number()));

        let mixed = Value::array_literal(vec![Value::LiteralInt(1), Value::literal_string("a")]);
        assert_eq!(mixed.widen(), Value::array(Value::Any));

        let empty = Value::array_literal(vec![]);
        assert_eq!(empty.widen(), Value::instance(primitives::ARRAY));
    }

    #[test]
    fn structural_tuples_stay() {
        let t = Value::tuple(vec![Value::int(), Value::string()]);
        assert_eq!(t.widen(), t);
        assert!(t.instance_of().is_none());
    }

    #[test]
    fn this_is_an_instance() {
        let class = TypeHash(42);
        assert_eq!(Value::This(class).interface(), Some(class));
        assert_eq!(Value::This(class).widen(), Value::instance(class));
    }
}
