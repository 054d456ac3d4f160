//! Built-in prototypes of the output language.
//!
//! `Array` and `Promise` are generic over one argument. Their members depend on
//! that argument and are produced on lookup by [`generic_member`] instead of
//! being stored on the entry.

use wtscript_core::{TypeHash, primitives};

use crate::entries::{EnumEntry, MemberEntry, PrimitiveEntry};
use crate::{Overload, Value};

fn method(name: &str, params: Vec<Value>, ret: Option<Value>) -> MemberEntry {
    MemberEntry::method(name, Value::simple_function(params, ret))
}

fn overloaded(name: &str, overloads: Vec<Overload>) -> MemberEntry {
    MemberEntry::method(name, Value::function(overloads))
}

/// Every built-in prototype, parents before children.
pub(crate) fn prototypes() -> Vec<PrimitiveEntry> {
    let string = Value::string;
    let int = Value::int;

    vec![
        PrimitiveEntry::new("Object", primitives::OBJECT)
            .with_constructor(vec![])
            .with_member(method("toString", vec![], Some(string()))),
        PrimitiveEntry::new("Number", primitives::NUMBER)
            .with_parent(primitives::OBJECT)
            .universal()
            .with_constructor(vec![Value::Any])
            .with_member(method("toFixed", vec![int()], Some(string()))),
        PrimitiveEntry::new("Int", primitives::INT)
            .with_parent(primitives::NUMBER)
            .universal()
            .with_constructor(vec![Value::Any]),
        PrimitiveEntry::new("Boolean", primitives::BOOLEAN)
            .with_parent(primitives::OBJECT)
            .universal()
            .with_constructor(vec![Value::Any]),
        PrimitiveEntry::new("String", primitives::STRING)
            .with_parent(primitives::OBJECT)
            .universal()
            .with_constructor(vec![Value::Any])
            .with_member(MemberEntry::getter("length", int()))
            .with_member(method("charAt", vec![int()], Some(string())))
            .with_member(method("indexOf", vec![string()], Some(int())))
            .with_member(method("includes", vec![string()], Some(Value::boolean())))
            .with_member(overloaded(
                "slice",
                Overload::with_optional(vec![int(), int()], 1, Some(string())),
            ))
            .with_member(method("split", vec![string()], Some(Value::array(string()))))
            .with_member(method("toUpperCase", vec![], Some(string())))
            .with_member(method("toLowerCase", vec![], Some(string())))
            .with_member(method("trim", vec![], Some(string()))),
        PrimitiveEntry::new("Array", primitives::ARRAY)
            .with_parent(primitives::OBJECT)
            .with_type_params(1)
            .universal()
            .with_constructor(vec![]),
        PrimitiveEntry::new("Promise", primitives::PROMISE)
            .with_parent(primitives::OBJECT)
            .with_type_params(1),
    ]
}

/// Members of `Array<T>` and `Promise<T>`. A missing argument is `any`.
pub(crate) fn generic_member(hash: TypeHash, args: &[Value], name: &str) -> Option<MemberEntry> {
    let item = args.first().cloned().unwrap_or(Value::Any);
    let void = |params: Vec<Value>| Value::simple_function(params, None);

    if hash == primitives::ARRAY {
        let array = Value::array(item.clone());
        let member = match name {
            "length" => MemberEntry::getter("length", Value::int()),
            "push" => method("push", vec![item], Some(Value::int())),
            "pop" => method("pop", vec![], Some(item)),
            "indexOf" => method("indexOf", vec![item], Some(Value::int())),
            "includes" => method("includes", vec![item], Some(Value::boolean())),
            "join" => overloaded(
                "join",
                Overload::with_optional(vec![Value::string()], 0, Some(Value::string())),
            ),
            "slice" => overloaded(
                "slice",
                Overload::with_optional(vec![Value::int(), Value::int()], 0, Some(array)),
            ),
            "concat" => method("concat", vec![array.clone()], Some(array)),
            "forEach" => method("forEach", vec![void(vec![item])], None),
            "filter" => method(
                "filter",
                vec![Value::simple_function(vec![item], Some(Value::boolean()))],
                Some(array),
            ),
            _ => return None,
        };
        return Some(member);
    }

    if hash == primitives::PROMISE {
        let member = match name {
            "then" => method("then", vec![void(vec![item])], None),
            "catch" => method("catch", vec![void(vec![Value::Any])], None),
            _ => return None,
        };
        return Some(member);
    }

    None
}

/// Static side of an enum: one getter per member plus the reflection helpers.
pub(crate) fn enum_static_member(entry: &EnumEntry, name: &str) -> Option<MemberEntry> {
    let instance = Value::instance(entry.type_hash);
    let member = match name {
        "values" => MemberEntry::getter("values", Value::array(instance)),
        "keys" => MemberEntry::getter("keys", Value::array(Value::string())),
        "value" => method("value", vec![Value::string()], Some(instance)),
        "key" => method("key", vec![instance], Some(Value::string())),
        _ => {
            entry.find_member(name)?;
            MemberEntry::getter(name, instance)
        }
    };
    Some(member.as_static())
}
