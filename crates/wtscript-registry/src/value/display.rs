//! Human readable rendering of values for diagnostics.

use std::fmt::Write;

use crate::{Overload, TypeRegistry, Value};

impl TypeRegistry {
    /// Render a value the way it would be written as a type annotation.
    pub fn describe(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value);
        out
    }

    fn write_value(&self, out: &mut String, value: &Value) {
        match value {
            Value::Any => out.push_str("any"),
            Value::Instance(instance) => {
                out.push_str(self.type_name(instance.interface));
                if !instance.args.is_empty() {
                    out.push('<');
                    self.write_list(out, &instance.args);
                    out.push('>');
                }
            }
            Value::LiteralInt(v) => {
                let _ = write!(out, "Int({v})");
            }
            Value::LiteralBool(v) => {
                let _ = write!(out, "Boolean({v})");
            }
            Value::LiteralString(v) => {
                let _ = write!(out, "String({v:?})");
            }
            Value::Function(func) => {
                for (i, overload) in func.overloads.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.write_overload(out, overload);
                }
            }
            Value::Class(class) => {
                out.push_str("class ");
                out.push_str(self.type_name(class.interface));
            }
            Value::Enum(hash) => {
                out.push_str("enum ");
                out.push_str(self.type_name(*hash));
            }
            Value::Tuple(tuple) => {
                out.push('[');
                self.write_list(out, &tuple.items);
                out.push(']');
            }
            Value::Located(inner, _) => self.write_value(out, inner),
            Value::This(class) => out.push_str(self.type_name(*class)),
        }
    }

    fn write_list(&self, out: &mut String, values: &[Value]) {
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_value(out, value);
        }
    }

    fn write_overload(&self, out: &mut String, overload: &Overload) {
        out.push('(');
        self.write_list(out, &overload.params);
        out.push_str(") => ");
        match &overload.ret {
            Some(ret) => self.write_value(out, ret),
            None => out.push_str("void"),
        }
    }
}
