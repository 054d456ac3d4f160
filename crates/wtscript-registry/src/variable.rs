//! Variables and the whole-program variable arena.

use wtscript_core::{FileId, Span, TypeHash, VarId};

use crate::Value;

/// How a variable was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Var,
    Let,
    Const,
    Param,
    Function,
    Class,
    Interface,
    Enum,
    /// The implicit receiver of a class body.
    This,
    /// The implicit parent constructor/prototype of a subclass body.
    Super,
    /// A built-in global with a fixed output name.
    Builtin,
    /// A command line define.
    Define,
}

impl VarKind {
    /// Kinds that keep their output name no matter what the namespace pass does.
    pub fn is_fixed(self) -> bool {
        matches!(self, VarKind::This | VarKind::Super | VarKind::Builtin | VarKind::Define)
    }

    /// Kinds whose name is a type rather than a runtime value.
    pub fn is_type(self) -> bool {
        matches!(self, VarKind::Class | VarKind::Interface | VarKind::Enum)
    }
}

/// A named binding.
///
/// `name` starts as the source name and is rewritten in place by the
/// namespace pass. `value` is attached during name resolution for annotated
/// declarations, and during type evaluation for inferred ones.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub original: String,
    pub kind: VarKind,
    pub constant: bool,
    pub span: Span,
    /// Module the variable was declared in, `None` for globals.
    pub file: Option<FileId>,
    pub value: Option<Value>,
    /// The declaration this name stands for, for classes, interfaces and enums.
    pub object: Option<TypeHash>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VarKind, span: Span) -> Self {
        let name = name.into();
        Self {
            original: name.clone(),
            name,
            kind,
            constant: matches!(
                kind,
                VarKind::Const | VarKind::Class | VarKind::Interface | VarKind::Enum | VarKind::Define
            ),
            span,
            file: None,
            value: None,
            object: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_object(mut self, object: TypeHash) -> Self {
        self.object = Some(object);
        self
    }

    pub fn in_file(mut self, file: FileId) -> Self {
        self.file = Some(file);
        self
    }

    pub fn constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }
}

/// Arena of every variable in the program, addressed by [`VarId`].
#[derive(Debug, Default)]
pub struct Variables {
    vars: Vec<Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, var: Variable) -> VarId {
        let id = VarId::new(self.vars.len() as u32);
        self.vars.push(var);
        id
    }

    /// # Panics
    ///
    /// Panics on an id from another arena.
    pub fn get(&self, id: VarId) -> &Variable {
        &self.vars[id.index()]
    }

    pub fn get_mut(&mut self, id: VarId) -> &mut Variable {
        &mut self.vars[id.index()]
    }

    pub fn name(&self, id: VarId) -> &str {
        &self.vars[id.index()].name
    }

    pub fn set_value(&mut self, id: VarId, value: Value) {
        self.vars[id.index()].value = Some(value);
    }

    /// Rename in place, used by the namespace pass.
    pub fn rename(&mut self, id: VarId, name: impl Into<String>) {
        self.vars[id.index()].name = name.into();
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.vars
            .iter()
            .enumerate()
            .map(|(i, var)| (VarId::new(i as u32), var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_rename() {
        let mut vars = Variables::new();
        let id = vars.add(Variable::new("count", VarKind::Let, Span::default()));

        vars.rename(id, "a");
        assert_eq!(vars.name(id), "a");
        assert_eq!(vars.get(id).original, "count");
    }

    #[test]
    fn constancy_follows_kind() {
        assert!(Variable::new("x", VarKind::Const, Span::default()).constant);
        assert!(Variable::new("C", VarKind::Class, Span::default()).constant);
        assert!(!Variable::new("x", VarKind::Let, Span::default()).constant);
    }

    #[test]
    fn ids_are_sequential() {
        let mut vars = Variables::new();
        let a = vars.add(Variable::new("a", VarKind::Var, Span::default()));
        let b = vars.add(Variable::new("b", VarKind::Var, Span::default()));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(vars.iter().count(), 2);
    }

    #[test]
    fn fixed_kinds() {
        assert!(VarKind::Builtin.is_fixed());
        assert!(VarKind::This.is_fixed());
        assert!(!VarKind::Function.is_fixed());
    }
}
